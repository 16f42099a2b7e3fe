use blake2::{digest::{Update, VariableOutput}, Blake2bVar};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use crate::error::{CodecError, Result};

/// Size in bytes of every id field on the wire
pub const DIGEST32_SIZE: usize = 32;

/// A 32 byte hash used for box, transaction and token identifiers
///
/// Raw bytes internally, lowercase hex at the public surface.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest32(pub [u8; DIGEST32_SIZE]);

/// Identifier of a box: hash of its canonical encoding
pub type BoxId = Digest32;

/// Identifier of a transaction: hash of its bytes to sign
pub type TxId = Digest32;

/// Identifier of a token
pub type TokenId = Digest32;

impl Digest32 {
    /// Create a digest from a byte slice of exactly 32 bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != DIGEST32_SIZE {
            return Err(CodecError::InvalidLength {
                expected: DIGEST32_SIZE,
                actual: bytes.len(),
            });
        }

        let mut array = [0u8; DIGEST32_SIZE];
        array.copy_from_slice(bytes);
        Ok(Self(array))
    }

    /// Get the digest as bytes
    pub fn as_bytes(&self) -> &[u8; DIGEST32_SIZE] {
        &self.0
    }

    /// Get the digest as a hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a digest from a hex string
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str.trim())?;
        Self::from_bytes(&bytes)
    }
}

impl From<[u8; DIGEST32_SIZE]> for Digest32 {
    fn from(bytes: [u8; DIGEST32_SIZE]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Digest32 {
    type Error = CodecError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes(bytes)
    }
}

impl AsRef<[u8]> for Digest32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Digest32 {
    type Err = CodecError;

    fn from_str(value: &str) -> Result<Self> {
        Self::from_hex(value)
    }
}

impl std::fmt::Display for Digest32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::fmt::Debug for Digest32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Digest32({})", self.to_hex())
    }
}

impl Serialize for Digest32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Blake2b with a 256 bit output, the hash behind every id in this crate
pub fn blake2b256(data: &[u8]) -> Result<Digest32> {
    let mut hasher = Blake2bVar::new(DIGEST32_SIZE)
        .map_err(|e| CodecError::Blake2bError(e.to_string()))?;
    hasher.update(data);

    let mut result = [0u8; DIGEST32_SIZE];
    hasher
        .finalize_variable(&mut result)
        .map_err(|e| CodecError::Blake2bError(e.to_string()))?;
    Ok(Digest32(result))
}

/// Serde helpers rendering byte vectors as hex strings
pub(crate) mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.trim()).map_err(serde::de::Error::custom)
    }
}
