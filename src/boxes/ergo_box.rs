use serde::{Deserialize, Serialize};

use crate::boxes::box_codec;
use crate::boxes::registers::NonMandatoryRegisters;
use crate::digest::{hex_bytes, BoxId, TokenId, TxId};
use crate::error::Result;

/// Upper bound on the encoded size of one box, used as a writer capacity hint
pub const MAX_BOX_SIZE: usize = 4_096;

/// An amount of one token held by a box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
    pub token_id: TokenId,
    pub amount: u64,
}

impl TokenAmount {
    pub fn new(token_id: TokenId, amount: u64) -> Self {
        Self { token_id, amount }
    }
}

/// An output that is not yet part of a transaction
///
/// Carries everything a box does except its id, owning transaction and
/// output index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxCandidate {
    pub value: u64,
    /// Serialized spending condition
    #[serde(with = "hex_bytes")]
    pub ergo_tree: Vec<u8>,
    pub creation_height: u32,
    /// Tokens in the order they were added; order is part of the encoding
    pub assets: Vec<TokenAmount>,
    pub additional_registers: NonMandatoryRegisters,
}

impl BoxCandidate {
    pub fn new(value: u64, ergo_tree: Vec<u8>, creation_height: u32) -> Self {
        Self {
            value,
            ergo_tree,
            creation_height,
            ..Self::default()
        }
    }

    pub fn with_assets(mut self, assets: Vec<TokenAmount>) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_registers(mut self, registers: NonMandatoryRegisters) -> Self {
        self.additional_registers = registers;
        self
    }
}

/// An immutable, content-addressed output
///
/// The id is always the hash of the canonical encoding of every other field,
/// so it can only be obtained by hashing or by decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErgoBox {
    box_id: BoxId,
    #[serde(flatten)]
    candidate: BoxCandidate,
    transaction_id: TxId,
    index: u16,
}

impl ErgoBox {
    /// Anchor a candidate as output `index` of `transaction_id`, deriving its id
    pub fn from_candidate(candidate: BoxCandidate, transaction_id: TxId, index: u16) -> Result<Self> {
        let box_id = box_codec::compute_box_id(&candidate, &transaction_id, index)?;
        Ok(Self::with_id(box_id, candidate, transaction_id, index))
    }

    /// Assemble a box whose id was derived by a codec path
    pub(crate) fn with_id(
        box_id: BoxId,
        candidate: BoxCandidate,
        transaction_id: TxId,
        index: u16,
    ) -> Self {
        Self {
            box_id,
            candidate,
            transaction_id,
            index,
        }
    }

    pub fn box_id(&self) -> &BoxId {
        &self.box_id
    }

    pub fn value(&self) -> u64 {
        self.candidate.value
    }

    pub fn ergo_tree(&self) -> &[u8] {
        &self.candidate.ergo_tree
    }

    pub fn creation_height(&self) -> u32 {
        self.candidate.creation_height
    }

    pub fn assets(&self) -> &[TokenAmount] {
        &self.candidate.assets
    }

    pub fn additional_registers(&self) -> &NonMandatoryRegisters {
        &self.candidate.additional_registers
    }

    pub fn transaction_id(&self) -> &TxId {
        &self.transaction_id
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    /// Every field except the identity ones
    pub fn candidate(&self) -> &BoxCandidate {
        &self.candidate
    }

    pub fn into_candidate(self) -> BoxCandidate {
        self.candidate
    }

    /// Canonical encoding, the preimage of the box id
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        box_codec::serialize_box_to_bytes(self)
    }

    /// Decode a top-level box that occupies all of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        box_codec::deserialize_box_from_bytes(bytes)
    }

    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str.trim())?;
        Self::from_bytes(&bytes)
    }
}

/// Either kind of box, as accepted by the box serializer
#[derive(Debug, Clone, Copy)]
pub enum BoxRef<'a> {
    Candidate(&'a BoxCandidate),
    Anchored(&'a ErgoBox),
}

impl<'a> BoxRef<'a> {
    pub fn fields(&self) -> &'a BoxCandidate {
        match self {
            BoxRef::Candidate(candidate) => candidate,
            BoxRef::Anchored(ergo_box) => &ergo_box.candidate,
        }
    }

    /// Owning transaction and output index, when known
    pub fn anchor(&self) -> Option<(&'a TxId, u16)> {
        match self {
            BoxRef::Candidate(_) => None,
            BoxRef::Anchored(ergo_box) => Some((&ergo_box.transaction_id, ergo_box.index)),
        }
    }
}

impl<'a> From<&'a BoxCandidate> for BoxRef<'a> {
    fn from(candidate: &'a BoxCandidate) -> Self {
        BoxRef::Candidate(candidate)
    }
}

impl<'a> From<&'a ErgoBox> for BoxRef<'a> {
    fn from(ergo_box: &'a ErgoBox) -> Self {
        BoxRef::Anchored(ergo_box)
    }
}
