use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{CodecError, Result};
use crate::sigma::{read_constant, SigmaByteReader, SigmaByteWriter};

/// Number of optional register slots on a box
pub const MAX_REGISTERS: usize = 6;

/// Optional register slots R4 to R9
///
/// Ordering follows the slot number, which is also the wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NonMandatoryRegisterId {
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
    R8 = 8,
    R9 = 9,
}

impl NonMandatoryRegisterId {
    /// Slot number of the first optional register
    pub const START_INDEX: u8 = 4;

    /// Get the slot number
    pub fn index(&self) -> u8 {
        *self as u8
    }

    /// Create a register id from its slot number
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            4 => Some(Self::R4),
            5 => Some(Self::R5),
            6 => Some(Self::R6),
            7 => Some(Self::R7),
            8 => Some(Self::R8),
            9 => Some(Self::R9),
            _ => None,
        }
    }

    /// Register id for the `position`-th value on the wire
    pub fn from_position(position: usize) -> Option<Self> {
        let index = u8::try_from(position).ok()?.checked_add(Self::START_INDEX)?;
        Self::from_index(index)
    }
}

impl std::fmt::Display for NonMandatoryRegisterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}", self.index())
    }
}

impl FromStr for NonMandatoryRegisterId {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        value
            .strip_prefix('R')
            .or_else(|| value.strip_prefix('r'))
            .and_then(|n| n.parse::<u8>().ok())
            .and_then(Self::from_index)
            .ok_or_else(|| format!("invalid register id: {}", value))
    }
}

impl Serialize for NonMandatoryRegisterId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for NonMandatoryRegisterId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Pre-encoded register value, kept as opaque bytes
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct RegisterValue(Vec<u8>);

impl RegisterValue {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn from_hex(hex_str: &str) -> Result<Self> {
        Ok(Self(hex::decode(hex_str.trim())?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for RegisterValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Debug for RegisterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RegisterValue({})", self.to_hex())
    }
}

impl Serialize for RegisterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RegisterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Sparse set of optional registers attached to a box
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NonMandatoryRegisters(BTreeMap<NonMandatoryRegisterId, RegisterValue>);

impl NonMandatoryRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a register, returning the previous value
    pub fn insert(
        &mut self,
        id: NonMandatoryRegisterId,
        value: impl Into<RegisterValue>,
    ) -> Option<RegisterValue> {
        self.0.insert(id, value.into())
    }

    pub fn get(&self, id: NonMandatoryRegisterId) -> Option<&RegisterValue> {
        self.0.get(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Registers in slot order
    pub fn iter(&self) -> impl Iterator<Item = (&NonMandatoryRegisterId, &RegisterValue)> {
        self.0.iter()
    }

    /// Values that go on the wire: slot order, empty values skipped
    pub fn wire_values(&self) -> impl Iterator<Item = &RegisterValue> {
        self.0.values().filter(|value| !value.is_empty())
    }
}

impl FromIterator<(NonMandatoryRegisterId, RegisterValue)> for NonMandatoryRegisters {
    fn from_iter<T: IntoIterator<Item = (NonMandatoryRegisterId, RegisterValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Writes the register count followed by each value's raw bytes.
///
/// Slot keys are not written. A reader assigns R4, R5, ... by position, so a
/// gap such as {R4, R6, R7} comes back as {R4, R5, R6}.
pub fn write_registers(writer: &mut SigmaByteWriter, registers: &NonMandatoryRegisters) {
    let values: Vec<&RegisterValue> = registers.wire_values().collect();
    writer.write_count(values.len());
    for value in values {
        writer.write_bytes(value.as_bytes());
    }
}

/// Reads a register count and that many typed constants, numbering them from R4.
pub fn read_registers(reader: &mut SigmaByteReader<'_>) -> Result<NonMandatoryRegisters> {
    let count = reader.read_count("register count")?;
    if count > MAX_REGISTERS {
        return Err(CodecError::TooManyRegisters {
            count,
            max: MAX_REGISTERS,
        });
    }

    let mut registers = NonMandatoryRegisters::new();
    for position in 0..count {
        let value = read_constant(reader)?;
        let id = NonMandatoryRegisterId::from_position(position).ok_or(
            CodecError::TooManyRegisters {
                count,
                max: MAX_REGISTERS,
            },
        )?;
        registers.insert(id, value.to_vec());
    }
    Ok(registers)
}
