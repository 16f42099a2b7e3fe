use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::boxes::RegisterValue;
use crate::digest::{hex_bytes, BoxId};
use crate::error::{CodecError, Result};
use crate::sigma::{read_constant, SigmaByteReader, SigmaByteWriter};

/// Extra typed constants a spender attaches to an input, keyed by a one byte id
///
/// Values are opaque serialized constants, like register values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextExtension(BTreeMap<u8, RegisterValue>);

impl ContextExtension {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: u8, value: impl Into<RegisterValue>) -> Option<RegisterValue> {
        self.0.insert(key, value.into())
    }

    pub fn get(&self, key: u8) -> Option<&RegisterValue> {
        self.0.get(&key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u8, &RegisterValue)> {
        self.0.iter()
    }

    /// Writes a one byte entry count, then each key byte and raw value in key order.
    pub fn write(&self, writer: &mut SigmaByteWriter) -> Result<()> {
        let count = u8::try_from(self.0.len()).map_err(|_| CodecError::OutOfRange {
            field: "context extension size",
            value: self.0.len() as u64,
        })?;
        writer.write_byte(count);
        for (key, value) in &self.0 {
            writer.write_byte(*key).write_bytes(value.as_bytes());
        }
        Ok(())
    }

    pub fn read(reader: &mut SigmaByteReader<'_>) -> Result<Self> {
        let count = reader.read_byte("context extension size")?;
        let mut extension = Self::new();
        for _ in 0..count {
            let key = reader.read_byte("context extension key")?;
            let value = read_constant(reader)?;
            if extension.insert(key, value.to_vec()).is_some() {
                return Err(CodecError::DuplicateExtensionKey(key));
            }
        }
        Ok(extension)
    }
}

impl FromIterator<(u8, RegisterValue)> for ContextExtension {
    fn from_iter<T: IntoIterator<Item = (u8, RegisterValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Proof that satisfies the spending condition of the box an input consumes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingProof {
    #[serde(with = "hex_bytes")]
    pub proof_bytes: Vec<u8>,
    pub extension: ContextExtension,
}

impl SpendingProof {
    pub fn new(proof_bytes: Vec<u8>, extension: ContextExtension) -> Self {
        Self {
            proof_bytes,
            extension,
        }
    }
}

/// Signed input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    pub box_id: BoxId,
    pub spending_proof: SpendingProof,
}

impl Input {
    pub fn new(box_id: BoxId, spending_proof: SpendingProof) -> Self {
        Self {
            box_id,
            spending_proof,
        }
    }
}

/// Input that has not been signed yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedInput {
    pub box_id: BoxId,
    pub extension: ContextExtension,
}

impl UnsignedInput {
    pub fn new(box_id: BoxId) -> Self {
        Self {
            box_id,
            extension: ContextExtension::new(),
        }
    }

    pub fn with_extension(mut self, extension: ContextExtension) -> Self {
        self.extension = extension;
        self
    }
}

impl From<Input> for UnsignedInput {
    fn from(input: Input) -> Self {
        Self {
            box_id: input.box_id,
            extension: input.spending_proof.extension,
        }
    }
}

/// Box read but not spent by a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataInput {
    pub box_id: BoxId,
}

impl DataInput {
    pub fn new(box_id: BoxId) -> Self {
        Self { box_id }
    }
}

/// Common wire shape of signed and unsigned inputs
pub trait TransactionInput: Sized {
    fn box_id(&self) -> &BoxId;

    /// Proof bytes written on the wire; empty for unsigned inputs
    fn proof_bytes(&self) -> &[u8];

    fn extension(&self) -> &ContextExtension;

    /// Rebuild an input from its decoded wire fields.
    fn from_wire(box_id: BoxId, proof_bytes: &[u8], extension: ContextExtension) -> Result<Self>;
}

impl TransactionInput for Input {
    fn box_id(&self) -> &BoxId {
        &self.box_id
    }

    fn proof_bytes(&self) -> &[u8] {
        &self.spending_proof.proof_bytes
    }

    fn extension(&self) -> &ContextExtension {
        &self.spending_proof.extension
    }

    fn from_wire(box_id: BoxId, proof_bytes: &[u8], extension: ContextExtension) -> Result<Self> {
        Ok(Self::new(
            box_id,
            SpendingProof::new(proof_bytes.to_vec(), extension),
        ))
    }
}

impl TransactionInput for UnsignedInput {
    fn box_id(&self) -> &BoxId {
        &self.box_id
    }

    fn proof_bytes(&self) -> &[u8] {
        &[]
    }

    fn extension(&self) -> &ContextExtension {
        &self.extension
    }

    fn from_wire(box_id: BoxId, proof_bytes: &[u8], extension: ContextExtension) -> Result<Self> {
        if !proof_bytes.is_empty() {
            return Err(CodecError::UnexpectedProof {
                box_id,
                len: proof_bytes.len(),
            });
        }
        Ok(Self::new(box_id).with_extension(extension))
    }
}

/// Writes `boxId | proofLen | proof | extension`.
///
/// With `with_proof` unset the proof is written as empty, which is the form
/// the transaction id is computed over.
pub fn write_input<I: TransactionInput>(
    writer: &mut SigmaByteWriter,
    input: &I,
    with_proof: bool,
) -> Result<()> {
    let proof: &[u8] = if with_proof { input.proof_bytes() } else { &[] };
    writer
        .write_digest(input.box_id())
        .write_count(proof.len())
        .write_bytes(proof);
    input.extension().write(writer)
}

/// Reads one input and feeds its proof-less form into `to_sign`.
pub fn read_input<I: TransactionInput>(
    reader: &mut SigmaByteReader<'_>,
    to_sign: &mut SigmaByteWriter,
) -> Result<I> {
    let box_id = reader.read_digest("input box id")?;
    let proof_len = reader.read_count("spending proof length")?;
    let proof_bytes = reader.read_bytes(proof_len, "spending proof")?;

    let start = reader.cursor();
    let extension = ContextExtension::read(reader)?;
    to_sign
        .write_digest(&box_id)
        .write_count(0)
        .write_bytes(reader.bytes_since(start));

    I::from_wire(box_id, proof_bytes, extension)
}
