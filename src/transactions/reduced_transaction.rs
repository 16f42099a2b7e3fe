use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::digest::hex_bytes;
use crate::error::{CodecError, Result};
use crate::sigma::{SigmaByteReader, SigmaByteWriter};
use crate::transactions::transaction::UnsignedTransaction;

/// Spending proposition an input reduces to, with its estimated cost
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReducedInput {
    #[serde(with = "hex_bytes")]
    pub sigma_prop: Vec<u8>,
    pub cost: u64,
}

impl ReducedInput {
    pub fn new(sigma_prop: Vec<u8>, cost: u64) -> Self {
        Self { sigma_prop, cost }
    }

    fn write(&self, writer: &mut SigmaByteWriter) {
        writer
            .write_count(self.sigma_prop.len())
            .write_bytes(&self.sigma_prop)
            .write_u64(self.cost);
    }

    fn read(reader: &mut SigmaByteReader<'_>) -> Result<Self> {
        let len = reader.read_count("sigma proposition length")?;
        let sigma_prop = reader.read_bytes(len, "sigma proposition")?.to_vec();
        let cost = reader.read_u64("reduced input cost")?;
        Ok(Self::new(sigma_prop, cost))
    }
}

/// Unsigned transaction prepared for offline signing
///
/// Wire form: `txLen | tx | (propLen, prop, cost) per input | txCost`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReducedTransaction {
    unsigned_tx: UnsignedTransaction,
    reduced_inputs: Vec<ReducedInput>,
    tx_cost: u64,
}

impl ReducedTransaction {
    /// Pair a transaction with one reduced input per transaction input.
    pub fn new(
        unsigned_tx: UnsignedTransaction,
        reduced_inputs: Vec<ReducedInput>,
        tx_cost: u64,
    ) -> Result<Self> {
        if reduced_inputs.len() != unsigned_tx.inputs().len() {
            return Err(CodecError::ReducedInputCountMismatch {
                expected: unsigned_tx.inputs().len(),
                actual: reduced_inputs.len(),
            });
        }
        Ok(Self {
            unsigned_tx,
            reduced_inputs,
            tx_cost,
        })
    }

    pub fn unsigned_tx(&self) -> &UnsignedTransaction {
        &self.unsigned_tx
    }

    pub fn reduced_inputs(&self) -> &[ReducedInput] {
        &self.reduced_inputs
    }

    pub fn tx_cost(&self) -> u64 {
        self.tx_cost
    }

    pub fn serialize(&self, writer: &mut SigmaByteWriter) -> Result<()> {
        let tx_bytes = self.unsigned_tx.to_bytes()?;
        writer.write_count(tx_bytes.len()).write_bytes(&tx_bytes);
        for input in &self.reduced_inputs {
            input.write(writer);
        }
        writer.write_u64(self.tx_cost);
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = SigmaByteWriter::new();
        self.serialize(&mut writer)?;
        Ok(writer.into_bytes())
    }

    pub fn to_hex(&self) -> Result<String> {
        self.to_bytes().map(hex::encode)
    }

    /// Decode a reduced transaction.
    ///
    /// The length prefix is not needed to find the end of the embedded
    /// transaction and is only checked for consistency.
    pub fn parse(reader: &mut SigmaByteReader<'_>) -> Result<Self> {
        let declared_len = reader.read_count("transaction length")?;
        let start = reader.cursor();
        let unsigned_tx = UnsignedTransaction::parse(reader)?;
        let actual_len = reader.cursor() - start;
        if actual_len != declared_len {
            debug!(
                declared_len,
                actual_len, "Reduced transaction length prefix disagrees with decoded length"
            );
        }

        let reduced_inputs = (0..unsigned_tx.inputs().len())
            .map(|_| ReducedInput::read(reader))
            .collect::<Result<Vec<_>>>()?;
        let tx_cost = reader.read_u64("transaction cost")?;

        debug!(
            tx_id = %unsigned_tx.id(),
            inputs = reduced_inputs.len(),
            tx_cost,
            "Decoded reduced transaction"
        );

        Ok(Self {
            unsigned_tx,
            reduced_inputs,
            tx_cost,
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = SigmaByteReader::new(bytes);
        let reduced = Self::parse(&mut reader)?;
        reader.ensure_consumed("reduced transaction")?;
        Ok(reduced)
    }

    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str.trim())?;
        Self::from_bytes(&bytes)
    }
}
