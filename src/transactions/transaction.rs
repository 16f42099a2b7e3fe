use serde::Serialize;
use tracing::debug;

use crate::boxes::{read_embedded_box, serialize_box, BoxCandidate, BoxRef, ErgoBox, TokenTable};
use crate::digest::{blake2b256, TxId};
use crate::error::{CodecError, Result};
use crate::sigma::{SigmaByteReader, SigmaByteWriter};
use crate::transactions::input::{
    read_input, write_input, DataInput, Input, TransactionInput, UnsignedInput,
};

/// A transaction over inputs of kind `I`
///
/// Outputs are full boxes anchored to this transaction's id. The id is the
/// hash of the transaction encoding with every proof emptied, so a signed
/// transaction and its unsigned form share it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction<I> {
    id: TxId,
    inputs: Vec<I>,
    data_inputs: Vec<DataInput>,
    outputs: Vec<ErgoBox>,
}

pub type SignedTransaction = Transaction<Input>;
pub type UnsignedTransaction = Transaction<UnsignedInput>;

impl<I: TransactionInput> Transaction<I> {
    /// Assemble a transaction, computing its id and anchoring every output.
    pub fn new(
        inputs: Vec<I>,
        data_inputs: Vec<DataInput>,
        output_candidates: Vec<BoxCandidate>,
    ) -> Result<Self> {
        check_output_count(output_candidates.len())?;

        let refs: Vec<BoxRef<'_>> = output_candidates.iter().map(BoxRef::from).collect();
        let mut writer = SigmaByteWriter::new();
        write_transaction(&mut writer, &inputs, &data_inputs, &refs, false)?;
        let id = blake2b256(writer.as_bytes())?;

        let outputs = output_candidates
            .into_iter()
            .enumerate()
            .map(|(index, candidate)| ErgoBox::from_candidate(candidate, id, index as u16))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id,
            inputs,
            data_inputs,
            outputs,
        })
    }

    pub fn id(&self) -> &TxId {
        &self.id
    }

    pub fn inputs(&self) -> &[I] {
        &self.inputs
    }

    pub fn data_inputs(&self) -> &[DataInput] {
        &self.data_inputs
    }

    pub fn outputs(&self) -> &[ErgoBox] {
        &self.outputs
    }

    /// Token table the outputs are compacted against
    pub fn token_table(&self) -> TokenTable {
        TokenTable::from_outputs(self.outputs.iter().map(ErgoBox::assets))
    }

    /// Append the wire encoding of this transaction to `writer`.
    pub fn serialize(&self, writer: &mut SigmaByteWriter) -> Result<()> {
        let refs: Vec<BoxRef<'_>> = self.outputs.iter().map(BoxRef::from).collect();
        write_transaction(writer, &self.inputs, &self.data_inputs, &refs, true)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = SigmaByteWriter::new();
        self.serialize(&mut writer)?;
        Ok(writer.into_bytes())
    }

    pub fn to_hex(&self) -> Result<String> {
        self.to_bytes().map(hex::encode)
    }

    /// Encoding with every proof emptied; the preimage of the id
    pub fn bytes_to_sign(&self) -> Result<Vec<u8>> {
        let refs: Vec<BoxRef<'_>> = self.outputs.iter().map(BoxRef::from).collect();
        let mut writer = SigmaByteWriter::new();
        write_transaction(&mut writer, &self.inputs, &self.data_inputs, &refs, false)?;
        Ok(writer.into_bytes())
    }

    /// Decode a transaction in one forward pass.
    ///
    /// Outputs are read as embedded boxes; their ids are derived once the
    /// transaction id is known at the end of the pass.
    pub fn parse(reader: &mut SigmaByteReader<'_>) -> Result<Self> {
        let mut to_sign = SigmaByteWriter::new();

        let input_count = reader.read_count("input count")?;
        to_sign.write_count(input_count);
        let mut inputs = Vec::with_capacity(input_count.min(reader.remaining()));
        for _ in 0..input_count {
            inputs.push(read_input::<I>(reader, &mut to_sign)?);
        }

        // Everything after the inputs is identical in the signed and unsigned forms
        let tail = reader.cursor();
        let data_inputs = reader.read_collection("data inputs", |r, _| {
            Ok(DataInput::new(r.read_digest("data input box id")?))
        })?;
        let token_table = TokenTable::read(reader)?;
        let output_count = reader.read_count("output count")?;
        check_output_count(output_count)?;
        let mut embedded = Vec::with_capacity(output_count.min(reader.remaining()));
        for _ in 0..output_count {
            embedded.push(read_embedded_box(reader, &token_table)?);
        }
        to_sign.write_bytes(reader.bytes_since(tail));

        let id = blake2b256(to_sign.as_bytes())?;
        let outputs = embedded
            .into_iter()
            .enumerate()
            .map(|(index, output)| output.anchor(&id, index as u16))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            tx_id = %id,
            inputs = inputs.len(),
            data_inputs = data_inputs.len(),
            tokens = token_table.len(),
            outputs = outputs.len(),
            "Decoded transaction"
        );

        Ok(Self {
            id,
            inputs,
            data_inputs,
            outputs,
        })
    }

    /// Decode a transaction that must span all of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = SigmaByteReader::new(bytes);
        let tx = Self::parse(&mut reader)?;
        reader.ensure_consumed("transaction")?;
        Ok(tx)
    }

    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str.trim())?;
        Self::from_bytes(&bytes)
    }
}

impl SignedTransaction {
    /// Drop the proofs, keeping context extensions. The id is unchanged.
    pub fn to_unsigned(&self) -> UnsignedTransaction {
        Transaction {
            id: self.id,
            inputs: self.inputs.iter().cloned().map(UnsignedInput::from).collect(),
            data_inputs: self.data_inputs.clone(),
            outputs: self.outputs.clone(),
        }
    }
}

/// Output indices are 16 bit
fn check_output_count(count: usize) -> Result<()> {
    if count > usize::from(u16::MAX) + 1 {
        return Err(CodecError::OutOfRange {
            field: "output count",
            value: count as u64,
        });
    }
    Ok(())
}

/// `inputs | dataInputs | tokenTable | outputs`, outputs compacted against one
/// table built from their tokens in output order.
fn write_transaction<I: TransactionInput>(
    writer: &mut SigmaByteWriter,
    inputs: &[I],
    data_inputs: &[DataInput],
    outputs: &[BoxRef<'_>],
    with_proofs: bool,
) -> Result<()> {
    writer.write_collection(inputs, |w, input| write_input(w, input, with_proofs))?;
    writer.write_collection(data_inputs, |w, data_input| {
        w.write_digest(&data_input.box_id);
        Ok(())
    })?;

    let token_table = TokenTable::from_outputs(outputs.iter().map(|output| output.fields().assets.as_slice()));
    token_table.write(writer);

    writer.write_collection(outputs, |w, output| serialize_box(*output, w, Some(&token_table)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boxes::{NonMandatoryRegisterId, NonMandatoryRegisters, RegisterValue, TokenAmount};
    use crate::digest::Digest32;
    use crate::error::ErrorKind;
    use crate::transactions::input::{ContextExtension, SpendingProof};

    fn digest(byte: u8) -> Digest32 {
        Digest32([byte; 32])
    }

    fn candidates() -> Vec<BoxCandidate> {
        let mut registers = NonMandatoryRegisters::new();
        registers.insert(NonMandatoryRegisterId::R4, RegisterValue::from_hex("0e0201ff").unwrap());

        vec![
            BoxCandidate::new(1_000_000, vec![0x00, 0x08, 0xcd], 100).with_assets(vec![
                TokenAmount::new(digest(0xB0), 5),
                TokenAmount::new(digest(0xA0), 1),
            ]),
            BoxCandidate::new(2_000_000, vec![0x10, 0x01], 100)
                .with_assets(vec![TokenAmount::new(digest(0xA0), 9)])
                .with_registers(registers),
            BoxCandidate::new(1_100_000, vec![0x00], 101),
        ]
    }

    fn signed_tx() -> SignedTransaction {
        let mut extension = ContextExtension::new();
        extension.insert(3, RegisterValue::from_hex("0101").unwrap());
        let inputs = vec![
            Input::new(digest(1), SpendingProof::new(vec![0x5A; 56], ContextExtension::new())),
            Input::new(digest(2), SpendingProof::new(vec![], extension)),
        ];
        Transaction::new(inputs, vec![DataInput::new(digest(9))], candidates()).unwrap()
    }

    #[test]
    fn test_signed_roundtrip() {
        let tx = signed_tx();
        let bytes = tx.to_bytes().unwrap();
        let decoded = SignedTransaction::from_bytes(&bytes).unwrap();

        assert_eq!(decoded, tx);
        assert_eq!(decoded.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_outputs_are_anchored() {
        let tx = signed_tx();
        for (index, output) in tx.outputs().iter().enumerate() {
            assert_eq!(output.transaction_id(), tx.id());
            assert_eq!(output.index() as usize, index);
            let expected = ErgoBox::from_candidate(output.candidate().clone(), *tx.id(), index as u16).unwrap();
            assert_eq!(output.box_id(), expected.box_id());
        }
    }

    #[test]
    fn test_id_ignores_proofs() {
        let tx = signed_tx();
        assert_eq!(tx.id(), &blake2b256(&tx.bytes_to_sign().unwrap()).unwrap());

        let unsigned = tx.to_unsigned();
        assert_eq!(unsigned.id(), tx.id());
        assert_eq!(unsigned.to_bytes().unwrap(), tx.bytes_to_sign().unwrap());

        let rebuilt = UnsignedTransaction::new(
            unsigned.inputs().to_vec(),
            unsigned.data_inputs().to_vec(),
            candidates(),
        )
        .unwrap();
        assert_eq!(rebuilt, unsigned);
    }

    #[test]
    fn test_token_table_first_seen() {
        let tx = signed_tx();
        assert_eq!(tx.token_table().ids(), &[digest(0xB0), digest(0xA0)]);
    }

    #[test]
    fn test_empty_transaction() {
        let tx = UnsignedTransaction::new(vec![], vec![], vec![]).unwrap();
        let bytes = tx.to_bytes().unwrap();
        assert_eq!(bytes, vec![0x00, 0x00, 0x00, 0x00]);

        let decoded = UnsignedTransaction::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, tx);
        assert!(decoded.outputs().is_empty());
    }

    #[test]
    fn test_unsigned_parse_rejects_signed_bytes() {
        let bytes = signed_tx().to_bytes().unwrap();
        let err = UnsignedTransaction::from_bytes(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn test_truncated_transaction() {
        let bytes = signed_tx().to_bytes().unwrap();
        for cut in [0, 1, 33, bytes.len() / 2, bytes.len() - 1] {
            let err = SignedTransaction::from_bytes(&bytes[..cut]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Underflow, "cut at {}", cut);
        }
    }

    #[test]
    fn test_token_index_out_of_range() {
        // No inputs, no data inputs, empty token table, one output referencing token 0
        let bytes = hex::decode("000000010101000001000100").unwrap();
        let err = UnsignedTransaction::from_bytes(&bytes).unwrap_err();
        assert_eq!(err, CodecError::TokenIndexOutOfRange { index: 0, len: 0 });
    }

    #[test]
    fn test_repeated_token_ids_decode_by_position() {
        // Table lists the same id twice; the output references the second slot
        let bytes = format!("000002{}010101010001010500", "aa".repeat(64));
        let tx = UnsignedTransaction::from_hex(&bytes).unwrap();

        let output = &tx.outputs()[0];
        assert_eq!(output.assets(), &[TokenAmount::new(digest(0xAA), 5)]);
        let expected = ErgoBox::from_candidate(output.candidate().clone(), *tx.id(), 0).unwrap();
        assert_eq!(output.box_id(), expected.box_id());
    }

    #[test]
    fn test_output_count_limit() {
        let err = UnsignedTransaction::new(vec![], vec![], vec![BoxCandidate::default(); 65_537]).unwrap_err();
        assert_eq!(
            err,
            CodecError::OutOfRange {
                field: "output count",
                value: 65_537
            }
        );

        // The count is rejected before any output is read
        let err = UnsignedTransaction::from_hex("000000818004").unwrap_err();
        assert_eq!(
            err,
            CodecError::OutOfRange {
                field: "output count",
                value: 65_537
            }
        );
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_json_shape() {
        let tx = signed_tx();
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["id"], tx.id().to_hex());
        assert_eq!(json["dataInputs"][0]["boxId"], digest(9).to_hex());
        assert_eq!(json["outputs"][1]["additionalRegisters"]["R4"], "0e0201ff");
        assert_eq!(json["outputs"][2]["index"], 2);
        assert_eq!(json["outputs"][0]["transactionId"], tx.id().to_hex());
    }
}
