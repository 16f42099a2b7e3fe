//! Canonical and token-compacted box encodings.
//!
//! Canonical form (the preimage of a box id):
//!
//! ```text
//! value | treeLen | tree | height | tokenCount | (tokenId:32, amount)* | registers | txId:32 | index
//! ```
//!
//! Inside a transaction each `tokenId` is replaced by its index in the
//! transaction's [`TokenTable`] and the trailing `txId | index` is left out.
//! [`read_embedded_box`] recovers the canonical bytes during the same forward
//! pass that decodes the compacted form: segments that are identical in both
//! forms are copied from the input, only the token list is rendered again.

use crate::boxes::ergo_box::{BoxCandidate, BoxRef, ErgoBox, TokenAmount, MAX_BOX_SIZE};
use crate::boxes::registers::{read_registers, write_registers};
use crate::boxes::token_table::TokenTable;
use crate::digest::{blake2b256, BoxId, TxId};
use crate::error::{CodecError, Result};
use crate::sigma::{SigmaByteReader, SigmaByteWriter};
use tracing::trace;

/// Serialize a box or candidate.
///
/// With a token table the compacted embedded form is written and any
/// identity fields are ignored. Without one the canonical form is written,
/// which needs a full box: a candidate fails with a shape violation and
/// nothing is written.
pub fn serialize_box<'a>(
    ergo_box: impl Into<BoxRef<'a>>,
    writer: &mut SigmaByteWriter,
    token_table: Option<&TokenTable>,
) -> Result<()> {
    let ergo_box = ergo_box.into();

    let anchor = match (token_table, ergo_box.anchor()) {
        (Some(_), _) => None,
        (None, Some(anchor)) => Some(anchor),
        (None, None) => {
            return Err(CodecError::ShapeViolation(
                "canonical encoding needs a transaction id and output index; \
                 got a box candidate"
                    .to_string(),
            ))
        }
    };

    write_box_body(writer, ergo_box.fields(), token_table)?;

    if let Some((transaction_id, index)) = anchor {
        writer.write_digest(transaction_id).write_u16(index);
    }
    Ok(())
}

/// Canonical encoding of a full box as a fresh byte vector
pub fn serialize_box_to_bytes(ergo_box: &ErgoBox) -> Result<Vec<u8>> {
    let mut writer = SigmaByteWriter::with_capacity(MAX_BOX_SIZE);
    serialize_box(ergo_box, &mut writer, None)?;
    Ok(writer.into_bytes())
}

/// Id a candidate gets once anchored as output `index` of `transaction_id`
pub fn compute_box_id(candidate: &BoxCandidate, transaction_id: &TxId, index: u16) -> Result<BoxId> {
    let mut writer = SigmaByteWriter::with_capacity(MAX_BOX_SIZE);
    write_box_body(&mut writer, candidate, None)?;
    writer.write_digest(transaction_id).write_u16(index);
    blake2b256(writer.as_bytes())
}

/// Everything up to and including the registers.
fn write_box_body(
    writer: &mut SigmaByteWriter,
    candidate: &BoxCandidate,
    token_table: Option<&TokenTable>,
) -> Result<()> {
    // Resolve every index before the first byte goes out
    let indices = match token_table {
        Some(table) => Some(
            candidate
                .assets
                .iter()
                .map(|token| table.index_of(&token.token_id))
                .collect::<Result<Vec<u32>>>()?,
        ),
        None => None,
    };

    writer
        .write_u64(candidate.value)
        .write_count(candidate.ergo_tree.len())
        .write_bytes(&candidate.ergo_tree)
        .write_u32(candidate.creation_height)
        .write_count(candidate.assets.len());

    for (position, token) in candidate.assets.iter().enumerate() {
        let writer = match &indices {
            Some(indices) => writer.write_u32(indices[position]),
            None => writer.write_digest(&token.token_id),
        };
        writer.write_u64(token.amount);
    }

    write_registers(writer, &candidate.additional_registers);
    Ok(())
}

/// Value, tree and creation height: identical in both forms.
fn read_fixed_fields(reader: &mut SigmaByteReader<'_>) -> Result<(u64, Vec<u8>, u32)> {
    let value = reader.read_u64("box value")?;
    let tree_len = reader.read_count("ergo tree length")?;
    let ergo_tree = reader.read_bytes(tree_len, "ergo tree")?.to_vec();
    let creation_height = reader.read_u32("creation height")?;
    Ok((value, ergo_tree, creation_height))
}

/// Decode a top-level box in canonical form.
///
/// The id is the hash of exactly the bytes this call consumes.
pub fn deserialize_box(reader: &mut SigmaByteReader<'_>) -> Result<ErgoBox> {
    let start = reader.cursor();

    let (value, ergo_tree, creation_height) = read_fixed_fields(reader)?;
    let assets = reader.read_collection("tokens", |r, _| {
        let token_id = r.read_digest("token id")?;
        let amount = r.read_u64("token amount")?;
        Ok(TokenAmount::new(token_id, amount))
    })?;
    let additional_registers = read_registers(reader)?;
    let transaction_id = reader.read_digest("transaction id")?;
    let index = reader.read_u16("output index")?;

    let box_id = blake2b256(reader.bytes_since(start))?;
    let candidate = BoxCandidate {
        value,
        ergo_tree,
        creation_height,
        assets,
        additional_registers,
    };
    Ok(ErgoBox::with_id(box_id, candidate, transaction_id, index))
}

/// Decode a top-level box that must span all of `bytes`
pub fn deserialize_box_from_bytes(bytes: &[u8]) -> Result<ErgoBox> {
    let mut reader = SigmaByteReader::new(bytes);
    let ergo_box = deserialize_box(&mut reader)?;
    reader.ensure_consumed("box")?;
    Ok(ergo_box)
}

/// A box decoded from a transaction body, waiting for its owning transaction id
///
/// Holds the canonical encoding of everything but the trailing identity
/// fields, so anchoring only has to append them and hash.
#[derive(Debug, Clone)]
pub struct EmbeddedBox {
    candidate: BoxCandidate,
    canonical: SigmaByteWriter,
}

impl EmbeddedBox {
    pub fn candidate(&self) -> &BoxCandidate {
        &self.candidate
    }

    /// Canonical bytes accumulated so far
    pub fn canonical_prefix(&self) -> &[u8] {
        self.canonical.as_bytes()
    }

    /// Append the owning transaction id and output index, then hash.
    pub fn anchor(mut self, transaction_id: &TxId, index: u16) -> Result<ErgoBox> {
        self.canonical.write_digest(transaction_id).write_u16(index);
        let box_id = blake2b256(self.canonical.as_bytes())?;
        trace!(box_id = %box_id, index, "Anchored embedded box");
        Ok(ErgoBox::with_id(box_id, self.candidate, *transaction_id, index))
    }
}

/// Decode a compacted box, rebuilding its canonical bytes as it goes.
pub fn read_embedded_box(
    reader: &mut SigmaByteReader<'_>,
    token_table: &TokenTable,
) -> Result<EmbeddedBox> {
    let mut canonical = SigmaByteWriter::with_capacity(MAX_BOX_SIZE);

    let start = reader.cursor();
    let (value, ergo_tree, creation_height) = read_fixed_fields(reader)?;
    canonical.write_bytes(reader.bytes_since(start));

    // Indices on the wire, full ids in the canonical form
    let assets = reader.read_collection("tokens", |r, _| {
        let index = r.read_u64("token index")?;
        let token_id = *token_table.get(index)?;
        let amount = r.read_u64("token amount")?;
        Ok(TokenAmount::new(token_id, amount))
    })?;
    canonical.write_count(assets.len());
    for token in &assets {
        canonical.write_digest(&token.token_id).write_u64(token.amount);
    }

    let start = reader.cursor();
    let additional_registers = read_registers(reader)?;
    canonical.write_bytes(reader.bytes_since(start));

    Ok(EmbeddedBox {
        candidate: BoxCandidate {
            value,
            ergo_tree,
            creation_height,
            assets,
            additional_registers,
        },
        canonical,
    })
}

/// Decode a compacted box and derive its id from the caller-supplied anchor.
pub fn deserialize_embedded_box(
    reader: &mut SigmaByteReader<'_>,
    token_table: &TokenTable,
    transaction_id: &TxId,
    index: u16,
) -> Result<ErgoBox> {
    read_embedded_box(reader, token_table)?.anchor(transaction_id, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boxes::registers::{NonMandatoryRegisterId, NonMandatoryRegisters, RegisterValue};
    use crate::digest::Digest32;
    use crate::error::ErrorKind;

    // First output of the sample transaction in canonical form
    const SAMPLE_BOX: &str = "c0843d240008cd02dc5b9d9d2081889ef00e6452fb5ad1730df42444ceccb9ea02258256d2fbd262e4f25601fbbaac7337d051c10fc3da0ccb864f4d32d40027551e1c3ea3ce361f39b91e4064006b378fbbe3271da3f348a3925681578ddd95e5baaeff7c9fb8d2ad801a7aa26000";
    const SAMPLE_BOX_ID: &str = "b67e51482e984b585b1aaf710959b872d9055ea9df7764758706dae4ce571094";

    fn token(byte: u8) -> Digest32 {
        Digest32([byte; 32])
    }

    fn p2pk_tree() -> Vec<u8> {
        let mut tree = hex::decode("0008cd02").unwrap();
        tree.extend_from_slice(&[0x11; 32]);
        tree
    }

    fn sample_candidate() -> BoxCandidate {
        let mut registers = NonMandatoryRegisters::new();
        registers.insert(NonMandatoryRegisterId::R4, RegisterValue::from_hex("0e0201ff").unwrap());
        registers.insert(NonMandatoryRegisterId::R5, RegisterValue::from_hex("05c0843d").unwrap());

        BoxCandidate::new(1_000_000_000, p2pk_tree(), 1_423_716)
            .with_assets(vec![
                TokenAmount::new(token(0xAA), 1),
                TokenAmount::new(token(0xBB), u64::MAX),
            ])
            .with_registers(registers)
    }

    #[test]
    fn test_sample_box_id() {
        let ergo_box = ErgoBox::from_hex(SAMPLE_BOX).unwrap();
        assert_eq!(ergo_box.box_id().to_hex(), SAMPLE_BOX_ID);
        assert_eq!(ergo_box.value(), 1_000_000);
        assert_eq!(ergo_box.creation_height(), 1_423_716);
        assert_eq!(ergo_box.assets().len(), 1);
        assert_eq!(ergo_box.assets()[0].amount, 100);
        assert_eq!(ergo_box.index(), 0);
        assert!(ergo_box.additional_registers().is_empty());
        assert_eq!(hex::encode(ergo_box.to_bytes().unwrap()), SAMPLE_BOX);
    }

    #[test]
    fn test_top_level_roundtrip() {
        let ergo_box = ErgoBox::from_candidate(sample_candidate(), token(0x01), 7).unwrap();
        let bytes = ergo_box.to_bytes().unwrap();
        let decoded = ErgoBox::from_bytes(&bytes).unwrap();

        assert_eq!(decoded, ergo_box);
        assert_eq!(decoded.box_id(), &blake2b256(&bytes).unwrap());
    }

    #[test]
    fn test_candidate_needs_token_table() {
        let candidate = sample_candidate();
        let mut writer = SigmaByteWriter::new();
        let err = serialize_box(&candidate, &mut writer, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
        assert!(writer.is_empty());

        let table = TokenTable::from_outputs([candidate.assets.as_slice()]);
        serialize_box(&candidate, &mut writer, Some(&table)).unwrap();
        assert!(!writer.is_empty());
    }

    #[test]
    fn test_unknown_token_writes_nothing() {
        let candidate = sample_candidate();
        let table = TokenTable::from_ids(vec![token(0xAA)]);
        let mut writer = SigmaByteWriter::new();
        writer.write_byte(0x7f);

        let err = serialize_box(&candidate, &mut writer, Some(&table)).unwrap_err();
        assert_eq!(err, CodecError::UnknownToken(token(0xBB)));
        assert_eq!(err.kind(), ErrorKind::Integrity);
        assert_eq!(writer.as_bytes(), &[0x7f]);
    }

    #[test]
    fn test_compacted_form_omits_identity() {
        let ergo_box = ErgoBox::from_candidate(sample_candidate(), token(0x01), 3).unwrap();
        let table = TokenTable::from_outputs([ergo_box.assets()]);

        let mut canonical = SigmaByteWriter::new();
        serialize_box(&ergo_box, &mut canonical, None).unwrap();
        let mut compacted = SigmaByteWriter::new();
        serialize_box(&ergo_box, &mut compacted, Some(&table)).unwrap();

        // Two 32 byte ids become one byte indices, and the 33 byte anchor is dropped
        assert_eq!(canonical.len() - compacted.len(), 2 * 31 + 32 + 1);
    }

    #[test]
    fn test_embedded_id_matches_canonical_hash() {
        let candidate = sample_candidate();
        // Table order differs from the box's own asset order
        let other = vec![TokenAmount::new(token(0xBB), 5), TokenAmount::new(token(0xCC), 5)];
        let table = TokenTable::from_outputs([other.as_slice(), candidate.assets.as_slice()]);
        assert_eq!(table.index_of(&token(0xAA)).unwrap(), 2);

        let mut writer = SigmaByteWriter::new();
        serialize_box(&candidate, &mut writer, Some(&table)).unwrap();
        let bytes = writer.into_bytes();

        let tx_id = token(0x42);
        let mut reader = SigmaByteReader::new(&bytes);
        let decoded = deserialize_embedded_box(&mut reader, &table, &tx_id, 1).unwrap();
        assert!(reader.is_empty());

        let expected = ErgoBox::from_candidate(candidate, tx_id, 1).unwrap();
        assert_eq!(decoded, expected);
        assert_eq!(
            decoded.box_id(),
            &blake2b256(&expected.to_bytes().unwrap()).unwrap()
        );
    }

    #[test]
    fn test_embedded_prefix_is_canonical() {
        let candidate = sample_candidate();
        let table = TokenTable::from_outputs([candidate.assets.as_slice()]);
        let mut writer = SigmaByteWriter::new();
        serialize_box(&candidate, &mut writer, Some(&table)).unwrap();
        let bytes = writer.into_bytes();

        let mut reader = SigmaByteReader::new(&bytes);
        let embedded = read_embedded_box(&mut reader, &table).unwrap();
        let full = ErgoBox::from_candidate(candidate, token(9), 0).unwrap();
        let canonical = full.to_bytes().unwrap();
        assert_eq!(embedded.canonical_prefix(), &canonical[..canonical.len() - 33]);
    }

    #[test]
    fn test_embedded_index_out_of_range() {
        let candidate = sample_candidate();
        let table = TokenTable::from_outputs([candidate.assets.as_slice()]);
        let mut writer = SigmaByteWriter::new();
        serialize_box(&candidate, &mut writer, Some(&table)).unwrap();
        let bytes = writer.into_bytes();

        let short_table = TokenTable::from_ids(vec![token(0xAA)]);
        let mut reader = SigmaByteReader::new(&bytes);
        let err = read_embedded_box(&mut reader, &short_table).unwrap_err();
        assert_eq!(err, CodecError::TokenIndexOutOfRange { index: 1, len: 1 });
        assert_eq!(err.kind(), ErrorKind::Integrity);
    }

    #[test]
    fn test_truncated_box() {
        let bytes = hex::decode(SAMPLE_BOX).unwrap();
        for cut in [1, 5, 40, bytes.len() - 1] {
            let err = ErgoBox::from_bytes(&bytes[..cut]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Underflow, "cut at {}", cut);
        }
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = hex::decode(SAMPLE_BOX).unwrap();
        bytes.push(0);
        assert_eq!(
            ErgoBox::from_bytes(&bytes).unwrap_err(),
            CodecError::TrailingBytes {
                field: "box",
                remaining: 1
            }
        );
    }

    #[test]
    fn test_box_without_registers() {
        let candidate = BoxCandidate::new(1, vec![0x00], 0);
        let ergo_box = ErgoBox::from_candidate(candidate, Digest32::default(), 0).unwrap();
        let bytes = ergo_box.to_bytes().unwrap();
        // value, tree length, tree, height, token count, register count
        assert_eq!(&bytes[..6], &[0x01, 0x01, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(bytes.len(), 6 + 32 + 1);
    }
}
