//! Extent of serialized typed constants.
//!
//! Register values and context extension entries are stored as a type
//! descriptor followed by a value. The codec keeps them as opaque bytes but
//! has to know where one ends and the next field begins, so each one is
//! parsed with `ergotree-ir` and the consumed span is handed back verbatim.

use ergotree_ir::mir::constant::Constant;
use ergotree_ir::serialization::constant_store::ConstantStore;
use ergotree_ir::serialization::sigma_byte_reader;
use ergotree_ir::serialization::{SigmaParsingError, SigmaSerializable};
use std::io::Cursor;

use crate::error::{CodecError, Result};
use crate::sigma::SigmaByteReader;

/// Reads one typed constant and returns its complete encoding.
pub fn read_constant<'a>(reader: &mut SigmaByteReader<'a>) -> Result<&'a [u8]> {
    let rest = reader.rest();
    if rest.is_empty() {
        return Err(CodecError::unexpected_end("constant", 1, 0));
    }

    let mut cursor = Cursor::new(rest);
    {
        let mut constant_reader =
            sigma_byte_reader::SigmaByteReader::new(&mut cursor, ConstantStore::empty());
        Constant::sigma_parse(&mut constant_reader).map_err(|e| match e {
            SigmaParsingError::Io(_) => CodecError::unexpected_end("constant", rest.len() + 1, rest.len()),
            other => CodecError::InvalidConstant(other.to_string()),
        })?;
    }
    let consumed = cursor.position();
    let consumed = usize::try_from(consumed).map_err(|_| CodecError::OutOfRange {
        field: "constant length",
        value: consumed,
    })?;

    reader.read_bytes(consumed, "constant")
}
