//! Byte-level building blocks shared by every codec in the crate.
//!
//! All integers on the wire use the unsigned variable-length (VLQ) encoding
//! and all ids are raw 32 byte values.

mod constant;
mod reader;
mod writer;

pub use constant::read_constant;
pub use reader::SigmaByteReader;
pub use writer::SigmaByteWriter;
