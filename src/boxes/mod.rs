//! Boxes: the outputs that transactions create and spend.

pub mod box_codec;
mod ergo_box;
pub mod registers;
mod token_table;

pub use box_codec::{
    compute_box_id, deserialize_box, deserialize_embedded_box, read_embedded_box, serialize_box,
    EmbeddedBox,
};
pub use ergo_box::{BoxCandidate, BoxRef, ErgoBox, TokenAmount, MAX_BOX_SIZE};
pub use registers::{
    NonMandatoryRegisterId, NonMandatoryRegisters, RegisterValue, MAX_REGISTERS,
};
pub use token_table::TokenTable;
