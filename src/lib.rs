//! Binary codec for Ergo boxes, transactions and reduced transactions.
//!
//! Boxes are content addressed: a box id is the blake2b256 hash of the box's
//! canonical encoding. Inside a transaction body boxes are written in a
//! compacted form that refers to tokens by index into a per-transaction
//! token table; decoding such a box recovers its canonical bytes in the same
//! pass so the id never requires a second encoding.

pub mod boxes;
pub mod digest;
pub mod error;
pub mod sigma;
pub mod transactions;

#[cfg(feature = "wasm-bindgen")]
pub mod wasm;

pub use boxes::{BoxCandidate, ErgoBox, TokenAmount, TokenTable};
pub use digest::{blake2b256, BoxId, Digest32, TokenId, TxId};
pub use error::{CodecError, ErrorKind, Result};
pub use transactions::{
    ReducedInput, ReducedTransaction, SignedTransaction, Transaction, UnsignedTransaction,
};
