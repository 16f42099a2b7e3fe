//! Transactions, their inputs and the reduced form used for offline signing.

pub mod input;
mod reduced_transaction;
mod transaction;

pub use input::{
    ContextExtension, DataInput, Input, SpendingProof, TransactionInput, UnsignedInput,
};
pub use reduced_transaction::{ReducedInput, ReducedTransaction};
pub use transaction::{SignedTransaction, Transaction, UnsignedTransaction};
