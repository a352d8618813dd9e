//! Error types for ledger operations.
//!
//! The taxonomy is deliberately small. Duplicate adds, missing removes, and
//! failed lookups are *expected negative outcomes* and surface as booleans
//! or empty results — they never appear here. [`LedgerError`] covers caller
//! mistakes only, and no variant leaves the ledger partially mutated.

use thiserror::Error;

/// Errors returned by the public ledger API.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The action string is not one of `add`, `remove`, or `lookup`.
    /// Nothing is appended to the chain.
    #[error("invalid operation: {0:?}")]
    InvalidOperation(String),

    /// A block index outside `[0, size())` was passed to `modify`.
    #[error("block index out of range: index {index}, chain length {len}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The chain length at the time of the call.
        len: usize,
    },
}
