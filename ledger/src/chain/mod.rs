//! The chain: blocks, the proof-of-work sealer, and the ledger that owns
//! both the chain and the tree it records operations against.

pub mod block;
pub mod ledger;
pub mod sealer;

pub use block::Block;
pub use ledger::{Action, Ledger, OperationReceipt};
pub use sealer::{meets_difficulty, Seal};
