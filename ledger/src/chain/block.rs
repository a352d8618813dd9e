//! # Block Structure
//!
//! A block is one sealed entry of the ledger: a single tree operation, a
//! link to the previous block, and the proof-of-work that sealed it.
//!
//! ## Block Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  index: u64          (0-based, dense, genesis = 0)   │
//! │  instruction: String ("add5true", "remove1true", …)  │
//! │  prev_hash: String   (hex digest of the prior block) │
//! │  hash: String        (hex SHA-256 of the seal)       │
//! │  nonce: u64          (proof-of-work witness)         │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Seal Preimage
//!
//! The sealed content is `index || instruction || prev_hash`, with the
//! nonce appended in decimal by the sealer. The stored `hash` is exactly
//! `hex(SHA-256(content || nonce))` — recomputable at any time from the
//! stored fields, which is what chain validation does.
//!
//! Blocks are immutable once sealed. The single exception is
//! [`Ledger::modify`](crate::chain::Ledger::modify), the deliberate
//! corruption hook used by tamper-detection tests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chain::sealer;
use crate::config::{GENESIS_INSTRUCTION, GENESIS_PREV_HASH};

/// One sealed entry of the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain. 0-based, monotonically increasing, dense.
    pub index: u64,
    /// Canonical description of the operation and its outcome.
    pub instruction: String,
    /// Hash of the previous block; the genesis sentinel for block 0.
    pub prev_hash: String,
    /// This block's own sealed hash.
    pub hash: String,
    /// The proof-of-work nonce that produced `hash`.
    pub nonce: u64,
}

impl Block {
    /// Mine and construct a new block from its content fields.
    pub(crate) fn seal_new(
        index: u64,
        instruction: String,
        prev_hash: String,
        difficulty: u32,
    ) -> Self {
        let content = seal_content_of(index, &instruction, &prev_hash);
        let seal = sealer::seal(&content, difficulty);
        Block {
            index,
            instruction,
            prev_hash,
            hash: seal.hash,
            nonce: seal.nonce,
        }
    }

    /// Construct the genesis block.
    ///
    /// Index 0, the fixed placeholder instruction, and the fixed
    /// previous-hash sentinel. The genesis block is mined like any other;
    /// validation simply never re-checks it.
    pub(crate) fn genesis(difficulty: u32) -> Self {
        Self::seal_new(
            0,
            GENESIS_INSTRUCTION.to_string(),
            GENESIS_PREV_HASH.to_string(),
            difficulty,
        )
    }

    /// The seal preimage (without the nonce) rebuilt from stored fields.
    ///
    /// Validation recomputes this and hashes it with the stored nonce; any
    /// edit to `index`, `instruction`, or `prev_hash` changes the preimage
    /// and therefore the recomputed hash.
    pub fn seal_content(&self) -> String {
        seal_content_of(self.index, &self.instruction, &self.prev_hash)
    }
}

fn seal_content_of(index: u64, instruction: &str, prev_hash: &str) -> String {
    format!("{index}{instruction}{prev_hash}")
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} [{}] nonce={} hash={} prev={}",
            self.index, self.instruction, self.nonce, self.hash, self.prev_hash
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::sealer::meets_difficulty;

    #[test]
    fn genesis_block_properties() {
        let genesis = Block::genesis(1);
        assert_eq!(genesis.index, 0);
        assert_eq!(genesis.instruction, GENESIS_INSTRUCTION);
        assert_eq!(genesis.prev_hash, GENESIS_PREV_HASH);
        assert!(meets_difficulty(&genesis.hash, 1));
    }

    #[test]
    fn genesis_is_deterministic() {
        // Same content, same exhaustive search, same nonce and hash.
        let a = Block::genesis(2);
        let b = Block::genesis(2);
        assert_eq!(a, b);
    }

    #[test]
    fn seal_content_concatenates_in_canonical_order() {
        let block = Block::seal_new(3, "add5true".into(), "00ab".into(), 1);
        assert_eq!(block.seal_content(), "3add5true00ab");
    }

    #[test]
    fn sealed_block_reverifies_from_stored_fields() {
        let block = Block::seal_new(1, "add7true".into(), "0000dead".into(), 2);
        let recomputed = sealer::verify(&block.seal_content(), block.nonce, 2);
        assert_eq!(recomputed.as_deref(), Some(block.hash.as_str()));
    }

    #[test]
    fn editing_the_instruction_breaks_the_seal() {
        let mut block = Block::seal_new(1, "add7true".into(), "0000dead".into(), 2);
        block.instruction = "add7false".into();
        let recomputed = sealer::verify(&block.seal_content(), block.nonce, 2);
        assert_ne!(recomputed.as_deref(), Some(block.hash.as_str()));
    }

    #[test]
    fn serialization_roundtrip() {
        let block = Block::seal_new(2, "lookup9false".into(), "00ff".into(), 1);
        let json = serde_json::to_string(&block).expect("serialize");
        let recovered: Block = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(block, recovered);
    }

    #[test]
    fn display_shows_index_and_instruction() {
        let block = Block::seal_new(4, "remove2false".into(), "00aa".into(), 1);
        let rendered = block.to_string();
        assert!(rendered.starts_with("#4 [remove2false]"));
        assert!(rendered.contains(&block.hash));
    }
}
