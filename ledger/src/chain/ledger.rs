//! # The Ledger
//!
//! An append-only chain of sealed blocks, each recording one operation
//! against the ledger's own AVL tree. The chain has exactly one state — an
//! append-only log with a movable tail. No rollback, no branching, no
//! fork choice: every successful [`Ledger::operate`] call deterministically
//! extends the chain by one block.
//!
//! ## Atomicity
//!
//! `operate` either fully completes (tree mutated, block mined and
//! appended) or changes nothing observable — an invalid action string is
//! an error, a rejected operation is a `false` receipt, and neither leaves
//! a trace in the tree or the chain. There is no partial-failure state to
//! reason about.
//!
//! ## Single mutation authority
//!
//! The tree is a private field of the ledger, never aliased elsewhere.
//! Read-only queries and `validate` may run between mutations; there are no
//! concurrent readers during a mutation because there is no concurrency.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::chain::block::Block;
use crate::chain::sealer;
use crate::error::LedgerError;
use crate::tree::AvlTree;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// The three operations a block can record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Insert a key into the tree.
    Add,
    /// Remove a key from the tree.
    Remove,
    /// Pure search; reports the found node's provenance.
    Lookup,
}

impl FromStr for Action {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Action::Add),
            "remove" => Ok(Action::Remove),
            "lookup" => Ok(Action::Lookup),
            other => Err(LedgerError::InvalidOperation(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Add => "add",
            Action::Remove => "remove",
            Action::Lookup => "lookup",
        })
    }
}

// ---------------------------------------------------------------------------
// OperationReceipt
// ---------------------------------------------------------------------------

/// What an `operate` call did.
///
/// The receipt is the caller's output channel: the console front end the
/// core deliberately excludes would render these fields, and tests assert
/// on them directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationReceipt {
    /// Index of the block this operation sealed, or `None` if the
    /// operation was rejected and nothing was sealed.
    pub block_index: Option<u64>,
    /// The canonical instruction, e.g. `"add5true"`. Recorded in a block
    /// only when `block_index` is `Some`.
    pub instruction: String,
    /// The operation's boolean outcome: inserted / removed / found.
    pub success: bool,
    /// For a successful lookup, the found node's modifier set — the indices
    /// of every block whose operation structurally touched that node.
    pub modifiers: Option<BTreeSet<u64>>,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// The append-only, hash-linked operation ledger and the tree it governs.
pub struct Ledger<K> {
    /// Required count of leading zero hex digits in every sealed hash.
    difficulty: u32,
    /// The chain. Index 0 is always the genesis block.
    chain: Vec<Block>,
    /// The single tree every operation applies to. Created with the ledger,
    /// lives as long as the ledger, mutated in place, never replaced.
    tree: AvlTree<K>,
}

impl<K: Ord + fmt::Display> Ledger<K> {
    /// Create a ledger, mining its genesis block at the given difficulty.
    ///
    /// Any difficulty is accepted; `16^difficulty` expected hashes per
    /// block is the caller's bed to lie in. Front ends that want the
    /// classic bound use [`crate::config::difficulty_in_range`].
    pub fn new(difficulty: u32) -> Self {
        info!(difficulty, "creating ledger, sealing genesis block");
        let genesis = Block::genesis(difficulty);
        Ledger {
            difficulty,
            chain: vec![genesis],
            tree: AvlTree::new(),
        }
    }

    /// Apply one operation and, if it succeeds, seal it into a new block.
    ///
    /// `action` must be `"add"`, `"remove"`, or `"lookup"`; anything else
    /// fails with [`LedgerError::InvalidOperation`] and appends nothing.
    /// The block's instruction concatenates action, key, and boolean
    /// outcome (`"add5true"`), and the block is sealed against the current
    /// tail before being appended. Rejected operations — duplicate adds,
    /// absent removes, missed lookups — touch neither the tree nor the
    /// chain: there is no state transition to record, so nothing is mined.
    pub fn operate(&mut self, action: &str, key: K) -> Result<OperationReceipt, LedgerError> {
        let action = Action::from_str(action)?;
        let block_index = self.chain.len() as u64;
        let key_repr = key.to_string();

        let (success, modifiers) = match action {
            Action::Add => (self.tree.add(key, block_index), None),
            Action::Remove => (self.tree.remove(&key, block_index), None),
            Action::Lookup => {
                let modifiers = self.tree.lookup(&key).cloned();
                (modifiers.is_some(), modifiers)
            }
        };

        let instruction = format!("{action}{key_repr}{success}");
        if !success {
            debug!(%action, key = %key_repr, "operation rejected, nothing sealed");
            return Ok(OperationReceipt {
                block_index: None,
                instruction,
                success: false,
                modifiers: None,
            });
        }

        let prev_hash = self.latest_block().hash.clone();
        let block = Block::seal_new(block_index, instruction.clone(), prev_hash, self.difficulty);
        debug!(
            index = block.index,
            nonce = block.nonce,
            instruction = %block.instruction,
            "block sealed and appended"
        );
        self.chain.push(block);

        Ok(OperationReceipt {
            block_index: Some(block_index),
            instruction,
            success: true,
            modifiers,
        })
    }

    /// Walk the whole chain and report whether it is intact.
    ///
    /// For every block after the genesis: recompute the hash from the
    /// stored fields and stored nonce (one hash, no search) and compare it
    /// to the stored hash, then compare the stored `prev_hash` against the
    /// actual hash of the preceding block. Any mismatch anywhere fails the
    /// whole chain. Never mutates anything.
    pub fn validate(&self) -> bool {
        for window in self.chain.windows(2) {
            let (prev, current) = (&window[0], &window[1]);
            let recomputed = sealer::verify(&current.seal_content(), current.nonce, self.difficulty);
            if recomputed.as_deref() != Some(current.hash.as_str()) {
                warn!(
                    index = current.index,
                    "stored hash does not match recomputed hash"
                );
                return false;
            }
            if current.prev_hash != prev.hash {
                warn!(index = current.index, "previous-hash link broken");
                return false;
            }
        }
        true
    }

    /// Overwrite a block's instruction *without resealing it*.
    ///
    /// This is deliberate corruption — the one tool for provoking a
    /// validation failure in tests. The block's hash and nonce stay as they
    /// were, so [`Ledger::validate`] reports `false` from now on.
    pub fn modify(
        &mut self,
        index: usize,
        new_instruction: impl Into<String>,
    ) -> Result<(), LedgerError> {
        let len = self.chain.len();
        let Some(block) = self.chain.get_mut(index) else {
            return Err(LedgerError::IndexOutOfRange { index, len });
        };
        warn!(index, "overwriting block instruction without resealing");
        block.instruction = new_instruction.into();
        Ok(())
    }

    /// Chain length, genesis included.
    pub fn size(&self) -> usize {
        self.chain.len()
    }

    /// All blocks, oldest first.
    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    /// The chain's tail.
    pub fn latest_block(&self) -> &Block {
        self.chain
            .last()
            .expect("chain always holds at least the genesis block")
    }

    /// The configured difficulty.
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Read access to the governed tree, for rendering and queries.
    pub fn tree(&self) -> &AvlTree<K> {
        &self.tree
    }
}

impl<K: Ord + fmt::Display> fmt::Display for Ledger<K> {
    /// One line per block, oldest first. Pure formatting for humans.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.chain {
            writeln!(f, "{block}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Difficulty 1 keeps each seal to ~16 expected hashes; chain semantics
    // do not depend on the difficulty.
    const D: u32 = 1;

    #[test]
    fn new_ledger_holds_only_genesis() {
        let ledger: Ledger<i64> = Ledger::new(D);
        assert_eq!(ledger.size(), 1);
        assert_eq!(ledger.latest_block().index, 0);
        assert!(ledger.tree().is_empty());
        assert!(ledger.validate());
    }

    #[test]
    fn operate_appends_one_block_per_call() {
        let mut ledger = Ledger::new(D);
        ledger.operate("add", 5).unwrap();
        ledger.operate("add", 9).unwrap();
        ledger.operate("lookup", 5).unwrap();
        assert_eq!(ledger.size(), 4);
        let indices: Vec<u64> = ledger.blocks().iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn instructions_concatenate_action_key_outcome() {
        let mut ledger = Ledger::new(D);
        let r = ledger.operate("add", 5).unwrap();
        assert_eq!(r.instruction, "add5true");
        assert!(r.success);
        assert_eq!(r.block_index, Some(1));

        let r = ledger.operate("add", 5).unwrap();
        assert_eq!(r.instruction, "add5false");
        assert!(!r.success);
        assert_eq!(r.block_index, None);

        let r = ledger.operate("remove", 7).unwrap();
        assert_eq!(r.instruction, "remove7false");

        let r = ledger.operate("lookup", 5).unwrap();
        assert_eq!(r.instruction, "lookup5true");
        assert_eq!(r.block_index, Some(2));
    }

    #[test]
    fn rejected_operations_seal_nothing() {
        let mut ledger = Ledger::new(D);
        ledger.operate("add", 1).unwrap();
        ledger.operate("add", 1).unwrap(); // duplicate, rejected
        ledger.operate("remove", 2).unwrap(); // absent, rejected
        ledger.operate("lookup", 9).unwrap(); // miss, rejected
        assert_eq!(ledger.size(), 2);
        assert_eq!(ledger.tree().size(), 1);
        assert!(ledger.validate());
    }

    #[test]
    fn unknown_action_fails_and_appends_nothing() {
        let mut ledger = Ledger::new(D);
        let err = ledger.operate("frobnicate", 5).unwrap_err();
        assert_eq!(err, LedgerError::InvalidOperation("frobnicate".to_string()));
        assert_eq!(ledger.size(), 1);
        assert!(ledger.tree().is_empty());
    }

    #[test]
    fn lookup_receipt_carries_the_modifier_set() {
        let mut ledger = Ledger::new(D);
        ledger.operate("add", 5).unwrap(); // block 1
        let r = ledger.operate("lookup", 5).unwrap();
        assert!(r.success);
        let mods = r.modifiers.expect("hit must carry modifiers");
        assert!(mods.contains(&1), "inserting block index must be present");

        let r = ledger.operate("lookup", 42).unwrap();
        assert!(!r.success);
        assert!(r.modifiers.is_none());
    }

    #[test]
    fn lookup_does_not_mutate_the_tree() {
        let mut ledger = Ledger::new(D);
        ledger.operate("add", 5).unwrap();
        let before = ledger.tree().clone();
        ledger.operate("lookup", 5).unwrap();
        ledger.operate("lookup", 6).unwrap();
        assert_eq!(ledger.tree(), &before);
    }

    #[test]
    fn blocks_link_by_hash() {
        let mut ledger = Ledger::new(D);
        ledger.operate("add", 3).unwrap();
        ledger.operate("add", 4).unwrap();
        let blocks = ledger.blocks();
        assert_eq!(blocks[1].prev_hash, blocks[0].hash);
        assert_eq!(blocks[2].prev_hash, blocks[1].hash);
    }

    #[test]
    fn fresh_chain_always_validates() {
        let mut ledger = Ledger::new(D);
        for key in [8, 3, 10, 1, 6, 14] {
            ledger.operate("add", key).unwrap();
            assert!(ledger.validate());
        }
        for key in [3, 42, 8] {
            ledger.operate("remove", key).unwrap();
            assert!(ledger.validate());
        }
    }

    #[test]
    fn modify_breaks_validation_permanently() {
        let mut ledger = Ledger::new(D);
        ledger.operate("add", 5).unwrap();
        ledger.operate("add", 6).unwrap();
        assert!(ledger.validate());

        ledger.modify(1, "Invalid Instruction").unwrap();
        assert!(!ledger.validate());

        // Later (honest) operations cannot repair the corrupted block.
        ledger.operate("remove", 6).unwrap();
        assert!(!ledger.validate());
    }

    #[test]
    fn modify_out_of_range_is_rejected() {
        let mut ledger: Ledger<i64> = Ledger::new(D);
        let err = ledger.modify(5, "whatever").unwrap_err();
        assert_eq!(err, LedgerError::IndexOutOfRange { index: 5, len: 1 });
        // The genesis block itself is a legal target.
        assert!(ledger.modify(0, "rewritten").is_ok());
    }

    #[test]
    fn validate_never_mutates() {
        let mut ledger = Ledger::new(D);
        ledger.operate("add", 1).unwrap();
        ledger.modify(1, "tampered").unwrap();
        let before: Vec<Block> = ledger.blocks().to_vec();
        assert!(!ledger.validate());
        assert!(!ledger.validate());
        assert_eq!(ledger.blocks(), before.as_slice());
    }

    #[test]
    fn display_lists_every_block() {
        let mut ledger = Ledger::new(D);
        ledger.operate("add", 2).unwrap();
        let rendered = ledger.to_string();
        assert_eq!(rendered.lines().count(), 2);
        assert!(rendered.contains("[add2true]"));
    }
}
