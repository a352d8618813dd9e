// Copyright (c) 2026 Tessera Contributors. MIT License.
// See LICENSE for details.

//! # Tessera — Tamper-Evident Operation Ledger
//!
//! Tessera records a sequence of search-tree operations as a hash-linked,
//! proof-of-work sealed chain. Every `add`, `remove`, and `lookup` against
//! the ledger's AVL tree becomes one immutable block, and every tree node
//! remembers *which blocks last touched it* — structural provenance down to
//! the rotation.
//!
//! The interesting part is the interplay of two structures:
//!
//! - **[`tree::AvlTree`]** — a height-balanced binary search tree whose
//!   nodes carry modifier sets: the indices of the blocks whose operations
//!   created them or rotated them into place.
//! - **[`chain::Ledger`]** — the append-only chain. Each block stores one
//!   operation, the previous block's hash, and a nonce found by SHA-256
//!   proof-of-work search.
//!
//! ## Architecture
//!
//! - **crypto** — SHA-256 hex digests. The chain speaks lowercase hex.
//! - **tree** — the AVL tree with per-node provenance.
//! - **chain** — blocks, the proof-of-work sealer, and the ledger itself.
//! - **error** — the (deliberately small) error taxonomy.
//! - **config** — genesis sentinels and difficulty bounds.
//!
//! ## Design Philosophy
//!
//! 1. Expected-negative outcomes (duplicate add, missing remove) are
//!    booleans, not errors. Errors are reserved for caller mistakes.
//! 2. Every public operation is atomic: it fully completes or changes
//!    nothing observable.
//! 3. The tree has exactly one mutation authority — the ledger that owns it.
//! 4. Single-threaded by design. Mining blocks the caller; that's the deal.

pub mod chain;
pub mod config;
pub mod crypto;
pub mod error;
pub mod tree;

pub use chain::{Action, Block, Ledger, OperationReceipt, Seal};
pub use error::LedgerError;
pub use tree::AvlTree;
