//! # Provenance-Tracking AVL Tree
//!
//! A height-balanced binary search tree in which every node remembers the
//! ledger blocks that last structurally touched it. "Structurally touched"
//! means: the block's operation created the node, re-linked it during a
//! rotation (pivot, promoted child, or transplanted subtree), or moved it
//! while splicing out a removed node.
//!
//! ## Ownership model
//!
//! Children are exclusively-owned `Box`es. Every recursive mutation consumes
//! a subtree and returns its possibly-new root together with a flag saying
//! whether the root's identity changed — the parent uses that flag to decide
//! whether its own child pointer moved and therefore whether it must tag
//! itself with the mutating block's index. No reference-identity tricks,
//! no aliasing.
//!
//! ## Conventions
//!
//! - Heights: empty subtree = 0, leaf = 1.
//! - Balance factor: `height(left) - height(right)`, kept in `{-1, 0, 1}`.
//! - Duplicate keys are rejected, not merged.
//! - A failed `add` or `remove` leaves the tree byte-for-byte unchanged,
//!   modifier sets included.

use std::collections::BTreeSet;
use std::fmt;

mod node;

use node::{Link, Node};

// ---------------------------------------------------------------------------
// Mutation bookkeeping
// ---------------------------------------------------------------------------

/// What a recursive mutation did to the subtree it was handed.
#[derive(Clone, Copy, Debug)]
struct Mutation {
    /// The operation actually happened (insert performed / key removed).
    applied: bool,
    /// The subtree's root is a different node than before (new leaf,
    /// rotation, or splice). Parents tag themselves when this is set.
    root_changed: bool,
}

impl Mutation {
    const NOOP: Mutation = Mutation {
        applied: false,
        root_changed: false,
    };
}

// ---------------------------------------------------------------------------
// AvlTree
// ---------------------------------------------------------------------------

/// A height-balanced search tree over an ordered key type, with per-node
/// block provenance.
///
/// The tree is created once, alongside the ledger that owns it, and mutated
/// in place for the ledger's whole lifetime. The `Ord` bound plays the role
/// of the external comparator: there is exactly one ordering per key type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvlTree<K> {
    root: Link<K>,
}

impl<K> Default for AvlTree<K> {
    fn default() -> Self {
        AvlTree { root: None }
    }
}

impl<K: Ord> AvlTree<K> {
    /// Create an empty tree.
    pub fn new() -> Self {
        AvlTree { root: None }
    }

    // -- mutations ----------------------------------------------------------

    /// Insert `key`, tagging every structurally affected node with
    /// `block_index`.
    ///
    /// Returns `false` without any side effect if the key is already
    /// present — duplicates are an expected negative outcome, not an error.
    pub fn add(&mut self, key: K, block_index: u64) -> bool {
        let (root, outcome) = Self::add_rec(self.root.take(), key, block_index);
        self.root = root;
        outcome.applied
    }

    fn add_rec(link: Link<K>, key: K, block_index: u64) -> (Link<K>, Mutation) {
        let Some(mut current) = link else {
            // Empty slot reached: the key goes here, in a fresh leaf whose
            // provenance starts with the inserting block.
            let leaf = Box::new(Node::new(key, block_index));
            return (
                Some(leaf),
                Mutation {
                    applied: true,
                    root_changed: true,
                },
            );
        };

        let ordering = key.cmp(&current.key);
        let outcome = match ordering {
            std::cmp::Ordering::Less => {
                let (child, outcome) = Self::add_rec(current.left.take(), key, block_index);
                current.left = child;
                outcome
            }
            std::cmp::Ordering::Greater => {
                let (child, outcome) = Self::add_rec(current.right.take(), key, block_index);
                current.right = child;
                outcome
            }
            std::cmp::Ordering::Equal => {
                // Duplicate: hand the node back untouched.
                return (Some(current), Mutation::NOOP);
            }
        };

        if !outcome.applied {
            // Duplicate detected deeper down. Nothing on this path may
            // change, not even heights.
            return (Some(current), outcome);
        }

        if outcome.root_changed {
            current.tag(block_index);
        }
        current.update_height();
        let (current, rotated) = Self::rebalance(current, block_index);
        (
            Some(current),
            Mutation {
                applied: true,
                root_changed: rotated,
            },
        )
    }

    /// Remove `key`, tagging every structurally affected node with
    /// `block_index`.
    ///
    /// Returns `false` without any side effect if the key is absent — a
    /// failed search must not leave modifier-set fingerprints anywhere.
    pub fn remove(&mut self, key: &K, block_index: u64) -> bool {
        let (root, outcome) = Self::remove_rec(self.root.take(), key, block_index);
        self.root = root;
        outcome.applied
    }

    fn remove_rec(link: Link<K>, key: &K, block_index: u64) -> (Link<K>, Mutation) {
        let Some(mut current) = link else {
            return (None, Mutation::NOOP);
        };

        let outcome = match key.cmp(&current.key) {
            std::cmp::Ordering::Less => {
                let (child, outcome) = Self::remove_rec(current.left.take(), key, block_index);
                current.left = child;
                outcome
            }
            std::cmp::Ordering::Greater => {
                let (child, outcome) = Self::remove_rec(current.right.take(), key, block_index);
                current.right = child;
                outcome
            }
            std::cmp::Ordering::Equal => {
                // Found it. Splice the node out; whatever takes its place is
                // by definition a different node (or absence).
                let replacement = match Self::splice(current, block_index) {
                    None => None,
                    Some(node) => {
                        let (node, _) = Self::rebalance(node, block_index);
                        Some(node)
                    }
                };
                return (
                    replacement,
                    Mutation {
                        applied: true,
                        root_changed: true,
                    },
                );
            }
        };

        if !outcome.applied {
            return (Some(current), outcome);
        }

        if outcome.root_changed {
            current.tag(block_index);
        }
        current.update_height();
        let (current, rotated) = Self::rebalance(current, block_index);
        (
            Some(current),
            Mutation {
                applied: true,
                root_changed: rotated,
            },
        )
    }

    /// Replace a node about to be deleted with its successor structure.
    ///
    /// Zero or one children: the remaining child (or absence) is spliced in
    /// directly. Two children: the in-order successor — the leftmost node of
    /// the right subtree — is physically detached from its old position and
    /// transplanted here, keeping its own provenance and gaining
    /// `block_index`.
    fn splice(mut node: Box<Node<K>>, block_index: u64) -> Link<K> {
        match (node.left.take(), node.right.take()) {
            (None, None) => None,
            (Some(left), None) => Some(left),
            (None, Some(right)) => Some(right),
            (Some(left), Some(right)) => {
                let (rest, _, mut successor) = Self::detach_min(right, block_index);
                successor.left = Some(left);
                successor.right = rest;
                successor.tag(block_index);
                successor.update_height();
                Some(successor)
            }
        }
    }

    /// Detach the minimum node of a non-empty subtree.
    ///
    /// Returns the remaining (rebalanced) subtree, whether that subtree's
    /// root identity changed, and the detached node. The same propagation
    /// rule as insertion applies on the way back up: an ancestor is tagged
    /// only when its left child's identity actually changed — at the
    /// detachment point itself, or where a rotation below replaced the
    /// child's root.
    ///
    /// Taking the subtree by `Box` rather than `Option` makes the "no
    /// in-order successor" state unrepresentable: the caller already proved
    /// a right subtree exists.
    fn detach_min(mut node: Box<Node<K>>, block_index: u64) -> (Link<K>, bool, Box<Node<K>>) {
        match node.left.take() {
            None => {
                // This is the minimum. Its right subtree (if any) moves up
                // into its place, so the parent's child slot changes.
                let rest = node.right.take();
                (rest, true, node)
            }
            Some(left) => {
                let (rest, child_changed, min) = Self::detach_min(left, block_index);
                node.left = rest;
                if child_changed {
                    node.tag(block_index);
                }
                node.update_height();
                let (node, rotated) = Self::rebalance(node, block_index);
                (Some(node), rotated, min)
            }
        }
    }

    // -- rebalancing --------------------------------------------------------

    /// Restore the AVL invariant at `node` if its balance factor left the
    /// `{-1, 0, 1}` band. Returns the subtree root and whether a rotation
    /// replaced it.
    fn rebalance(node: Box<Node<K>>, block_index: u64) -> (Box<Node<K>>, bool) {
        let balance = node.balance();
        if balance > 1 {
            if Node::link_balance(&node.left) >= 0 {
                // Left-left: one right rotation.
                (Self::rotate_right(node, block_index), true)
            } else {
                // Left-right: rotate the left child left, then this right.
                let mut node = node;
                let left = node
                    .left
                    .take()
                    .expect("left-heavy node must have a left child");
                node.left = Some(Self::rotate_left(left, block_index));
                (Self::rotate_right(node, block_index), true)
            }
        } else if balance < -1 {
            if Node::link_balance(&node.right) <= 0 {
                // Right-right: one left rotation.
                (Self::rotate_left(node, block_index), true)
            } else {
                // Right-left: rotate the right child right, then this left.
                let mut node = node;
                let right = node
                    .right
                    .take()
                    .expect("right-heavy node must have a right child");
                node.right = Some(Self::rotate_right(right, block_index));
                (Self::rotate_left(node, block_index), true)
            }
        } else {
            (node, false)
        }
    }

    /// Left rotation: promote the right child over `pivot`.
    ///
    /// Three links move: the pivot, its promoted right child, and the
    /// child's left subtree transplanted onto the pivot. All three nodes
    /// (when present) get tagged; both rotated nodes' heights are recomputed
    /// from scratch after the links settle.
    fn rotate_left(mut pivot: Box<Node<K>>, block_index: u64) -> Box<Node<K>> {
        let mut promoted = pivot
            .right
            .take()
            .expect("left rotation requires a right child");
        pivot.right = promoted.left.take();
        if let Some(transplanted) = pivot.right.as_mut() {
            transplanted.tag(block_index);
        }
        pivot.tag(block_index);
        pivot.update_height();
        promoted.tag(block_index);
        promoted.left = Some(pivot);
        promoted.update_height();
        promoted
    }

    /// Right rotation: mirror image of [`Self::rotate_left`].
    fn rotate_right(mut pivot: Box<Node<K>>, block_index: u64) -> Box<Node<K>> {
        let mut promoted = pivot
            .left
            .take()
            .expect("right rotation requires a left child");
        pivot.left = promoted.right.take();
        if let Some(transplanted) = pivot.left.as_mut() {
            transplanted.tag(block_index);
        }
        pivot.tag(block_index);
        pivot.update_height();
        promoted.tag(block_index);
        promoted.right = Some(pivot);
        promoted.update_height();
        promoted
    }

    // -- pure queries -------------------------------------------------------

    /// Search for `key`; on a hit, return the node's accumulated modifier
    /// set. Never mutates anything.
    pub fn lookup(&self, key: &K) -> Option<&BTreeSet<u64>> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                std::cmp::Ordering::Less => node.left.as_deref(),
                std::cmp::Ordering::Greater => node.right.as_deref(),
                std::cmp::Ordering::Equal => return Some(&node.modifiers),
            };
        }
        None
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &K) -> bool {
        self.lookup(key).is_some()
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        fn count<K>(link: &Link<K>) -> usize {
            link.as_ref()
                .map_or(0, |n| 1 + count(&n.left) + count(&n.right))
        }
        count(&self.root)
    }

    /// Whether the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the whole tree (empty = 0, single node = 1).
    pub fn height(&self) -> u32 {
        Node::link_height(&self.root)
    }

    /// Number of leaf nodes.
    pub fn leaves_count(&self) -> usize {
        fn leaves<K>(link: &Link<K>) -> usize {
            match link.as_deref() {
                None => 0,
                Some(n) if n.is_leaf() => 1,
                Some(n) => leaves(&n.left) + leaves(&n.right),
            }
        }
        leaves(&self.root)
    }

    /// Largest key in the tree, if any.
    pub fn max(&self) -> Option<&K> {
        let mut current = self.root.as_deref()?;
        while let Some(right) = current.right.as_deref() {
            current = right;
        }
        Some(&current.key)
    }

    /// Depth of `key` below the root (root = 0), or `None` if absent.
    pub fn level(&self, key: &K) -> Option<u32> {
        let mut depth = 0;
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            match key.cmp(&node.key) {
                std::cmp::Ordering::Less => current = node.left.as_deref(),
                std::cmp::Ordering::Greater => current = node.right.as_deref(),
                std::cmp::Ordering::Equal => return Some(depth),
            }
            depth += 1;
        }
        None
    }

    /// Keys strictly between `low` and `high` (both bounds excluded), in
    /// ascending order.
    pub fn get_in_range(&self, low: &K, high: &K) -> Vec<K>
    where
        K: Clone,
    {
        fn walk<K: Ord + Clone>(link: &Link<K>, low: &K, high: &K, out: &mut Vec<K>) {
            let Some(node) = link.as_deref() else { return };
            if &node.key > low {
                walk(&node.left, low, high, out);
            }
            if &node.key > low && &node.key < high {
                out.push(node.key.clone());
            }
            if &node.key < high {
                walk(&node.right, low, high, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.root, low, high, &mut out);
        out
    }

    /// All keys in ascending order.
    pub fn in_order(&self) -> Vec<&K> {
        fn walk<'a, K>(link: &'a Link<K>, out: &mut Vec<&'a K>) {
            if let Some(node) = link.as_deref() {
                walk(&node.left, out);
                out.push(&node.key);
                walk(&node.right, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.root, &mut out);
        out
    }

    /// Shape-only equality: same keys and same cached heights, node for
    /// node. Modifier sets are ignored, so two trees built from the same
    /// insertion order compare equal even if tagged by different chains.
    pub fn structural_eq(&self, other: &Self) -> bool {
        fn eq<K: Ord>(a: &Link<K>, b: &Link<K>) -> bool {
            match (a.as_deref(), b.as_deref()) {
                (None, None) => true,
                (Some(a), Some(b)) => {
                    a.key == b.key
                        && a.height == b.height
                        && eq(&a.left, &b.left)
                        && eq(&a.right, &b.right)
                }
                _ => false,
            }
        }
        eq(&self.root, &other.root)
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        self.root = None;
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

impl<K: Ord + fmt::Display> fmt::Display for AvlTree<K> {
    /// Level-order rendering, one line per level. Each node prints as
    /// `key(height){modifiers}`; absent slots under present parents print
    /// as `-`. Purely for humans; nothing parses this.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(root) = self.root.as_deref() else {
            return write!(f, "(empty)");
        };
        let mut level: Vec<Option<&Node<K>>> = vec![Some(root)];
        while level.iter().any(Option::is_some) {
            let mut line = Vec::with_capacity(level.len());
            let mut next = Vec::with_capacity(level.len() * 2);
            for slot in &level {
                match slot {
                    Some(node) => {
                        line.push(node.describe());
                        next.push(node.left.as_deref());
                        next.push(node.right.as_deref());
                    }
                    None => line.push("-".to_string()),
                }
            }
            writeln!(f, "{}", line.join("  "))?;
            level = next;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
