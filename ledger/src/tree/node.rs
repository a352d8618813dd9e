//! Tree node: key, boxed children, cached height, and the provenance set.

use std::collections::BTreeSet;
use std::fmt;

/// An owned, possibly-absent subtree.
pub(crate) type Link<K> = Option<Box<Node<K>>>;

/// A single node of the AVL tree.
///
/// Each node caches its own height (empty subtree = 0, leaf = 1) and carries
/// a *modifier set*: the indices of every ledger block whose operation
/// created this node or structurally moved it — an insertion, a rotation
/// passing through it, or a removal cascade re-linking it.
///
/// Nodes are exclusively owned by their parent (or by the tree, for the
/// root). Every mutation returns the possibly-new subtree root, so there is
/// no aliased pointer surgery anywhere.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node<K> {
    pub(crate) key: K,
    pub(crate) left: Link<K>,
    pub(crate) right: Link<K>,
    pub(crate) height: u32,
    pub(crate) modifiers: BTreeSet<u64>,
}

impl<K> Node<K> {
    /// Create a leaf whose provenance starts with the block that inserted it.
    pub(crate) fn new(key: K, block_index: u64) -> Self {
        let mut modifiers = BTreeSet::new();
        modifiers.insert(block_index);
        Node {
            key,
            left: None,
            right: None,
            height: 1,
            modifiers,
        }
    }

    /// Height of a possibly-absent subtree.
    pub(crate) fn link_height(link: &Link<K>) -> u32 {
        link.as_ref().map_or(0, |n| n.height)
    }

    /// Balance factor of a possibly-absent subtree. An empty tree is
    /// perfectly balanced.
    pub(crate) fn link_balance(link: &Link<K>) -> i32 {
        link.as_ref().map_or(0, |n| n.balance())
    }

    /// Left height minus right height.
    pub(crate) fn balance(&self) -> i32 {
        Self::link_height(&self.left) as i32 - Self::link_height(&self.right) as i32
    }

    /// Recompute this node's height from its children. Must be called after
    /// any change to either child link.
    pub(crate) fn update_height(&mut self) {
        self.height = 1 + Self::link_height(&self.left).max(Self::link_height(&self.right));
    }

    /// Record that `block_index` structurally touched this node.
    pub(crate) fn tag(&mut self, block_index: u64) {
        self.modifiers.insert(block_index);
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

impl<K: fmt::Display> Node<K> {
    /// Render as `key(height){modifiers}`, e.g. `5(2){0,3}`.
    pub(crate) fn describe(&self) -> String {
        let mods: Vec<String> = self.modifiers.iter().map(|m| m.to_string()).collect();
        format!("{}({}){{{}}}", self.key, self.height, mods.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_node_is_a_leaf_with_one_modifier() {
        let node = Node::new(7, 3);
        assert_eq!(node.height, 1);
        assert!(node.is_leaf());
        assert_eq!(node.balance(), 0);
        assert!(node.modifiers.contains(&3));
        assert_eq!(node.modifiers.len(), 1);
    }

    #[test]
    fn link_height_of_absent_is_zero() {
        let empty: Link<i64> = None;
        assert_eq!(Node::link_height(&empty), 0);
        assert_eq!(Node::link_balance(&empty), 0);
    }

    #[test]
    fn describe_renders_key_height_and_modifiers() {
        let mut node = Node::new(5, 0);
        node.tag(3);
        assert_eq!(node.describe(), "5(1){0,3}");
    }
}
