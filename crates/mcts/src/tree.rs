//! Arena-allocated MCTS tree.
//!
//! Using a Vec<Node> with indices keeps ownership simple: the arena owns
//! every node, a parent refers to its children by index and a child refers
//! back to its parent by index.

use crate::node::{Node, NodeId};
use std::hash::Hash;

/// Arena-allocated MCTS tree.
///
/// Nodes are only ever appended, so a `NodeId` stays valid for the lifetime
/// of the tree.
#[derive(Debug)]
pub struct Tree<A: Clone + Copy + Eq + Hash> {
    nodes: Vec<Node<A>>,
}

impl<A: Clone + Copy + Eq + Hash> Tree<A> {
    /// Create a new tree whose root can play `legal_actions`.
    pub fn new(legal_actions: Vec<A>) -> Self {
        Self {
            nodes: vec![Node::root(legal_actions)],
        }
    }

    /// Get a reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId is invalid.
    pub fn get(&self, id: NodeId) -> &Node<A> {
        &self.nodes[id.0]
    }

    /// Get a mutable reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId is invalid.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<A> {
        &mut self.nodes[id.0]
    }

    /// Append a child of `parent` reached by `action`, returning its ID.
    ///
    /// The caller is responsible for having removed `action` from the
    /// parent's untried actions.
    pub fn add_child(&mut self, parent: NodeId, action: A, untried: Vec<A>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(Some(parent), Some(action), untried));
        self.get_mut(parent).children.push((action, id));
        id
    }

    /// Record a simulation outcome on `leaf` and every ancestor up to the root.
    ///
    /// Returns the number of nodes updated.
    pub fn backpropagate(&mut self, leaf: NodeId, won: bool) -> usize {
        let mut current = Some(leaf);
        let mut updated = 0;

        while let Some(id) = current {
            let node = self.get_mut(id);
            node.stats.record(won);
            current = node.parent;
            updated += 1;
        }

        updated
    }

    /// Number of edges between `id` and the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.get(id).parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.get(parent).parent;
        }
        depth
    }

    /// Sum of visit counts over every node.
    pub fn total_visits(&self) -> u64 {
        self.nodes.iter().map(|n| n.stats.visits as u64).sum()
    }

    /// Iterate over every node with its ID, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<A>)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Get the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (never true, the root always exists).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the root node.
    pub fn root(&self) -> &Node<A> {
        self.get(NodeId::ROOT)
    }
}
