//! MCTS node types for tree storage.
//!
//! Uses arena allocation with indices: a node refers to its parent and
//! children by `NodeId`, never by pointer.

use std::hash::Hash;

/// Index into the node arena.
///
/// This is a lightweight handle that references a node in the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Statistics for a single MCTS node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeStats {
    /// Number of simulations that passed through this node.
    pub visits: u32,

    /// Number of those simulations won by the player being optimized.
    /// Never exceeds `visits`.
    pub wins: u32,
}

impl NodeStats {
    /// Record one simulation outcome.
    pub fn record(&mut self, won: bool) {
        self.visits += 1;
        if won {
            self.wins += 1;
        }
    }

    /// Empirical win rate, or `None` if the node was never visited.
    pub fn win_rate(&self) -> Option<f64> {
        if self.visits == 0 {
            None
        } else {
            Some(self.wins as f64 / self.visits as f64)
        }
    }
}

/// A node in the MCTS tree.
#[derive(Clone, Debug)]
pub struct Node<A: Clone + Copy + Eq + Hash> {
    /// Parent node (None for root).
    pub parent: Option<NodeId>,

    /// Action that led to this node (None for root).
    pub action: Option<A>,

    /// Children: (action, node_id) pairs, in expansion order.
    pub children: Vec<(A, NodeId)>,

    /// Legal actions at this node that have no child yet.
    pub untried: Vec<A>,

    /// Visit and win counters.
    pub stats: NodeStats,
}

impl<A: Clone + Copy + Eq + Hash> Node<A> {
    /// Create a new node with no statistics and no children.
    pub fn new(parent: Option<NodeId>, action: Option<A>, untried: Vec<A>) -> Self {
        Self {
            parent,
            action,
            children: Vec::new(),
            untried,
            stats: NodeStats::default(),
        }
    }

    /// Create the root node.
    pub fn root(legal_actions: Vec<A>) -> Self {
        Self::new(None, None, legal_actions)
    }

    /// True once every legal action has been expanded.
    pub fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }

    /// True if the node has neither children nor untried actions.
    pub fn is_terminal(&self) -> bool {
        self.untried.is_empty() && self.children.is_empty()
    }

    /// Child reached by `action`, if it has been expanded.
    pub fn child(&self, action: A) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, id)| *id)
    }
}
