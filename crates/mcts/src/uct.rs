//! UCT child selection.
//!
//! score(i) = wins_i / visits_i + C * sqrt(ln(visits_parent) / visits_i)
//!
//! Unvisited children score `f64::INFINITY`, so every child of a node is
//! tried once before the tree below it is exploited.

use crate::node::{NodeId, NodeStats};
use crate::tree::Tree;
use std::hash::Hash;

/// UCT score of a child with `child` statistics under a parent visited
/// `parent_visits` times.
pub fn uct_score(child: &NodeStats, parent_visits: u32, exploration: f64) -> f64 {
    if child.visits == 0 {
        return f64::INFINITY;
    }

    let n = child.visits as f64;
    let exploitation = child.wins as f64 / n;
    // ln(0) only happens for an unvisited parent, whose children are all unvisited too
    let log_parent = (parent_visits.max(1) as f64).ln();
    exploitation + exploration * (log_parent / n).sqrt()
}

/// Child of `node_id` with the highest UCT score.
///
/// Ties keep the child expanded first. Returns `None` if the node has no
/// children.
pub fn select_child<A: Clone + Copy + Eq + Hash>(
    tree: &Tree<A>,
    node_id: NodeId,
    exploration: f64,
) -> Option<(A, NodeId)> {
    let node = tree.get(node_id);
    let parent_visits = node.stats.visits;

    let mut best = None;
    let mut best_score = f64::NEG_INFINITY;

    for &(action, child_id) in &node.children {
        let score = uct_score(&tree.get(child_id).stats, parent_visits, exploration);
        if best.is_none() || score > best_score {
            best_score = score;
            best = Some((action, child_id));
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(visits: u32, wins: u32) -> NodeStats {
        NodeStats { visits, wins }
    }

    #[test]
    fn test_unvisited_child_is_infinite() {
        assert_eq!(uct_score(&stats(0, 0), 10, 2.0), f64::INFINITY);
    }

    #[test]
    fn test_score_formula() {
        // 3/4 + 2 * sqrt(ln(10) / 4)
        let expected = 0.75 + 2.0 * (10f64.ln() / 4.0).sqrt();
        assert!((uct_score(&stats(4, 3), 10, 2.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_zero_exploration_is_win_rate() {
        assert!((uct_score(&stats(5, 1), 50, 0.0) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_select_prefers_unvisited() {
        let mut tree: Tree<u8> = Tree::new(vec![]);
        let a = tree.add_child(NodeId::ROOT, 0, vec![]);
        let b = tree.add_child(NodeId::ROOT, 1, vec![]);
        for _ in 0..5 {
            tree.backpropagate(a, true);
        }

        assert_eq!(select_child(&tree, NodeId::ROOT, 2.0), Some((1, b)));
    }

    #[test]
    fn test_select_ties_keep_first() {
        let mut tree: Tree<u8> = Tree::new(vec![]);
        let a = tree.add_child(NodeId::ROOT, 0, vec![]);
        let b = tree.add_child(NodeId::ROOT, 1, vec![]);
        tree.backpropagate(a, true);
        tree.backpropagate(b, true);

        assert_eq!(select_child(&tree, NodeId::ROOT, 2.0), Some((0, a)));
    }

    #[test]
    fn test_select_all_zero_scores() {
        // Scores of exactly 0 must still produce a choice
        let mut tree: Tree<u8> = Tree::new(vec![]);
        let a = tree.add_child(NodeId::ROOT, 0, vec![]);
        let b = tree.add_child(NodeId::ROOT, 1, vec![]);
        tree.get_mut(a).stats = stats(1, 0);
        tree.get_mut(b).stats = stats(1, 0);
        tree.get_mut(NodeId::ROOT).stats = stats(1, 0);

        assert_eq!(select_child(&tree, NodeId::ROOT, 2.0), Some((0, a)));
    }

    #[test]
    fn test_select_without_children() {
        let tree: Tree<u8> = Tree::new(vec![1]);
        assert_eq!(select_child(&tree, NodeId::ROOT, 2.0), None);
    }
}
