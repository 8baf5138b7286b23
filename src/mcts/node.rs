//! Search tree nodes and edges.
//!
//! Nodes are addressed by `NodeId` into the tree arena. Everything a worker
//! thread updates during a simulation is atomic: edge visits, value sums,
//! in-flight (virtual loss) counters and child links. A node's edge list is
//! written exactly once through `OnceLock` when the node is first evaluated.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::core::{ActionId, PlayerId, PlayerMap};

/// Index into the tree arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value representing no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "NodeId(NONE)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

/// One legal action out of a node, with its running statistics.
///
/// `value_sum` is accumulated from the perspective of the player to move at
/// the parent node.
#[derive(Debug)]
pub struct Edge {
    action: ActionId,
    prior: f32,
    visits: AtomicU32,
    value_sum: AtomicU64,
    in_flight: AtomicU32,
    child: AtomicU32,
}

impl Edge {
    pub fn new(action: ActionId, prior: f32) -> Self {
        Self {
            action,
            prior,
            visits: AtomicU32::new(0),
            value_sum: AtomicU64::new(0f64.to_bits()),
            in_flight: AtomicU32::new(0),
            child: AtomicU32::new(NodeId::NONE.0),
        }
    }

    #[inline]
    #[must_use]
    pub fn action(&self) -> ActionId {
        self.action
    }

    #[inline]
    #[must_use]
    pub fn prior(&self) -> f32 {
        self.prior
    }

    #[inline]
    #[must_use]
    pub fn visits(&self) -> u32 {
        self.visits.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn value_sum(&self) -> f64 {
        f64::from_bits(self.value_sum.load(Ordering::Relaxed))
    }

    /// Simulations currently travelling through this edge.
    #[inline]
    #[must_use]
    pub fn in_flight(&self) -> u32 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Mean backed-up value, or `None` before the first visit.
    #[must_use]
    pub fn mean_value(&self) -> Option<f64> {
        match self.visits() {
            0 => None,
            n => Some(self.value_sum() / f64::from(n)),
        }
    }

    #[inline]
    #[must_use]
    pub fn child(&self) -> NodeId {
        NodeId(self.child.load(Ordering::Acquire))
    }

    /// Link the child node. Returns the already-linked child if another
    /// worker won the race.
    pub fn set_child(&self, id: NodeId) -> Result<(), NodeId> {
        self.child
            .compare_exchange(NodeId::NONE.0, id.0, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(NodeId)
    }

    pub fn add_virtual_loss(&self) {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
    }

    /// Release a virtual loss without recording a visit.
    pub fn cancel(&self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record a finished simulation and release its virtual loss.
    pub fn backup(&self, value: f64) {
        self.visits.fetch_add(1, Ordering::Relaxed);
        let _ = self
            .value_sum
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((f64::from_bits(bits) + value).to_bits())
            });
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Edges of an evaluated node, sorted by descending prior, plus the value
/// the evaluator gave the node.
#[derive(Debug)]
pub struct Expansion {
    pub edges: Vec<Edge>,
    pub value: PlayerMap<f64>,
}

/// A search tree node. Owns its game state.
#[derive(Debug)]
pub struct Node<S> {
    state: S,
    to_move: PlayerId,
    depth: u16,
    terminal: Option<PlayerMap<f64>>,
    visits: AtomicU32,
    expansion: OnceLock<Expansion>,
}

impl<S> Node<S> {
    /// `terminal` holds the game returns when `state` is terminal.
    pub fn new(state: S, to_move: PlayerId, depth: u16, terminal: Option<PlayerMap<f64>>) -> Self {
        Self {
            state,
            to_move,
            depth,
            terminal,
            visits: AtomicU32::new(0),
            expansion: OnceLock::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &S {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn to_move(&self) -> PlayerId {
        self.to_move
    }

    #[must_use]
    pub fn depth(&self) -> u16 {
        self.depth
    }

    #[must_use]
    pub fn terminal(&self) -> Option<&PlayerMap<f64>> {
        self.terminal.as_ref()
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    #[inline]
    #[must_use]
    pub fn visits(&self) -> u32 {
        self.visits.load(Ordering::Relaxed)
    }

    pub fn add_visit(&self) {
        self.visits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    #[must_use]
    pub fn expansion(&self) -> Option<&Expansion> {
        self.expansion.get()
    }

    /// Edges, empty until the node is expanded.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        self.expansion().map_or(&[], |e| e.edges.as_slice())
    }

    /// Install the expansion. Returns false if another worker expanded the
    /// node first; theirs is kept.
    pub fn expand(&self, expansion: Expansion) -> bool {
        self.expansion.set(expansion).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_none() {
        assert!(NodeId::NONE.is_none());
        assert!(!NodeId::new(0).is_none());
        assert_eq!(NodeId::new(7).to_string(), "NodeId(7)");
        assert_eq!(NodeId::NONE.to_string(), "NodeId(NONE)");
    }

    #[test]
    fn test_edge_backup() {
        let edge = Edge::new(ActionId(3), 0.5);
        assert_eq!(edge.mean_value(), None);

        edge.add_virtual_loss();
        edge.add_virtual_loss();
        assert_eq!(edge.in_flight(), 2);

        edge.backup(1.0);
        edge.backup(-0.5);
        assert_eq!(edge.visits(), 2);
        assert_eq!(edge.in_flight(), 0);
        assert_eq!(edge.mean_value(), Some(0.25));
    }

    #[test]
    fn test_child_link_once() {
        let edge = Edge::new(ActionId(0), 1.0);
        assert!(edge.child().is_none());
        assert_eq!(edge.set_child(NodeId(4)), Ok(()));
        assert_eq!(edge.set_child(NodeId(9)), Err(NodeId(4)));
        assert_eq!(edge.child(), NodeId(4));
    }

    #[test]
    fn test_expand_once() {
        let node = Node::new((), PlayerId::FIRST, 0, None);
        assert!(node.edges().is_empty());

        let first = Expansion { edges: vec![Edge::new(ActionId(1), 1.0)], value: PlayerMap::with_value(0.0) };
        let second = Expansion { edges: vec![], value: PlayerMap::with_value(0.0) };
        assert!(node.expand(first));
        assert!(!node.expand(second));
        assert_eq!(node.edges().len(), 1);
    }

    #[test]
    fn test_concurrent_backup() {
        let edge = Edge::new(ActionId(0), 1.0);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..250 {
                        edge.add_virtual_loss();
                        edge.backup(1.0);
                    }
                });
            }
        });
        assert_eq!(edge.visits(), 1000);
        assert_eq!(edge.value_sum(), 1000.0);
        assert_eq!(edge.in_flight(), 0);
    }
}
