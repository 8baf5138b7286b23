//! Arena search tree shared by worker threads.
//!
//! Nodes sit behind `Arc` in a `RwLock`-guarded arena. Readers hold the lock
//! only long enough to clone an `Arc`; all statistics live in the nodes'
//! atomics, so the write lock is taken once per child link and nowhere else.
//!
//! With transpositions enabled the arena also maps position keys to nodes,
//! and an edge reaching a position already in the tree links to that node.
//! The tree becomes a DAG whose shared nodes carry one set of statistics.
//! Positions never repeat along a line of play, so it has no cycles.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rustc_hash::FxHashMap;

use super::node::{Edge, Node, NodeId};

/// How `link_child` resolved an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Link {
    /// A new node was added.
    Created(NodeId),
    /// The position was already in the tree; the edge now shares its node.
    Transposed(NodeId),
    /// Another worker linked the edge first.
    Raced(NodeId),
}

impl Link {
    #[must_use]
    pub fn node(self) -> NodeId {
        match self {
            Link::Created(id) | Link::Transposed(id) | Link::Raced(id) => id,
        }
    }
}

#[derive(Debug)]
struct Arena<S> {
    nodes: Vec<Arc<Node<S>>>,
    keys: Option<FxHashMap<u64, NodeId>>,
}

#[derive(Debug)]
pub struct Tree<S> {
    arena: RwLock<Arena<S>>,
}

impl<S> Tree<S> {
    /// A tree holding only `root`.
    pub fn new(root: Node<S>, capacity: usize) -> Self {
        Self::build(root, capacity, None)
    }

    /// A tree that merges equal positions, keyed by `root_key` for the root.
    pub fn with_transpositions(root: Node<S>, capacity: usize, root_key: u64) -> Self {
        let mut keys = FxHashMap::default();
        keys.insert(root_key, NodeId::new(0));
        Self::build(root, capacity, Some(keys))
    }

    fn build(root: Node<S>, capacity: usize, keys: Option<FxHashMap<u64, NodeId>>) -> Self {
        let mut nodes = Vec::with_capacity(capacity.min(1 << 16));
        nodes.push(Arc::new(root));
        Self { arena: RwLock::new(Arena { nodes, keys }) }
    }

    fn read(&self) -> RwLockReadGuard<'_, Arena<S>> {
        self.arena.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Arena<S>> {
        self.arena.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::new(0)
    }

    /// # Panics
    ///
    /// Panics if `id` was not returned by this tree.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Arc<Node<S>> {
        Arc::clone(&self.read().nodes[id.index()])
    }

    #[must_use]
    pub fn root_node(&self) -> Arc<Node<S>> {
        self.get(self.root())
    }

    #[must_use]
    pub fn uses_transpositions(&self) -> bool {
        self.read().keys.is_some()
    }

    /// Link `edge` to the node for `child`, whose position hashes to `key`.
    ///
    /// Runs under the write lock, so an edge is linked at most once and a
    /// node is only added when its edge is actually linked to it. `key` is
    /// ignored unless the tree merges transpositions.
    pub fn link_child(&self, edge: &Edge, child: Node<S>, key: u64) -> Link
    where
        S: PartialEq,
    {
        let mut arena = self.write();
        let existing = edge.child();
        if !existing.is_none() {
            return Link::Raced(existing);
        }

        let known = arena.keys.as_ref().and_then(|keys| keys.get(&key).copied());
        if let Some(id) = known {
            // Equal keys with unequal states are hash collisions: keep them apart.
            if arena.nodes[id.index()].state() == child.state() {
                return match edge.set_child(id) {
                    Ok(()) => Link::Transposed(id),
                    Err(winner) => Link::Raced(winner),
                };
            }
        }

        let id = NodeId::new(arena.nodes.len() as u32);
        if let Err(winner) = edge.set_child(id) {
            return Link::Raced(winner);
        }
        arena.nodes.push(Arc::new(child));
        if let Some(keys) = arena.keys.as_mut() {
            keys.entry(key).or_insert(id);
        }
        Link::Created(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().nodes.len()
    }

    /// Never true: the root is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().nodes.is_empty()
    }

    /// Deepest node depth.
    #[must_use]
    pub fn max_depth(&self) -> u16 {
        self.read().nodes.iter().map(|n| n.depth()).max().unwrap_or(0)
    }
}
