//! PUCT search driver.
//!
//! ## Simulation
//!
//! 1. **Select**: from the root, follow the edge maximising
//!    `Q_eff + c_puct · P · sqrt(N_eff) / (1 + n_eff)` among the first
//!    `widening_limit(N)` edges (sorted by prior). In-flight simulations
//!    count as visits that lost `virtual_loss` each, which spreads parallel
//!    workers across the tree.
//! 2. **Expand**: an edge without a child applies its action through the
//!    engine and links the new node under the tree's write lock. With
//!    `use_transposition`, a position already in the tree is linked instead
//!    of duplicated, so its statistics and edges are shared.
//! 3. **Evaluate**: terminal nodes use the game returns; other leaves call
//!    the `Evaluator` once and install their sorted edge list.
//! 4. **Backup**: each edge on the path adds the value of the player to
//!    move at its parent, then releases its virtual loss.
//!
//! ## Threads
//!
//! `threads == 1` runs on the caller's thread and is fully deterministic.
//! More threads run under `std::thread::scope` over the shared tree; the
//! simulation budget is a shared counter, and the first error stops every
//! worker.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use smallvec::SmallVec;
use thiserror::Error;

use crate::core::{ActionId, GameRng};
use crate::rules::{EngineError, GameEngine};

use super::config::PuctConfig;
use super::evaluator::{normalize_priors, Evaluator};
use super::node::{Edge, Expansion, Node, NodeId};
use super::stats::SearchStats;
use super::tree::{Link, Tree};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("engine error during search: {0}")]
    Engine(#[from] EngineError),

    #[error("the root state has no legal actions")]
    NoLegalActions,

    #[error("the root state is terminal")]
    TerminalRoot,

    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),

    #[error("evaluator returned {got} priors for {expected} legal actions")]
    PriorCount { expected: usize, got: usize },
}

/// Path from the root: (parent node, edge index) per step.
type Path = SmallVec<[(NodeId, usize); 64]>;

/// Counters shared by the workers of one search.
#[derive(Default)]
struct Shared {
    issued: AtomicU32,
    completed: AtomicU32,
    expansions: AtomicU32,
    collisions: AtomicU32,
    transpositions: AtomicU32,
    stop: AtomicBool,
    error: Mutex<Option<SearchError>>,
}

impl Shared {
    fn fail(&self, err: SearchError) {
        let mut slot = self.error.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(err);
        }
        self.stop.store(true, Ordering::Release);
    }

    fn take_error(&self) -> Option<SearchError> {
        self.error.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

/// PUCT search over a `GameEngine` with a pluggable `Evaluator`.
///
/// The tree of the most recent search is kept for `visit_policy`,
/// `action_visits` and `stats`; the next `search` replaces it.
pub struct PuctSearch<E: GameEngine, V> {
    engine: E,
    evaluator: V,
    config: PuctConfig,
    rng: GameRng,
    tree: Option<Tree<E::State>>,
    stats: SearchStats,
}

impl<E: GameEngine, V: Evaluator<E>> PuctSearch<E, V> {
    pub fn new(engine: E, evaluator: V, config: PuctConfig) -> Self {
        let rng = GameRng::new(config.seed).for_context("puct");
        Self {
            engine,
            evaluator,
            config,
            rng,
            tree: None,
            stats: SearchStats::default(),
        }
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[must_use]
    pub fn config(&self) -> &PuctConfig {
        &self.config
    }

    /// Statistics of the most recent search.
    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Run a search from `state` and choose an action.
    pub fn search(&mut self, state: &E::State) -> Result<ActionId, SearchError> {
        self.config.validate()?;
        if self.engine.is_terminal(state) {
            return Err(SearchError::TerminalRoot);
        }
        if self.engine.legal_actions(state).is_empty() {
            return Err(SearchError::NoLegalActions);
        }

        let start = Instant::now();
        self.stats.reset();
        let root = Node::new(state.clone(), self.engine.to_move(state), 0, None);
        let tree = if self.config.use_transposition {
            Tree::with_transpositions(root, self.config.max_nodes, self.engine.state_key(state))
        } else {
            Tree::new(root, self.config.max_nodes)
        };
        let shared = Shared::default();
        let deadline = self.config.time_limit().map(|limit| start + limit);

        // The root is always expanded, so the move choice never depends on
        // whether any simulation completed.
        let root_node = tree.root_node();
        match self.evaluate_leaf(&root_node) {
            Ok(expansion) => {
                root_node.expand(expansion);
                root_node.add_visit();
                shared.expansions.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                log::warn!("search aborted while evaluating the root: {err}");
                return Err(err);
            }
        }

        if self.config.threads <= 1 {
            self.worker(&tree, &shared, deadline);
        } else {
            let this = &*self;
            std::thread::scope(|scope| {
                for _ in 0..this.config.threads {
                    scope.spawn(|| this.worker(&tree, &shared, deadline));
                }
            });
        }

        if let Some(err) = shared.take_error() {
            log::warn!("search aborted: {err}");
            return Err(err);
        }

        self.stats = SearchStats {
            simulations: shared.completed.load(Ordering::Relaxed),
            expansions: shared.expansions.load(Ordering::Relaxed),
            collisions: shared.collisions.load(Ordering::Relaxed),
            transpositions: shared.transpositions.load(Ordering::Relaxed),
            max_depth: tree.max_depth(),
            nodes: tree.len(),
            time_us: start.elapsed().as_micros() as u64,
        };
        self.tree = Some(tree);

        let action = self.choose_root_action().ok_or(SearchError::NoLegalActions)?;
        log::debug!("search chose {action}: {}", self.stats);
        Ok(action)
    }

    /// Tree of the most recent search.
    #[must_use]
    pub fn tree(&self) -> Option<&Tree<E::State>> {
        self.tree.as_ref()
    }

    /// Root visit counts of the most recent search, in edge (prior) order.
    #[must_use]
    pub fn action_visits(&self) -> Vec<(ActionId, u32)> {
        self.tree.as_ref().map_or_else(Vec::new, |tree| {
            tree.root_node()
                .edges()
                .iter()
                .map(|e| (e.action(), e.visits()))
                .collect()
        })
    }

    /// Dense visit distribution over the whole action space.
    ///
    /// `temperature == 0` gives a one-hot on the chosen-by-visits action;
    /// otherwise entries are proportional to `visits^(1/T)`. All zeros before
    /// the first search.
    #[must_use]
    pub fn visit_policy(&self, temperature: f64) -> Vec<f32> {
        let mut policy = vec![0.0f32; self.engine.action_space_size()];
        let visits = self.action_visits();
        if visits.is_empty() {
            return policy;
        }

        if temperature <= 0.0 {
            if let Some(best) = most_visited(&visits) {
                policy[best.index()] = 1.0;
            }
            return policy;
        }

        let weights = visit_weights(&visits, temperature);
        let total: f64 = weights.iter().sum();
        if total > 0.0 {
            for ((action, _), w) in visits.iter().zip(&weights) {
                policy[action.index()] = (w / total) as f32;
            }
        } else if let Some(best) = most_visited(&visits) {
            policy[best.index()] = 1.0;
        }
        policy
    }

    fn choose_root_action(&mut self) -> Option<ActionId> {
        let visits = self.action_visits();
        if self.config.temperature > 0.0 {
            let weights = visit_weights(&visits, self.config.temperature);
            if let Some(i) = self.rng.choose_weighted(&weights) {
                return Some(visits[i].0);
            }
        }
        most_visited(&visits)
    }

    // =========================================================================
    // Workers
    // =========================================================================

    fn worker(&self, tree: &Tree<E::State>, shared: &Shared, deadline: Option<Instant>) {
        let budget = self.config.simulations;
        loop {
            if shared.stop.load(Ordering::Acquire) {
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                shared.stop.store(true, Ordering::Release);
                break;
            }
            if tree.len() >= self.config.max_nodes {
                break;
            }
            if budget > 0 && shared.issued.fetch_add(1, Ordering::Relaxed) >= budget {
                break;
            }

            match self.simulate(tree, shared) {
                Ok(()) => {
                    shared.completed.fetch_add(1, Ordering::Relaxed);
                }
                Err(err) => {
                    shared.fail(err);
                    break;
                }
            }
        }
    }

    fn simulate(&self, tree: &Tree<E::State>, shared: &Shared) -> Result<(), SearchError> {
        let mut path = Path::new();
        let mut node_id = tree.root();

        let value = loop {
            let node = tree.get(node_id);
            if let Some(returns) = node.terminal() {
                node.add_visit();
                break *returns;
            }

            let Some(expansion) = node.expansion() else {
                let expansion = match self.evaluate_leaf(&node) {
                    Ok(expansion) => expansion,
                    Err(err) => {
                        release(tree, &path);
                        return Err(err);
                    }
                };
                let value = expansion.value;
                if node.expand(expansion) {
                    shared.expansions.fetch_add(1, Ordering::Relaxed);
                } else {
                    shared.collisions.fetch_add(1, Ordering::Relaxed);
                }
                node.add_visit();
                break value;
            };

            if expansion.edges.is_empty() {
                node.add_visit();
                break expansion.value;
            }
            let index = self.select(&node, &expansion.edges);
            let edge = &expansion.edges[index];
            edge.add_virtual_loss();
            path.push((node_id, index));

            node_id = match self.child_of(tree, &node, edge, shared) {
                Ok(child) => child,
                Err(err) => {
                    release(tree, &path);
                    return Err(err);
                }
            };
        };

        for &(parent_id, index) in path.iter().rev() {
            let parent = tree.get(parent_id);
            parent.edges()[index].backup(value[parent.to_move()]);
            parent.add_visit();
        }
        Ok(())
    }

    /// Child of `edge`, creating and linking it if needed.
    fn child_of(
        &self,
        tree: &Tree<E::State>,
        parent: &Node<E::State>,
        edge: &Edge,
        shared: &Shared,
    ) -> Result<NodeId, SearchError> {
        let existing = edge.child();
        if !existing.is_none() {
            return Ok(existing);
        }

        let state = self.engine.apply_action(parent.state(), edge.action())?;
        let key = if tree.uses_transpositions() { self.engine.state_key(&state) } else { 0 };
        let terminal = self
            .engine
            .is_terminal(&state)
            .then(|| self.engine.returns(&state));
        let to_move = self.engine.to_move(&state);
        let child = Node::new(state, to_move, parent.depth().saturating_add(1), terminal);

        let link = tree.link_child(edge, child, key);
        match link {
            Link::Created(_) => {}
            Link::Transposed(_) => {
                shared.transpositions.fetch_add(1, Ordering::Relaxed);
            }
            Link::Raced(_) => {
                shared.collisions.fetch_add(1, Ordering::Relaxed);
            }
        }
        Ok(link.node())
    }

    fn evaluate_leaf(&self, node: &Node<E::State>) -> Result<Expansion, SearchError> {
        let legal: Vec<ActionId> = self.engine.legal_actions(node.state()).iter().collect();
        let evaluation = self.evaluator.evaluate(&self.engine, node.state(), &legal)?;

        let mut priors = evaluation.priors;
        if priors.len() != legal.len() {
            return Err(SearchError::PriorCount { expected: legal.len(), got: priors.len() });
        }
        normalize_priors(&mut priors);

        let mut edges: Vec<Edge> = legal
            .into_iter()
            .zip(priors)
            .map(|(action, prior)| Edge::new(action, prior))
            .collect();
        // Stable: equal priors keep action-id order.
        edges.sort_by(|a, b| b.prior().total_cmp(&a.prior()));

        Ok(Expansion { edges, value: evaluation.value })
    }

    /// Index of the edge to follow. Ties go to the earlier (higher prior) edge.
    fn select(&self, node: &Node<E::State>, edges: &[Edge]) -> usize {
        let allowed = edges.len().min(self.config.widening_limit(node.visits()).max(1));
        let candidates = &edges[..allowed];

        let in_flight: u32 = candidates.iter().map(Edge::in_flight).sum();
        let parent_n = f64::from(node.visits() + in_flight).max(1.0);
        let sqrt_n = parent_n.sqrt();
        let vl = self.config.virtual_loss;

        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (i, edge) in candidates.iter().enumerate() {
            let visits = f64::from(edge.visits());
            let pending = f64::from(edge.in_flight());
            let n_eff = visits + pending;
            let q = if n_eff > 0.0 {
                (edge.value_sum() - pending * vl) / n_eff
            } else {
                self.config.fpu_value
            };
            let u = self.config.c_puct * f64::from(edge.prior()) * sqrt_n / (1.0 + n_eff);
            let score = q + u;
            if score > best_score {
                best = i;
                best_score = score;
            }
        }
        best
    }
}

/// Release the virtual loss of an abandoned path.
fn release<S>(tree: &Tree<S>, path: &Path) {
    for &(parent_id, index) in path.iter() {
        tree.get(parent_id).edges()[index].cancel();
    }
}

fn most_visited(visits: &[(ActionId, u32)]) -> Option<ActionId> {
    let mut best: Option<(ActionId, u32)> = None;
    for &(action, n) in visits {
        if best.map_or(true, |(_, b)| n > b) {
            best = Some((action, n));
        }
    }
    best.map(|(action, _)| action)
}

fn visit_weights(visits: &[(ActionId, u32)], temperature: f64) -> Vec<f64> {
    let exponent = 1.0 / temperature;
    visits.iter().map(|&(_, n)| f64::from(n).powf(exponent)).collect()
}

impl<E: GameEngine, V> std::fmt::Debug for PuctSearch<E, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PuctSearch")
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
