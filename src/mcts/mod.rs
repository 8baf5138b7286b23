//! PUCT Monte Carlo Tree Search.
//!
//! ## Overview
//!
//! - **Generic**: searches any `GameEngine`; the Satellites rules are never
//!   consulted directly
//! - **Pluggable evaluation**: priors and values come from an `Evaluator`
//!   (heuristic, network, uniform or debug rollout)
//! - **Parallel**: one shared arena tree with atomic edge statistics and
//!   virtual loss, searched by scoped worker threads
//! - **Transpositions**: move orders reaching the same position share one
//!   node, keyed by `GameEngine::state_key`
//! - **Progressive widening**: only the highest-prior edges are selectable
//!   until a node has enough visits
//!
//! ## Usage
//!
//! ```rust
//! use satellites::core::GameConfig;
//! use satellites::mcts::{PuctConfig, PuctSearch, UniformEvaluator};
//! use satellites::rules::SatellitesEngine;
//!
//! let engine = SatellitesEngine::new(GameConfig::default()).unwrap();
//! let state = engine.new_game(7);
//!
//! let config = PuctConfig::default().with_simulations(64);
//! let mut search = PuctSearch::new(engine.clone(), UniformEvaluator, config);
//! let action = search.search(&state).unwrap();
//! assert!(engine.legal_actions(&state).contains(action));
//! ```

pub mod config;
pub mod evaluator;
pub mod node;
pub mod search;
pub mod stats;
pub mod tree;

pub use config::PuctConfig;
pub use evaluator::{masked_softmax, Evaluation, Evaluator, NetworkEvaluator, RolloutEvaluator, UniformEvaluator};
pub use node::{Edge, Expansion, Node, NodeId};
pub use search::{PuctSearch, SearchError};
pub use stats::SearchStats;
pub use tree::{Link, Tree};
