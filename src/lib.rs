//! # satellites
//!
//! A deterministic rules engine for the Satellites hex-board game, with a
//! parallel PUCT search built for self-play and tuning.
//!
//! ## Design Principles
//!
//! 1. **Pure engine**: `SatellitesEngine` never mutates its input. Every
//!    `apply_action` returns a fresh `State`, and a seed plus the action ids
//!    played reproduce a game exactly.
//!
//! 2. **Fixed action space**: every action has a stable id in a 2009-wide
//!    space, so legal masks and network policies line up.
//!
//! 3. **Configuration over convention**: the board, rule variants and
//!    search parameters are serde structs with defaults.
//!
//! ## Architecture
//!
//! - **Persistent board**: cells live in an `im::Vector`, so cloning a state
//!   for search is O(1).
//!
//! - **Shared-tree search**: worker threads share one arena tree with atomic
//!   statistics and virtual loss.
//!
//! ## Modules
//!
//! - `core`: players, RNG, hex geometry, satellites, units, configuration, state
//! - `rules`: action codec, legality, resolution, the `GameEngine` contract
//! - `nn`: observation encoding and the policy/value network seam
//! - `heuristics`: named evaluation weights and the heuristic evaluator
//! - `mcts`: PUCT search
//! - `replay`: seed-plus-actions game records
//! - `python`: PyO3 bindings (feature `python`)

pub mod core;
pub mod heuristics;
pub mod mcts;
pub mod nn;
pub mod replay;
pub mod rules;

#[cfg(feature = "python")]
pub mod python;

pub use crate::core::{
    Action, ActionId, BoardConfig, CellId, Direction, GameConfig, GameOutcome, GameResult, GameRng,
    HexCoord, PlayerId, PlayerMap, RulesConfig, State,
};

pub use crate::rules::{ActionMask, EngineError, GameEngine, SatellitesEngine};

pub use crate::heuristics::{HeuristicEvaluator, HeuristicWeights};

pub use crate::mcts::{PuctConfig, PuctSearch, SearchError, SearchStats};

pub use crate::replay::{GameRecord, ReplayError};
