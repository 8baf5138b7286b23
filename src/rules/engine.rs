//! Game engine trait consumed by search.
//!
//! Search code never interprets game concepts directly. It sees states,
//! a fixed-size action-id space, legal masks and terminal returns, all
//! through `GameEngine`.
//!
//! ## Implementation Notes
//!
//! - `apply_action` must be deterministic and must not mutate its input
//! - `legal_actions` is empty exactly when `is_terminal` is true
//! - `returns` is only meaningful for terminal states

use crate::core::{ActionId, PlayerId, PlayerMap};

use super::error::EngineError;
use super::mask::ActionMask;

/// A deterministic two-player game as seen by search.
///
/// Engines are shared across search threads, so they must be `Send + Sync`
/// and every method takes `&self`.
pub trait GameEngine: Send + Sync {
    /// Equality backs up `state_key` when merging transpositions.
    type State: Clone + PartialEq + Send + Sync;

    /// Size of the dense action-id space.
    fn action_space_size(&self) -> usize;

    fn legal_actions(&self, state: &Self::State) -> ActionMask;

    /// Apply one action, returning the successor state.
    fn apply_action(&self, state: &Self::State, action: ActionId) -> Result<Self::State, EngineError>;

    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Per-player terminal returns in `[-1, 1]`.
    fn returns(&self, state: &Self::State) -> PlayerMap<f64>;

    /// The player whose decision it is.
    fn to_move(&self, state: &Self::State) -> PlayerId;

    /// Position hash, used for rollout seeding and transposition lookups.
    /// Equal states must hash equally.
    fn state_key(&self, state: &Self::State) -> u64;
}
