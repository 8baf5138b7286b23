//! The Satellites rules engine.
//!
//! `SatellitesEngine` is immutable after construction and cheap to clone
//! (shared configuration and layout). All game data lives in `State`; the
//! engine's methods are pure functions over it.
//!
//! The methods are split by concern:
//!
//! - this file: construction and pure queries
//! - `legal.rs`: legality and masking
//! - `resolver.rs`: `apply_action` and the turn flow

use std::sync::Arc;

use crate::core::{
    Action, ActionId, BoardLayout, ConfigError, GameConfig, GameOutcome, PlayerId, PlayerMap,
    SatelliteRing, State,
};
use crate::nn::{EncodedState, SatellitesEncoder, StateEncoder};

use super::codec::ActionCodec;
use super::engine::GameEngine;
use super::error::EngineError;
use super::mask::ActionMask;

#[derive(Clone, Debug)]
pub struct SatellitesEngine {
    config: Arc<GameConfig>,
    layout: Arc<BoardLayout>,
    codec: ActionCodec,
    encoder: SatellitesEncoder,
}

impl SatellitesEngine {
    /// Validate a configuration and build the engine for it.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.rules.validate()?;
        let layout = Arc::new(BoardLayout::from_config(&config.board)?);
        config.board.validate(&layout, &config.rules)?;

        let max_commit = SatelliteRing::CANONICAL.iter().map(|k| k.initial_charge()).sum();
        let codec = ActionCodec::new(layout.cell_count(), config.rules.unit_cap, max_commit);
        let encoder = SatellitesEncoder::new(Arc::clone(&layout), &config.rules, codec.size());

        Ok(Self {
            config: Arc::new(config),
            layout,
            codec,
            encoder,
        })
    }

    /// Opening position for a seed. The seed fixes the ring order.
    #[must_use]
    pub fn new_game(&self, seed: u64) -> State {
        let state = State::new(seed, &self.layout, &self.config.board);
        log::debug!("new game: seed={seed} ring={:?}", state.ring().kinds());
        state
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    #[must_use]
    pub fn codec(&self) -> &ActionCodec {
        &self.codec
    }

    #[must_use]
    pub fn encoder(&self) -> &SatellitesEncoder {
        &self.encoder
    }

    #[must_use]
    pub fn action_space_size(&self) -> usize {
        self.codec.size()
    }

    /// Encode and apply a structured action.
    pub fn apply(&self, state: &State, action: &Action) -> Result<State, EngineError> {
        let id = self.codec.encode(action)?;
        self.apply_action(state, id)
    }

    #[must_use]
    pub fn is_terminal(&self, state: &State) -> bool {
        state.is_terminal()
    }

    #[must_use]
    pub fn result(&self, state: &State) -> Option<GameOutcome> {
        state.outcome().copied()
    }

    /// `+1` winner, `-1` loser, `0` each on a draw; zeros while the game is
    /// still running.
    #[must_use]
    pub fn returns(&self, state: &State) -> PlayerMap<f64> {
        state
            .outcome()
            .map_or_else(|| PlayerMap::with_value(0.0), |o| o.result.returns())
    }

    /// Fixed-shape observation planes; see `SatellitesEncoder`.
    #[must_use]
    pub fn observation_tensor(&self, state: &State) -> EncodedState {
        self.encoder.encode(state)
    }
}

impl GameEngine for SatellitesEngine {
    type State = State;

    fn action_space_size(&self) -> usize {
        self.codec.size()
    }

    fn legal_actions(&self, state: &State) -> ActionMask {
        SatellitesEngine::legal_actions(self, state)
    }

    fn apply_action(&self, state: &State, action: ActionId) -> Result<State, EngineError> {
        SatellitesEngine::apply_action(self, state, action)
    }

    fn is_terminal(&self, state: &State) -> bool {
        state.is_terminal()
    }

    fn returns(&self, state: &State) -> PlayerMap<f64> {
        SatellitesEngine::returns(self, state)
    }

    fn to_move(&self, state: &State) -> PlayerId {
        state.active_player()
    }

    fn state_key(&self, state: &State) -> u64 {
        state.state_key()
    }
}
