//! Game records.
//!
//! A game is fully determined by its seed and the action ids played, so a
//! `GameRecord` is just those. Replaying re-applies every id through the
//! engine, which both rebuilds the trajectory and verifies it: a record that
//! no longer replays cleanly (a rules change, a corrupted file) fails with
//! the step it broke at.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{ActionId, State};
use crate::rules::{EngineError, SatellitesEngine};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("replay failed at step {step}: {source}")]
    Engine {
        step: usize,
        #[source]
        source: EngineError,
    },

    #[error("invalid binary record: {0}")]
    Codec(#[from] bincode::Error),

    #[error("invalid JSON record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Seed plus action ids, in play order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub seed: u64,
    pub actions: Vec<u32>,
}

impl GameRecord {
    pub fn new(seed: u64) -> Self {
        Self { seed, actions: Vec::new() }
    }

    /// Append a played action.
    pub fn record(&mut self, action: ActionId) {
        self.actions.push(action.raw());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn action_ids(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.actions.iter().map(|&id| ActionId(id))
    }

    /// Every state of the game, starting with the initial one. The result
    /// has `len() + 1` entries.
    pub fn replay(&self, engine: &SatellitesEngine) -> Result<Vec<State>, ReplayError> {
        let mut states = Vec::with_capacity(self.actions.len() + 1);
        let mut state = engine.new_game(self.seed);
        for (step, action) in self.action_ids().enumerate() {
            let next = engine
                .apply_action(&state, action)
                .map_err(|source| ReplayError::Engine { step, source })?;
            states.push(state);
            state = next;
        }
        states.push(state);
        log::debug!("replayed {} actions from seed {}", self.actions.len(), self.seed);
        Ok(states)
    }

    /// The state after the last recorded action.
    pub fn final_state(&self, engine: &SatellitesEngine) -> Result<State, ReplayError> {
        let mut state = engine.new_game(self.seed);
        for (step, action) in self.action_ids().enumerate() {
            state = engine
                .apply_action(&state, action)
                .map_err(|source| ReplayError::Engine { step, source })?;
        }
        Ok(state)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ReplayError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReplayError> {
        Ok(bincode::deserialize(bytes)?)
    }

    pub fn to_json(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameConfig;

    fn engine() -> SatellitesEngine {
        SatellitesEngine::new(GameConfig::default()).unwrap()
    }

    fn play(engine: &SatellitesEngine, seed: u64, steps: usize) -> (GameRecord, State) {
        let mut record = GameRecord::new(seed);
        let mut state = engine.new_game(seed);
        for _ in 0..steps {
            if state.is_terminal() {
                break;
            }
            let actions: Vec<ActionId> = engine.legal_actions(&state).iter().collect();
            let action = actions[actions.len() / 2];
            state = engine.apply_action(&state, action).unwrap();
            record.record(action);
        }
        (record, state)
    }

    #[test]
    fn test_replay_reaches_same_state() {
        let engine = engine();
        let (record, state) = play(&engine, 17, 40);

        let states = record.replay(&engine).unwrap();
        assert_eq!(states.len(), record.len() + 1);
        assert_eq!(states[0], engine.new_game(17));
        assert_eq!(states.last(), Some(&state));
        assert_eq!(record.final_state(&engine).unwrap(), state);
    }

    #[test]
    fn test_empty_record() {
        let engine = engine();
        let record = GameRecord::new(3);
        assert!(record.is_empty());
        assert_eq!(record.replay(&engine).unwrap(), vec![engine.new_game(3)]);
    }

    #[test]
    fn test_bad_step_reported() {
        let engine = engine();
        let (mut record, _) = play(&engine, 5, 3);
        record.actions.push(u32::MAX);

        match record.replay(&engine) {
            Err(ReplayError::Engine { step, source: EngineError::InvalidActionId { .. } }) => assert_eq!(step, 3),
            other => panic!("expected engine error, got {other:?}"),
        }
    }

    #[test]
    fn test_binary_and_json() {
        let engine = engine();
        let (record, _) = play(&engine, 9, 20);

        let bytes = record.to_bytes().unwrap();
        assert_eq!(GameRecord::from_bytes(&bytes).unwrap(), record);

        let json = record.to_json().unwrap();
        assert_eq!(GameRecord::from_json(&json).unwrap(), record);

        assert!(matches!(GameRecord::from_bytes(&[1, 2]), Err(ReplayError::Codec(_))));
    }
}
