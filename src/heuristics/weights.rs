//! Named heuristic weights.
//!
//! Every weight is an `f64` field with a default. Weight files are JSON
//! objects keyed by field name: missing keys keep their defaults, unknown
//! keys are rejected.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeightsError {
    #[error("failed to access weight file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid weight file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown weight: {0}")]
    UnknownWeight(String),

    #[error("weight {name} must be finite, got {value}")]
    NonFinite { name: String, value: f64 },
}

macro_rules! heuristic_weights {
    ($( $(#[$doc:meta])* $name:ident = $default:expr ),+ $(,)?) => {
        #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
        #[serde(default, deny_unknown_fields)]
        pub struct HeuristicWeights {
            $( $(#[$doc])* pub $name: f64, )+
        }

        impl Default for HeuristicWeights {
            fn default() -> Self {
                Self { $( $name: $default, )+ }
            }
        }

        impl HeuristicWeights {
            /// All weight names, in declaration order.
            pub const NAMES: &'static [&'static str] = &[ $( stringify!($name), )+ ];

            #[must_use]
            pub fn get(&self, name: &str) -> Option<f64> {
                match name {
                    $( stringify!($name) => Some(self.$name), )+
                    _ => None,
                }
            }

            fn slot(&mut self, name: &str) -> Option<&mut f64> {
                match name {
                    $( stringify!($name) => Some(&mut self.$name), )+
                    _ => None,
                }
            }

            fn entries(&self) -> Vec<(&'static str, f64)> {
                vec![ $( (stringify!($name), self.$name), )+ ]
            }
        }
    };
}

heuristic_weights! {
    /// Per point of score lead.
    score_diff = 100.0,
    /// Within two points of the win score.
    near_win = 60.0,
    /// Per artefact an own bot stack can capture with one step.
    cap_next = 40.0,
    /// Artefact distance race while more than four artefacts remain.
    race_early = 20.0,
    race_mid = 35.0,
    /// Artefact distance race with two or fewer artefacts left.
    race_late = 50.0,
    /// Per own bot adjacent to an enemy tank.
    bot_tank_threat = 25.0,
    /// Per tank of material lead.
    tank_dominance = 20.0,
    /// Per own tank stack within two steps of an artefact.
    tanks_near_artefact = 15.0,
    /// Per charge of tempo held by the player to move.
    sat_charge = 2.0,
    sat_move_bot_bonus = 1.5,
    sat_move_tank_bonus = 1.2,
    sat_add_tank_bonus = 1.0,
    sat_add_bot_bonus = 0.7,
    add_tank_near_artefact = 1.2,
    add_tank_near_enemy_bot = 1.0,
    add_bot_dist_gain = 2.0,
    add_bot_tank_threat_penalty = 1.5,
    move_bot_capture = 10.0,
    /// Extra capture value per additional bot in the capturing stack.
    move_bot_capture_stack_scale = 0.8,
    move_bot_dist_delta = 0.5,
    move_bot_tank_threat_penalty = 2.5,
    move_bot_safe_approach = 2.0,
    move_tank_adj_enemy_bot = 1.6,
    move_tank_vs_tank_win = 1.0,
    move_tank_vs_tank_lose = 0.8,
    move_tank_near_artefact = 0.8,
    /// Per own bot stack next to an artefact and out of enemy tank reach.
    eval_safe_bot_near_artefact = 35.0,
    add_bot_stack_near_artefact = 2.2,
    /// The player to move holds a satellite with four or more charges.
    gifted_power_turn = 45.0,
    /// Per enemy bot stack an own tank stack sits next to, near an artefact.
    lane_block = 10.0,
    shoot_enemy_bot = 3.0,
    shoot_enemy_tank = 2.0,
    /// Evaluation difference that maps to `tanh(1)`.
    value_scale = 400.0,
    /// Softmax temperature turning action scores into priors.
    prior_temperature = 2.0,
}

impl HeuristicWeights {
    /// Change one weight by name.
    pub fn set(&mut self, name: &str, value: f64) -> Result<(), WeightsError> {
        if !value.is_finite() {
            return Err(WeightsError::NonFinite { name: name.to_string(), value });
        }
        let slot = self
            .slot(name)
            .ok_or_else(|| WeightsError::UnknownWeight(name.to_string()))?;
        *slot = value;
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, WeightsError> {
        let weights: Self = serde_json::from_str(json)?;
        weights.validate()?;
        Ok(weights)
    }

    pub fn to_json_string(&self) -> Result<String, WeightsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, WeightsError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| WeightsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let weights = Self::from_json_str(&text)?;
        log::debug!("loaded heuristic weights from {}", path.display());
        Ok(weights)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), WeightsError> {
        let path = path.as_ref();
        fs::write(path, self.to_json_string()?).map_err(|source| WeightsError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    fn validate(&self) -> Result<(), WeightsError> {
        match self.entries().into_iter().find(|(_, v)| !v.is_finite()) {
            Some((name, value)) => Err(WeightsError::NonFinite { name: name.to_string(), value }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let weights = HeuristicWeights::default();
        assert_eq!(weights.score_diff, 100.0);
        assert_eq!(weights.gifted_power_turn, 45.0);
        assert_eq!(weights.get("race_late"), Some(50.0));
        assert_eq!(weights.get("nope"), None);
        assert_eq!(HeuristicWeights::NAMES.len(), weights.entries().len());
    }

    #[test]
    fn test_set_by_name() {
        let mut weights = HeuristicWeights::default();
        weights.set("lane_block", 12.5).unwrap();
        assert_eq!(weights.lane_block, 12.5);

        assert!(matches!(weights.set("bogus", 1.0), Err(WeightsError::UnknownWeight(_))));
        assert!(matches!(weights.set("lane_block", f64::NAN), Err(WeightsError::NonFinite { .. })));
        assert_eq!(weights.lane_block, 12.5);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let weights = HeuristicWeights::from_json_str(r#"{"score_diff": 80.0}"#).unwrap();
        assert_eq!(weights.score_diff, 80.0);
        assert_eq!(weights.near_win, 60.0);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = HeuristicWeights::from_json_str(r#"{"score_dif": 80.0}"#).unwrap_err();
        assert!(matches!(err, WeightsError::Json(_)));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("satellites-weights-{}.json", std::process::id()));
        let mut weights = HeuristicWeights::default();
        weights.set("cap_next", 41.0).unwrap();

        weights.save_json(&path).unwrap();
        let loaded = HeuristicWeights::load_json(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, weights);
    }

    #[test]
    fn test_missing_file() {
        let err = HeuristicWeights::load_json("/nonexistent/satellites/weights.json").unwrap_err();
        assert!(matches!(err, WeightsError::Io { .. }));
    }
}
