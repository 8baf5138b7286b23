//! Hand-tuned evaluation for Satellites positions.
//!
//! `HeuristicWeights` holds every tunable number by name and round-trips
//! through JSON. `HeuristicEvaluator` turns the weights into search priors
//! and values, and is the default evaluator for `PuctSearch` on the real
//! game.

mod evaluator;
mod features;
mod weights;

pub use evaluator::HeuristicEvaluator;
pub use features::{BoardView, PositionFeatures, NO_BOTS};
pub use weights::{HeuristicWeights, WeightsError};
