//! Leaf evaluators.
//!
//! An `Evaluator` turns a non-terminal state and its legal actions into one
//! prior per legal action plus a per-player value. Priors are aligned with
//! the `legal` slice the evaluator was given, so an evaluator can reorder
//! preferences but never add actions.
//!
//! - `UniformEvaluator`: flat priors, zero value
//! - `RolloutEvaluator`: random playout, for debugging only
//! - `NetworkEvaluator`: masked softmax of a `PolicyValueNetwork`'s logits
//! - `heuristics::HeuristicEvaluator`: the production evaluator

use crate::core::{ActionId, GameRng, PlayerId, PlayerMap, State};
use crate::nn::PolicyValueNetwork;
use crate::rules::{EngineError, GameEngine, SatellitesEngine};

/// Priors over the legal actions and a value per player.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub priors: Vec<f32>,
    pub value: PlayerMap<f64>,
}

impl Evaluation {
    /// Flat priors over `n` actions.
    #[must_use]
    pub fn uniform(n: usize, value: PlayerMap<f64>) -> Self {
        let prior = if n == 0 { 0.0 } else { 1.0 / n as f32 };
        Self { priors: vec![prior; n], value }
    }
}

pub trait Evaluator<E: GameEngine>: Send + Sync {
    fn evaluate(&self, engine: &E, state: &E::State, legal: &[ActionId]) -> Result<Evaluation, EngineError>;
}

/// Flat priors and a zero value.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformEvaluator;

impl<E: GameEngine> Evaluator<E> for UniformEvaluator {
    fn evaluate(&self, _engine: &E, _state: &E::State, legal: &[ActionId]) -> Result<Evaluation, EngineError> {
        Ok(Evaluation::uniform(legal.len(), PlayerMap::with_value(0.0)))
    }
}

/// Uniform priors and the result of one random playout.
///
/// The playout RNG is seeded from the state key, so a given position always
/// gets the same value. Playouts that hit `max_steps` score zero.
#[derive(Clone, Copy, Debug)]
pub struct RolloutEvaluator {
    pub max_steps: u32,
}

impl Default for RolloutEvaluator {
    fn default() -> Self {
        Self { max_steps: 2_000 }
    }
}

impl<E: GameEngine> Evaluator<E> for RolloutEvaluator {
    fn evaluate(&self, engine: &E, state: &E::State, legal: &[ActionId]) -> Result<Evaluation, EngineError> {
        let mut rng = GameRng::new(engine.state_key(state)).for_context("rollout");
        let mut current = state.clone();

        for _ in 0..self.max_steps {
            if engine.is_terminal(&current) {
                break;
            }
            let actions: Vec<ActionId> = engine.legal_actions(&current).iter().collect();
            let Some(&action) = rng.choose(&actions) else {
                break;
            };
            current = engine.apply_action(&current, action)?;
        }

        let value = if engine.is_terminal(&current) {
            engine.returns(&current)
        } else {
            PlayerMap::with_value(0.0)
        };
        Ok(Evaluation::uniform(legal.len(), value))
    }
}

/// Policy and value from a learned network over the observation tensor.
#[derive(Clone, Debug)]
pub struct NetworkEvaluator<N> {
    network: N,
}

impl<N: PolicyValueNetwork> NetworkEvaluator<N> {
    pub fn new(network: N) -> Self {
        Self { network }
    }

    #[must_use]
    pub fn network(&self) -> &N {
        &self.network
    }
}

impl<N: PolicyValueNetwork> Evaluator<SatellitesEngine> for NetworkEvaluator<N> {
    fn evaluate(&self, engine: &SatellitesEngine, state: &State, legal: &[ActionId]) -> Result<Evaluation, EngineError> {
        let (logits, values) = self.network.predict(&engine.observation_tensor(state));
        let value = PlayerMap::new(|p: PlayerId| {
            values
                .get(p.index())
                .map_or(0.0, |v| f64::from(*v).clamp(-1.0, 1.0))
        });
        Ok(Evaluation { priors: masked_softmax(&logits, legal), value })
    }
}

/// Softmax of `logits` restricted to `legal`, aligned with `legal`.
///
/// Missing or non-finite logits count as zero. Falls back to uniform if the
/// result would not be a distribution.
#[must_use]
pub fn masked_softmax(logits: &[f32], legal: &[ActionId]) -> Vec<f32> {
    let picked: Vec<f32> = legal
        .iter()
        .map(|a| logits.get(a.index()).copied().filter(|l| l.is_finite()).unwrap_or(0.0))
        .collect();
    let max = picked.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = picked.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();

    if sum.is_finite() && sum > 0.0 {
        exps.into_iter().map(|e| e / sum).collect()
    } else {
        Evaluation::uniform(legal.len(), PlayerMap::with_value(0.0)).priors
    }
}

/// Clean up evaluator priors: non-finite or negative entries become zero,
/// the rest are normalised. Uniform if nothing is left.
pub(crate) fn normalize_priors(priors: &mut [f32]) {
    for p in priors.iter_mut() {
        if !p.is_finite() || *p < 0.0 {
            *p = 0.0;
        }
    }
    let sum: f32 = priors.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        priors.iter_mut().for_each(|p| *p /= sum);
    } else if !priors.is_empty() {
        let flat = 1.0 / priors.len() as f32;
        priors.iter_mut().for_each(|p| *p = flat);
    }
}
