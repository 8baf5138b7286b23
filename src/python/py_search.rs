//! Search bindings for Python.

use std::time::Duration;

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::heuristics::{HeuristicEvaluator, HeuristicWeights};
use crate::mcts::{PuctConfig, PuctSearch, SearchError};
use crate::rules::SatellitesEngine;

use super::py_engine::{engine_err, PySatellites};

fn search_err(err: SearchError) -> PyErr {
    match err {
        SearchError::Engine(e) => engine_err(e),
        SearchError::InvalidConfig(msg) => PyValueError::new_err(msg),
        other => PyRuntimeError::new_err(other.to_string()),
    }
}

/// PUCT agent with the heuristic evaluator.
///
/// The search tree of the last call is kept for `visit_policy` and `stats`.
#[pyclass(name = "PuctAgent")]
pub struct PyPuctAgent {
    config: PuctConfig,
    evaluator: HeuristicEvaluator,
    search: Option<PuctSearch<SatellitesEngine, HeuristicEvaluator>>,
}

#[pymethods]
impl PyPuctAgent {
    /// # Arguments
    /// - simulations: simulations per move
    /// - c_puct: exploration constant
    /// - threads: worker threads
    /// - seed: seed for temperature sampling
    /// - temperature: 0 picks the most visited move
    /// - time_limit_ms: optional wall-clock budget per move
    /// - weights_path: JSON file of heuristic weights
    /// - use_transposition: share statistics between move orders reaching
    ///   the same position
    #[new]
    #[pyo3(signature = (
        simulations = 800,
        c_puct = 1.5,
        threads = 1,
        seed = 42,
        temperature = 0.0,
        time_limit_ms = None,
        weights_path = None,
        use_transposition = true
    ))]
    fn new(
        simulations: u32,
        c_puct: f64,
        threads: usize,
        seed: u64,
        temperature: f64,
        time_limit_ms: Option<u64>,
        weights_path: Option<String>,
        use_transposition: bool,
    ) -> PyResult<Self> {
        let mut config = PuctConfig::default()
            .with_simulations(simulations)
            .with_c_puct(c_puct)
            .with_threads(threads)
            .with_seed(seed)
            .with_temperature(temperature)
            .with_transposition(use_transposition);
        if let Some(ms) = time_limit_ms {
            config = config.with_time_limit(Duration::from_millis(ms));
        }
        config.validate().map_err(search_err)?;

        let weights = match weights_path {
            Some(path) => HeuristicWeights::load_json(path).map_err(|e| PyValueError::new_err(e.to_string()))?,
            None => HeuristicWeights::default(),
        };
        Ok(Self { config, evaluator: HeuristicEvaluator::new(weights), search: None })
    }

    /// Search from the game's current state and return the chosen action id.
    /// The game itself is not modified.
    fn search(&mut self, py: Python<'_>, game: &PySatellites) -> PyResult<u32> {
        let reuse = self
            .search
            .as_ref()
            .is_some_and(|s| s.engine().config() == game.engine.config());
        if !reuse {
            self.search = Some(PuctSearch::new(game.engine.clone(), self.evaluator.clone(), self.config.clone()));
        }
        let Some(search) = self.search.as_mut() else {
            return Err(PyRuntimeError::new_err("search not initialised"));
        };
        let state = game.state.clone();
        let action = py.allow_threads(|| search.search(&state)).map_err(search_err)?;
        Ok(action.raw())
    }

    /// Dense visit distribution of the last search.
    #[pyo3(signature = (temperature = 1.0))]
    fn visit_policy(&self, temperature: f64) -> Vec<f32> {
        self.search
            .as_ref()
            .map_or_else(Vec::new, |s| s.visit_policy(temperature))
    }

    /// `(simulations, nodes, max_depth, time_us)` of the last search.
    fn stats(&self) -> Option<(u32, usize, u16, u64)> {
        self.search.as_ref().map(|s| {
            let stats = s.stats();
            (stats.simulations, stats.nodes, stats.max_depth, stats.time_us)
        })
    }

    fn __repr__(&self) -> String {
        format!(
            "PuctAgent(simulations={}, c_puct={}, threads={})",
            self.config.simulations, self.config.c_puct, self.config.threads
        )
    }
}
