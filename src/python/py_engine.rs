//! Engine bindings for Python.

use numpy::{PyArray1, PyArrayDyn, PyArrayMethods};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::core::{ActionId, GameConfig, PlayerId, RulesConfig, State};
use crate::replay::GameRecord;
use crate::rules::{EngineError, SatellitesEngine};

pub(crate) fn engine_err(err: EngineError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// A Satellites game: the engine plus one evolving state.
///
/// Every applied action is recorded, so `history` together with `seed`
/// reproduces the game.
#[pyclass(name = "Satellites")]
#[derive(Clone)]
pub struct PySatellites {
    pub(crate) engine: SatellitesEngine,
    pub(crate) state: State,
    record: GameRecord,
}

#[pymethods]
impl PySatellites {
    /// Start a new game on the standard board.
    ///
    /// # Arguments
    /// - seed: ring order seed
    /// - win_score, max_turns, unit_cap: rule overrides
    #[new]
    #[pyo3(signature = (seed = 42, win_score = None, max_turns = None, unit_cap = None))]
    fn new(seed: u64, win_score: Option<u16>, max_turns: Option<u32>, unit_cap: Option<u8>) -> PyResult<Self> {
        let mut rules = RulesConfig::default();
        if let Some(score) = win_score {
            rules = rules.with_win_score(score);
        }
        if let Some(turns) = max_turns {
            rules = rules.with_max_turns(turns);
        }
        if let Some(cap) = unit_cap {
            rules = rules.with_unit_cap(cap);
        }
        let engine = SatellitesEngine::new(GameConfig::default().with_rules(rules))
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        let state = engine.new_game(seed);
        Ok(Self { engine, state, record: GameRecord::new(seed) })
    }

    /// Independent copy of the game.
    #[pyo3(name = "clone")]
    fn py_clone(&self) -> Self {
        self.clone()
    }

    fn __copy__(&self) -> Self {
        self.clone()
    }

    /// Boolean mask over the whole action space.
    fn legal_actions<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<bool>> {
        PyArray1::from_vec_bound(py, self.engine.legal_actions(&self.state).to_bools())
    }

    /// Legal action ids, ascending.
    fn legal_action_ids(&self) -> Vec<u32> {
        self.engine.legal_actions(&self.state).iter().map(ActionId::raw).collect()
    }

    /// Apply an action id. Raises ValueError for unknown or illegal ids and
    /// leaves the game unchanged.
    fn apply_action(&mut self, action: u32) -> PyResult<()> {
        let id = ActionId(action);
        self.state = self.engine.apply_action(&self.state, id).map_err(engine_err)?;
        self.record.record(id);
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.engine.is_terminal(&self.state)
    }

    /// `[p1, p2]` returns: +1 win, -1 loss, 0 draw or unfinished.
    fn returns(&self) -> Vec<f64> {
        self.engine.returns(&self.state).as_array().to_vec()
    }

    /// Observation planes shaped `(planes, rows, cols)`.
    fn observation_tensor<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArrayDyn<f32>>> {
        let encoded = self.engine.observation_tensor(&self.state);
        PyArray1::from_vec_bound(py, encoded.tensor).reshape(encoded.shape)
    }

    /// Index (0 or 1) of the player to act.
    fn current_player(&self) -> u8 {
        self.state.active_player().0
    }

    /// Human-readable form of an action id.
    fn describe_action(&self, action: u32) -> PyResult<String> {
        self.engine
            .codec()
            .decode(ActionId(action))
            .map(|a| a.to_string())
            .map_err(engine_err)
    }

    #[getter]
    fn action_space_size(&self) -> usize {
        self.engine.action_space_size()
    }

    #[getter]
    fn seed(&self) -> u64 {
        self.state.seed()
    }

    #[getter]
    fn turn_number(&self) -> u32 {
        self.state.turn_number()
    }

    #[getter]
    fn scores(&self) -> Vec<u16> {
        PlayerId::both().map(|p| self.state.score(p)).collect()
    }

    /// Action ids applied so far.
    #[getter]
    fn history(&self) -> Vec<u32> {
        self.record.actions.clone()
    }

    /// The game record in bincode form.
    fn record_bytes(&self) -> PyResult<Vec<u8>> {
        self.record
            .to_bytes()
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn __repr__(&self) -> String {
        let status = if self.is_terminal() { "terminal" } else { "ongoing" };
        format!(
            "Satellites(turn={}, to_move=P{}, scores={:?}, status={})",
            self.state.turn_number(),
            self.state.active_player().0 + 1,
            self.scores(),
            status
        )
    }
}
