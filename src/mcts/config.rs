//! PUCT search configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::search::SearchError;

/// PUCT search configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuctConfig {
    /// Exploration constant in `Q + c·P·sqrt(N) / (1 + n)`.
    pub c_puct: f64,

    /// Simulation budget, shared by all worker threads.
    pub simulations: u32,

    /// Optional wall-clock budget; checked between simulations.
    pub time_limit_ms: Option<u64>,

    /// Worker threads over the shared tree (1 = deterministic).
    pub threads: usize,

    /// Edges open at an unvisited node.
    pub widening_base: usize,

    /// Extra edges opened per `widening_every` visits.
    pub widening_step: usize,

    pub widening_every: u32,

    /// Pessimistic loss applied per in-flight visit.
    pub virtual_loss: f64,

    /// Q used for unvisited edges.
    pub fpu_value: f64,

    /// Root move choice: 0 picks the most visited edge, higher values sample
    /// proportionally to `visits^(1/T)`.
    pub temperature: f64,

    /// Seed for temperature sampling.
    pub seed: u64,

    /// Hard cap on tree size. Simulations stop once it is reached.
    pub max_nodes: usize,

    /// Merge equal positions reached by different move orders into one node.
    pub use_transposition: bool,
}

impl Default for PuctConfig {
    fn default() -> Self {
        Self {
            c_puct: 1.5,
            simulations: 800,
            time_limit_ms: None,
            threads: 1,
            widening_base: 8,
            widening_step: 5,
            widening_every: 25,
            virtual_loss: 1.0,
            fpu_value: 0.0,
            temperature: 0.0,
            seed: 42,
            max_nodes: 1_000_000,
            use_transposition: true,
        }
    }
}

impl PuctConfig {
    #[must_use]
    pub fn with_c_puct(mut self, c: f64) -> Self {
        self.c_puct = c;
        self
    }

    #[must_use]
    pub fn with_simulations(mut self, simulations: u32) -> Self {
        self.simulations = simulations;
        self
    }

    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_ms = Some(limit.as_millis() as u64);
        self
    }

    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    #[must_use]
    pub fn with_widening(mut self, base: usize, step: usize, every: u32) -> Self {
        self.widening_base = base;
        self.widening_step = step;
        self.widening_every = every;
        self
    }

    #[must_use]
    pub fn with_virtual_loss(mut self, virtual_loss: f64) -> Self {
        self.virtual_loss = virtual_loss;
        self
    }

    #[must_use]
    pub fn with_fpu_value(mut self, fpu: f64) -> Self {
        self.fpu_value = fpu;
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = temp;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    #[must_use]
    pub fn with_transposition(mut self, enabled: bool) -> Self {
        self.use_transposition = enabled;
        self
    }

    #[must_use]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }

    /// Number of edges selectable at a node with `visits` visits.
    #[must_use]
    pub fn widening_limit(&self, visits: u32) -> usize {
        let steps = (visits / self.widening_every.max(1)) as usize;
        self.widening_base.saturating_add(steps.saturating_mul(self.widening_step))
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        let invalid = |reason: &str| Err(SearchError::InvalidConfig(reason.to_string()));
        if !(self.c_puct.is_finite() && self.c_puct >= 0.0) {
            return invalid("c_puct must be finite and non-negative");
        }
        if self.simulations == 0 && self.time_limit_ms.is_none() {
            return invalid("either simulations or a time limit must be set");
        }
        if self.threads == 0 {
            return invalid("threads must be at least 1");
        }
        if self.widening_base == 0 || self.widening_every == 0 {
            return invalid("widening_base and widening_every must be positive");
        }
        if !(self.virtual_loss.is_finite() && self.virtual_loss >= 0.0) {
            return invalid("virtual_loss must be finite and non-negative");
        }
        if !(self.temperature.is_finite() && self.temperature >= 0.0) {
            return invalid("temperature must be finite and non-negative");
        }
        if self.max_nodes < 2 {
            return invalid("max_nodes must allow at least one expansion");
        }
        Ok(())
    }
}
