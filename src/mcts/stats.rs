//! Search statistics for diagnostics and tuning.

use serde::{Deserialize, Serialize};

/// Statistics of the most recent search.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Completed simulations (selection through backup).
    pub simulations: u32,

    /// Nodes evaluated and given edges.
    pub expansions: u32,

    /// Lost races: a node expanded or a child linked by another worker first.
    pub collisions: u32,

    /// Edges linked to a node already reached by another move order.
    pub transpositions: u32,

    /// Deepest node reached, root = 0.
    pub max_depth: u16,

    /// Nodes in the tree when the search stopped.
    pub nodes: usize,

    pub time_us: u64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn simulations_per_second(&self) -> f64 {
        if self.time_us == 0 {
            0.0
        } else {
            f64::from(self.simulations) / (self.time_us as f64 / 1_000_000.0)
        }
    }

    /// Fraction of simulations that lost an expansion or link race.
    #[must_use]
    pub fn collision_rate(&self) -> f64 {
        if self.simulations == 0 {
            0.0
        } else {
            f64::from(self.collisions) / f64::from(self.simulations)
        }
    }
}

impl std::fmt::Display for SearchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} sims ({:.0}/s), {} nodes, depth {}, {} collisions, {} transpositions",
            self.simulations,
            self.simulations_per_second(),
            self.nodes,
            self.max_depth,
            self.collisions,
            self.transpositions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates() {
        let mut stats = SearchStats::new();
        assert_eq!(stats.simulations_per_second(), 0.0);
        assert_eq!(stats.collision_rate(), 0.0);

        stats.simulations = 1000;
        stats.collisions = 50;
        stats.time_us = 1_000_000;
        assert_eq!(stats.simulations_per_second(), 1000.0);
        assert_eq!(stats.collision_rate(), 0.05);
    }

    #[test]
    fn test_reset() {
        let mut stats = SearchStats { simulations: 5, nodes: 9, ..SearchStats::default() };
        stats.reset();
        assert_eq!(stats, SearchStats::default());
    }

    #[test]
    fn test_serialization() {
        let stats = SearchStats { simulations: 42, ..SearchStats::default() };
        let json = serde_json::to_string(&stats).unwrap();
        let restored: SearchStats = serde_json::from_str(&json).unwrap();
        assert_eq!(stats, restored);
    }
}
