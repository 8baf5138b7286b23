//! Python bindings for the Satellites engine and search.
//!
//! # Quick Start
//!
//! ```python
//! import satellites
//!
//! game = satellites.Satellites(seed=7)
//! agent = satellites.PuctAgent(simulations=400)
//!
//! while not game.is_terminal():
//!     game.apply_action(agent.search(game))
//!
//! print(game.returns(), game.history)
//! ```

use pyo3::prelude::*;

mod py_engine;
mod py_search;

pub use py_engine::PySatellites;
pub use py_search::PyPuctAgent;

/// satellites: rules engine and PUCT search for the Satellites board game.
#[pymodule]
fn satellites(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySatellites>()?;
    m.add_class::<PyPuctAgent>()?;
    Ok(())
}
