//! Satellites rules: action encoding, legality, resolution.
//!
//! `SatellitesEngine` is the concrete engine; `GameEngine` is the narrow
//! interface search depends on.

pub mod codec;
pub mod engine;
pub mod error;
pub mod legal;
pub mod mask;
pub mod resolver;
pub mod satellites;

pub use codec::ActionCodec;
pub use engine::GameEngine;
pub use error::EngineError;
pub use mask::ActionMask;
pub use satellites::SatellitesEngine;
