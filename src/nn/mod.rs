//! Neural network integration.
//!
//! ## Overview
//!
//! - **Encoding**: `StateEncoder` and the 62-plane `SatellitesEncoder`
//! - **Networks**: `PolicyValueNetwork`, with `UniformPolicyZeroValue` as a
//!   stand-in
//!
//! Search reaches a network through `mcts::NetworkEvaluator`, which masks
//! the policy logits to the legal actions.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use satellites::nn::PolicyValueNetwork;
//!
//! let encoded = engine.observation_tensor(&state);
//! let (logits, value) = network.predict(&encoded);
//! ```

pub mod encoder;
pub mod traits;

pub use encoder::{SatellitesEncoder, StateEncoder, PLANES};
pub use traits::{EncodedState, PolicyValueNetwork, UniformPolicyZeroValue};
