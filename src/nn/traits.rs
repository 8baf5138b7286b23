//! Tensor container and network traits.
//!
//! These define the seam between the engine and a learned model, which
//! typically lives in Python and is reached through PyO3.

use serde::{Deserialize, Serialize};

/// Observation tensor, flattened in row-major order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncodedState {
    pub tensor: Vec<f32>,

    /// e.g. `[planes, rows, width]`.
    pub shape: Vec<usize>,
}

impl EncodedState {
    pub fn new(tensor: Vec<f32>, shape: Vec<usize>) -> Self {
        debug_assert_eq!(
            tensor.len(),
            shape.iter().product::<usize>(),
            "tensor length must match shape product"
        );
        Self { tensor, shape }
    }

    pub fn zeros(shape: Vec<usize>) -> Self {
        let size = shape.iter().product();
        Self {
            tensor: vec![0.0; size],
            shape,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tensor.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tensor.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<f32> {
        self.tensor.get(index).copied()
    }

    /// Element at a multi-dimensional index; `None` if the rank or any
    /// coordinate is out of range.
    #[must_use]
    pub fn at(&self, index: &[usize]) -> Option<f32> {
        self.flat_index(index).and_then(|i| self.get(i))
    }

    /// Ignores out-of-range indices.
    pub fn set(&mut self, index: usize, value: f32) {
        if let Some(slot) = self.tensor.get_mut(index) {
            *slot = value;
        }
    }

    fn flat_index(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.len() {
            return None;
        }
        index
            .iter()
            .zip(&self.shape)
            .try_fold(0usize, |acc, (&i, &dim)| (i < dim).then_some(acc * dim + i))
    }
}

/// Combined policy and value prediction.
///
/// `predict` returns `(logits, values)`: one logit per action id of the
/// engine's action space and one value per player. Illegal ids are masked
/// by the caller, so networks need not know the rules.
pub trait PolicyValueNetwork: Send + Sync {
    fn predict(&self, encoded: &EncodedState) -> (Vec<f32>, Vec<f32>);

    fn predict_batch(&self, encoded: &[EncodedState]) -> Vec<(Vec<f32>, Vec<f32>)> {
        encoded.iter().map(|e| self.predict(e)).collect()
    }
}

/// Flat logits and zero value. A stand-in until a trained model is wired in.
#[derive(Clone, Debug, Default)]
pub struct UniformPolicyZeroValue {
    action_space_size: usize,
    player_count: usize,
}

impl UniformPolicyZeroValue {
    pub fn new(action_space_size: usize, player_count: usize) -> Self {
        Self {
            action_space_size,
            player_count,
        }
    }
}

impl PolicyValueNetwork for UniformPolicyZeroValue {
    fn predict(&self, _encoded: &EncodedState) -> (Vec<f32>, Vec<f32>) {
        (vec![0.0; self.action_space_size], vec![0.0; self.player_count])
    }
}
