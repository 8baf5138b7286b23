//! Engine error taxonomy.
//!
//! All variants are fatal to the call that raised them: the input state is
//! never modified, and the engine never corrects an action on the caller's
//! behalf.

use thiserror::Error;

use crate::core::{Action, ActionId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Decode of an id outside the action space. A caller or protocol bug.
    #[error("action id {id} is outside the action space of size {size}")]
    InvalidActionId { id: ActionId, size: u32 },

    /// The id decodes but is not in the current legal mask.
    #[error("action {action} ({id}) is not legal in the current state")]
    IllegalAction { id: ActionId, action: Action },

    /// `apply_action` on a terminal state.
    #[error("the game is already over")]
    GameAlreadyOver,

    /// Encode of an action that has no id on this board.
    #[error("action {action} cannot be encoded on this board")]
    Unencodable { action: Action },
}
