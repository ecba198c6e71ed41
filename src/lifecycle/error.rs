// Lifecycle command errors. Returned to callers; nothing in this layer panics.

use thiserror::Error;

use crate::models::{EntityAction, EntityStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// No entity with this id is registered.
    #[error("entity '{id}' not found")]
    EntityNotFound { id: String },

    /// The action is not in the transition table for the entity's effective status
    /// (the target of an in-flight command, else its current status).
    #[error("cannot {action} entity '{id}' while it is {status}")]
    InvalidTransition {
        id: String,
        status: EntityStatus,
        action: EntityAction,
    },

    /// The simulator was disposed; no further commands are accepted.
    #[error("lifecycle simulator has been disposed")]
    Disposed,
}

/// Result type for lifecycle commands.
pub type CommandResult<T> = Result<T, CommandError>;
