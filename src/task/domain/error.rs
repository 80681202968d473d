//! Error types for task domain validation and parsing.

use super::State;
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The name fails the character or length rule.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// A required field is absent, empty, or over the permitted length.
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// The requested state is not reachable from the current state.
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        /// State the entity is currently in.
        from: State,
        /// State the caller asked for.
        to: State,
    },

    /// A subtask transition violates the parent/child lifecycle ordering.
    #[error("subtask state {requested} inconsistent with parent task state {parent}")]
    InconsistentParentChildState {
        /// Current state of the parent task.
        parent: State,
        /// State requested for the subtask.
        requested: State,
    },
}

/// Error returned while parsing lifecycle states from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown lifecycle state: {0}")]
pub struct ParseStateError(pub String);
