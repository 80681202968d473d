//! Lifecycle state shared by tasks and subtasks.

use super::ParseStateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a task or subtask.
///
/// The uppercase serialized names are part of the wire contract and must not
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    /// Work has not started.
    Pending,
    /// Work is executing.
    InProgress,
    /// Work finished successfully (terminal).
    Completed,
    /// Work finished unsuccessfully (terminal).
    Failed,
    /// Work was cancelled before finishing (terminal).
    Cancelled,
}

/// Every lifecycle state, in declaration order.
pub const ALL_STATES: [State; 5] = [
    State::Pending,
    State::InProgress,
    State::Completed,
    State::Failed,
    State::Cancelled,
];

impl State {
    /// Returns the canonical wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Returns true for states with no outgoing transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Returns the states reachable from this state.
    ///
    /// Terminal states yield an empty slice. The table is immutable shared
    /// data, safe for concurrent readers.
    #[must_use]
    pub const fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::InProgress, Self::Cancelled],
            Self::InProgress => &[Self::Completed, Self::Failed],
            Self::Completed | Self::Failed | Self::Cancelled => &[],
        }
    }

    /// Returns whether the transition `self -> to` is legal.
    ///
    /// Self-loops are never legal, and terminal states allow no transitions.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        if self == to || self.is_terminal() {
            return false;
        }
        self.allowed_transitions().contains(&to)
    }
}

impl TryFrom<&str> for State {
    type Error = ParseStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "PENDING" => Ok(Self::Pending),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(ParseStateError(value.to_owned())),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
