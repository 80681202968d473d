//! Validated name scalar shared by tasks and subtasks.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum byte length accepted for names and actor identifiers.
pub const MAX_NAME_LENGTH: usize = 256;

/// Validated task or subtask name.
///
/// Names are non-empty, at most [`MAX_NAME_LENGTH`] bytes, and limited to
/// ASCII alphanumerics, spaces, underscores, and hyphens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskName(String);

impl TaskName {
    /// Creates a validated name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidName`] when the value is empty,
    /// exceeds [`MAX_NAME_LENGTH`] bytes, or contains a character outside
    /// the allowed set.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        if raw.is_empty() {
            return Err(TaskDomainError::InvalidName(
                "name cannot be empty".to_owned(),
            ));
        }
        if raw.len() > MAX_NAME_LENGTH {
            return Err(TaskDomainError::InvalidName(format!(
                "name exceeds {MAX_NAME_LENGTH} characters"
            )));
        }
        if !raw.chars().all(is_allowed_name_char) {
            return Err(TaskDomainError::InvalidName(
                "name contains invalid characters".to_owned(),
            ));
        }
        Ok(Self(raw))
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const fn is_allowed_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, ' ' | '_' | '-')
}

/// Validates an actor identifier (`created_by` / `updated_by` / `deleted_by`).
///
/// Actors are free-form but must be non-empty and within
/// [`MAX_NAME_LENGTH`] bytes.
///
/// # Errors
///
/// Returns [`TaskDomainError::MissingRequiredField`] naming `field` when the
/// value is empty or over the length limit.
pub fn validated_actor(
    value: impl Into<String>,
    field: &'static str,
) -> Result<String, TaskDomainError> {
    let raw = value.into();
    if raw.is_empty() || raw.len() > MAX_NAME_LENGTH {
        return Err(TaskDomainError::MissingRequiredField(field));
    }
    Ok(raw)
}
