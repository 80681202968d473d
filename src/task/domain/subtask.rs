//! Subtask entity owned by a task aggregate.

use super::{State, SubtaskId, TaskName};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Child unit of work inside a task.
///
/// A subtask belongs to exactly one task; storage resolves parentage by
/// foreign key while the in-memory aggregate owns its subtasks directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    id: SubtaskId,
    name: TaskName,
    state: State,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted subtask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSubtaskData {
    /// Persisted subtask identifier.
    pub id: SubtaskId,
    /// Persisted name.
    pub name: TaskName,
    /// Persisted lifecycle state.
    pub state: State,
    /// Persisted start timestamp, if any.
    pub start_date: Option<DateTime<Utc>>,
    /// Persisted end timestamp, if any.
    pub end_date: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted soft-deletion timestamp, if any.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Subtask {
    /// Creates a new pending subtask.
    #[must_use]
    pub fn new(name: TaskName, clock: &(impl Clock + ?Sized)) -> Self {
        let timestamp = clock.utc();
        Self {
            id: SubtaskId::new(),
            name,
            state: State::Pending,
            start_date: None,
            end_date: None,
            created_at: timestamp,
            updated_at: timestamp,
            deleted_at: None,
        }
    }

    /// Reconstructs a subtask from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedSubtaskData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            state: data.state,
            start_date: data.start_date,
            end_date: data.end_date,
            created_at: data.created_at,
            updated_at: data.updated_at,
            deleted_at: data.deleted_at,
        }
    }

    /// Returns the subtask identifier.
    #[must_use]
    pub const fn id(&self) -> SubtaskId {
        self.id
    }

    /// Returns the subtask name.
    #[must_use]
    pub const fn name(&self) -> &TaskName {
        &self.name
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// Returns the start timestamp, if set.
    #[must_use]
    pub const fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    /// Returns the end timestamp, if set.
    #[must_use]
    pub const fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the soft-deletion timestamp, if set.
    #[must_use]
    pub const fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Returns true when the subtask is soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Sets the start timestamp if it is currently unset.
    pub fn set_start_date(&mut self, clock: &(impl Clock + ?Sized)) {
        if self.start_date.is_none() {
            self.start_date = Some(clock.utc());
        }
    }

    /// Sets the end timestamp if it is currently unset.
    pub fn set_end_date(&mut self, clock: &(impl Clock + ?Sized)) {
        if self.end_date.is_none() {
            self.end_date = Some(clock.utc());
        }
    }

    /// Soft-deletes the subtask; a no-op when already deleted.
    pub fn delete(&mut self, clock: &(impl Clock + ?Sized)) {
        if self.deleted_at.is_none() {
            let timestamp = clock.utc();
            self.deleted_at = Some(timestamp);
            self.updated_at = timestamp;
        }
    }

    /// Replaces the subtask name.
    pub fn rename(&mut self, name: TaskName, clock: &(impl Clock + ?Sized)) {
        self.name = name;
        self.touch(clock);
    }

    /// Applies a state change that the caller has already validated through
    /// the state machine.
    ///
    /// Stamps the start date on entering [`State::InProgress`] and the end
    /// date on entering any terminal state.
    pub fn apply_state(&mut self, new_state: State, clock: &(impl Clock + ?Sized)) {
        if new_state == State::InProgress {
            self.set_start_date(clock);
        }
        if new_state.is_terminal() {
            self.set_end_date(clock);
        }
        self.state = new_state;
        self.touch(clock);
    }

    /// Forces the parent's terminal state onto this subtask during
    /// propagation. The end date is stamped if still unset; the start date
    /// is left alone.
    pub(crate) fn inherit_terminal_state(&mut self, state: State, clock: &(impl Clock + ?Sized)) {
        self.state = state;
        self.set_end_date(clock);
        self.touch(clock);
    }

    fn touch(&mut self, clock: &(impl Clock + ?Sized)) {
        self.updated_at = clock.utc();
    }
}
