//! Task aggregate root.

use super::{State, Subtask, SubtaskId, TaskDomainError, TaskId, TaskName, name::validated_actor};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Automation task aggregate owning its subtasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    name: TaskName,
    state: State,
    subtasks: Vec<Subtask>,
    created_by: String,
    updated_by: String,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted name.
    pub name: TaskName,
    /// Persisted lifecycle state.
    pub state: State,
    /// Persisted subtasks, including soft-deleted ones.
    pub subtasks: Vec<Subtask>,
    /// Actor who created the task.
    pub created_by: String,
    /// Actor who last updated the task.
    pub updated_by: String,
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

impl Task {
    /// Creates a new pending task with no subtasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MissingRequiredField`] when `created_by`
    /// is empty or over the permitted length.
    pub fn new(
        name: TaskName,
        created_by: impl Into<String>,
        clock: &(impl Clock + ?Sized),
    ) -> Result<Self, TaskDomainError> {
        let created_by = validated_actor(created_by, "created_by")?;
        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            name,
            state: State::Pending,
            subtasks: Vec::new(),
            updated_by: created_by.clone(),
            created_by,
            start_date: None,
            end_date: None,
            created_at: timestamp,
            updated_at: timestamp,
            deleted_at: None,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            state: data.state,
            subtasks: data.subtasks,
            created_by: data.created_by,
            updated_by: data.updated_by,
            start_date: data.start_date,
            end_date: data.end_date,
            created_at: data.created_at,
            updated_at: data.updated_at,
            deleted_at: data.deleted_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task name.
    #[must_use]
    pub const fn name(&self) -> &TaskName {
        &self.name
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// Returns the owned subtasks, including soft-deleted ones.
    #[must_use]
    pub fn subtasks(&self) -> &[Subtask] {
        &self.subtasks
    }

    /// Returns the actor who created the task.
    #[must_use]
    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    /// Returns the actor who last updated the task.
    #[must_use]
    pub fn updated_by(&self) -> &str {
        &self.updated_by
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

    /// Returns true when the task is soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Appends a subtask to the aggregate and bumps the update timestamp.
    pub fn add_subtask(&mut self, subtask: Subtask, clock: &(impl Clock + ?Sized)) {
        self.subtasks.push(subtask);
        self.touch(clock);
    }

    /// Returns a mutable handle to the subtask with `id`, if present.
    pub fn subtask_mut(&mut self, id: SubtaskId) -> Option<&mut Subtask> {
        self.subtasks.iter_mut().find(|subtask| subtask.id() == id)
    }

    /// Soft-deletes every live subtask whose id is not in `retained`.
    pub fn soft_delete_subtasks_except(&mut self, retained: &[SubtaskId], clock: &(impl Clock + ?Sized)) {
        for subtask in &mut self.subtasks {
            if !subtask.is_deleted() && !retained.contains(&subtask.id()) {
                subtask.delete(clock);
            }
        }
    }

    /// Replaces the task name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MissingRequiredField`] when `updated_by`
    /// is empty or over the permitted length.
    pub fn rename(
        &mut self,
        name: TaskName,
        updated_by: impl Into<String>,
        clock: &(impl Clock + ?Sized),
    ) -> Result<(), TaskDomainError> {
        self.updated_by = validated_actor(updated_by, "updated_by")?;
        self.name = name;
        self.touch(clock);
        Ok(())
    }

    /// Applies a state change and manages lifecycle timestamps.
    ///
    /// Transition *legality* is not re-checked here: callers are expected to
    /// have validated the move through
    /// [`validate_task_transition`](super::validate_task_transition) first;
    /// the closed [`State`] enum already rules out malformed values. Entering
    /// [`State::InProgress`] stamps the start date, entering any terminal
    /// state stamps the end date and propagates the state to all live
    /// subtasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::MissingRequiredField`] when `updated_by`
    /// is empty or over the permitted length.
    pub fn update_state(
        &mut self,
        new_state: State,
        updated_by: impl Into<String>,
        clock: &(impl Clock + ?Sized),
    ) -> Result<(), TaskDomainError> {
        let updated_by = validated_actor(updated_by, "updated_by")?;

        if new_state == State::InProgress {
            self.set_start_date(clock);
        }
        if new_state.is_terminal() {
            self.set_end_date(clock);
        }

        self.state = new_state;
        self.updated_by = updated_by;
        self.touch(clock);

        if new_state.is_terminal() {
            self.propagate_state_to_subtasks(clock);
        }

        Ok(())
    }

    /// Forces the task's terminal state onto every live subtask.
    ///
    /// A no-op unless the task is in a terminal state. Soft-deleted subtasks
    /// are skipped entirely; live ones take the parent's state and have
    /// their end date stamped. Start dates are deliberately left untouched
    /// for subtasks that skipped `IN_PROGRESS`.
    pub fn propagate_state_to_subtasks(&mut self, clock: &(impl Clock + ?Sized)) {
        if !self.state.is_terminal() {
            return;
        }
        for subtask in &mut self.subtasks {
            if subtask.is_deleted() {
                continue;
            }
            subtask.inherit_terminal_state(self.state, clock);
        }
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

    /// Soft-deletes the task; a no-op when already deleted.
    pub fn delete(&mut self, clock: &(impl Clock + ?Sized)) {
        if self.deleted_at.is_none() {
            let timestamp = clock.utc();
            self.deleted_at = Some(timestamp);
            self.updated_at = timestamp;
        }
    }

    fn touch(&mut self, clock: &(impl Clock + ?Sized)) {
        self.updated_at = clock.utc();
    }
}
