//! Orchestration service for standalone subtask updates.

use super::ServiceResult;
use crate::task::{
    domain::{
        State, Subtask, SubtaskId, TaskDomainError, TaskName, validate_subtask_transition,
        validate_task_transition, validated_actor,
    },
    ports::{SubtaskRepository, TaskRepository},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::warn;

/// Request payload for updating a subtask through its standalone endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSubtaskRequest {
    id: SubtaskId,
    updated_by: String,
    name: Option<String>,
    state: Option<State>,
}

impl UpdateSubtaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(id: SubtaskId, updated_by: impl Into<String>) -> Self {
        Self {
            id,
            updated_by: updated_by.into(),
            name: None,
            state: None,
        }
    }

    /// Renames the subtask.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Requests a state transition.
    #[must_use]
    pub const fn with_state(mut self, state: State) -> Self {
        self.state = Some(state);
        self
    }
}

/// Subtask orchestration service.
///
/// State changes are validated against the parent task, resolved through
/// the subtask's foreign key rather than any scan over tasks.
#[derive(Clone)]
pub struct SubtaskService<T, S, C>
where
    T: TaskRepository,
    S: SubtaskRepository,
    C: Clock + Send + Sync,
{
    task_repository: Arc<T>,
    subtask_repository: Arc<S>,
    clock: Arc<C>,
}

impl<T, S, C> SubtaskService<T, S, C>
where
    T: TaskRepository,
    S: SubtaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new subtask service.
    #[must_use]
    pub const fn new(task_repository: Arc<T>, subtask_repository: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            task_repository,
            subtask_repository,
            clock,
        }
    }

    /// Applies a rename and/or parent-aware state transition to a subtask.
    ///
    /// When the new state is terminal, a follow-up check auto-completes an
    /// `IN_PROGRESS` parent whose live subtasks are now all `COMPLETED`.
    /// That side effect is best-effort: its failure is logged and never
    /// overrides the success of the subtask update itself.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Domain`](super::ServiceError::Domain) on validation or transition
    /// failures, or [`ServiceError::Repository`](super::ServiceError::Repository) when the subtask or its
    /// parent cannot be loaded or persisted.
    pub async fn update(&self, request: UpdateSubtaskRequest) -> ServiceResult<Subtask> {
        let updated_by = validated_actor(request.updated_by, "updated_by")?;
        if request.name.is_none() && request.state.is_none() {
            return Err(TaskDomainError::MissingRequiredField("name or state").into());
        }

        let mut subtask = self.subtask_repository.find_by_id(request.id).await?;

        if let Some(name) = request.name {
            subtask.rename(TaskName::new(name)?, &*self.clock);
        }

        if let Some(new_state) = request.state {
            let parent_id = self
                .subtask_repository
                .find_parent_task_id(request.id)
                .await?;
            let parent = self.task_repository.find_by_id(parent_id).await?;
            validate_subtask_transition(&parent, &subtask, new_state)?;
            subtask.apply_state(new_state, &*self.clock);
        }

        self.subtask_repository.update(&subtask).await?;

        if request.state.is_some_and(State::is_terminal) {
            if let Err(err) = self.try_complete_parent(subtask.id(), &updated_by).await {
                warn!(
                    subtask_id = %subtask.id(),
                    error = %err,
                    "failed to auto-complete parent task"
                );
            }
        }

        Ok(subtask)
    }

    /// Soft-deletes a subtask.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Domain`](super::ServiceError::Domain) when `deleted_by` fails validation,
    /// or [`ServiceError::Repository`](super::ServiceError::Repository) when the subtask is missing or
    /// persistence fails.
    pub async fn delete(&self, id: SubtaskId, deleted_by: &str) -> ServiceResult<()> {
        let deleted_by = validated_actor(deleted_by, "deleted_by")?;
        Ok(self.subtask_repository.delete(id, &deleted_by).await?)
    }

    /// Reloads the parent and completes it when it is `IN_PROGRESS` and
    /// every live subtask has reached `COMPLETED`.
    async fn try_complete_parent(&self, subtask_id: SubtaskId, updated_by: &str) -> ServiceResult<()> {
        let parent_id = self
            .subtask_repository
            .find_parent_task_id(subtask_id)
            .await?;
        let mut parent = self.task_repository.find_by_id(parent_id).await?;

        if parent.state() != State::InProgress {
            return Ok(());
        }

        let children = self
            .subtask_repository
            .find_by_task_id(parent_id, false)
            .await?;
        if children.is_empty()
            || children
                .iter()
                .any(|child| child.state() != State::Completed)
        {
            return Ok(());
        }

        validate_task_transition(&parent, State::Completed)?;
        parent.update_state(State::Completed, updated_by, &*self.clock)?;
        self.task_repository.update(&parent).await?;
        Ok(())
    }
}
