//! Orchestration service for task CRUD and state updates.

use super::ServiceResult;
use crate::task::{
    domain::{
        State, Subtask, SubtaskId, Task, TaskDomainError, TaskId, TaskName, validate_subtask_transition,
        validate_task_transition, validated_actor,
    },
    ports::{RepositoryError, TaskFilters, TaskPage, TaskRepository},
};
use mockable::Clock;
use std::sync::Arc;

/// Page size applied when a listing request does not supply one.
const DEFAULT_PAGE_LIMIT: u32 = 20;
/// Largest page size a listing request may ask for.
const MAX_PAGE_LIMIT: u32 = 100;

/// Request payload for creating a task.
///
/// Tasks always start in `PENDING`; a caller wanting a different initial
/// state issues a follow-up [`UpdateTaskRequest`] so the transition runs
/// through the same validation as any other update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    name: String,
    created_by: String,
    subtask_names: Vec<String>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, created_by: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_by: created_by.into(),
            subtask_names: Vec::new(),
        }
    }

    /// Adds subtasks to create alongside the task.
    #[must_use]
    pub fn with_subtasks(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.subtask_names = names.into_iter().collect();
        self
    }
}

/// One entry in an update request's subtask reconciliation list.
///
/// Entries with an id update the existing subtask in place; entries with
/// only a name create a fresh subtask. Live subtasks omitted from the list
/// are soft-deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtaskChange {
    id: Option<SubtaskId>,
    name: Option<String>,
    state: Option<State>,
}

impl SubtaskChange {
    /// Targets an existing subtask.
    #[must_use]
    pub const fn existing(id: SubtaskId) -> Self {
        Self {
            id: Some(id),
            name: None,
            state: None,
        }
    }

    /// Creates a fresh subtask with the given name.
    #[must_use]
    pub fn create(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            state: None,
        }
    }

    /// Sets a new name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets a requested state.
    #[must_use]
    pub const fn with_state(mut self, state: State) -> Self {
        self.state = Some(state);
        self
    }
}

/// Request payload for updating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    id: TaskId,
    updated_by: String,
    name: Option<String>,
    state: Option<State>,
    subtasks: Vec<SubtaskChange>,
}

impl UpdateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(id: TaskId, updated_by: impl Into<String>) -> Self {
        Self {
            id,
            updated_by: updated_by.into(),
            name: None,
            state: None,
            subtasks: Vec::new(),
        }
    }

    /// Renames the task.
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

    /// Supplies the subtask reconciliation list.
    #[must_use]
    pub fn with_subtasks(mut self, changes: impl IntoIterator<Item = SubtaskChange>) -> Self {
        self.subtasks = changes.into_iter().collect();
        self
    }
}

/// Request payload for listing tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTasksRequest {
    /// Restrict to tasks in this state.
    pub state: Option<State>,
    /// Restrict to tasks whose name contains this substring.
    pub name_contains: Option<String>,
    /// 1-indexed page; values below 1 are clamped to 1.
    pub page: u32,
    /// Page size; 0 falls back to the default, large values are capped.
    pub limit: u32,
    /// Include soft-deleted tasks.
    pub include_deleted: bool,
}

/// Task orchestration service.
#[derive(Clone)]
pub struct TaskService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> TaskService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates a task, optionally with pending subtasks, and persists it.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Domain`](super::ServiceError::Domain) when a name or actor fails
    /// validation, or [`ServiceError::Repository`](super::ServiceError::Repository) when persistence fails.
    pub async fn create(&self, request: CreateTaskRequest) -> ServiceResult<Task> {
        let name = TaskName::new(request.name)?;
        let mut task = Task::new(name, request.created_by, &*self.clock)?;
        for subtask_name in request.subtask_names {
            let subtask = Subtask::new(TaskName::new(subtask_name)?, &*self.clock);
            task.add_subtask(subtask, &*self.clock);
        }
        self.repository.create(&task).await?;
        Ok(task)
    }

    /// Retrieves a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::TaskNotFound`] (wrapped) when the task is
    /// absent or soft-deleted.
    pub async fn get(&self, id: TaskId) -> ServiceResult<Task> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Lists tasks with filters and clamped pagination.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Repository`](super::ServiceError::Repository) when the listing query fails.
    pub async fn list(&self, request: ListTasksRequest) -> ServiceResult<TaskPage> {
        let filters = TaskFilters {
            state: request.state,
            name_contains: request.name_contains,
            page: request.page.max(1),
            limit: if request.limit == 0 {
                DEFAULT_PAGE_LIMIT
            } else {
                request.limit.min(MAX_PAGE_LIMIT)
            },
            include_deleted: request.include_deleted,
        };
        Ok(self.repository.find_all(&filters).await?)
    }

    /// Applies an update: rename, state transition, and/or subtask
    /// reconciliation, then persists the whole aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Domain`](super::ServiceError::Domain) on validation or transition
    /// failures, or [`ServiceError::Repository`](super::ServiceError::Repository) when the task is missing
    /// or persistence fails.
    pub async fn update(&self, request: UpdateTaskRequest) -> ServiceResult<Task> {
        let updated_by = validated_actor(request.updated_by, "updated_by")?;
        if request.name.is_none() && request.state.is_none() && request.subtasks.is_empty() {
            return Err(TaskDomainError::MissingRequiredField("name, state, or subtasks").into());
        }

        let mut task = self.repository.find_by_id(request.id).await?;

        if let Some(name) = request.name {
            task.rename(TaskName::new(name)?, &updated_by, &*self.clock)?;
        }

        if let Some(new_state) = request.state {
            validate_task_transition(&task, new_state)?;
            task.update_state(new_state, &updated_by, &*self.clock)?;
        }

        if !request.subtasks.is_empty() {
            self.reconcile_subtasks(&mut task, request.subtasks)?;
        }

        self.repository.update(&task).await?;
        Ok(task)
    }

    /// Soft-deletes a task and its subtasks.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Domain`](super::ServiceError::Domain) when `deleted_by` fails validation,
    /// or [`ServiceError::Repository`](super::ServiceError::Repository) when the task is missing or
    /// persistence fails.
    pub async fn delete(&self, id: TaskId, deleted_by: &str) -> ServiceResult<()> {
        let deleted_by = validated_actor(deleted_by, "deleted_by")?;
        Ok(self.repository.delete(id, &deleted_by).await?)
    }

    /// Applies the reconciliation list against the aggregate: updates by
    /// id, creates name-only entries, and soft-deletes live subtasks the
    /// list omits. Every state change is checked against the task's
    /// current state.
    fn reconcile_subtasks(
        &self,
        task: &mut Task,
        changes: Vec<SubtaskChange>,
    ) -> ServiceResult<()> {
        let mut retained: Vec<SubtaskId> = Vec::with_capacity(changes.len());

        for change in changes {
            if let Some(id) = change.id {
                let snapshot = task
                    .subtasks()
                    .iter()
                    .find(|subtask| subtask.id() == id && !subtask.is_deleted())
                    .cloned()
                    .ok_or(RepositoryError::SubtaskNotFound(id))?;

                if let Some(new_state) = change.state {
                    validate_subtask_transition(task, &snapshot, new_state)?;
                }
                let validated_name = change.name.map(TaskName::new).transpose()?;

                if let Some(subtask) = task.subtask_mut(id) {
                    if let Some(name) = validated_name {
                        subtask.rename(name, &*self.clock);
                    }
                    if let Some(new_state) = change.state {
                        subtask.apply_state(new_state, &*self.clock);
                    }
                }
                retained.push(id);
            } else if let Some(name) = change.name {
                let mut subtask = Subtask::new(TaskName::new(name)?, &*self.clock);
                if let Some(new_state) = change.state {
                    validate_subtask_transition(task, &subtask, new_state)?;
                    subtask.apply_state(new_state, &*self.clock);
                }
                retained.push(subtask.id());
                task.add_subtask(subtask, &*self.clock);
            }
        }

        task.soft_delete_subtasks_except(&retained, &*self.clock);
        Ok(())
    }
}
