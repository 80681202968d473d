//! Repository ports for task and subtask persistence.

use crate::task::domain::{State, Subtask, SubtaskId, Task, TaskId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Filters for paginated task listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilters {
    /// Restrict to tasks in this state.
    pub state: Option<State>,
    /// Restrict to tasks whose name contains this substring
    /// (case-insensitive).
    pub name_contains: Option<String>,
    /// 1-indexed page number.
    pub page: u32,
    /// Results per page.
    pub limit: u32,
    /// Include soft-deleted tasks.
    pub include_deleted: bool,
}

/// One page of a task listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPage {
    /// Tasks on this page, newest first.
    pub tasks: Vec<Task>,
    /// Total matching tasks across all pages.
    pub total: u64,
    /// 1-indexed page number served.
    pub page: u32,
    /// Page size served.
    pub limit: u32,
    /// Total page count for the filter.
    pub total_pages: u64,
}

/// Task persistence contract.
///
/// Create and update operate on the whole aggregate (task plus subtasks)
/// transactionally. Lookups treat soft-deleted tasks as absent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task and its subtasks in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] on persistence failure.
    async fn create(&self, task: &Task) -> RepositoryResult<()>;

    /// Persists changes to an existing task aggregate, upserting subtasks.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::TaskNotFound`] when the task does not
    /// exist or is soft-deleted.
    async fn update(&self, task: &Task) -> RepositoryResult<()>;

    /// Finds a task (with its subtasks) by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::TaskNotFound`] when the task does not
    /// exist or is soft-deleted.
    async fn find_by_id(&self, id: TaskId) -> RepositoryResult<Task>;

    /// Returns a page of tasks matching `filters`, ordered by creation
    /// time descending.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] on persistence failure.
    async fn find_all(&self, filters: &TaskFilters) -> RepositoryResult<TaskPage>;

    /// Soft-deletes a task and all of its subtasks.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::TaskNotFound`] when the task does not
    /// exist or is already soft-deleted.
    async fn delete(&self, id: TaskId, deleted_by: &str) -> RepositoryResult<()>;

    /// Permanently removes tasks soft-deleted before `cutoff`, returning
    /// how many were purged. Retention housekeeping, not part of the
    /// request path.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] on persistence failure.
    async fn hard_delete_before(&self, cutoff: DateTime<Utc>) -> RepositoryResult<u64>;
}

/// Subtask persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubtaskRepository: Send + Sync {
    /// Stores a new subtask under `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] on persistence failure.
    async fn create(&self, task_id: TaskId, subtask: &Subtask) -> RepositoryResult<()>;

    /// Persists changes to an existing subtask.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::SubtaskNotFound`] when the subtask does
    /// not exist or is soft-deleted.
    async fn update(&self, subtask: &Subtask) -> RepositoryResult<()>;

    /// Finds a subtask by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::SubtaskNotFound`] when the subtask does
    /// not exist or is soft-deleted.
    async fn find_by_id(&self, id: SubtaskId) -> RepositoryResult<Subtask>;

    /// Resolves the parent task of a subtask via its foreign key.
    ///
    /// This is a direct indexed lookup, never a scan over tasks.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::SubtaskNotFound`] when the subtask does
    /// not exist or is soft-deleted.
    async fn find_parent_task_id(&self, id: SubtaskId) -> RepositoryResult<TaskId>;

    /// Returns all subtasks of a task, optionally including soft-deleted
    /// ones.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] on persistence failure.
    async fn find_by_task_id(
        &self,
        task_id: TaskId,
        include_deleted: bool,
    ) -> RepositoryResult<Vec<Subtask>>;

    /// Soft-deletes a subtask.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::SubtaskNotFound`] when the subtask does
    /// not exist or is already soft-deleted.
    async fn delete(&self, id: SubtaskId, deleted_by: &str) -> RepositoryResult<()>;

    /// Soft-deletes every live subtask of a task.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] on persistence failure.
    async fn delete_by_task_id(&self, task_id: TaskId, deleted_by: &str) -> RepositoryResult<()>;
}

/// Errors returned by repository implementations.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// The task was not found or is soft-deleted.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The subtask was not found or is soft-deleted.
    #[error("subtask not found: {0}")]
    SubtaskNotFound(SubtaskId),

    /// The storage backend could not be reached.
    #[error("database unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),

    /// The storage backend failed while executing an operation.
    #[error("database error: {0}")]
    Database(Arc<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    /// Wraps a backend execution error.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Database(Arc::new(err))
    }

    /// Wraps a backend connectivity error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
