//! Port contracts for task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod repository;

pub use repository::{
    RepositoryError, RepositoryResult, SubtaskRepository, TaskFilters, TaskPage, TaskRepository,
};

#[cfg(test)]
pub use repository::{MockSubtaskRepository, MockTaskRepository};
