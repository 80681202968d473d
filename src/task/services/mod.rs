//! Application services for task lifecycle orchestration.

mod error;
mod subtasks;
mod tasks;

pub use error::{ServiceError, ServiceResult};
pub use subtasks::{SubtaskService, UpdateSubtaskRequest};
pub use tasks::{
    CreateTaskRequest, ListTasksRequest, SubtaskChange, TaskService, UpdateTaskRequest,
};
