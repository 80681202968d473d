//! Domain model for task lifecycle management.
//!
//! The task domain models validated task/subtask construction, the lifecycle
//! state machine, parent/child consistency rules, and terminal-state
//! propagation while keeping all infrastructure concerns outside of the
//! domain boundary.

mod error;
mod ids;
mod name;
mod state;
mod state_machine;
mod subtask;
mod task;

pub use error::{ParseStateError, TaskDomainError};
pub use ids::{SubtaskId, TaskId};
pub use name::{MAX_NAME_LENGTH, TaskName, validated_actor};
pub use state::{ALL_STATES, State};
pub use state_machine::{validate_subtask_transition, validate_task_transition, validate_transition};
pub use subtask::{PersistedSubtaskData, Subtask};
pub use task::{PersistedTaskData, Task};
