//! Unit tests for the task lifecycle core.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]
#![expect(
    clippy::indexing_slicing,
    reason = "Test code uses indexing after length checks"
)]
#![expect(
    clippy::shadow_unrelated,
    reason = "Test code reuses variable names for clarity in sequential assertions"
)]

mod domain_tests;
mod subtask_service_tests;

use crate::task::domain::{State, Subtask, Task, TaskName};
use mockable::Clock;

/// Builds a pending task named `name` created by `ops`.
pub(crate) fn pending_task(name: &str, clock: &impl Clock) -> Task {
    let task_name = TaskName::new(name).expect("valid task name");
    Task::new(task_name, "ops", clock).expect("valid task")
}

/// Builds a task driven to `state` through legal transitions.
pub(crate) fn task_in_state(state: State, clock: &impl Clock) -> Task {
    let mut task = pending_task("State fixture", clock);
    match state {
        State::Pending => {}
        State::InProgress => {
            task.update_state(State::InProgress, "ops", clock)
                .expect("valid update");
        }
        State::Completed | State::Failed => {
            task.update_state(State::InProgress, "ops", clock)
                .expect("valid update");
            task.update_state(state, "ops", clock).expect("valid update");
        }
        State::Cancelled => {
            task.update_state(State::Cancelled, "ops", clock)
                .expect("valid update");
        }
    }
    task
}

/// Builds a subtask currently in `state`.
pub(crate) fn subtask_in_state(state: State, clock: &impl Clock) -> Subtask {
    let name = TaskName::new("Subtask fixture").expect("valid subtask name");
    let mut subtask = Subtask::new(name, clock);
    if state != State::Pending {
        subtask.apply_state(state, clock);
    }
    subtask
}
