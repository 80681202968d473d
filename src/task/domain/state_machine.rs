//! Transition validation for task and subtask lifecycle states.
//!
//! The functions here are pure and stateless; the transition table itself
//! lives on [`State::allowed_transitions`]. Orchestration services call
//! these before mutating any entity, so an illegal request is rejected
//! without side effects.

use super::{State, Subtask, Task, TaskDomainError};

/// Validates the transition `from -> to`.
///
/// # Errors
///
/// Returns [`TaskDomainError::InvalidStateTransition`] when `from` is
/// terminal or the pair is not in the transition table.
pub fn validate_transition(from: State, to: State) -> Result<(), TaskDomainError> {
    if !from.can_transition_to(to) {
        return Err(TaskDomainError::InvalidStateTransition { from, to });
    }
    Ok(())
}

/// Validates a state transition for a task.
///
/// # Errors
///
/// Returns [`TaskDomainError::InvalidStateTransition`] when the task's
/// current state does not allow `new_state`.
pub fn validate_task_transition(task: &Task, new_state: State) -> Result<(), TaskDomainError> {
    validate_transition(task.state(), new_state)
}

/// Validates a state transition for a subtask against its parent task.
///
/// The parent/child rule is evaluated in order:
///
/// 1. A terminal parent only lets a subtask inherit that exact state; the
///    basic transition check still applies afterwards, so an already
///    terminal subtask cannot re-inherit.
/// 2. A subtask cannot enter `IN_PROGRESS` while the parent is `PENDING`.
/// 3. A subtask that has not started cannot jump to a terminal state while
///    the parent is non-terminal; a running subtask may finish normally,
///    which is what lets a parent auto-complete once every child is done.
/// 4. Otherwise the basic transition check on the subtask's own state
///    decides.
///
/// A subtask may stay `PENDING` while the parent runs; the rule bounds the
/// child lifecycle by the parent's without forcing lock-step progress.
///
/// # Errors
///
/// Returns [`TaskDomainError::InconsistentParentChildState`] when the
/// parent/child ordering is violated, or
/// [`TaskDomainError::InvalidStateTransition`] when the subtask's own
/// transition is illegal.
pub fn validate_subtask_transition(
    task: &Task,
    subtask: &Subtask,
    new_state: State,
) -> Result<(), TaskDomainError> {
    if task.state().is_terminal() {
        if new_state != task.state() {
            return Err(TaskDomainError::InconsistentParentChildState {
                parent: task.state(),
                requested: new_state,
            });
        }
        return validate_transition(subtask.state(), new_state);
    }

    if task.state() == State::Pending && new_state == State::InProgress {
        return Err(TaskDomainError::InconsistentParentChildState {
            parent: task.state(),
            requested: new_state,
        });
    }

    if new_state.is_terminal()
        && !task.state().is_terminal()
        && subtask.state() != State::InProgress
    {
        return Err(TaskDomainError::InconsistentParentChildState {
            parent: task.state(),
            requested: new_state,
        });
    }

    validate_transition(subtask.state(), new_state)
}
