//! Domain-focused tests for entity construction and mutation.

use super::{pending_task, subtask_in_state, task_in_state};
use crate::task::domain::{
    MAX_NAME_LENGTH, State, Subtask, Task, TaskDomainError, TaskName,
};
use mockable::{Clock, DefaultClock};
use rstest::{fixture, rstest};
use serde_json::json;
use std::sync::Arc;

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

#[rstest]
fn new_task_starts_pending_with_no_dates(clock: DefaultClock) {
    let name = TaskName::new("Deploy").expect("valid name");
    let task = Task::new(name, "ops", &clock).expect("valid task");

    assert_eq!(task.state(), State::Pending);
    assert!(task.subtasks().is_empty());
    assert_eq!(task.created_by(), "ops");
    assert_eq!(task.updated_by(), "ops");
    assert!(task.start_date().is_none());
    assert!(task.end_date().is_none());
    assert!(task.deleted_at().is_none());
    assert_eq!(task.created_at(), task.updated_at());
}

#[rstest]
#[case("")]
#[case("bad!name")]
#[case("café")]
#[case("tab\tseparated")]
fn task_name_rejects_invalid_characters(#[case] raw: &str) {
    assert!(matches!(
        TaskName::new(raw),
        Err(TaskDomainError::InvalidName(_))
    ));
}

#[rstest]
fn task_name_rejects_overlong_values() {
    let raw = "a".repeat(MAX_NAME_LENGTH + 1);
    assert!(matches!(
        TaskName::new(raw),
        Err(TaskDomainError::InvalidName(_))
    ));
}

#[rstest]
#[case("Deploy v2")]
#[case("nightly_build-01")]
fn task_name_accepts_allowed_characters(#[case] raw: &str) {
    let name = TaskName::new(raw).expect("valid name");
    assert_eq!(name.as_str(), raw);
}

#[rstest]
fn new_task_requires_a_creator(clock: DefaultClock) {
    let name = TaskName::new("Deploy").expect("valid name");
    assert_eq!(
        Task::new(name, "", &clock).expect_err("empty creator"),
        TaskDomainError::MissingRequiredField("created_by")
    );

    let long_name = TaskName::new("Deploy").expect("valid name");
    let long_actor = "a".repeat(MAX_NAME_LENGTH + 1);
    assert_eq!(
        Task::new(long_name, long_actor, &clock).expect_err("overlong creator"),
        TaskDomainError::MissingRequiredField("created_by")
    );
}

#[rstest]
fn update_state_requires_an_actor(clock: DefaultClock) {
    let mut task = pending_task("Deploy", &clock);
    assert_eq!(
        task.update_state(State::InProgress, "", &clock)
            .expect_err("empty actor"),
        TaskDomainError::MissingRequiredField("updated_by")
    );
    assert_eq!(task.state(), State::Pending);
}

#[rstest]
fn entering_in_progress_stamps_the_start_date(clock: DefaultClock) {
    let mut task = pending_task("Deploy", &clock);

    task.update_state(State::InProgress, "alice", &clock)
        .expect("valid update");

    assert_eq!(task.state(), State::InProgress);
    assert_eq!(task.updated_by(), "alice");
    assert!(task.start_date().is_some());
    assert!(task.end_date().is_none());
}

#[rstest]
fn set_dates_are_idempotent(clock: DefaultClock) {
    let mut task = pending_task("Deploy", &clock);

    task.set_start_date(&clock);
    let first_start = task.start_date();
    task.set_start_date(&clock);
    assert_eq!(task.start_date(), first_start);

    task.set_end_date(&clock);
    let first_end = task.end_date();
    task.set_end_date(&clock);
    assert_eq!(task.end_date(), first_end);
}

#[rstest]
fn delete_is_idempotent(clock: DefaultClock) {
    let mut task = pending_task("Deploy", &clock);

    task.delete(&clock);
    let first = task.deleted_at();
    assert!(first.is_some());

    task.delete(&clock);
    assert_eq!(task.deleted_at(), first);
}

#[rstest]
fn add_subtask_bumps_the_update_timestamp(clock: DefaultClock) {
    let mut task = pending_task("Deploy", &clock);
    let before = task.updated_at();
    let subtask = Subtask::new(TaskName::new("Build").expect("valid name"), &clock);

    task.add_subtask(subtask, &clock);

    assert_eq!(task.subtasks().len(), 1);
    assert!(task.updated_at() >= before);
}

#[rstest]
fn completing_a_task_propagates_to_live_subtasks_only(clock: DefaultClock) {
    let mut task = task_in_state(State::InProgress, &clock);
    let first = Subtask::new(TaskName::new("Build").expect("valid name"), &clock);
    let second = Subtask::new(TaskName::new("Test").expect("valid name"), &clock);
    let mut doomed = subtask_in_state(State::InProgress, &clock);
    doomed.delete(&clock);
    let doomed_id = doomed.id();
    task.add_subtask(first, &clock);
    task.add_subtask(second, &clock);
    task.add_subtask(doomed, &clock);

    task.update_state(State::Completed, "alice", &clock)
        .expect("valid update");

    assert_eq!(task.state(), State::Completed);
    assert!(task.end_date().is_some());
    for subtask in task.subtasks() {
        if subtask.id() == doomed_id {
            assert_eq!(subtask.state(), State::InProgress);
        } else {
            assert_eq!(subtask.state(), State::Completed);
            assert!(subtask.end_date().is_some());
        }
    }
}

#[rstest]
fn propagation_is_a_noop_for_live_states(clock: DefaultClock) {
    let mut task = task_in_state(State::InProgress, &clock);
    let subtask = Subtask::new(TaskName::new("Build").expect("valid name"), &clock);
    task.add_subtask(subtask, &clock);

    task.propagate_state_to_subtasks(&clock);

    assert_eq!(task.subtasks()[0].state(), State::Pending);
}

#[rstest]
fn subtask_apply_state_stamps_lifecycle_dates(clock: DefaultClock) {
    let mut subtask = Subtask::new(TaskName::new("Build").expect("valid name"), &clock);

    subtask.apply_state(State::InProgress, &clock);
    assert!(subtask.start_date().is_some());
    assert!(subtask.end_date().is_none());

    subtask.apply_state(State::Completed, &clock);
    assert!(subtask.end_date().is_some());
    assert_eq!(subtask.state(), State::Completed);
}

#[rstest]
fn rename_requires_an_actor(clock: DefaultClock) {
    let mut task = pending_task("Deploy", &clock);
    let name = TaskName::new("Redeploy").expect("valid name");

    assert_eq!(
        task.rename(name, "", &clock).expect_err("empty actor"),
        TaskDomainError::MissingRequiredField("updated_by")
    );
}

#[rstest]
fn entity_mutators_accept_shared_trait_object_clocks() {
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(DefaultClock);

    let name = TaskName::new("Deploy").expect("valid name");
    let mut task = Task::new(name, "ops", &*clock).expect("valid task");
    let mut subtask = Subtask::new(TaskName::new("Build").expect("valid name"), &*clock);

    subtask.apply_state(State::InProgress, &*clock);
    task.add_subtask(subtask, &*clock);
    task.soft_delete_subtasks_except(&[], &*clock);
    task.delete(&*clock);

    assert!(task.is_deleted());
    assert!(task.subtasks()[0].is_deleted());
}

#[rstest]
fn states_serialize_with_the_uppercase_wire_vocabulary() {
    let serialized = serde_json::to_value([
        State::Pending,
        State::InProgress,
        State::Completed,
        State::Failed,
        State::Cancelled,
    ])
    .expect("states serialize");

    assert_eq!(
        serialized,
        json!(["PENDING", "IN_PROGRESS", "COMPLETED", "FAILED", "CANCELLED"])
    );
}

#[rstest]
fn states_parse_from_their_wire_names() {
    for state in crate::task::domain::ALL_STATES {
        assert_eq!(State::try_from(state.as_str()), Ok(state));
    }
    assert!(State::try_from("pending").is_err());
    assert!(State::try_from("DONE").is_err());
}
