//! Orchestration tests for standalone subtask updates.

use std::sync::Arc;

use super::{subtask_in_state, task_in_state};
use crate::task::{
    adapters::memory::InMemoryStore,
    domain::{State, SubtaskId, TaskDomainError, TaskId},
    ports::{MockSubtaskRepository, MockTaskRepository, RepositoryError},
    services::{
        CreateTaskRequest, ServiceError, SubtaskService, TaskService, UpdateSubtaskRequest,
        UpdateTaskRequest,
    },
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

struct Harness {
    tasks: TaskService<InMemoryStore, DefaultClock>,
    subtasks: SubtaskService<InMemoryStore, InMemoryStore, DefaultClock>,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(DefaultClock);
    Harness {
        tasks: TaskService::new(Arc::clone(&store), Arc::clone(&clock)),
        subtasks: SubtaskService::new(Arc::clone(&store), store, clock),
    }
}

/// Creates an `IN_PROGRESS` task with pending subtasks and returns its id
/// alongside the subtask ids.
async fn running_task_with_subtasks(
    harness: &Harness,
    names: &[&str],
) -> (TaskId, Vec<SubtaskId>) {
    let created = harness
        .tasks
        .create(
            CreateTaskRequest::new("Deploy", "ops")
                .with_subtasks(names.iter().map(|name| (*name).to_owned())),
        )
        .await
        .expect("creation succeeds");
    harness
        .tasks
        .update(UpdateTaskRequest::new(created.id(), "ops").with_state(State::InProgress))
        .await
        .expect("start succeeds");
    let subtask_ids = created.subtasks().iter().map(|subtask| subtask.id()).collect();
    (created.id(), subtask_ids)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rename_updates_the_stored_subtask(harness: Harness) {
    let (task_id, subtask_ids) = running_task_with_subtasks(&harness, &["Build"]).await;

    let updated = harness
        .subtasks
        .update(UpdateSubtaskRequest::new(subtask_ids[0], "alice").with_name("Rebuild"))
        .await
        .expect("update succeeds");

    assert_eq!(updated.name().as_str(), "Rebuild");
    let parent = harness.tasks.get(task_id).await.expect("lookup succeeds");
    assert_eq!(parent.subtasks()[0].name().as_str(), "Rebuild");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_without_changes_is_rejected(harness: Harness) {
    let (_, subtask_ids) = running_task_with_subtasks(&harness, &["Build"]).await;

    let result = harness
        .subtasks
        .update(UpdateSubtaskRequest::new(subtask_ids[0], "alice"))
        .await;

    assert!(matches!(
        result,
        Err(ServiceError::Domain(TaskDomainError::MissingRequiredField(
            "name or state"
        )))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn state_change_is_checked_against_the_parent(harness: Harness) {
    let created = harness
        .tasks
        .create(CreateTaskRequest::new("Deploy", "ops").with_subtasks(vec!["Build".to_owned()]))
        .await
        .expect("creation succeeds");

    let result = harness
        .subtasks
        .update(
            UpdateSubtaskRequest::new(created.subtasks()[0].id(), "alice")
                .with_state(State::InProgress),
        )
        .await;

    assert!(matches!(
        result,
        Err(ServiceError::Domain(
            TaskDomainError::InconsistentParentChildState {
                parent: State::Pending,
                requested: State::InProgress,
            }
        ))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completing_the_last_subtask_completes_the_parent(harness: Harness) {
    let (task_id, subtask_ids) = running_task_with_subtasks(&harness, &["Build", "Test"]).await;

    for id in &subtask_ids {
        harness
            .subtasks
            .update(UpdateSubtaskRequest::new(*id, "alice").with_state(State::InProgress))
            .await
            .expect("start succeeds");
    }
    harness
        .subtasks
        .update(UpdateSubtaskRequest::new(subtask_ids[0], "alice").with_state(State::Completed))
        .await
        .expect("completion succeeds");

    let parent = harness.tasks.get(task_id).await.expect("lookup succeeds");
    assert_eq!(parent.state(), State::InProgress);

    harness
        .subtasks
        .update(UpdateSubtaskRequest::new(subtask_ids[1], "alice").with_state(State::Completed))
        .await
        .expect("completion succeeds");

    let parent = harness.tasks.get(task_id).await.expect("lookup succeeds");
    assert_eq!(parent.state(), State::Completed);
    assert!(parent.end_date().is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_subtask_does_not_complete_the_parent(harness: Harness) {
    let (task_id, subtask_ids) = running_task_with_subtasks(&harness, &["Build"]).await;
    harness
        .subtasks
        .update(UpdateSubtaskRequest::new(subtask_ids[0], "alice").with_state(State::InProgress))
        .await
        .expect("start succeeds");

    harness
        .subtasks
        .update(UpdateSubtaskRequest::new(subtask_ids[0], "alice").with_state(State::Failed))
        .await
        .expect("update succeeds");

    let parent = harness.tasks.get(task_id).await.expect("lookup succeeds");
    assert_eq!(parent.state(), State::InProgress);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn soft_deleted_subtasks_are_ignored_by_auto_completion(harness: Harness) {
    let (task_id, subtask_ids) =
        running_task_with_subtasks(&harness, &["Build", "Abandoned"]).await;
    harness
        .subtasks
        .delete(subtask_ids[1], "alice")
        .await
        .expect("delete succeeds");
    harness
        .subtasks
        .update(UpdateSubtaskRequest::new(subtask_ids[0], "alice").with_state(State::InProgress))
        .await
        .expect("start succeeds");

    harness
        .subtasks
        .update(UpdateSubtaskRequest::new(subtask_ids[0], "alice").with_state(State::Completed))
        .await
        .expect("completion succeeds");

    let parent = harness.tasks.get(task_id).await.expect("lookup succeeds");
    assert_eq!(parent.state(), State::Completed);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_hides_the_subtask(harness: Harness) {
    let (_, subtask_ids) = running_task_with_subtasks(&harness, &["Build"]).await;

    harness
        .subtasks
        .delete(subtask_ids[0], "alice")
        .await
        .expect("delete succeeds");

    let result = harness
        .subtasks
        .update(UpdateSubtaskRequest::new(subtask_ids[0], "alice").with_name("Rebuild"))
        .await;
    assert!(matches!(
        result,
        Err(ServiceError::Repository(RepositoryError::SubtaskNotFound(_)))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_requires_an_actor(harness: Harness) {
    let (_, subtask_ids) = running_task_with_subtasks(&harness, &["Build"]).await;

    let result = harness.subtasks.delete(subtask_ids[0], "").await;

    assert!(matches!(
        result,
        Err(ServiceError::Domain(TaskDomainError::MissingRequiredField(
            "deleted_by"
        )))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn parent_completion_failure_does_not_fail_the_subtask_update() {
    let clock = DefaultClock;
    let parent = task_in_state(State::InProgress, &clock);
    let parent_id = parent.id();
    let subtask = subtask_in_state(State::InProgress, &clock);
    let subtask_id = subtask.id();
    let completed_child = subtask_in_state(State::Completed, &clock);

    let mut task_repository = MockTaskRepository::new();
    task_repository
        .expect_find_by_id()
        .returning(move |_| Ok(parent.clone()));
    task_repository
        .expect_update()
        .returning(|_| Err(RepositoryError::unavailable(std::io::Error::other("pool exhausted"))));

    let mut subtask_repository = MockSubtaskRepository::new();
    subtask_repository
        .expect_find_by_id()
        .returning(move |_| Ok(subtask.clone()));
    subtask_repository
        .expect_find_parent_task_id()
        .returning(move |_| Ok(parent_id));
    subtask_repository.expect_update().returning(|_| Ok(()));
    subtask_repository
        .expect_find_by_task_id()
        .returning(move |_, _| Ok(vec![completed_child.clone()]));

    let service = SubtaskService::new(
        Arc::new(task_repository),
        Arc::new(subtask_repository),
        Arc::new(DefaultClock),
    );

    let updated = service
        .update(UpdateSubtaskRequest::new(subtask_id, "alice").with_state(State::Completed))
        .await
        .expect("subtask update survives the parent persistence failure");

    assert_eq!(updated.state(), State::Completed);
    assert!(updated.end_date().is_some());
}
