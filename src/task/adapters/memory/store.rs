//! In-memory repository for task lifecycle tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{Subtask, SubtaskId, Task, TaskId},
    ports::{
        RepositoryError, RepositoryResult, SubtaskRepository, TaskFilters, TaskPage,
        TaskRepository,
    },
};

/// Thread-safe in-memory task and subtask store.
///
/// Tasks are held as whole aggregates; a subtask index maps each subtask id
/// to its parent, giving the same O(1) parent resolution the SQL foreign
/// key provides.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

#[derive(Debug, Default)]
struct StoreState {
    tasks: HashMap<TaskId, Task>,
    parent_index: HashMap<SubtaskId, TaskId>,
}

impl InMemoryStore {
    /// Creates an empty store using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Creates an empty store using the supplied clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
            clock,
        }
    }

    fn read(&self) -> RepositoryResult<std::sync::RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|err| RepositoryError::database(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> RepositoryResult<std::sync::RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|err| RepositoryError::database(std::io::Error::other(err.to_string())))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore").finish_non_exhaustive()
    }
}

fn index_subtasks(state: &mut StoreState, task: &Task) {
    for subtask in task.subtasks() {
        state.parent_index.insert(subtask.id(), task.id());
    }
}

fn live_task<'a>(state: &'a StoreState, id: TaskId) -> RepositoryResult<&'a Task> {
    state
        .tasks
        .get(&id)
        .filter(|task| !task.is_deleted())
        .ok_or(RepositoryError::TaskNotFound(id))
}

fn matches_filters(task: &Task, filters: &TaskFilters) -> bool {
    if !filters.include_deleted && task.is_deleted() {
        return false;
    }
    if let Some(state) = filters.state
        && task.state() != state
    {
        return false;
    }
    if let Some(needle) = &filters.name_contains
        && !task
            .name()
            .as_str()
            .to_lowercase()
            .contains(&needle.to_lowercase())
    {
        return false;
    }
    true
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn create(&self, task: &Task) -> RepositoryResult<()> {
        let mut state = self.write()?;
        index_subtasks(&mut state, task);
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> RepositoryResult<()> {
        let mut state = self.write()?;
        live_task(&state, task.id())?;
        index_subtasks(&mut state, task);
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> RepositoryResult<Task> {
        let state = self.read()?;
        live_task(&state, id).cloned()
    }

    async fn find_all(&self, filters: &TaskFilters) -> RepositoryResult<TaskPage> {
        let state = self.read()?;
        let mut matching: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| matches_filters(task, filters))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let page = filters.page.max(1);
        let limit = filters.limit.max(1);
        let offset = (u64::from(page) - 1) * u64::from(limit);
        let tasks = matching
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();

        Ok(TaskPage {
            tasks,
            total,
            page,
            limit,
            total_pages: total.div_ceil(u64::from(limit)),
        })
    }

    async fn delete(&self, id: TaskId, _deleted_by: &str) -> RepositoryResult<()> {
        let mut state = self.write()?;
        let task = state
            .tasks
            .get_mut(&id)
            .filter(|task| !task.is_deleted())
            .ok_or(RepositoryError::TaskNotFound(id))?;
        task.soft_delete_subtasks_except(&[], &*self.clock);
        task.delete(&*self.clock);
        Ok(())
    }

    async fn hard_delete_before(&self, cutoff: DateTime<Utc>) -> RepositoryResult<u64> {
        let mut state = self.write()?;
        let doomed: Vec<TaskId> = state
            .tasks
            .values()
            .filter(|task| task.deleted_at().is_some_and(|at| at < cutoff))
            .map(Task::id)
            .collect();
        for id in &doomed {
            if let Some(task) = state.tasks.remove(id) {
                for subtask in task.subtasks() {
                    state.parent_index.remove(&subtask.id());
                }
            }
        }
        Ok(u64::try_from(doomed.len()).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl SubtaskRepository for InMemoryStore {
    async fn create(&self, task_id: TaskId, subtask: &Subtask) -> RepositoryResult<()> {
        let mut state = self.write()?;
        live_task(&state, task_id)?;
        state.parent_index.insert(subtask.id(), task_id);
        if let Some(task) = state.tasks.get_mut(&task_id) {
            task.add_subtask(subtask.clone(), &*self.clock);
        }
        Ok(())
    }

    async fn update(&self, subtask: &Subtask) -> RepositoryResult<()> {
        let mut state = self.write()?;
        let parent_id = *state
            .parent_index
            .get(&subtask.id())
            .ok_or(RepositoryError::SubtaskNotFound(subtask.id()))?;
        let task = state
            .tasks
            .get_mut(&parent_id)
            .ok_or(RepositoryError::SubtaskNotFound(subtask.id()))?;
        let slot = task
            .subtask_mut(subtask.id())
            .filter(|slot| !slot.is_deleted())
            .ok_or(RepositoryError::SubtaskNotFound(subtask.id()))?;
        *slot = subtask.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: SubtaskId) -> RepositoryResult<Subtask> {
        let state = self.read()?;
        find_live_subtask(&state, id).cloned()
    }

    async fn find_parent_task_id(&self, id: SubtaskId) -> RepositoryResult<TaskId> {
        let state = self.read()?;
        find_live_subtask(&state, id)?;
        state
            .parent_index
            .get(&id)
            .copied()
            .ok_or(RepositoryError::SubtaskNotFound(id))
    }

    async fn find_by_task_id(
        &self,
        task_id: TaskId,
        include_deleted: bool,
    ) -> RepositoryResult<Vec<Subtask>> {
        let state = self.read()?;
        let task = state
            .tasks
            .get(&task_id)
            .ok_or(RepositoryError::TaskNotFound(task_id))?;
        Ok(task
            .subtasks()
            .iter()
            .filter(|subtask| include_deleted || !subtask.is_deleted())
            .cloned()
            .collect())
    }

    async fn delete(&self, id: SubtaskId, _deleted_by: &str) -> RepositoryResult<()> {
        let mut state = self.write()?;
        let parent_id = *state
            .parent_index
            .get(&id)
            .ok_or(RepositoryError::SubtaskNotFound(id))?;
        let subtask = state
            .tasks
            .get_mut(&parent_id)
            .and_then(|task| task.subtask_mut(id))
            .filter(|subtask| !subtask.is_deleted())
            .ok_or(RepositoryError::SubtaskNotFound(id))?;
        subtask.delete(&*self.clock);
        Ok(())
    }

    async fn delete_by_task_id(&self, task_id: TaskId, _deleted_by: &str) -> RepositoryResult<()> {
        let mut state = self.write()?;
        let task = state
            .tasks
            .get_mut(&task_id)
            .ok_or(RepositoryError::TaskNotFound(task_id))?;
        task.soft_delete_subtasks_except(&[], &*self.clock);
        Ok(())
    }
}

fn find_live_subtask(state: &StoreState, id: SubtaskId) -> RepositoryResult<&Subtask> {
    state
        .parent_index
        .get(&id)
        .and_then(|parent_id| state.tasks.get(parent_id))
        .and_then(|task| task.subtasks().iter().find(|subtask| subtask.id() == id))
        .filter(|subtask| !subtask.is_deleted())
        .ok_or(RepositoryError::SubtaskNotFound(id))
}
