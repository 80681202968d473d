//! `PostgreSQL` repository implementation for task lifecycle storage.

use super::{
    models::{NewSubtaskRow, NewTaskRow, SubtaskRow, TaskRow},
    schema::{subtasks, tasks},
};
use crate::task::{
    domain::{
        PersistedSubtaskData, PersistedTaskData, State, Subtask, SubtaskId, Task, TaskId, TaskName,
    },
    ports::{
        RepositoryError, RepositoryResult, SubtaskRepository, TaskFilters, TaskPage,
        TaskRepository,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        Self::database(err)
    }
}

/// `PostgreSQL`-backed task and subtask store.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: TaskPgPool,
}

impl PostgresStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> RepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(RepositoryError::unavailable)?;
            f(&mut connection)
        })
        .await
        .map_err(RepositoryError::database)?
    }
}

#[async_trait]
impl TaskRepository for PostgresStore {
    async fn create(&self, task: &Task) -> RepositoryResult<()> {
        let task_row = to_task_row(task);
        let subtask_rows: Vec<NewSubtaskRow> = task
            .subtasks()
            .iter()
            .map(|subtask| to_subtask_row(task.id(), subtask))
            .collect();

        self.run_blocking(move |connection| {
            connection.transaction::<_, RepositoryError, _>(|tx_conn| {
                diesel::insert_into(tasks::table)
                    .values(&task_row)
                    .execute(tx_conn)?;
                if !subtask_rows.is_empty() {
                    diesel::insert_into(subtasks::table)
                        .values(&subtask_rows)
                        .execute(tx_conn)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn update(&self, task: &Task) -> RepositoryResult<()> {
        let task_id = task.id();
        let task_row = to_task_row(task);
        let subtask_rows: Vec<NewSubtaskRow> = task
            .subtasks()
            .iter()
            .map(|subtask| to_subtask_row(task_id, subtask))
            .collect();

        self.run_blocking(move |connection| {
            connection.transaction::<_, RepositoryError, _>(|tx_conn| {
                let updated = diesel::update(
                    tasks::table
                        .find(task_id.into_inner())
                        .filter(tasks::deleted_at.is_null()),
                )
                .set(&task_row)
                .execute(tx_conn)?;
                if updated == 0 {
                    return Err(RepositoryError::TaskNotFound(task_id));
                }

                // Upsert keeps subtasks added during reconciliation in the
                // same transaction as the aggregate update.
                for row in &subtask_rows {
                    diesel::insert_into(subtasks::table)
                        .values(row)
                        .on_conflict(subtasks::id)
                        .do_update()
                        .set(row)
                        .execute(tx_conn)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> RepositoryResult<Task> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .filter(tasks::deleted_at.is_null())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(RepositoryError::database)?
                .ok_or(RepositoryError::TaskNotFound(id))?;

            let subtask_rows = subtasks::table
                .filter(subtasks::task_id.eq(id.into_inner()))
                .order(subtasks::created_at.asc())
                .select(SubtaskRow::as_select())
                .load::<SubtaskRow>(connection)
                .map_err(RepositoryError::database)?;

            row_to_task(row, subtask_rows)
        })
        .await
    }

    async fn find_all(&self, filters: &TaskFilters) -> RepositoryResult<TaskPage> {
        let filters = filters.clone();
        self.run_blocking(move |connection| {
            let page = filters.page.max(1);
            let limit = filters.limit.max(1);

            let total = i64_to_u64(
                filtered_tasks(&filters)
                    .count()
                    .get_result::<i64>(connection)
                    .map_err(RepositoryError::database)?,
            );

            let offset = (i64::from(page) - 1) * i64::from(limit);
            let rows = filtered_tasks(&filters)
                .order(tasks::created_at.desc())
                .offset(offset)
                .limit(i64::from(limit))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(RepositoryError::database)?;

            let task_ids: Vec<uuid::Uuid> = rows.iter().map(|row| row.id).collect();
            let mut children: std::collections::HashMap<uuid::Uuid, Vec<SubtaskRow>> =
                std::collections::HashMap::new();
            if !task_ids.is_empty() {
                let subtask_rows = subtasks::table
                    .filter(subtasks::task_id.eq_any(&task_ids))
                    .order(subtasks::created_at.asc())
                    .select(SubtaskRow::as_select())
                    .load::<SubtaskRow>(connection)
                    .map_err(RepositoryError::database)?;
                for subtask_row in subtask_rows {
                    children
                        .entry(subtask_row.task_id)
                        .or_default()
                        .push(subtask_row);
                }
            }

            let task_list = rows
                .into_iter()
                .map(|row| {
                    let owned = children.remove(&row.id).unwrap_or_default();
                    row_to_task(row, owned)
                })
                .collect::<RepositoryResult<Vec<Task>>>()?;

            Ok(TaskPage {
                tasks: task_list,
                total,
                page,
                limit,
                total_pages: total.div_ceil(u64::from(limit)),
            })
        })
        .await
    }

    async fn delete(&self, id: TaskId, deleted_by: &str) -> RepositoryResult<()> {
        let deleted_by = deleted_by.to_owned();
        self.run_blocking(move |connection| {
            connection.transaction::<_, RepositoryError, _>(|tx_conn| {
                let now = Utc::now();
                let updated = diesel::update(
                    tasks::table
                        .find(id.into_inner())
                        .filter(tasks::deleted_at.is_null()),
                )
                .set((
                    tasks::deleted_at.eq(now),
                    tasks::updated_at.eq(now),
                    tasks::updated_by.eq(&deleted_by),
                ))
                .execute(tx_conn)?;
                if updated == 0 {
                    return Err(RepositoryError::TaskNotFound(id));
                }

                diesel::update(
                    subtasks::table
                        .filter(subtasks::task_id.eq(id.into_inner()))
                        .filter(subtasks::deleted_at.is_null()),
                )
                .set((subtasks::deleted_at.eq(now), subtasks::updated_at.eq(now)))
                .execute(tx_conn)?;
                Ok(())
            })
        })
        .await
    }

    async fn hard_delete_before(&self, cutoff: DateTime<Utc>) -> RepositoryResult<u64> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, RepositoryError, _>(|tx_conn| {
                let doomed: Vec<uuid::Uuid> = tasks::table
                    .filter(tasks::deleted_at.lt(cutoff))
                    .select(tasks::id)
                    .load::<uuid::Uuid>(tx_conn)?;
                if doomed.is_empty() {
                    return Ok(0);
                }

                diesel::delete(subtasks::table.filter(subtasks::task_id.eq_any(&doomed)))
                    .execute(tx_conn)?;
                let purged = diesel::delete(tasks::table.filter(tasks::id.eq_any(&doomed)))
                    .execute(tx_conn)?;
                Ok(u64::try_from(purged).unwrap_or(u64::MAX))
            })
        })
        .await
    }
}

#[async_trait]
impl SubtaskRepository for PostgresStore {
    async fn create(&self, task_id: TaskId, subtask: &Subtask) -> RepositoryResult<()> {
        let row = to_subtask_row(task_id, subtask);
        self.run_blocking(move |connection| {
            diesel::insert_into(subtasks::table)
                .values(&row)
                .execute(connection)
                .map_err(RepositoryError::database)?;
            Ok(())
        })
        .await
    }

    async fn update(&self, subtask: &Subtask) -> RepositoryResult<()> {
        let id = subtask.id();
        let name = subtask.name().as_str().to_owned();
        let state = subtask.state().as_str().to_owned();
        let start_date = subtask.start_date();
        let end_date = subtask.end_date();
        let updated_at = subtask.updated_at();
        let deleted_at = subtask.deleted_at();

        self.run_blocking(move |connection| {
            let updated = diesel::update(
                subtasks::table
                    .find(id.into_inner())
                    .filter(subtasks::deleted_at.is_null()),
            )
            .set((
                subtasks::name.eq(name),
                subtasks::state.eq(state),
                subtasks::start_date.eq(start_date),
                subtasks::end_date.eq(end_date),
                subtasks::updated_at.eq(updated_at),
                subtasks::deleted_at.eq(deleted_at),
            ))
            .execute(connection)
            .map_err(RepositoryError::database)?;
            if updated == 0 {
                return Err(RepositoryError::SubtaskNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: SubtaskId) -> RepositoryResult<Subtask> {
        self.run_blocking(move |connection| {
            let row = subtasks::table
                .find(id.into_inner())
                .filter(subtasks::deleted_at.is_null())
                .select(SubtaskRow::as_select())
                .first::<SubtaskRow>(connection)
                .optional()
                .map_err(RepositoryError::database)?
                .ok_or(RepositoryError::SubtaskNotFound(id))?;
            row_to_subtask(row)
        })
        .await
    }

    async fn find_parent_task_id(&self, id: SubtaskId) -> RepositoryResult<TaskId> {
        self.run_blocking(move |connection| {
            let parent = subtasks::table
                .find(id.into_inner())
                .filter(subtasks::deleted_at.is_null())
                .select(subtasks::task_id)
                .first::<uuid::Uuid>(connection)
                .optional()
                .map_err(RepositoryError::database)?
                .ok_or(RepositoryError::SubtaskNotFound(id))?;
            Ok(TaskId::from_uuid(parent))
        })
        .await
    }

    async fn find_by_task_id(
        &self,
        task_id: TaskId,
        include_deleted: bool,
    ) -> RepositoryResult<Vec<Subtask>> {
        self.run_blocking(move |connection| {
            let mut query = subtasks::table
                .filter(subtasks::task_id.eq(task_id.into_inner()))
                .into_boxed();
            if !include_deleted {
                query = query.filter(subtasks::deleted_at.is_null());
            }
            query
                .order(subtasks::created_at.asc())
                .select(SubtaskRow::as_select())
                .load::<SubtaskRow>(connection)
                .map_err(RepositoryError::database)?
                .into_iter()
                .map(row_to_subtask)
                .collect()
        })
        .await
    }

    async fn delete(&self, id: SubtaskId, _deleted_by: &str) -> RepositoryResult<()> {
        self.run_blocking(move |connection| {
            let now = Utc::now();
            let updated = diesel::update(
                subtasks::table
                    .find(id.into_inner())
                    .filter(subtasks::deleted_at.is_null()),
            )
            .set((subtasks::deleted_at.eq(now), subtasks::updated_at.eq(now)))
            .execute(connection)
            .map_err(RepositoryError::database)?;
            if updated == 0 {
                return Err(RepositoryError::SubtaskNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_by_task_id(&self, task_id: TaskId, _deleted_by: &str) -> RepositoryResult<()> {
        self.run_blocking(move |connection| {
            let now = Utc::now();
            diesel::update(
                subtasks::table
                    .filter(subtasks::task_id.eq(task_id.into_inner()))
                    .filter(subtasks::deleted_at.is_null()),
            )
            .set((subtasks::deleted_at.eq(now), subtasks::updated_at.eq(now)))
            .execute(connection)
            .map_err(RepositoryError::database)?;
            Ok(())
        })
        .await
    }
}

type BoxedTaskQuery = tasks::BoxedQuery<'static, diesel::pg::Pg>;

fn filtered_tasks(filters: &TaskFilters) -> BoxedTaskQuery {
    let mut query = tasks::table.into_boxed();
    if !filters.include_deleted {
        query = query.filter(tasks::deleted_at.is_null());
    }
    if let Some(state) = filters.state {
        query = query.filter(tasks::state.eq(state.as_str()));
    }
    if let Some(needle) = &filters.name_contains {
        query = query.filter(tasks::name.ilike(format!("%{needle}%")));
    }
    query
}

fn to_task_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        name: task.name().as_str().to_owned(),
        state: task.state().as_str().to_owned(),
        created_by: task.created_by().to_owned(),
        updated_by: task.updated_by().to_owned(),
        start_date: task.start_date(),
        end_date: task.end_date(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
        deleted_at: task.deleted_at(),
    }
}

fn to_subtask_row(task_id: TaskId, subtask: &Subtask) -> NewSubtaskRow {
    NewSubtaskRow {
        id: subtask.id().into_inner(),
        task_id: task_id.into_inner(),
        name: subtask.name().as_str().to_owned(),
        state: subtask.state().as_str().to_owned(),
        start_date: subtask.start_date(),
        end_date: subtask.end_date(),
        created_at: subtask.created_at(),
        updated_at: subtask.updated_at(),
        deleted_at: subtask.deleted_at(),
    }
}

fn row_to_task(row: TaskRow, subtask_rows: Vec<SubtaskRow>) -> RepositoryResult<Task> {
    let owned = subtask_rows
        .into_iter()
        .map(row_to_subtask)
        .collect::<RepositoryResult<Vec<Subtask>>>()?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        name: TaskName::new(row.name).map_err(RepositoryError::database)?,
        state: State::try_from(row.state.as_str()).map_err(RepositoryError::database)?,
        subtasks: owned,
        created_by: row.created_by,
        updated_by: row.updated_by,
        start_date: row.start_date,
        end_date: row.end_date,
        created_at: row.created_at,
        updated_at: row.updated_at,
        deleted_at: row.deleted_at,
    };
    Ok(Task::from_persisted(data))
}

fn row_to_subtask(row: SubtaskRow) -> RepositoryResult<Subtask> {
    let data = PersistedSubtaskData {
        id: SubtaskId::from_uuid(row.id),
        name: TaskName::new(row.name).map_err(RepositoryError::database)?,
        state: State::try_from(row.state.as_str()).map_err(RepositoryError::database)?,
        start_date: row.start_date,
        end_date: row.end_date,
        created_at: row.created_at,
        updated_at: row.updated_at,
        deleted_at: row.deleted_at,
    };
    Ok(Subtask::from_persisted(data))
}

fn i64_to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
