//! Diesel row models for task and subtask persistence.

use super::schema::{subtasks, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task name.
    pub name: String,
    /// Lifecycle state.
    pub state: String,
    /// Actor who created the task.
    pub created_by: String,
    /// Actor who last updated the task.
    pub updated_by: String,
    /// Optional start timestamp.
    pub start_date: Option<DateTime<Utc>>,
    /// Optional end timestamp.
    pub end_date: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-deletion timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Insert/upsert model for task records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task name.
    pub name: String,
    /// Lifecycle state.
    pub state: String,
    /// Actor who created the task.
    pub created_by: String,
    /// Actor who last updated the task.
    pub updated_by: String,
    /// Optional start timestamp.
    pub start_date: Option<DateTime<Utc>>,
    /// Optional end timestamp.
    pub end_date: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-deletion timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Query result row for subtask records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = subtasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SubtaskRow {
    /// Subtask identifier.
    pub id: uuid::Uuid,
    /// Parent task identifier.
    pub task_id: uuid::Uuid,
    /// Subtask name.
    pub name: String,
    /// Lifecycle state.
    pub state: String,
    /// Optional start timestamp.
    pub start_date: Option<DateTime<Utc>>,
    /// Optional end timestamp.
    pub end_date: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-deletion timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Insert/upsert model for subtask records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = subtasks)]
#[diesel(treat_none_as_null = true)]
pub struct NewSubtaskRow {
    /// Subtask identifier.
    pub id: uuid::Uuid,
    /// Parent task identifier.
    pub task_id: uuid::Uuid,
    /// Subtask name.
    pub name: String,
    /// Lifecycle state.
    pub state: String,
    /// Optional start timestamp.
    pub start_date: Option<DateTime<Utc>>,
    /// Optional end timestamp.
    pub end_date: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-deletion timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
}
