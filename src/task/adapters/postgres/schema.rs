//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Validated task name.
        #[max_length = 256]
        name -> Varchar,
        /// Lifecycle state.
        #[max_length = 50]
        state -> Varchar,
        /// Actor who created the task.
        #[max_length = 256]
        created_by -> Varchar,
        /// Actor who last updated the task.
        #[max_length = 256]
        updated_by -> Varchar,
        /// Optional start timestamp.
        start_date -> Nullable<Timestamptz>,
        /// Optional end timestamp.
        end_date -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Soft-deletion timestamp.
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Subtask records, keyed to their parent task by foreign key.
    subtasks (id) {
        /// Subtask identifier.
        id -> Uuid,
        /// Parent task identifier.
        task_id -> Uuid,
        /// Validated subtask name.
        #[max_length = 256]
        name -> Varchar,
        /// Lifecycle state.
        #[max_length = 50]
        state -> Varchar,
        /// Optional start timestamp.
        start_date -> Nullable<Timestamptz>,
        /// Optional end timestamp.
        end_date -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Soft-deletion timestamp.
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(subtasks -> tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(tasks, subtasks);
