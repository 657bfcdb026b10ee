//! Diesel schema for project and task persistence.

diesel::table! {
    /// Project records, unique per (owner, name).
    projects (id) {
        /// Project identifier.
        id -> Uuid,
        /// Project name, case preserved.
        #[max_length = 150]
        name -> Varchar,
        /// Identifier of the owning user.
        owner_id -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last rename timestamp.
        updated_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Task records owned by a project.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Task title.
        #[max_length = 100]
        title -> Varchar,
        /// Optional task description.
        #[max_length = 500]
        description -> Nullable<Varchar>,
        /// Due date.
        due_date -> Timestamptz,
        /// Completion timestamp, set when the task first completes.
        completed_at -> Nullable<Timestamptz>,
        /// Priority, fixed at creation.
        #[max_length = 20]
        priority -> Varchar,
        /// Current status.
        #[max_length = 20]
        status -> Varchar,
        /// Identifier of the owning project.
        project_id -> Uuid,
    }
}

diesel::table! {
    /// Comments attached to tasks.
    task_comments (id) {
        /// Comment identifier.
        id -> Uuid,
        /// Identifier of the owning task.
        task_id -> Uuid,
        /// Comment content.
        #[max_length = 1000]
        content -> Varchar,
        /// Identifier of the comment author.
        author_id -> Uuid,
        /// Creation timestamp.
        posted_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit records of task-affecting actions.
    task_history (id) {
        /// History identifier.
        id -> Uuid,
        /// Identifier of the owning task.
        task_id -> Uuid,
        /// Change note.
        #[max_length = 500]
        note -> Varchar,
        /// Status snapshot at write time.
        #[max_length = 20]
        status -> Varchar,
        /// Priority snapshot at write time.
        #[max_length = 20]
        priority -> Varchar,
        /// Identifier of the acting user.
        author_id -> Uuid,
        /// Write timestamp.
        recorded_at -> Timestamptz,
    }
}

diesel::joinable!(tasks -> projects (project_id));
diesel::joinable!(task_comments -> tasks (task_id));
diesel::joinable!(task_history -> tasks (task_id));

diesel::allow_tables_to_appear_in_same_query!(projects, tasks, task_comments, task_history);
