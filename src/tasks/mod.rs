//! Task lifecycle: list, create, toggle, delete.
//!
//! Ownership rules live in the SQL itself. A task is visible to a visitor
//! when its `owner_id` matches the visitor's token or is NULL (a "legacy"
//! row predating ownership tracking). Mutations are permitted under the
//! same predicate; a permitted toggle of a NULL-owner row claims it for
//! the acting visitor ("adoption") atomically with the completion flip.
//! Adoption is the only transition owner_id ever makes once set.

use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::identity::VisitorId;

#[derive(Debug, Error)]
pub enum TaskError {
    /// The referenced task id does not exist.
    #[error("task not found")]
    NotFound,
    /// The task is owned by a different visitor. Deliberately generic — it
    /// never distinguishes "exists but not yours" beyond what a 404 would.
    #[error("not authorized")]
    Unauthorized,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct TaskRow {
    pub id: i64,
    pub title: String,
    pub is_complete: bool,
    /// NULL for rows created before ownership tracking existed.
    pub owner_id: Option<String>,
}

#[derive(Clone)]
pub struct TaskStore {
    pool: SqlitePool,
}

impl TaskStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All tasks the visitor may see, in id order.
    pub async fn list_visible(&self, visitor: &VisitorId) -> Result<Vec<TaskRow>, TaskError> {
        Ok(sqlx::query_as(
            "SELECT id, title, is_complete, owner_id FROM tasks
             WHERE owner_id IS NULL OR owner_id = ?
             ORDER BY id ASC",
        )
        .bind(visitor.as_str())
        .fetch_all(&self.pool)
        .await?)
    }

    /// Insert a new task owned by the visitor. Any title is accepted,
    /// including the empty string.
    pub async fn create(&self, title: &str, visitor: &VisitorId) -> Result<TaskRow, TaskError> {
        let result = sqlx::query(
            "INSERT INTO tasks (title, is_complete, owner_id) VALUES (?, 0, ?)",
        )
        .bind(title)
        .bind(visitor.as_str())
        .execute(&self.pool)
        .await?;
        self.get(result.last_insert_rowid())
            .await?
            .ok_or(TaskError::NotFound)
    }

    pub async fn get(&self, id: i64) -> Result<Option<TaskRow>, TaskError> {
        Ok(
            sqlx::query_as("SELECT id, title, is_complete, owner_id FROM tasks WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Flip a task's completion state, adopting it when unowned.
    ///
    /// The ownership check, the flip, and the adoption are one guarded
    /// UPDATE, so a concurrent adoption by another visitor cannot slip
    /// between the check and the write.
    pub async fn toggle(&self, id: i64, visitor: &VisitorId) -> Result<TaskRow, TaskError> {
        let result = sqlx::query(
            "UPDATE tasks
             SET is_complete = 1 - is_complete,
                 owner_id = COALESCE(owner_id, ?)
             WHERE id = ? AND (owner_id IS NULL OR owner_id = ?)",
        )
        .bind(visitor.as_str())
        .bind(id)
        .bind(visitor.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.missing_or_foreign(id).await?);
        }
        self.get(id).await?.ok_or(TaskError::NotFound)
    }

    /// Remove a task permanently. Unowned tasks may be deleted by anyone,
    /// but delete never adopts.
    pub async fn delete(&self, id: i64, visitor: &VisitorId) -> Result<(), TaskError> {
        let result = sqlx::query(
            "DELETE FROM tasks WHERE id = ? AND (owner_id IS NULL OR owner_id = ?)",
        )
        .bind(id)
        .bind(visitor.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.missing_or_foreign(id).await?);
        }
        Ok(())
    }

    /// A guarded mutation matched no row: either the task does not exist
    /// (NotFound) or it belongs to another visitor (Unauthorized).
    async fn missing_or_foreign(&self, id: i64) -> Result<TaskError, TaskError> {
        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(match exists {
            Some(_) => TaskError::Unauthorized,
            None => TaskError::NotFound,
        })
    }
}
