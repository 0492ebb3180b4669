/// Task model and database operations
///
/// Tasks are personal records: every operation here is parameterized by the
/// owner's user ID, and a task belonging to someone else is indistinguishable
/// from a task that doesn't exist. That contract is enforced in the SQL
/// (`WHERE id = $1 AND owner_id = $2`), not in handler code.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     date TIMESTAMPTZ,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     image VARCHAR(512),
///     owner_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Partial Updates
///
/// `UpdateTask` distinguishes "field omitted" from "field set to null" with
/// an `Option<Option<T>>` wrapper on the nullable columns, so a request can
/// clear `date` or `image` without accidentally clearing everything else,
/// and `completed: false` is a real update rather than a no-op.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::PgPool;

/// Task record owned by exactly one user
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: i64,

    /// Short title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Optional due date
    pub date: Option<DateTime<Utc>>,

    /// Completion flag, false for new tasks
    pub completed: bool,

    /// Optional reference to an uploaded image (generated filename)
    pub image: Option<String>,

    /// Owning user; internal, not exposed in responses
    #[serde(skip_serializing)]
    pub owner_id: i64,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Short title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Optional due date
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,

    /// Completion flag (defaults to false)
    #[serde(default)]
    pub completed: bool,

    /// Optional image reference
    #[serde(default)]
    pub image: Option<String>,
}

/// Input for partially updating a task
///
/// Outer `None` means the field was omitted and the stored value is left
/// untouched. For `date` and `image` an inner `None` means the field was
/// explicitly set to null and the stored value is cleared.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New due date; `Some(None)` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub date: Option<Option<DateTime<Utc>>>,

    /// New completion flag; `Some(false)` is an explicit update
    pub completed: Option<bool>,

    /// New image reference; `Some(None)` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
}

/// Deserializes a present-but-possibly-null field into `Some(inner)`
///
/// Combined with `#[serde(default)]`, an absent field stays `None` while a
/// null field becomes `Some(None)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

impl UpdateTask {
    /// True if no field was supplied at all
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.completed.is_none()
            && self.image.is_none()
    }
}

impl Task {
    /// Creates a new task owned by `owner_id`
    pub async fn create(
        pool: &PgPool,
        owner_id: i64,
        data: CreateTask,
    ) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, date, completed, image, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, description, date, completed, image, owner_id, created_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.date)
        .bind(data.completed)
        .bind(data.image)
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Lists tasks belonging to `owner_id`
    ///
    /// `completed` narrows the result to tasks with that completion status;
    /// `None` returns all of the owner's tasks.
    pub async fn list(
        pool: &PgPool,
        owner_id: i64,
        completed: Option<bool>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = match completed {
            Some(flag) => {
                sqlx::query_as::<_, Task>(
                    r#"
                    SELECT id, title, description, date, completed, image, owner_id, created_at
                    FROM tasks
                    WHERE owner_id = $1 AND completed = $2
                    ORDER BY created_at, id
                    "#,
                )
                .bind(owner_id)
                .bind(flag)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Task>(
                    r#"
                    SELECT id, title, description, date, completed, image, owner_id, created_at
                    FROM tasks
                    WHERE owner_id = $1
                    ORDER BY created_at, id
                    "#,
                )
                .bind(owner_id)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(tasks)
    }

    /// Finds one of `owner_id`'s tasks by ID
    ///
    /// Returns `None` both when the task doesn't exist and when it belongs
    /// to a different user.
    pub async fn find_by_id(
        pool: &PgPool,
        id: i64,
        owner_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, date, completed, image, owner_id, created_at
            FROM tasks
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Applies a partial update to one of `owner_id`'s tasks
    ///
    /// Only supplied fields overwrite stored values. Returns the updated
    /// task, or `None` if the task is absent or owned by someone else.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        owner_id: i64,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.is_empty() {
            return Self::find_by_id(pool, id, owner_id).await;
        }

        // Build the UPDATE dynamically from the supplied fields
        let mut assignments: Vec<String> = Vec::new();
        let mut bind_count = 2;

        if data.title.is_some() {
            bind_count += 1;
            assignments.push(format!("title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            assignments.push(format!("description = ${}", bind_count));
        }
        if data.date.is_some() {
            bind_count += 1;
            assignments.push(format!("date = ${}", bind_count));
        }
        if data.completed.is_some() {
            bind_count += 1;
            assignments.push(format!("completed = ${}", bind_count));
        }
        if data.image.is_some() {
            bind_count += 1;
            assignments.push(format!("image = ${}", bind_count));
        }

        let query = format!(
            "UPDATE tasks SET {} WHERE id = $1 AND owner_id = $2 \
             RETURNING id, title, description, date, completed, image, owner_id, created_at",
            assignments.join(", "),
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id).bind(owner_id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(date) = data.date {
            q = q.bind(date);
        }
        if let Some(completed) = data.completed {
            q = q.bind(completed);
        }
        if let Some(image) = data.image {
            q = q.bind(image);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes one of `owner_id`'s tasks
    ///
    /// Returns the deleted task, or `None` if the task is absent or owned by
    /// someone else.
    pub async fn delete(
        pool: &PgPool,
        id: i64,
        owner_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            DELETE FROM tasks
            WHERE id = $1 AND owner_id = $2
            RETURNING id, title, description, date, completed, image, owner_id, created_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_task_defaults() {
        let task: CreateTask =
            serde_json::from_str(r#"{"title": "Buy milk", "description": "2%"}"#).unwrap();

        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, "2%");
        assert!(!task.completed);
        assert!(task.date.is_none());
        assert!(task.image.is_none());
    }

    #[test]
    fn test_update_task_empty() {
        let update: UpdateTask = serde_json::from_str("{}").unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_update_completed_false_is_present() {
        // A present-but-false flag must be an explicit update, not a no-op
        let update: UpdateTask = serde_json::from_str(r#"{"completed": false}"#).unwrap();

        assert_eq!(update.completed, Some(false));
        assert!(!update.is_empty());
    }

    #[test]
    fn test_update_omitted_vs_null_image() {
        let omitted: UpdateTask = serde_json::from_str(r#"{"title": "T"}"#).unwrap();
        assert!(omitted.image.is_none());

        let cleared: UpdateTask = serde_json::from_str(r#"{"image": null}"#).unwrap();
        assert_eq!(cleared.image, Some(None));

        let set: UpdateTask = serde_json::from_str(r#"{"image": "abc.png"}"#).unwrap();
        assert_eq!(set.image, Some(Some("abc.png".to_string())));
    }

    #[test]
    fn test_update_omitted_vs_null_date() {
        let omitted: UpdateTask = serde_json::from_str("{}").unwrap();
        assert!(omitted.date.is_none());

        let cleared: UpdateTask = serde_json::from_str(r#"{"date": null}"#).unwrap();
        assert_eq!(cleared.date, Some(None));
    }

    #[test]
    fn test_owner_id_not_serialized() {
        let task = Task {
            id: 7,
            title: "T".to_string(),
            description: "D".to_string(),
            date: None,
            completed: false,
            image: None,
            owner_id: 42,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("owner_id").is_none());
        assert_eq!(json["id"], 7);
        assert_eq!(json["completed"], false);
    }
}
