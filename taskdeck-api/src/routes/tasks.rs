/// Owner-scoped task CRUD
///
/// Every handler here runs behind the bearer authentication layer and
/// receives the resolved `CurrentUser` from request extensions. The owner's
/// ID is threaded into every repository call, so a task belonging to another
/// user produces the same 404 as a task that doesn't exist.
///
/// # Endpoints
///
/// - `GET    /tasks?filter=<bool>` - list own tasks, optionally by status
/// - `POST   /tasks`               - create a task
/// - `GET    /tasks/:id`           - read one task
/// - `PUT    /tasks/:id`           - partial update
/// - `DELETE /tasks/:id`           - delete, returning the deleted task

use crate::{
    app::{AppState, CurrentUser},
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use taskdeck_shared::models::task::{CreateTask, Task, UpdateTask};

/// Query parameters for listing tasks
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// Completion-status filter; absent means all tasks
    pub filter: Option<bool>,
}

/// Lists the authenticated user's tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = Task::list(&state.db, user.id, query.filter).await?;
    Ok(Json(tasks))
}

/// Creates a task owned by the authenticated user
pub async fn create_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateTask>,
) -> ApiResult<Json<Task>> {
    let task = Task::create(&state.db, user.id, req).await?;

    tracing::debug!(task_id = task.id, owner_id = user.id, "Task created");
    Ok(Json(task))
}

/// Reads one of the authenticated user's tasks
pub async fn get_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_by_id(&state.db, id, user.id)
        .await?
        .ok_or_else(task_not_found)?;

    Ok(Json(task))
}

/// Partially updates one of the authenticated user's tasks
///
/// Only fields present in the body overwrite stored values; a present
/// `"completed": false` is applied, and `"date": null` / `"image": null`
/// clear those fields.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTask>,
) -> ApiResult<Json<Task>> {
    let task = Task::update(&state.db, id, user.id, req)
        .await?
        .ok_or_else(task_not_found)?;

    Ok(Json(task))
}

/// Deletes one of the authenticated user's tasks, returning it
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Task>> {
    let task = Task::delete(&state.db, id, user.id)
        .await?
        .ok_or_else(task_not_found)?;

    tracing::debug!(task_id = id, owner_id = user.id, "Task deleted");
    Ok(Json(task))
}

/// Same 404 for "absent" and "not yours"
fn task_not_found() -> ApiError {
    ApiError::NotFound("Task not found".to_string())
}
