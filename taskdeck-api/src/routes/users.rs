/// User registration
///
/// # Endpoint
///
/// ```text
/// POST /users
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "secret",
///   "repeat_password": "secret"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "id": 1,
///   "username": "alice",
///   "tasks": []
/// }
/// ```
///
/// Duplicate usernames are caught by the database's unique constraint, not
/// by a lookup, so concurrent registrations for the same name yield exactly
/// one success and one 400.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::password,
    models::{
        task::Task,
        user::{CreateUser, User},
    },
};
use validator::Validate;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Desired username
    #[validate(length(min = 1, max = 255, message = "Username must be 1-255 characters"))]
    pub username: String,

    /// Plaintext password (hashed before storage, never logged)
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,

    /// Must match `password`
    pub repeat_password: String,
}

/// Registration response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// Generated user ID
    pub id: i64,

    /// Username as registered
    pub username: String,

    /// The user's tasks, always empty at registration
    pub tasks: Vec<Task>,
}

/// Registers a new user
///
/// # Errors
///
/// - `400 Bad Request`: empty fields, mismatched passwords, or username taken
/// - `500 Internal Server Error`: hashing or database failure
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate()?;

    if req.password != req.repeat_password {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "repeat_password".to_string(),
            message: "Passwords must match".to_string(),
        }]));
    }

    let password_hash = password::hash_password(&req.password)?;

    // A duplicate username surfaces here as a unique violation and maps to 400
    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            password_hash,
        },
    )
    .await?;

    Ok(Json(UserResponse {
        id: user.id,
        username: user.username,
        tasks: Vec::new(),
    }))
}
