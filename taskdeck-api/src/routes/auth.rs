/// Login / token issuance
///
/// # Endpoint
///
/// ```text
/// POST /token
/// Content-Type: application/x-www-form-urlencoded
///
/// username=alice&password=secret
/// ```
///
/// # Response
///
/// ```json
/// {
///   "access_token": "eyJ...",
///   "token_type": "bearer"
/// }
/// ```
///
/// Bad credentials return 401 with a `WWW-Authenticate: Bearer` header. The
/// response does not reveal whether the username or the password was wrong.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Form, Json};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::{jwt, password},
    models::user::User,
};

/// Login form body
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Username
    pub username: String,

    /// Plaintext password, verified against the stored hash
    pub password: String,
}

/// Token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed bearer token
    pub access_token: String,

    /// Always "bearer"
    pub token_type: String,
}

/// Authenticates form credentials and mints an access token
///
/// # Errors
///
/// - `401 Unauthorized`: unknown username or wrong password
/// - `500 Internal Server Error`: hashing or signing failure
pub async fn login_for_access_token(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<TokenResponse>> {
    let user = User::find_by_username(&state.db, &form.username)
        .await?
        .ok_or_else(bad_credentials)?;

    if !password::verify_password(&form.password, &user.password_hash) {
        return Err(bad_credentials());
    }

    let claims = jwt::Claims::new(&user.username, state.token_ttl());
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// Identical response for unknown username and wrong password
fn bad_credentials() -> ApiError {
    ApiError::Unauthorized("Incorrect username or password".to_string())
}
