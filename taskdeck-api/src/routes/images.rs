/// Image upload and download
///
/// Uploads are multipart; the stored name is generated server-side and
/// returned to the client, which attaches it to a task via the `image`
/// field. Downloads fall back to a placeholder image when the requested
/// name doesn't resolve, so a task with a stale reference still renders.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Upload response
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Generated filename to store on a task's `image` field
    pub image: String,
}

/// Accepts a multipart file upload and stores it
///
/// The first field carrying a file is used; its original filename only
/// contributes the extension of the generated name.
///
/// # Errors
///
/// - `400 Bad Request`: no file field, or malformed multipart body
/// - `500 Internal Server Error`: filesystem failure
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.file_name().is_none() && field.name() != Some("file") {
            continue;
        }

        let original_filename = field.file_name().map(ToString::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;

        let image = state
            .images
            .save(original_filename.as_deref(), &data)
            .await
            .map_err(|e| ApiError::InternalError(format!("Failed to store image: {}", e)))?;

        tracing::debug!(image = %image, bytes = data.len(), "Image stored");
        return Ok(Json(UploadResponse { image }));
    }

    Err(ApiError::BadRequest("No file field in upload".to_string()))
}

/// Serves a stored image, or the placeholder if it doesn't exist
///
/// # Errors
///
/// - `404 Not Found`: neither the image nor the placeholder exists
pub async fn get_image(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Response> {
    let (path, served_name) = match state.images.resolve(&name).await {
        Some(path) => (path, name),
        None => (
            state.images.placeholder_path(),
            crate::images::PLACEHOLDER.to_string(),
        ),
    };

    let data = tokio::fs::read(&path)
        .await
        .map_err(|_| ApiError::NotFound("Image not found".to_string()))?;

    let response = (
        [(header::CONTENT_TYPE, crate::images::content_type(&served_name))],
        data,
    )
        .into_response();

    Ok(response)
}
