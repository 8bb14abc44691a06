use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::photo::{CallerContext, PhotoResponse, UrlMode};
use crate::routes::AppState;

#[derive(Deserialize, utoipa::IntoParams)]
pub struct PhotoUrlQuery {
    /// `original`, `medium` or `thumbnail`; anything else yields medium.
    pub size: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PhotoUrlResponse {
    pub url: String,
}

#[utoipa::path(
    post,
    path = "/spots/{spot_id}/photos",
    tag = "Photos",
    params(("spot_id" = String, Path, description = "Spot id")),
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Photo uploaded", body = PhotoResponse),
        (status = 400, description = "Invalid file"),
        (status = 404, description = "Spot not found"),
        (status = 409, description = "Photo limit reached"),
        (status = 422, description = "Image could not be decoded"),
        (status = 500, description = "Internal Server Error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path(spot_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<PhotoResponse>), AppError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut is_main = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::BadRequest("Invalid multipart data".to_string()))?
    {
        match field.name() {
            Some("file") => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::BadRequest("Failed to read file bytes".to_string()))?;
                file = Some((content_type, data.to_vec()));
            }
            Some("is_main") => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::BadRequest("Invalid is_main field".to_string()))?;
                is_main = matches!(value.trim(), "true" | "1");
            }
            _ => {}
        }
    }

    let Some((content_type, data)) = file else {
        tracing::info!(spot_id = %spot_id, "Upload rejected, no file field found");
        return Err(AppError::BadRequest("No file field found".to_string()));
    };

    let photo = state
        .photos
        .upload(spot_id, caller.caller_id, data, &content_type, is_main)
        .await?;

    Ok((StatusCode::CREATED, Json(photo)))
}

#[utoipa::path(
    get,
    path = "/spots/{spot_id}/photos",
    tag = "Photos",
    params(("spot_id" = String, Path, description = "Spot id")),
    responses(
        (status = 200, description = "Photos of the spot", body = Vec<PhotoResponse>),
        (status = 500, description = "Internal Server Error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_photos(
    State(state): State<AppState>,
    Path(spot_id): Path<Uuid>,
) -> Result<Json<Vec<PhotoResponse>>, AppError> {
    let photos = state.photos.list_by_parent(spot_id, UrlMode::Public).await?;
    Ok(Json(photos))
}

#[utoipa::path(
    delete,
    path = "/photos/{photo_id}",
    tag = "Photos",
    params(("photo_id" = String, Path, description = "Photo id")),
    responses(
        (status = 204, description = "Photo deleted"),
        (status = 403, description = "Not the uploader"),
        (status = 404, description = "Photo not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_photo(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path(photo_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.photos.delete(photo_id, caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/photos/{photo_id}/main",
    tag = "Photos",
    params(("photo_id" = String, Path, description = "Photo id")),
    responses(
        (status = 204, description = "Main photo updated"),
        (status = 403, description = "Not the spot owner"),
        (status = 404, description = "Photo or spot not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_main_photo(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path(photo_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.photos.set_main_photo(photo_id, caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/photos/{photo_id}/url",
    tag = "Photos",
    params(
        ("photo_id" = String, Path, description = "Photo id"),
        PhotoUrlQuery
    ),
    responses(
        (status = 200, description = "Presigned URL, valid for one hour", body = PhotoUrlResponse),
        (status = 404, description = "Photo not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn photo_url(
    State(state): State<AppState>,
    Path(photo_id): Path<Uuid>,
    Query(query): Query<PhotoUrlQuery>,
) -> Result<Json<PhotoUrlResponse>, AppError> {
    let size = query.size.as_deref().unwrap_or("medium");
    let url = state.photos.presigned_url(photo_id, size).await?;
    Ok(Json(PhotoUrlResponse { url }))
}
