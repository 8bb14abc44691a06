use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::entities::photo;

/// Who is calling, as resolved by the authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerContext {
    pub caller_id: Uuid,
    pub is_admin: bool,
}

/// How variant URLs are resolved when listing photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlMode {
    /// Direct bucket URLs; assumes a public-read policy.
    Public,
    /// Time-limited signed URLs.
    Presigned(Duration),
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct PhotoResponse {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub spot_id: Uuid,
    pub is_main: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_original: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_medium: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_thumbnail: Option<String>,
    #[schema(value_type = String)]
    pub uploaded_by: Uuid,
    pub mime_type: String,
    pub file_size: i64,
    pub created_at: NaiveDateTime,
}

impl From<photo::Model> for PhotoResponse {
    fn from(model: photo::Model) -> Self {
        Self {
            id: model.id,
            spot_id: model.parent_id,
            is_main: model.is_main,
            url_original: None,
            url_medium: None,
            url_thumbnail: None,
            uploaded_by: model.uploader_id,
            mime_type: model.mime_type,
            file_size: model.file_size,
            created_at: model.created_at,
        }
    }
}
