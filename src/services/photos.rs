//! Photo lifecycle orchestration.
//!
//! Metadata and binaries live in two stores that share no transaction. Every
//! upload first creates a pending record, then writes all variants, then
//! commits the three paths in a single update. Until that update lands the
//! photo is invisible, and any failure along the way rolls back by hand.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::entities::photo;
use crate::error::{DecodeError, NotFoundError, PhotoError, PhotoResult, ValidationError};
use crate::models::photo::{CallerContext, PhotoResponse, UrlMode};
use crate::models::variant::Variant;
use crate::services::object_store::ObjectStore;
use crate::services::parents::ParentRepository;
use crate::services::photo_store::PhotoStore;
use crate::utils::image_processor::{self, OUTPUT_MIME_TYPE};
use crate::utils::photo_key;

pub const MAX_PHOTOS_PER_PARENT: u64 = 10;
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;
pub const PRESIGNED_URL_TTL: Duration = Duration::from_secs(60 * 60);

const ALLOWED_CONTENT_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

pub fn is_allowed_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_CONTENT_TYPES.contains(&essence.as_str())
}

#[derive(Clone)]
pub struct PhotoService {
    store: PhotoStore,
    parents: Arc<dyn ParentRepository>,
    storage: Arc<dyn ObjectStore>,
    parent_type: String,
}

impl PhotoService {
    pub fn new(
        store: PhotoStore,
        parents: Arc<dyn ParentRepository>,
        storage: Arc<dyn ObjectStore>,
        parent_type: impl Into<String>,
    ) -> Self {
        Self {
            store,
            parents,
            storage,
            parent_type: parent_type.into(),
        }
    }

    pub fn store(&self) -> &PhotoStore {
        &self.store
    }

    #[tracing::instrument(skip(self, data), fields(size = data.len()))]
    pub async fn upload(
        &self,
        parent_id: Uuid,
        uploader_id: Uuid,
        data: Vec<u8>,
        content_type: &str,
        requested_is_main: bool,
    ) -> PhotoResult<PhotoResponse> {
        if self.parents.find_by_id(parent_id).await?.is_none() {
            return Err(NotFoundError::Parent(parent_id).into());
        }

        let count = self.store.count_by_parent_id(parent_id).await?;
        if count >= MAX_PHOTOS_PER_PARENT {
            return Err(PhotoError::LimitExceeded {
                parent_id,
                max: MAX_PHOTOS_PER_PARENT,
            });
        }

        if data.len() > MAX_FILE_SIZE {
            return Err(ValidationError::FileTooLarge {
                size: data.len(),
                max: MAX_FILE_SIZE,
            }
            .into());
        }

        if !is_allowed_content_type(content_type) {
            return Err(ValidationError::InvalidFileType(content_type.to_string()).into());
        }

        let mut photo = self
            .store
            .create(parent_id, uploader_id, OUTPUT_MIME_TYPE)
            .await?;

        let processed = match tokio::task::spawn_blocking(move || image_processor::process_image(&data)).await {
            Ok(Ok(processed)) => processed,
            Ok(Err(e)) => {
                tracing::warn!(photo_id = %photo.id, error = %e, "Rejecting undecodable upload");
                self.roll_back(&photo, &[]).await;
                return Err(e.into());
            }
            Err(e) => {
                self.roll_back(&photo, &[]).await;
                return Err(DecodeError(format!("image task failed: {}", e)).into());
            }
        };

        let file_size = processed.original.len() as i64;
        let mut uploaded: Vec<String> = Vec::with_capacity(Variant::ALL.len());

        for (variant, bytes) in processed.into_variants() {
            let key = photo_key(&self.parent_type, parent_id, photo.id, variant);

            if let Err(e) = self.storage.upload(&key, bytes, OUTPUT_MIME_TYPE).await {
                tracing::error!(
                    photo_id = %photo.id,
                    variant = %variant,
                    error = %e,
                    "Variant upload failed, rolling back"
                );
                self.roll_back(&photo, &uploaded).await;
                return Err(e.into());
            }

            uploaded.push(key);
        }

        let pending = photo.clone();
        for (variant, key) in Variant::ALL.into_iter().zip(uploaded.iter()) {
            photo.set_path(variant, key.clone());
        }
        photo.file_size = file_size;

        // Committing the paths is what makes the photo visible.
        let mut photo = match self.store.commit_paths(&photo).await {
            Ok(Some(committed)) => committed,
            Ok(None) => {
                tracing::warn!(photo_id = %pending.id, "Pending photo was reclaimed before commit, rolling back");
                self.roll_back(&pending, &uploaded).await;
                return Err(NotFoundError::Photo(pending.id).into());
            }
            Err(e) => {
                tracing::error!(photo_id = %pending.id, error = %e, "Failed to commit photo paths, rolling back");
                self.roll_back(&pending, &uploaded).await;
                return Err(e.into());
            }
        };

        let promote = if requested_is_main {
            true
        } else {
            match self.store.get_main_photo(parent_id).await {
                Ok(main) => main.is_none(),
                Err(e) => {
                    tracing::warn!(parent_id = %parent_id, error = %e, "Failed to look up main photo");
                    count == 0
                }
            }
        };

        if promote {
            match self.store.set_main_photo(photo.id, parent_id).await {
                Ok(true) => photo.is_main = true,
                Ok(false) => {
                    tracing::warn!(photo_id = %photo.id, "Photo disappeared before it could become main")
                }
                Err(e) => {
                    tracing::warn!(photo_id = %photo.id, error = %e, "Failed to set main photo after upload")
                }
            }
        }

        tracing::info!(
            photo_id = %photo.id,
            parent_id = %parent_id,
            is_main = photo.is_main,
            "Photo uploaded"
        );

        self.to_response(photo, UrlMode::Public).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, photo_id: Uuid, caller: CallerContext) -> PhotoResult<()> {
        let photo = self.find_active(photo_id).await?;

        if photo.uploader_id != caller.caller_id && !caller.is_admin {
            return Err(PhotoError::Forbidden(
                "only the uploader or an admin can delete this photo".to_string(),
            ));
        }

        self.remove_objects(&photo, &photo.stored_paths()).await;
        self.store.delete(photo.id).await?;

        // The flag read above may be stale; a concurrent set-main can move it
        // onto this photo right before the soft delete clears it.
        if self.store.get_main_photo(photo.parent_id).await?.is_none() {
            let survivors = self.store.find_by_parent_id(photo.parent_id).await?;
            match survivors.first() {
                Some(next) => {
                    self.store.set_main_photo(next.id, photo.parent_id).await?;
                    tracing::info!(photo_id = %next.id, parent_id = %photo.parent_id, "Promoted new main photo");
                }
                None => {
                    tracing::debug!(parent_id = %photo.parent_id, "Last photo removed, spot has no main photo")
                }
            }
        }

        tracing::info!(photo_id = %photo.id, "Photo deleted");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_main_photo(&self, photo_id: Uuid, caller: CallerContext) -> PhotoResult<()> {
        let photo = self.find_active(photo_id).await?;

        let parent = self
            .parents
            .find_by_id(photo.parent_id)
            .await?
            .ok_or(NotFoundError::Parent(photo.parent_id))?;

        if parent.owner_id != caller.caller_id && !caller.is_admin {
            return Err(PhotoError::Forbidden(
                "only the spot owner or an admin can choose the main photo".to_string(),
            ));
        }

        if !self.store.set_main_photo(photo.id, parent.id).await? {
            // Deleted between the lookup and the transaction.
            return Err(NotFoundError::Photo(photo_id).into());
        }

        Ok(())
    }

    pub async fn list_by_parent(
        &self,
        parent_id: Uuid,
        mode: UrlMode,
    ) -> PhotoResult<Vec<PhotoResponse>> {
        let photos = self.store.find_by_parent_id(parent_id).await?;

        let mut responses = Vec::with_capacity(photos.len());
        for photo in photos {
            responses.push(self.to_response(photo, mode).await?);
        }

        Ok(responses)
    }

    /// One-hour URL for the requested size; unknown sizes resolve to medium.
    pub async fn presigned_url(&self, photo_id: Uuid, size: &str) -> PhotoResult<String> {
        let photo = self.find_active(photo_id).await?;
        let variant = Variant::from_name(size);

        Ok(self
            .storage
            .presigned_url(photo.path(variant), PRESIGNED_URL_TTL)
            .await?)
    }

    /// Public thumbnail URL of the parent's main photo, if it has one.
    pub async fn main_photo_url(&self, parent_id: Uuid) -> PhotoResult<Option<String>> {
        let main = self.store.get_main_photo(parent_id).await?;
        Ok(main.map(|p| self.storage.public_url(p.path(Variant::Thumbnail))))
    }

    /// Removes every photo of a parent that is about to be deleted.
    ///
    /// Object deletion is best-effort. Every row is hard-deleted; if some
    /// removals fail the first error is returned after all rows were tried.
    #[tracing::instrument(skip(self))]
    pub async fn delete_parent_photos(&self, parent_id: Uuid) -> PhotoResult<usize> {
        let photos = self.store.find_by_parent_id_unscoped(parent_id).await?;

        for photo in &photos {
            let keys = self.object_keys(photo);
            let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
            self.remove_objects(photo, &keys).await;
        }

        let mut removed = 0;
        let mut first_error = None;

        for photo in &photos {
            match self.store.hard_delete(photo.id).await {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(photo_id = %photo.id, error = %e, "Failed to delete photo record");
                    first_error.get_or_insert(e);
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e.into());
        }

        tracing::info!(parent_id = %parent_id, removed, "Removed spot photos");
        Ok(removed)
    }

    /// Reclaims uploads that stayed pending longer than `grace`.
    ///
    /// Every stale record is tried; the first failure is returned afterwards.
    pub async fn sweep_stale_pending(&self, grace: Duration) -> PhotoResult<usize> {
        let grace = chrono::Duration::from_std(grace).unwrap_or_else(|_| chrono::Duration::days(1));
        let cutoff = Utc::now().naive_utc() - grace;

        let stale = self.store.find_stale_pending(cutoff).await?;

        let mut reclaimed = 0;
        let mut first_error = None;

        for photo in &stale {
            let keys = self.object_keys(photo);
            let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
            self.remove_objects(photo, &keys).await;

            match self.store.delete(photo.id).await {
                Ok(()) => reclaimed += 1,
                Err(e) => {
                    tracing::warn!(photo_id = %photo.id, error = %e, "Failed to reclaim pending photo");
                    first_error.get_or_insert(e);
                }
            }
        }

        if reclaimed > 0 {
            tracing::info!(count = reclaimed, "Reclaimed stale pending uploads");
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(reclaimed),
        }
    }

    async fn find_active(&self, photo_id: Uuid) -> PhotoResult<photo::Model> {
        self.store
            .find_by_id(photo_id)
            .await?
            .filter(photo::Model::is_active)
            .ok_or_else(|| NotFoundError::Photo(photo_id).into())
    }

    /// Committed paths, or the deterministic keys a pending upload may have written.
    fn object_keys(&self, photo: &photo::Model) -> Vec<String> {
        if photo.has_paths() {
            photo.stored_paths().into_iter().map(str::to_string).collect()
        } else {
            Variant::ALL
                .into_iter()
                .map(|v| photo_key(&self.parent_type, photo.parent_id, photo.id, v))
                .collect()
        }
    }

    async fn remove_objects(&self, photo: &photo::Model, keys: &[&str]) {
        for key in keys {
            if let Err(e) = self.storage.delete(key).await {
                tracing::warn!(photo_id = %photo.id, key = %key, error = %e, "Failed to delete object");
            }
        }
    }

    /// Best-effort undo of a failed upload. Never replaces the caller's error.
    async fn roll_back(&self, photo: &photo::Model, uploaded: &[String]) {
        let keys: Vec<&str> = uploaded.iter().map(String::as_str).collect();
        self.remove_objects(photo, &keys).await;

        if let Err(e) = self.store.delete(photo.id).await {
            tracing::warn!(photo_id = %photo.id, error = %e, "Failed to remove pending photo record");
        }
    }

    async fn to_response(&self, photo: photo::Model, mode: UrlMode) -> PhotoResult<PhotoResponse> {
        let url_original = self.variant_url(photo.path(Variant::Original), mode).await?;
        let url_medium = self.variant_url(photo.path(Variant::Medium), mode).await?;
        let url_thumbnail = self.variant_url(photo.path(Variant::Thumbnail), mode).await?;

        Ok(PhotoResponse {
            url_original,
            url_medium,
            url_thumbnail,
            ..PhotoResponse::from(photo)
        })
    }

    async fn variant_url(&self, path: &str, mode: UrlMode) -> PhotoResult<Option<String>> {
        if path.is_empty() {
            return Ok(None);
        }

        let url = match mode {
            UrlMode::Public => self.storage.public_url(path),
            UrlMode::Presigned(ttl) => self.storage.presigned_url(path, ttl).await?,
        };

        Ok(Some(url))
    }
}
