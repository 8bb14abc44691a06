#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::io::Cursor;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use image::{DynamicImage, ImageFormat};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use uuid::Uuid;

use spot_photo_kit::entities::spot;
use spot_photo_kit::error::StorageError;
use spot_photo_kit::models::photo::CallerContext;
use spot_photo_kit::services::object_store::ObjectStore;
use spot_photo_kit::services::parents::SpotRepository;
use spot_photo_kit::services::photo_store::PhotoStore;
use spot_photo_kit::services::photos::PhotoService;

type Hook = Pin<Box<dyn Future<Output = ()> + Send>>;

/// In-memory bucket with switchable faults and one-shot interleaving hooks.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_upload_on: Mutex<Option<String>>,
    fail_deletes: AtomicBool,
    before_upload: Mutex<Option<(String, Hook)>>,
    before_delete: Mutex<Option<Hook>>,
}

impl MemoryObjectStore {
    /// Runs `hook` once, right before the first upload whose key contains `pattern`.
    pub fn before_upload_matching<F>(&self, pattern: &str, hook: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        *self.before_upload.lock().unwrap() = Some((pattern.to_string(), Box::pin(hook)));
    }

    /// Runs `hook` once, right before the next delete.
    pub fn before_next_delete<F>(&self, hook: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        *self.before_delete.lock().unwrap() = Some(Box::pin(hook));
    }

    /// Uploads whose key contains `pattern` fail.
    pub fn fail_uploads_matching(&self, pattern: &str) {
        *self.fail_upload_on.lock().unwrap() = Some(pattern.to_string());
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn put(&self, key: &str, data: &[u8]) {
        self.objects.lock().unwrap().insert(key.to_string(), data.to_vec());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<(), StorageError> {
        let fail = self
            .fail_upload_on
            .lock()
            .unwrap()
            .as_deref()
            .is_some_and(|pattern| key.contains(pattern));
        if fail {
            return Err(StorageError::new("put", key, "injected fault"));
        }

        let hook = {
            let mut slot = self.before_upload.lock().unwrap();
            match slot.take() {
                Some((pattern, hook)) if key.contains(&pattern) => Some(hook),
                other => {
                    *slot = other;
                    None
                }
            }
        };
        if let Some(hook) = hook {
            hook.await;
        }

        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let hook = self.before_delete.lock().unwrap().take();
        if let Some(hook) = hook {
            hook.await;
        }

        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::new("delete", key, "injected fault"));
        }

        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn presigned_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        Ok(format!("memory://signed/{}?ttl={}", key, ttl.as_secs()))
    }

    fn public_url(&self, key: &str) -> String {
        format!("memory://public/{}", key)
    }
}

pub struct TestEnv {
    pub db: DatabaseConnection,
    pub storage: Arc<MemoryObjectStore>,
    pub service: PhotoService,
}

impl TestEnv {
    pub fn store(&self) -> &PhotoStore {
        self.service.store()
    }

    /// Number of active photos flagged main for `spot_id`.
    pub async fn main_count(&self, spot_id: Uuid) -> usize {
        self.store()
            .find_by_parent_id(spot_id)
            .await
            .unwrap()
            .iter()
            .filter(|p| p.is_main)
            .count()
    }
}

pub async fn setup() -> TestEnv {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let storage = Arc::new(MemoryObjectStore::default());
    let service = PhotoService::new(
        PhotoStore::new(db.clone()),
        Arc::new(SpotRepository::new(db.clone())),
        storage.clone(),
        "spots",
    );

    TestEnv {
        db,
        storage,
        service,
    }
}

pub async fn create_spot(db: &DatabaseConnection, owner_id: Uuid) -> Uuid {
    let now = Utc::now().naive_utc();
    let spot = spot::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner_id),
        name: Set("Bench by the lake".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
    .insert(db)
    .await
    .unwrap();

    spot.id
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::new_rgb8(width, height);
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Jpeg).unwrap();
    buffer.into_inner()
}

pub fn caller(id: Uuid) -> CallerContext {
    CallerContext {
        caller_id: id,
        is_admin: false,
    }
}

pub fn admin() -> CallerContext {
    CallerContext {
        caller_id: Uuid::new_v4(),
        is_admin: true,
    }
}
