use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use tracing_subscriber::EnvFilter;

use spot_photo_kit::config::Config;
use spot_photo_kit::routes::{create_routes, AppState};
use spot_photo_kit::services::cleanup::CleanupService;
use spot_photo_kit::services::parents::SpotRepository;
use spot_photo_kit::services::photo_store::PhotoStore;
use spot_photo_kit::services::photos::PhotoService;
use spot_photo_kit::services::s3::S3Service;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let db = Database::connect(&config.database_url).await?;
    Migrator::up(&db, None).await?;

    let s3 = S3Service::new(&config.storage);
    s3.ensure_bucket_exists().await?;

    let photos = PhotoService::new(
        PhotoStore::new(db.clone()),
        Arc::new(SpotRepository::new(db.clone())),
        Arc::new(s3),
        config.parent_type.clone(),
    );

    let cleanup = CleanupService::new(
        photos.clone(),
        config.pending_sweep_interval,
        config.pending_grace,
    );
    tokio::spawn(cleanup.run_scheduler());

    let app = create_routes(AppState::new(photos, &config.jwt_secret));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
