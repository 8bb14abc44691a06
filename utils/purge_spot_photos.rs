//! Removes every photo of a spot, records and objects alike.
//!
//! Invoked by the spot deletion workflow before the spot row itself is dropped.

use std::sync::Arc;

use clap::Parser;
use sea_orm::Database;
use uuid::Uuid;

use spot_photo_kit::config::Config;
use spot_photo_kit::services::parents::SpotRepository;
use spot_photo_kit::services::photo_store::PhotoStore;
use spot_photo_kit::services::photos::PhotoService;
use spot_photo_kit::services::s3::S3Service;

#[derive(Parser, Debug)]
#[command(about = "Delete all photos (metadata and stored variants) of a spot")]
struct Args {
    /// Spot whose photos are removed
    #[arg(long)]
    spot_id: Uuid,

    /// Only report what would be removed
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let db = Database::connect(&config.database_url).await?;
    let store = PhotoStore::new(db.clone());

    if args.dry_run {
        let photos = store.find_by_parent_id_unscoped(args.spot_id).await?;
        for photo in &photos {
            println!(
                "{} main={} deleted={} original={}",
                photo.id,
                photo.is_main,
                photo.deleted_at.is_some(),
                photo.path_original
            );
        }
        println!("{} photo record(s) would be removed", photos.len());
        return Ok(());
    }

    let service = PhotoService::new(
        store,
        Arc::new(SpotRepository::new(db)),
        Arc::new(S3Service::new(&config.storage)),
        config.parent_type.clone(),
    );

    let removed = service.delete_parent_photos(args.spot_id).await?;
    println!("Removed {} photo record(s) for spot {}", removed, args.spot_id);

    Ok(())
}
