use std::time::Duration;

use crate::services::photos::PhotoService;

/// Periodically reclaims uploads that never reached the committed state,
/// e.g. when the request was cancelled between record creation and path commit.
pub struct CleanupService {
    photos: PhotoService,
    interval: Duration,
    grace: Duration,
}

impl CleanupService {
    pub fn new(photos: PhotoService, interval: Duration, grace: Duration) -> Self {
        Self {
            photos,
            interval,
            grace,
        }
    }

    pub async fn run_scheduler(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Cleanup scheduler started");
        let mut interval = tokio::time::interval(self.interval);

        loop {
            interval.tick().await;
            self.run_once().await;
        }
    }

    pub async fn run_once(&self) -> usize {
        match self.photos.sweep_stale_pending(self.grace).await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(error = %e, "Cleanup scheduler failed to sweep pending uploads");
                0
            }
        }
    }
}
