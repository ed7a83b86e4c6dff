use std::{sync::Arc, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::{
    sync::watch,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use crate::application::{error::ApplicationError, services::StorageService};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Periodically purges files whose modification time is older than the
/// retention threshold.
#[derive(Clone)]
pub struct RetentionSweeper {
    storage: Arc<dyn StorageService>,
    retention: Duration,
    interval: Duration,
}

impl RetentionSweeper {
    pub fn new(storage: Arc<dyn StorageService>, retention: Duration, interval: Duration) -> Self {
        Self {
            storage,
            retention,
            interval,
        }
    }

    /// One pass over the store. Per-file failures are logged and counted; only
    /// a failure to list the store at all is returned.
    pub async fn sweep_once(&self, now: DateTime<Utc>) -> Result<SweepReport, ApplicationError> {
        let retention = TimeDelta::from_std(self.retention).unwrap_or(TimeDelta::MAX);
        let files = self.storage.list().await?;

        let mut report = SweepReport {
            scanned: files.len(),
            ..SweepReport::default()
        };

        for file in files {
            let age = now - file.modified_at;
            if age <= retention {
                continue;
            }

            match self.storage.delete(&file.storage_name).await {
                Ok(()) => {
                    debug!(
                        file = %file.storage_name,
                        age_secs = age.num_seconds(),
                        "Expired file deleted"
                    );
                    report.deleted += 1;
                }
                Err(e) => {
                    warn!(file = %file.storage_name, error = ?e, "Failed to delete expired file");
                    report.failed += 1;
                }
            }
        }

        if report.deleted > 0 || report.failed > 0 {
            info!(
                scanned = report.scanned,
                deleted = report.deleted,
                failed = report.failed,
                "Retention sweep completed"
            );
        }

        Ok(report)
    }

    /// Sweeps immediately, then every `interval`, until `shutdown` turns true
    /// or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            retention_secs = self.retention.as_secs(),
            interval_secs = self.interval.as_secs(),
            "Retention sweeper started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep_once(Utc::now()).await {
                        error!(error = ?e, "Retention sweep failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Retention sweeper stopped");
    }
}
