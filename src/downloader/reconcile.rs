use std::path::Path;
use tracing::{info, warn};

use super::{filename_from_url, FetchError, ImageFetcher};
use crate::core::model::{DownloadOutcome, FailureReason, LaunchRecord, Report};

async fn attempt<F>(fetcher: &F, images_dir: &Path, url: &str) -> Result<u64, FetchError>
where
    F: ImageFetcher + ?Sized,
{
    let target = images_dir.join(filename_from_url(url));
    match fetcher.fetch(url, &target).await {
        Ok(size) => {
            info!("Downloaded {} to {} ({} bytes)", url, target.display(), size);
            Ok(size)
        }
        Err(e) => {
            warn!("Failed to download {} due to {}", url, e);
            Err(e)
        }
    }
}

/// Decide the outcome of a single record: primary first, alternative only
/// when the primary fails.
///
/// When both sources fail the outcome names the alternative URL; the primary
/// failure is only logged.
pub async fn reconcile_record<F>(fetcher: &F, images_dir: &Path, record: &LaunchRecord) -> DownloadOutcome
where
    F: ImageFetcher + ?Sized,
{
    let name = record.name.as_str();

    let Some(primary) = record.image.as_deref() else {
        warn!("No image URL available for {}", name);
        return DownloadOutcome::failure(name, None, FailureReason::NoImageUrl);
    };
    if attempt(fetcher, images_dir, primary).await.is_ok() {
        return DownloadOutcome::success(name, primary);
    }

    let Some(alternative) = record.alternative_image.as_deref() else {
        warn!("No alternative image available for {}", name);
        return DownloadOutcome::failure(name, None, FailureReason::NoAlternativeUrl);
    };
    if attempt(fetcher, images_dir, alternative).await.is_ok() {
        return DownloadOutcome::success(name, alternative);
    }

    warn!("Failed to download both primary and alternative images for {}", name);
    DownloadOutcome::failure(name, Some(alternative), FailureReason::BothSourcesFailed)
}

/// Processes `records` strictly in order, one outcome per record.
pub async fn reconcile<F>(fetcher: &F, images_dir: &Path, records: &[LaunchRecord]) -> Report
where
    F: ImageFetcher + ?Sized,
{
    let mut report = Report::new();
    for record in records {
        let outcome = reconcile_record(fetcher, images_dir, record).await;
        report.record(outcome);
    }
    info!(
        "Processed {} launches: {} downloaded, {} failed",
        records.len(),
        report.successes(),
        report.failures()
    );
    report
}
