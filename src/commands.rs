use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::core::model::Report;
use crate::data::{load_launches, save_report, Settings};
use crate::downloader::reconcile::reconcile;
use crate::downloader::{Downloader, ImageFetcher};
use crate::notify::compose_message;

/// Downloads the upstream launch list into `<data_dir>/launches.json`.
pub async fn fetch_launches(settings: &Settings) -> Result<PathBuf> {
    let downloader = Downloader::new(settings)?;
    fetch_launches_with(&downloader, settings).await
}

pub async fn fetch_launches_with<F: ImageFetcher + ?Sized>(fetcher: &F, settings: &Settings) -> Result<PathBuf> {
    tokio::fs::create_dir_all(&settings.data_dir)
        .await
        .with_context(|| format!("could not create data dir {}", settings.data_dir.display()))?;
    let path = settings.launches_path();
    let size = fetcher
        .fetch(&settings.launches_url, &path)
        .await
        .with_context(|| format!("could not fetch launches from {}", settings.launches_url))?;
    info!("Saved {} bytes of launches to {}", size, path.display());
    Ok(path)
}

/// Downloads one image per launch and writes the report file.
pub async fn get_pictures(settings: &Settings) -> Result<Report> {
    let downloader = Downloader::new(settings)?;
    get_pictures_with(&downloader, settings).await
}

pub async fn get_pictures_with<F: ImageFetcher + ?Sized>(fetcher: &F, settings: &Settings) -> Result<Report> {
    let images_dir = settings.images_dir();
    tokio::fs::create_dir_all(&images_dir)
        .await
        .with_context(|| format!("could not create images dir {}", images_dir.display()))?;

    let feed = load_launches(&settings.launches_path())?;
    let report = reconcile(fetcher, &images_dir, &feed.results).await;

    let report_path = settings.report_path();
    save_report(&report, &report_path)?;
    info!("Download report saved to {}", report_path.display());
    Ok(report)
}

pub fn notify(settings: &Settings) -> Result<String> {
    let message = compose_message(&settings.report_path())?;
    debug!("notification composed: {}", message);
    Ok(message)
}
