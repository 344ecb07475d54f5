use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::model::{LaunchFeed, Report};

pub const LAUNCHES_FILE: &str = "launches.json";
pub const REPORT_FILE: &str = "download_report.json";
pub const IMAGES_DIR: &str = "images";
pub const DEFAULT_LAUNCHES_URL: &str = "https://ll.thespacedevs.com/2.0.0/launch/upcoming";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub launches_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: app_dirs().join("data"),
            launches_url: DEFAULT_LAUNCHES_URL.to_string(),
            timeout_secs: 10,
            user_agent: format!("launchpix/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn launches_path(&self) -> PathBuf {
        self.data_dir.join(LAUNCHES_FILE)
    }

    pub fn report_path(&self) -> PathBuf {
        self.data_dir.join(REPORT_FILE)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.data_dir.join(IMAGES_DIR)
    }
}

/// Per-user application directory. Falls back to `./.launchpix` when the
/// platform has no home directory.
pub fn app_dirs() -> PathBuf {
    match ProjectDirs::from("dev", "launchpix", "launchpix") {
        Some(proj) => proj.data_dir().to_path_buf(),
        None => PathBuf::from(".launchpix"),
    }
}

pub fn settings_path() -> PathBuf {
    app_dirs().join("settings.json")
}

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings_from(path: &Path) -> Settings {
    match fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            tracing::warn!("ignoring malformed settings file {}: {}", path.display(), e);
            Settings::default()
        }),
        Err(_) => Settings::default(),
    }
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_launches(path: &Path) -> Result<LaunchFeed> {
    let bytes = fs::read(path).with_context(|| format!("could not read launches file {}", path.display()))?;
    let feed = serde_json::from_slice(&bytes).with_context(|| format!("malformed launches file {}", path.display()))?;
    Ok(feed)
}

/// Writes the report with 4-space indentation.
pub fn save_report(report: &Report, path: &Path) -> Result<()> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    report.serialize(&mut ser)?;
    fs::write(path, buf).with_context(|| format!("could not write report {}", path.display()))?;
    Ok(())
}

/// `Ok(None)` when no report exists at `path`.
pub fn load_report(path: &Path) -> Result<Option<Report>> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("could not read report {}", path.display())),
    };
    let report = serde_json::from_slice(&bytes).with_context(|| format!("malformed report {}", path.display()))?;
    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{DownloadOutcome, FailureReason};
    use tempfile::tempdir;

    #[test]
    fn test_settings_missing_file_uses_defaults() {
        let td = tempdir().unwrap();
        let s = load_settings_from(&td.path().join("nope.json"));
        assert_eq!(s.timeout_secs, 10);
        assert_eq!(s.launches_url, DEFAULT_LAUNCHES_URL);
    }

    #[test]
    fn test_settings_partial_file_fills_defaults() {
        let td = tempdir().unwrap();
        let path = td.path().join("settings.json");
        fs::write(&path, r#"{"timeout_secs": 3, "data_dir": "/tmp/rockets"}"#).unwrap();

        let s = load_settings_from(&path);
        assert_eq!(s.timeout_secs, 3);
        assert_eq!(s.data_dir, PathBuf::from("/tmp/rockets"));
        assert_eq!(s.images_dir(), PathBuf::from("/tmp/rockets/images"));
        assert_eq!(s.launches_url, DEFAULT_LAUNCHES_URL);
    }

    #[test]
    fn test_settings_save_and_load() {
        let td = tempdir().unwrap();
        let path = td.path().join("cfg").join("settings.json");
        let s = Settings { timeout_secs: 42, ..Settings::default() };
        save_settings_to(&s, &path).unwrap();
        assert_eq!(load_settings_from(&path), s);
    }

    #[test]
    fn test_report_file_layout() {
        let td = tempdir().unwrap();
        let path = td.path().join(REPORT_FILE);
        let mut report = Report::new();
        report.record(DownloadOutcome::failure("Vega", None, FailureReason::NoImageUrl));
        report.record(DownloadOutcome::success("Ariane 6", "http://a/x.jpg"));
        save_report(&report, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n    \"successful_downloads\": [\n        {"));
        let succ = text.find("successful_downloads").unwrap();
        let fail = text.find("failed_downloads").unwrap();
        assert!(succ < fail);

        let loaded = load_report(&path).unwrap().unwrap();
        assert_eq!(loaded, report);
    }

    #[test]
    fn test_load_launches_without_results_is_error() {
        let td = tempdir().unwrap();
        let path = td.path().join(LAUNCHES_FILE);
        fs::write(&path, r#"{"detail": "Request was throttled."}"#).unwrap();
        let err = load_launches(&path).unwrap_err();
        assert!(err.to_string().contains("malformed launches file"));
    }

    #[test]
    fn test_load_report_missing_is_none() {
        let td = tempdir().unwrap();
        assert!(load_report(&td.path().join(REPORT_FILE)).unwrap().is_none());
    }

    #[test]
    fn test_load_report_malformed_is_error() {
        let td = tempdir().unwrap();
        let path = td.path().join(REPORT_FILE);
        fs::write(&path, "{not json").unwrap();
        assert!(load_report(&path).is_err());
    }
}
