use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub const UNKNOWN_LAUNCH: &str = "Unknown Launch";

/// Upstream feed document. Only `results` is read; paging keys are ignored.
/// A document without `results` (an API error body, say) does not parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchFeed {
    pub results: Vec<LaunchRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRecord {
    #[serde(default = "unknown_launch", deserialize_with = "name_or_unknown")]
    pub name: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub alternative_image: Option<String>,
}

impl LaunchRecord {
    pub fn new(name: &str, image: Option<&str>, alternative_image: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            image: image.filter(|s| !s.is_empty()).map(str::to_string),
            alternative_image: alternative_image.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }
}

fn unknown_launch() -> String {
    UNKNOWN_LAUNCH.to_string()
}

fn name_or_unknown<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_else(unknown_launch))
}

// An empty URL string counts as "no URL".
fn non_empty<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(d)?.filter(|s| !s.is_empty()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessEntry {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub reason: String,
}

/// Why a record ended up in `failed_downloads`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    NoImageUrl,
    NoAlternativeUrl,
    BothSourcesFailed,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureReason::NoImageUrl => "No image URL provided",
            FailureReason::NoAlternativeUrl => "No alternative image URL provided",
            FailureReason::BothSourcesFailed => "Failed to download both primary and alternative images",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Success(SuccessEntry),
    Failure(FailureEntry),
}

impl DownloadOutcome {
    pub fn success(name: &str, url: &str) -> Self {
        DownloadOutcome::Success(SuccessEntry { name: name.to_string(), url: url.to_string() })
    }

    pub fn failure(name: &str, url: Option<&str>, reason: FailureReason) -> Self {
        DownloadOutcome::Failure(FailureEntry {
            name: name.to_string(),
            url: url.map(str::to_string),
            reason: reason.to_string(),
        })
    }
}

/// Success/failure ledger of one `get-pictures` run.
///
/// Field order is the serialized key order, so `successful_downloads`
/// always precedes `failed_downloads` in the written file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub successful_downloads: Vec<SuccessEntry>,
    pub failed_downloads: Vec<FailureEntry>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: DownloadOutcome) {
        match outcome {
            DownloadOutcome::Success(s) => self.successful_downloads.push(s),
            DownloadOutcome::Failure(f) => self.failed_downloads.push(f),
        }
    }

    pub fn successes(&self) -> usize {
        self.successful_downloads.len()
    }

    pub fn failures(&self) -> usize {
        self.failed_downloads.len()
    }

    pub fn len(&self) -> usize {
        self.successes() + self.failures()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_record_defaults() {
        let feed: LaunchFeed = serde_json::from_str(
            r#"{"count": 3, "next": null, "results": [
                {"name": "Ariane 6", "image": "http://a/x.jpg", "alternative_image": "http://b/y.jpg", "id": "abc"},
                {"image": ""},
                {"name": null, "image": null, "alternative_image": ""}
            ]}"#,
        )
        .unwrap();

        assert_eq!(feed.results.len(), 3);
        assert_eq!(feed.results[0], LaunchRecord::new("Ariane 6", Some("http://a/x.jpg"), Some("http://b/y.jpg")));
        assert_eq!(feed.results[1].name, UNKNOWN_LAUNCH);
        assert!(feed.results[1].image.is_none());
        assert_eq!(feed.results[2].name, UNKNOWN_LAUNCH);
        assert!(feed.results[2].image.is_none());
        assert!(feed.results[2].alternative_image.is_none());
    }

    #[test]
    fn test_feed_requires_results() {
        assert!(serde_json::from_str::<LaunchFeed>("{}").is_err());
        assert!(serde_json::from_str::<LaunchFeed>(r#"{"detail": "Request was throttled."}"#).is_err());
        let empty: LaunchFeed = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert!(empty.results.is_empty());
    }

    #[test]
    fn test_report_keeps_insertion_order() {
        let mut report = Report::new();
        report.record(DownloadOutcome::failure("A", None, FailureReason::NoImageUrl));
        report.record(DownloadOutcome::success("B", "http://b/1.png"));
        report.record(DownloadOutcome::success("C", "http://c/2.png"));

        assert_eq!(report.successes(), 2);
        assert_eq!(report.failures(), 1);
        assert_eq!(report.successful_downloads[0].name, "B");
        assert_eq!(report.successful_downloads[1].name, "C");
    }

    #[test]
    fn test_failure_without_url_omits_key() {
        let mut report = Report::new();
        report.record(DownloadOutcome::failure("A", None, FailureReason::NoAlternativeUrl));
        report.record(DownloadOutcome::failure("B", Some("http://b/alt.jpg"), FailureReason::BothSourcesFailed));

        let v = serde_json::to_value(&report).unwrap();
        assert!(v["failed_downloads"][0].get("url").is_none());
        assert_eq!(v["failed_downloads"][0]["reason"], "No alternative image URL provided");
        assert_eq!(v["failed_downloads"][1]["url"], "http://b/alt.jpg");
        assert_eq!(v["failed_downloads"][1]["reason"], "Failed to download both primary and alternative images");
    }
}
