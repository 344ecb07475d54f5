use anyhow::Result;
use std::path::Path;

use crate::core::model::Report;
use crate::data::load_report;

pub fn summary_line(report: &Report, report_path: &Path) -> String {
    format!(
        "Download Report: Successful downloads: {}, Failed downloads: {}. Check {} for details.",
        report.successes(),
        report.failures(),
        report_path.display()
    )
}

pub fn not_found_line(report_path: &Path) -> String {
    format!("Download report not found at {}.", report_path.display())
}

/// One-line summary of the report at `report_path`. A missing report is a
/// message, not an error; an unreadable one is an error.
pub fn compose_message(report_path: &Path) -> Result<String> {
    Ok(match load_report(report_path)? {
        Some(report) => summary_line(&report, report_path),
        None => not_found_line(report_path),
    })
}
