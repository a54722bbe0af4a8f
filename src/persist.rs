use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use msgscope_core::{render_text, ProfileReport};

#[derive(Debug, Clone)]
pub struct SavedReport {
    pub json: PathBuf,
    pub text: PathBuf,
}

/// `profile_report_<username>_<YYYYmmddHHMMSS>.json`
pub fn default_file_name(report: &ProfileReport, at: DateTime<Utc>) -> String {
    format!(
        "profile_report_{}_{}.json",
        report.user_info.handle(),
        at.format("%Y%m%d%H%M%S")
    )
}

/// Write the report as pretty UTF-8 JSON and its text form next to it with a
/// `.txt` extension.
pub fn save_report(
    report: &ProfileReport,
    dir: &Path,
    file_name: Option<&str>,
    at: DateTime<Utc>,
) -> anyhow::Result<SavedReport> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let name = file_name
        .map(str::to_string)
        .unwrap_or_else(|| default_file_name(report, at));
    let json_path = dir.join(name);
    let text_path = json_path.with_extension("txt");

    let json = report.to_json_pretty()?;
    std::fs::write(&json_path, json)
        .with_context(|| format!("writing {}", json_path.display()))?;
    std::fs::write(&text_path, render_text(report))
        .with_context(|| format!("writing {}", text_path.display()))?;

    tracing::info!(json = %json_path.display(), text = %text_path.display(), "report saved");
    Ok(SavedReport {
        json: json_path,
        text: text_path,
    })
}
