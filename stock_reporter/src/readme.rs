//! README timestamp and chart reference patching.
//!
//! Two single-line regions of the document are rewritten:
//! - `<!-- Last Updated: <anything> -->` gets today's UTC date (`YYYY-MM-DD`);
//! - `![Stock Chart](charts/<anything>.png)` points at the newest chart.
//!
//! The file is only written when the patched text differs, so running the step
//! twice with the same inputs leaves the second run without a write.
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use log::{info, warn};
use regex::{NoExpand, Regex};
use stock_common::artifacts::{self, ArtifactKind};
use stock_common::{PipelineError, Result};

/// Name used when the charts directory has no chart yet.
pub const PLACEHOLDER_CHART: &str = "chart_latest.png";

const DATE_MARKER: &str = r"<!-- Last Updated: .* -->";
const CHART_REFERENCE: &str = r"!\[Stock Chart\]\(charts/.*?\.png\)";

/// What `update_readme` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadmeOutcome {
    /// The document does not exist.
    Missing,
    /// Nothing changed; no write happened.
    UpToDate,
    /// The document was rewritten.
    Updated,
}

struct Patterns {
    date_marker: Regex,
    chart_reference: Regex,
}

impl Patterns {
    fn compile() -> Result<Self> {
        let compile = |p: &str| Regex::new(p).map_err(|e| PipelineError::Regex(e.to_string()));
        Ok(Self {
            date_marker: compile(DATE_MARKER)?,
            chart_reference: compile(CHART_REFERENCE)?,
        })
    }
}

/// File name of the newest chart, or [`PLACEHOLDER_CHART`].
pub fn latest_chart_name(charts_dir: &Path) -> Result<String> {
    match artifacts::latest(charts_dir, ArtifactKind::Chart)? {
        Some(chart) => {
            info!("Using chart: {}", chart.file_name());
            Ok(chart.file_name())
        }
        None => {
            warn!("No chart files found in {}", charts_dir.display());
            Ok(String::from(PLACEHOLDER_CHART))
        }
    }
}

/// Patch `content` in memory. `chart` of `None` leaves image references alone.
pub fn patch(content: &str, date: NaiveDate, chart: Option<&str>) -> Result<String> {
    let patterns = Patterns::compile()?;

    let marker = format!("<!-- Last Updated: {} -->", date.format("%Y-%m-%d"));
    let dated = patterns
        .date_marker
        .replace_all(content, NoExpand(&marker));

    let patched = match chart {
        Some(name) => {
            let reference = format!("![Stock Chart](charts/{name})");
            patterns
                .chart_reference
                .replace_all(&dated, NoExpand(&reference))
                .into_owned()
        }
        None => dated.into_owned(),
    };
    Ok(patched)
}

/// Patch the document at `readme` in place.
pub fn update_readme(
    readme: &Path,
    charts_dir: &Path,
    today: NaiveDate,
    manage_chart: bool,
) -> Result<ReadmeOutcome> {
    if !readme.is_file() {
        warn!("{} not found", readme.display());
        return Ok(ReadmeOutcome::Missing);
    }

    let chart = if manage_chart {
        Some(latest_chart_name(charts_dir)?)
    } else {
        None
    };

    let content = fs::read_to_string(readme)?;
    let updated = patch(&content, today, chart.as_deref())?;

    if updated == content {
        info!("{} is already up to date", readme.display());
        return Ok(ReadmeOutcome::UpToDate);
    }

    fs::write(readme, updated)?;
    info!("{} updated: {}", readme.display(), today.format("%Y-%m-%d"));
    if let Some(name) = chart {
        info!("Chart updated: {}", name);
    }
    Ok(ReadmeOutcome::Updated)
}
