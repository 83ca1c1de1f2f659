//! Timestamped artifact names and "latest artifact" lookup.
//!
//! Every generated file carries a fixed-width UTC suffix `YYYYMMDD_HHMMSS`.
//! Lookup parses that suffix and orders by the parsed instant; files whose
//! name does not match the pattern are ignored.
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use log::debug;

use crate::error::PipelineError;

/// `strftime` pattern of the suffix.
pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const STAMP_LEN: usize = 15;

/// Second-resolution UTC instant embedded in a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stamp(NaiveDateTime);

impl Stamp {
    /// Truncate `at` to whole seconds.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        let naive = at.naive_utc();
        Stamp(naive.with_nanosecond(0).unwrap_or(naive))
    }

    /// Parse a suffix such as `20240505_120000`.
    pub fn parse(suffix: &str) -> Option<Self> {
        if suffix.len() != STAMP_LEN {
            return None;
        }
        NaiveDateTime::parse_from_str(suffix, STAMP_FORMAT)
            .ok()
            .map(Stamp)
    }

    /// Fixed-width suffix text.
    pub fn suffix(&self) -> String {
        self.0.format(STAMP_FORMAT).to_string()
    }
}

/// The two families of generated files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// `stock_prices_<stamp>.json`
    Snapshot,
    /// `chart_<stamp>.png`
    Chart,
}

impl ArtifactKind {
    fn prefix(self) -> &'static str {
        match self {
            ArtifactKind::Snapshot => "stock_prices_",
            ArtifactKind::Chart => "chart_",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Snapshot => ".json",
            ArtifactKind::Chart => ".png",
        }
    }

    /// File name for `stamp`.
    pub fn file_name(self, stamp: Stamp) -> String {
        format!("{}{}{}", self.prefix(), stamp.suffix(), self.extension())
    }

    /// Stamp of a matching file name, `None` for anything else.
    pub fn parse_file_name(self, name: &str) -> Option<Stamp> {
        name.strip_prefix(self.prefix())
            .and_then(|rest| rest.strip_suffix(self.extension()))
            .and_then(Stamp::parse)
    }
}

/// A discovered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Full path.
    pub path: PathBuf,
    /// Instant parsed from the name.
    pub stamp: Stamp,
}

impl Artifact {
    /// Bare file name.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Newest artifact of `kind` in `dir`. A missing directory holds none.
pub fn latest(dir: &Path, kind: ArtifactKind) -> Result<Option<Artifact>, PipelineError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut newest: Option<Artifact> = None;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(stamp) = kind.parse_file_name(&name.to_string_lossy()) else {
            debug!("Ignoring {:?} in {}", name, dir.display());
            continue;
        };
        if newest.as_ref().is_none_or(|n| stamp > n.stamp) {
            newest = Some(Artifact {
                path: entry.path(),
                stamp,
            });
        }
    }
    Ok(newest)
}
