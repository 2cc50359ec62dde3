//! Presentation of snapshots.
//!
//! [`SnapshotReport`] flattens a snapshot into per-thread rows in depth-first
//! order. The renderers in this module only ever see that copied model.

mod html;
mod text;

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;

use crate::primitives::thread::ThreadLabel;
use crate::snapshot::Snapshot;
use crate::types::{Micros, ProfilerError, Result, ThreadKey};

/// Output format of [`render`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Standalone HTML page with one table per thread.
    Html,
    /// Indented plain-text columns.
    Text,
    /// Pretty-printed JSON of [`SnapshotReport`].
    Json,
}

impl ReportFormat {
    /// Lowercase name, also accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Text => "text",
            ReportFormat::Json => "json",
        }
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = ProfilerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(ReportFormat::Html),
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            _ => Err(ProfilerError::UnknownFormat(s.to_owned())),
        }
    }
}

/// One node of a thread's tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// Depth below the thread root, which is zero.
    pub depth: usize,
    /// `/`-joined path, `/` for the root.
    pub path: String,
    /// Node name.
    pub name: String,
    /// Recorded calls.
    pub calls: i64,
    /// Accumulated microseconds.
    pub total_us: Micros,
    /// Mean microseconds per call.
    pub avg_us: Micros,
}

/// Rows of one thread.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ThreadReport {
    /// Thread key.
    pub key: ThreadKey,
    /// Thread identity.
    pub label: ThreadLabel,
    /// Depth-first rows; empty when the thread recorded nothing.
    pub rows: Vec<ReportRow>,
}

/// Flattened snapshot ready for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SnapshotReport {
    /// Snapshot index, `None` for the null snapshot.
    pub index: Option<u32>,
    /// Snapshot name, `None` for the null snapshot.
    pub name: Option<String>,
    /// RFC 3339 capture time.
    pub timestamp: Option<String>,
    /// Threads in key order.
    pub threads: Vec<ThreadReport>,
}

impl SnapshotReport {
    /// Builds the row model of `snapshot`.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let threads = snapshot
            .threads()
            .map(|thread| {
                let rows = if thread.tree.is_empty() {
                    Vec::new()
                } else {
                    thread
                        .tree
                        .walk()
                        .map(|visit| ReportRow {
                            depth: visit.depth,
                            path: visit.display_path().to_owned(),
                            name: visit.name.to_owned(),
                            calls: visit.node.calls(),
                            total_us: visit.node.total_us(),
                            avg_us: visit.node.average_us(),
                        })
                        .collect()
                };
                ThreadReport {
                    key: thread.label.key,
                    label: thread.label.clone(),
                    rows,
                }
            })
            .collect();
        Self {
            index: snapshot.index(),
            name: snapshot.name().map(str::to_owned),
            timestamp: snapshot
                .timestamp()
                .and_then(|ts| ts.format(&Rfc3339).ok()),
            threads,
        }
    }

    /// True when built from the null snapshot.
    pub fn is_null(&self) -> bool {
        self.index.is_none()
    }

    /// Rows of the thread with `key`.
    pub fn thread(&self, key: ThreadKey) -> Option<&ThreadReport> {
        self.threads.iter().find(|thread| thread.key == key)
    }
}

/// Writes `report` to `out` in `format`.
pub fn render<W: Write + ?Sized>(
    report: &SnapshotReport,
    format: ReportFormat,
    out: &mut W,
) -> Result<()> {
    match format {
        ReportFormat::Html => html::write_html(report, out)?,
        ReportFormat::Text => text::write_text(report, out)?,
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
