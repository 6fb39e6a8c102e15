//! Batch update of term dates across a folder of generated reports.
//!
//! Every `.docx` under the folder gets the new start and end dates in its
//! identity cells and a fresh set of week dates. Files are rewritten via a
//! temporary file in the destination directory that is renamed over the
//! target, so a failed write never leaves a half-written report behind.
//! A failure on one file is recorded and the batch moves on.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::dates::{self, DateError, DEFAULT_DATE_FORMAT};
use crate::docx::Document;
use crate::layout::TemplateLayout;
use crate::report::{ReportError, ReportWriter};

#[derive(Debug, Clone)]
pub struct RedateConfig {
    pub dir: PathBuf,
    pub recursive: bool,
    pub start: NaiveDate,
    /// Defaults to the Friday of the last week.
    pub end: Option<NaiveDate>,
    pub date_format: String,
    pub layout: TemplateLayout,
    /// Write updated copies here instead of replacing the originals.
    pub output_dir: Option<PathBuf>,
}

impl RedateConfig {
    pub fn new(dir: impl Into<PathBuf>, start: NaiveDate) -> Self {
        Self {
            dir: dir.into(),
            recursive: false,
            start,
            end: None,
            date_format: DEFAULT_DATE_FORMAT.to_owned(),
            layout: TemplateLayout::default(),
            output_dir: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum RedateError {
    #[error("cannot scan {path}: {source}")]
    Scan {
        path: String,
        source: walkdir::Error,
    },
    #[error(transparent)]
    Date(#[from] DateError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Default, Serialize)]
pub struct RedateReport {
    pub updated: Vec<PathBuf>,
    pub failed: Vec<RedateFailure>,
}

#[derive(Debug, Serialize)]
pub struct RedateFailure {
    pub path: PathBuf,
    pub error: String,
}

fn is_report_document(path: &Path) -> bool {
    let is_docx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("docx"))
        .unwrap_or(false);
    let is_lock_file = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with("~$"))
        .unwrap_or(false);
    is_docx && !is_lock_file
}

/// Word documents in `dir`, sorted by path. Lock files (`~$…`) are skipped.
pub fn collect_documents(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, RedateError> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(if recursive { usize::MAX } else { 1 })
        .sort_by_file_name();
    let mut documents = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| RedateError::Scan {
            path: dir.display().to_string(),
            source,
        })?;
        if entry.file_type().is_file() && is_report_document(entry.path()) {
            documents.push(entry.into_path());
        } else {
            debug!(path = %entry.path().display(), "Skipping non-report entry");
        }
    }
    documents.sort();
    Ok(documents)
}

/// Rewrite term dates in one document and return the new package bytes.
pub fn redate_document(
    document: Document,
    layout: &TemplateLayout,
    start: &str,
    end: &str,
    week_dates: &[String],
) -> Result<Vec<u8>, ReportError> {
    let mut writer = ReportWriter::new(document, layout);
    writer.write_term_dates(start, end)?;
    writer.write_week_dates(week_dates)?;
    Ok(writer.into_document().to_bytes()?)
}

fn write_atomically(target: &Path, bytes: &[u8]) -> Result<(), RedateError> {
    let io_err = |source| RedateError::Io {
        path: target.display().to_string(),
        source,
    };
    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(io_err)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
    std::io::Write::write_all(&mut tmp, bytes).map_err(io_err)?;
    tmp.persist(target).map_err(|e| io_err(e.error))?;
    Ok(())
}

pub async fn redate_folder(config: &RedateConfig) -> Result<RedateReport, RedateError> {
    dates::check_format(&config.date_format)?;
    let weeks = config.layout.marks.weeks();
    let end = match config.end {
        Some(end) => end,
        None => dates::term_end(config.start, weeks)?,
    };
    let start_text = config.start.format(&config.date_format).to_string();
    let end_text = end.format(&config.date_format).to_string();
    let week_dates = dates::format_dates(&dates::week_dates(config.start, weeks)?, &config.date_format);

    info!(
        dir = %config.dir.display(),
        start = %start_text,
        end = %end_text,
        "[REDATE] Starting"
    );
    let documents = collect_documents(&config.dir, config.recursive)?;
    if documents.is_empty() {
        warn!(dir = %config.dir.display(), "[REDATE] No Word documents found");
    }

    let mut report = RedateReport::default();
    for path in documents {
        let target = match &config.output_dir {
            Some(out) => out.join(path.strip_prefix(&config.dir).unwrap_or(&path)),
            None => path.clone(),
        };
        let outcome = match tokio::fs::read(&path).await {
            Ok(bytes) => Document::from_bytes(bytes)
                .map_err(ReportError::from)
                .and_then(|doc| redate_document(doc, &config.layout, &start_text, &end_text, &week_dates))
                .map_err(RedateError::from)
                .and_then(|bytes| write_atomically(&target, &bytes)),
            Err(source) => Err(RedateError::Io {
                path: path.display().to_string(),
                source,
            }),
        };
        match outcome {
            Ok(()) => {
                info!(path = %target.display(), "[REDATE] Updated");
                report.updated.push(target);
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "[REDATE][ERROR] Update failed");
                report.failed.push(RedateFailure {
                    path,
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        updated = report.updated.len(),
        failed = report.failed.len(),
        "[REDATE] Complete"
    );
    Ok(report)
}
