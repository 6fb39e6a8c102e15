//! High-level pipeline: one filled report document per student record.
//!
//! The template is read once; every record gets its own copy, rendered with
//! [`crate::report::render_report`] and handed to a [`ReportSink`].
//!
//! # Responsibilities
//! - Fail-fast: the first record that cannot be rendered or stored stops the
//!   run, and the error names the record's position
//! - Records with neither `id` nor `name` are skipped and listed in the
//!   report, since they cannot be told apart in the output folder
//! - Logs progress for every record
//!
//! # Navigation
//! - Main entrypoint: [`fill_reports`]
//! - Supporting types: [`FillConfig`], [`FillReport`]

use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::contract::{ReportSink, SinkError};
use crate::dates::{check_format, DateError, DEFAULT_DATE_FORMAT};
use crate::docx::{DocxError, Document};
use crate::layout::TemplateLayout;
use crate::record::StudentRecord;
use crate::report::{render_report, ReportError};

#[derive(Debug, Clone)]
pub struct FillConfig {
    pub template: PathBuf,
    pub layout: TemplateLayout,
    pub date_format: String,
}

impl FillConfig {
    pub fn new(template: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            layout: TemplateLayout::default(),
            date_format: DEFAULT_DATE_FORMAT.to_owned(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FillError {
    #[error(transparent)]
    Date(#[from] DateError),
    #[error("failed to read template {path}: {source}")]
    Template {
        path: String,
        source: std::io::Error,
    },
    #[error("template {path} is not a usable Word document: {source}")]
    TemplateFormat { path: String, source: DocxError },
    #[error("record {index} ({student}): {source}")]
    Render {
        index: usize,
        student: String,
        source: ReportError,
    },
    #[error("record {index} ({student}): could not store report: {source}")]
    Sink {
        index: usize,
        student: String,
        source: SinkError,
    },
}

#[derive(Debug, Serialize)]
pub struct FillReport {
    pub generated: Vec<GeneratedReport>,
    pub skipped: Vec<SkippedRecord>,
}

#[derive(Debug, Serialize)]
pub struct GeneratedReport {
    pub index: usize,
    pub student: String,
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("static pattern"))
}

/// `<id>_<name>.docx` with anything outside `[A-Za-z0-9._-]` collapsed to `_`.
pub fn output_file_name(record: &StudentRecord, index: usize) -> String {
    let parts: Vec<&str> = [record.id.as_deref(), record.name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let joined = parts.join("_");
    let stem = unsafe_chars().replace_all(&joined, "_");
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        format!("report_{index}.docx")
    } else {
        format!("{stem}.docx")
    }
}

pub async fn fill_reports<S>(
    config: &FillConfig,
    records: &[StudentRecord],
    sink: &S,
) -> Result<FillReport, FillError>
where
    S: ReportSink + Sync,
{
    info!(template = %config.template.display(), records = records.len(), "[FILL] Starting");

    check_format(&config.date_format)?;

    let template_bytes = tokio::fs::read(&config.template).await.map_err(|source| {
        error!(error = ?source, path = %config.template.display(), "[FILL][ERROR] Template unreadable");
        FillError::Template {
            path: config.template.display().to_string(),
            source,
        }
    })?;
    let template = Document::from_bytes(template_bytes).map_err(|source| {
        error!(error = %source, "[FILL][ERROR] Template is not a Word document");
        FillError::TemplateFormat {
            path: config.template.display().to_string(),
            source,
        }
    })?;
    debug!(tables = template.table_count(), "[FILL] Template loaded");

    let mut generated = Vec::new();
    let mut skipped = Vec::new();

    for (index, record) in records.iter().enumerate() {
        if record.id.is_none() && record.name.is_none() {
            warn!(index, "[FILL] Record has neither id nor name; skipping");
            skipped.push(SkippedRecord {
                index,
                reason: "missing id and name".to_owned(),
            });
            continue;
        }
        let student = record.display_name().unwrap_or_default().to_owned();

        let document = render_report(template.clone(), &config.layout, record, &config.date_format)
            .map_err(|source| {
                error!(index, student = %student, error = %source, "[FILL][ERROR] Render failed");
                FillError::Render {
                    index,
                    student: student.clone(),
                    source,
                }
            })?;
        let bytes = document.to_bytes().map_err(|source| FillError::Render {
            index,
            student: student.clone(),
            source: source.into(),
        })?;

        let file_name = output_file_name(record, index);
        let path = sink.write_report(&file_name, bytes).await.map_err(|source| {
            error!(index, file = %file_name, error = %source, "[FILL][ERROR] Sink rejected report");
            FillError::Sink {
                index,
                student: student.clone(),
                source,
            }
        })?;
        info!(index, student = %student, path = %path.display(), "[FILL] Report generated");
        generated.push(GeneratedReport {
            index,
            student,
            path,
        });
    }

    info!(
        generated = generated.len(),
        skipped = skipped.len(),
        "[FILL] Complete"
    );
    Ok(FillReport { generated, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: Option<&str>, name: Option<&str>) -> StudentRecord {
        StudentRecord {
            id: id.map(Into::into),
            name: name.map(Into::into),
            ..Default::default()
        }
    }

    #[test]
    fn file_names_are_sanitised() {
        assert_eq!(
            output_file_name(&record(Some("1001"), Some("Ann Lee")), 0),
            "1001_Ann_Lee.docx"
        );
        assert_eq!(
            output_file_name(&record(None, Some("O'Brien / Sean")), 0),
            "O_Brien_Sean.docx"
        );
        assert_eq!(output_file_name(&record(Some("7"), None), 0), "7.docx");
        assert_eq!(output_file_name(&record(Some("  "), Some("//")), 4), "report_4.docx");
    }
}
