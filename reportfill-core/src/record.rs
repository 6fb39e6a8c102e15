//! Student records read from multi-document YAML.
//!
//! Each YAML document describes one student. A document is either a single
//! mapping or a sequence of mappings ("sections"); sections are merged in
//! order, so a skeleton like
//!
//! ```yaml
//! ---
//! - {name: "Ann Lee", id: "1001", sd: "08/01/2024", ed: "15/03/2024"}
//! - comment: Works hard.
//! - {start: 1, end: 10, marks: [[A, B, C]]}
//! ...
//! ```
//!
//! yields one record. Scalars of any YAML type are accepted where text is
//! expected; `null` means the value is absent.

use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to read records file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid YAML in document {index}: {source}")]
    Yaml {
        index: usize,
        source: serde_yaml::Error,
    },
    #[error("document {index}: {message}")]
    Shape { index: usize, message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(default, deserialize_with = "opt_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub course: Option<String>,
    #[serde(default, rename = "cl", deserialize_with = "opt_text")]
    pub class: Option<String>,
    #[serde(default, rename = "sd", deserialize_with = "opt_text")]
    pub start_date: Option<String>,
    #[serde(default, rename = "ed", deserialize_with = "opt_text")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub comment: Option<String>,
    /// First week the marks block covers, 1-based.
    #[serde(default)]
    pub start: Option<usize>,
    /// Last week the marks block covers, inclusive.
    #[serde(default)]
    pub end: Option<usize>,
    #[serde(default, deserialize_with = "mark_rows")]
    pub marks: Vec<Vec<Option<String>>>,
    /// Explicit week dates, overriding the ones derived from `sd`.
    #[serde(default, deserialize_with = "text_list")]
    pub dates: Vec<String>,
}

impl StudentRecord {
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.id.as_deref())
    }

    /// Resolved `(first, last)` week range, defaulting to the whole term.
    pub fn week_range(&self, weeks: usize) -> (usize, usize) {
        (self.start.unwrap_or(1), self.end.unwrap_or(weeks))
    }
}

/// Textual form of a YAML scalar; `Ok(None)` for null.
fn scalar_text(value: &Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => Err("expected a scalar value".to_owned()),
    }
}

fn opt_text<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(de)?;
    scalar_text(&value).map_err(D::Error::custom)
}

fn text_list<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<String>, D::Error> {
    let values = Option::<Vec<Value>>::deserialize(de)?.unwrap_or_default();
    values
        .iter()
        .map(|v| scalar_text(v).map(Option::unwrap_or_default))
        .collect::<Result<_, _>>()
        .map_err(D::Error::custom)
}

fn mark_rows<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<Vec<Option<String>>>, D::Error> {
    let rows = Option::<Vec<Option<Vec<Value>>>>::deserialize(de)?.unwrap_or_default();
    rows.into_iter()
        .map(|row| {
            row.unwrap_or_default()
                .iter()
                .map(scalar_text)
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<_, _>>()
        .map_err(D::Error::custom)
}

/// Merge one YAML document into a single mapping.
pub fn merge_sections(index: usize, doc: Value) -> Result<Option<Mapping>, RecordError> {
    match doc {
        Value::Null => Ok(None),
        Value::Mapping(map) => Ok(Some(map)),
        Value::Sequence(sections) => {
            let mut merged = Mapping::new();
            for section in sections {
                match section {
                    Value::Null => {}
                    Value::Mapping(map) => {
                        for (key, value) in map {
                            if merged.contains_key(&key) {
                                debug!(document = index, ?key, "Later section overrides key");
                            }
                            merged.insert(key, value);
                        }
                    }
                    other => {
                        return Err(RecordError::Shape {
                            index,
                            message: format!("section is not a mapping: {other:?}"),
                        })
                    }
                }
            }
            Ok(Some(merged))
        }
        other => Err(RecordError::Shape {
            index,
            message: format!("expected a mapping or a list of mappings, got {other:?}"),
        }),
    }
}

/// Parse every student record in a YAML stream, in document order.
pub fn parse_records(text: &str) -> Result<Vec<StudentRecord>, RecordError> {
    let mut records = Vec::new();
    for (index, document) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let value =
            Value::deserialize(document).map_err(|source| RecordError::Yaml { index, source })?;
        let Some(merged) = merge_sections(index, value)? else {
            debug!(document = index, "Skipping empty YAML document");
            continue;
        };
        let record: StudentRecord = serde_yaml::from_value(Value::Mapping(merged))
            .map_err(|source| RecordError::Yaml { index, source })?;
        records.push(record);
    }
    Ok(records)
}

pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<StudentRecord>, RecordError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| RecordError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let records = parse_records(&text)?;
    info!(path = %path.display(), count = records.len(), "Loaded student records");
    Ok(records)
}
