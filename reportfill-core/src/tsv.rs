//! Turn a tab separated class list into blank report YAML.
//!
//! Input lines have the form `ID<TAB>NAME<TAB>START_DATE<TAB>END_DATE`.
//! Each student becomes one YAML document with an identity section, an
//! empty comment and the week range, ready to have marks filled in.

use std::path::Path;

use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum TsvError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("line {line}: expected 4 tab separated columns, found {found}")]
    Columns { line: usize, found: usize },
    #[error("YAML serialisation failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsvStudent {
    pub id: String,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
}

pub fn parse_tsv(text: &str) -> Result<Vec<TsvStudent>, TsvError> {
    let mut students = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < 4 {
            return Err(TsvError::Columns {
                line: i + 1,
                found: cols.len(),
            });
        }
        if cols.len() > 4 {
            debug!(line = i + 1, extra = cols.len() - 4, "Ignoring extra TSV columns");
        }
        students.push(TsvStudent {
            id: cols[0].to_owned(),
            name: cols[1].to_owned(),
            start_date: cols[2].to_owned(),
            end_date: cols[3].to_owned(),
        });
    }
    Ok(students)
}

fn section(entries: Vec<(&str, Value)>) -> Value {
    let mut map = Mapping::new();
    for (key, value) in entries {
        map.insert(Value::String(key.to_owned()), value);
    }
    Value::Mapping(map)
}

/// One `---`/`...` delimited YAML document per student.
pub fn skeleton_yaml(
    students: &[TsvStudent],
    first_week: usize,
    last_week: usize,
) -> Result<String, TsvError> {
    let mut out = String::new();
    for student in students {
        let doc = Value::Sequence(vec![
            section(vec![
                ("name", Value::String(student.name.clone())),
                ("id", Value::String(student.id.clone())),
                ("sd", Value::String(student.start_date.clone())),
                ("ed", Value::String(student.end_date.clone())),
            ]),
            section(vec![("comment", Value::Null)]),
            section(vec![
                ("start", Value::from(first_week as u64)),
                ("end", Value::from(last_week as u64)),
            ]),
        ]);
        out.push_str("---\n");
        out.push_str(&serde_yaml::to_string(&doc)?);
        out.push_str("...\n");
    }
    Ok(out)
}

pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    first_week: usize,
    last_week: usize,
) -> Result<usize, TsvError> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let io_err = |path: &Path| {
        let path = path.display().to_string();
        move |source| TsvError::Io { path, source }
    };
    let text = std::fs::read_to_string(input).map_err(io_err(input))?;
    let students = parse_tsv(&text)?;
    let yaml = skeleton_yaml(&students, first_week, last_week)?;
    std::fs::write(output, yaml).map_err(io_err(output))?;
    info!(
        input = %input.display(),
        output = %output.display(),
        students = students.len(),
        "Wrote blank report YAML"
    );
    Ok(students.len())
}
