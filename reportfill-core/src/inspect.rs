//! Dump the text of every table cell in a document, to find the
//! coordinates a layout should point at.
//!
//! Columns are grid columns, the same numbering a `CellRef` uses: a
//! spanned or vertically merged cell is listed under every column it covers.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::docx::{DocxError, Document, TableDump};

#[derive(Debug, Serialize)]
pub struct Inspection {
    pub tables: Vec<TableDump>,
}

pub fn inspect(document: &Document) -> Result<Inspection, DocxError> {
    Ok(Inspection {
        tables: document.dump_tables()?,
    })
}

pub fn inspect_file<P: AsRef<Path>>(path: P) -> Result<Inspection, DocxError> {
    inspect(&Document::open(path)?)
}

impl fmt::Display for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for table in &self.tables {
            writeln!(f, "table {} ({} rows)", table.index, table.rows.len())?;
            for (r, row) in table.rows.iter().enumerate() {
                for (c, paragraphs) in row.iter().enumerate() {
                    writeln!(f, "table {} row {} col {}: {:?}", table.index, r, c, paragraphs)?;
                }
            }
        }
        Ok(())
    }
}
