//! Word (`.docx`) package access and table-cell editing.
//!
//! A `.docx` file is a zip package; the body text lives in
//! `word/document.xml`. Only that part is parsed and rewritten, every other
//! part is copied through raw so images, styles and relationships survive
//! unchanged.
//!
//! Table access mirrors how the report templates are addressed: top-level
//! body tables by index, then grid row/column, then the n-th paragraph of
//! the cell.

mod table;
pub mod xml;

use std::io::{Cursor, Read, Write};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::layout::CellRef;
use xml::XmlTree;

pub use table::TableDump;

/// Zip entry holding the main document part.
pub const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip package error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("package has no {0} part")]
    MissingPart(&'static str),
    #[error("malformed document XML: {0}")]
    Malformed(String),
    #[error("document has no table {0}")]
    NoTable(usize),
    #[error("table {table} has no cell at row {row}, column {col}")]
    NoCell { table: usize, row: usize, col: usize },
    #[error("cell at row {row}, column {col} of table {table} has no paragraph {paragraph}")]
    NoParagraph {
        table: usize,
        row: usize,
        col: usize,
        paragraph: usize,
    },
}

/// An opened `.docx` package with its main document part parsed.
#[derive(Debug, Clone)]
pub struct Document {
    package: Vec<u8>,
    xml: XmlTree,
}

impl Document {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DocxError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Opening Word document");
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(package: Vec<u8>) -> Result<Self, DocxError> {
        let mut archive = ZipArchive::new(Cursor::new(package.as_slice()))?;
        let mut part = match archive.by_name(DOCUMENT_PART) {
            Ok(part) => part,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(DocxError::MissingPart(DOCUMENT_PART))
            }
            Err(e) => return Err(e.into()),
        };
        let mut raw = Vec::with_capacity(part.size() as usize);
        part.read_to_end(&mut raw)?;
        drop(part);
        drop(archive);

        let xml = XmlTree::parse(&raw)?;
        let doc = Self { package, xml };
        debug!(tables = doc.table_count(), "Parsed main document part");
        Ok(doc)
    }

    /// Number of top-level tables in the document body.
    pub fn table_count(&self) -> usize {
        self.body()
            .map(|body| body.child_positions("w:tbl").len())
            .unwrap_or(0)
    }

    /// Replace the text of one paragraph in a table cell.
    ///
    /// The first run receives `text` and keeps its formatting; all later
    /// runs are emptied but left in place with their properties.
    pub fn set_paragraph_text(&mut self, at: &CellRef, text: &str) -> Result<(), DocxError> {
        let body = self.body_mut()?;
        let paragraph = table::paragraph_mut(body, at)?;
        table::assign_text(paragraph, text);
        debug!(?at, text, "Assigned paragraph text");
        Ok(())
    }

    pub fn paragraph_text(&self, at: &CellRef) -> Result<String, DocxError> {
        let body = self.body()?;
        let paragraph = table::paragraph(body, at)?;
        Ok(table::paragraph_text(paragraph))
    }

    /// Text of every paragraph of every cell, grouped by table and row.
    pub fn dump_tables(&self) -> Result<Vec<TableDump>, DocxError> {
        let body = self.body()?;
        body.child_positions("w:tbl")
            .into_iter()
            .enumerate()
            .map(|(index, position)| {
                let tbl = body
                    .element_at(position)
                    .ok_or(DocxError::NoTable(index))?;
                Ok(table::dump(index, tbl))
            })
            .collect()
    }

    /// Serialise the package with the edited document part.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let document_xml = self.xml.to_bytes()?;
        let mut archive = ZipArchive::new(Cursor::new(self.package.as_slice()))?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for index in 0..archive.len() {
            let entry = archive.by_index_raw(index)?;
            if entry.name() == DOCUMENT_PART {
                drop(entry);
                writer.start_file(DOCUMENT_PART, options)?;
                writer.write_all(&document_xml)?;
            } else {
                writer.raw_copy_file(entry)?;
            }
        }
        Ok(writer.finish()?.into_inner())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DocxError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        std::fs::write(path, &bytes)?;
        info!(path = %path.display(), size = bytes.len(), "Saved Word document");
        Ok(())
    }

    fn body(&self) -> Result<&xml::Element, DocxError> {
        self.xml
            .root()
            .and_then(|root| root.child("w:body"))
            .ok_or_else(|| DocxError::Malformed("missing w:document/w:body".into()))
    }

    fn body_mut(&mut self) -> Result<&mut xml::Element, DocxError> {
        let root = self
            .xml
            .root_mut()
            .ok_or_else(|| DocxError::Malformed("missing w:document".into()))?;
        let position = root
            .child_positions("w:body")
            .first()
            .copied()
            .ok_or_else(|| DocxError::Malformed("missing w:document/w:body".into()))?;
        root.element_at_mut(position)
            .ok_or_else(|| DocxError::Malformed("missing w:document/w:body".into()))
    }
}
