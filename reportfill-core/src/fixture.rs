//! In-memory report template matching [`TemplateLayout::default`], for tests.
//!
//! Heading table: identity placeholders split over two runs (the first
//! bold) so run clearing is observable. Marks table: 13 rows by 8 columns
//! with week labels. Comments table: a label paragraph and an empty
//! paragraph carrying mark properties.
//!
//! [`TemplateLayout::default`]: crate::layout::TemplateLayout

use std::io::{Cursor, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:styleId="Normal"/></w:styles>"#;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

fn para(text: &str) -> String {
    if text.is_empty() {
        "<w:p/>".to_owned()
    } else {
        format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
    }
}

/// Placeholder split over a bold run and a plain run.
fn split_para(text: &str) -> String {
    let (a, b) = text.split_at(text.len() / 2);
    format!(
        "<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>{a}</w:t></w:r><w:proofErr w:type=\"spellStart\"/><w:r><w:t>{b}</w:t></w:r></w:p>"
    )
}

fn cell(paragraphs: &[String]) -> String {
    format!("<w:tc>{}</w:tc>", paragraphs.concat())
}

fn row(cells: &[String]) -> String {
    format!("<w:tr>{}</w:tr>", cells.concat())
}

fn table(rows: &[String]) -> String {
    format!("<w:tbl><w:tblPr/>{}</w:tbl>", rows.concat())
}

fn heading_table() -> String {
    let labelled = |label: &str, value: &str| cell(&[para(label), para(""), split_para(value)]);
    let short = |label: &str, value: &str| cell(&[para(label), split_para(value)]);
    let blank = || cell(&[para("")]);
    table(&[
        row(&[
            labelled("Student ID", "IDID"),
            labelled("Name", "NAME"),
            short("Course", "COURSE"),
            labelled("Start", "SDSD"),
            labelled("End", "EDED"),
        ]),
        row(&[blank(), blank(), short("Class", "CLCL"), blank(), blank()]),
    ])
}

fn marks_table() -> String {
    let labels = [
        "Week", "1", "2", "3", "4", "5", "Mid", "6", "7", "8", "9", "10", "Final",
    ];
    let rows: Vec<String> = labels
        .iter()
        .enumerate()
        .map(|(r, label)| {
            let mut cells = vec![cell(&[para(label)])];
            for c in 1..8 {
                let text = if r == 0 {
                    if c == 1 { "Date".to_owned() } else { format!("C{}", c - 1) }
                } else {
                    String::new()
                };
                cells.push(cell(&[para(&text)]));
            }
            row(&cells)
        })
        .collect();
    table(&rows)
}

fn comments_table() -> String {
    let empty_with_mark =
        "<w:p><w:pPr><w:rPr><w:i/></w:rPr></w:pPr></w:p>".to_owned();
    table(&[row(&[cell(&[para("Comments"), empty_with_mark])])])
}

pub fn document_xml() -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>\
         {}{}{}{}{}<w:sectPr/></w:body></w:document>",
        heading_table(),
        para(""),
        marks_table(),
        para(""),
        comments_table()
    )
}

/// Zip package bytes of a document whose main part is `document_xml`.
pub fn package_with(document_xml: &str) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", RELS),
        ("word/document.xml", document_xml),
        ("word/styles.xml", STYLES_XML),
    ];
    for (name, body) in parts {
        zip.start_file(name, options).expect("start zip entry");
        zip.write_all(body.as_bytes()).expect("write zip entry");
    }
    zip.finish().expect("finish zip").into_inner()
}

pub fn template_bytes() -> Vec<u8> {
    package_with(&document_xml())
}

pub fn write_template<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    std::fs::write(path, template_bytes())
}
