//! Grid addressing of WordprocessingML tables and paragraph run editing.

use serde::Serialize;

use super::xml::{Element, Node};
use super::DocxError;
use crate::layout::CellRef;

/// Text content of one table, as `rows[row][col][paragraph]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDump {
    pub index: usize,
    pub rows: Vec<Vec<Vec<String>>>,
}

/// Position of a cell: index of its `w:tr` and `w:tc` among their parents' children.
type CellPosition = (usize, usize);

/// Maps every (row, grid column) to the cell covering it.
///
/// `gridSpan` cells cover several columns, `gridBefore` leaves leading
/// columns uncovered, and a `vMerge` continuation cell resolves to the cell
/// covering the same column in the row above.
fn grid(tbl: &Element) -> Vec<Vec<Option<CellPosition>>> {
    let mut rows: Vec<Vec<Option<CellPosition>>> = Vec::new();
    for tr_pos in tbl.child_positions("w:tr") {
        let Some(tr) = tbl.element_at(tr_pos) else {
            continue;
        };
        let skip = tr
            .child("w:trPr")
            .and_then(|pr| pr.child("w:gridBefore"))
            .and_then(|el| el.attr("w:val"))
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        let mut cols: Vec<Option<CellPosition>> = vec![None; skip];

        for tc_pos in tr.child_positions("w:tc") {
            let Some(tc) = tr.element_at(tc_pos) else {
                continue;
            };
            let props = tc.child("w:tcPr");
            let span = props
                .and_then(|pr| pr.child("w:gridSpan"))
                .and_then(|el| el.attr("w:val"))
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(1)
                .max(1);
            let continues_merge = props
                .and_then(|pr| pr.child("w:vMerge"))
                .map(|el| el.attr("w:val").as_deref() != Some("restart"))
                .unwrap_or(false);

            for _ in 0..span {
                let col = cols.len();
                let above = rows.last().and_then(|prev| prev.get(col).copied().flatten());
                let cell = match (continues_merge, above) {
                    (true, Some(origin)) => Some(origin),
                    _ => Some((tr_pos, tc_pos)),
                };
                cols.push(cell);
            }
        }
        rows.push(cols);
    }
    rows
}

/// Locate `(tbl position in body, tc position)` for a cell reference.
fn locate(body: &Element, at: &CellRef) -> Result<(usize, CellPosition), DocxError> {
    let tbl_pos = *body
        .child_positions("w:tbl")
        .get(at.table)
        .ok_or(DocxError::NoTable(at.table))?;
    let tbl = body.element_at(tbl_pos).ok_or(DocxError::NoTable(at.table))?;
    let cell = grid(tbl)
        .get(at.row)
        .and_then(|cols| cols.get(at.col).copied().flatten())
        .ok_or(DocxError::NoCell {
            table: at.table,
            row: at.row,
            col: at.col,
        })?;
    Ok((tbl_pos, cell))
}

fn no_paragraph(at: &CellRef) -> DocxError {
    DocxError::NoParagraph {
        table: at.table,
        row: at.row,
        col: at.col,
        paragraph: at.paragraph,
    }
}

fn no_cell(at: &CellRef) -> DocxError {
    DocxError::NoCell {
        table: at.table,
        row: at.row,
        col: at.col,
    }
}

pub(super) fn paragraph<'a>(body: &'a Element, at: &CellRef) -> Result<&'a Element, DocxError> {
    let (tbl_pos, (tr_pos, tc_pos)) = locate(body, at)?;
    let tc = body
        .element_at(tbl_pos)
        .and_then(|tbl| tbl.element_at(tr_pos))
        .and_then(|tr| tr.element_at(tc_pos))
        .ok_or_else(|| no_cell(at))?;
    let p_pos = *tc
        .child_positions("w:p")
        .get(at.paragraph)
        .ok_or_else(|| no_paragraph(at))?;
    tc.element_at(p_pos).ok_or_else(|| no_paragraph(at))
}

pub(super) fn paragraph_mut<'a>(
    body: &'a mut Element,
    at: &CellRef,
) -> Result<&'a mut Element, DocxError> {
    let (tbl_pos, (tr_pos, tc_pos)) = locate(body, at)?;
    let tc = body
        .element_at_mut(tbl_pos)
        .and_then(|tbl| tbl.element_at_mut(tr_pos))
        .and_then(|tr| tr.element_at_mut(tc_pos))
        .ok_or_else(|| no_cell(at))?;
    let p_pos = *tc
        .child_positions("w:p")
        .get(at.paragraph)
        .ok_or_else(|| no_paragraph(at))?;
    tc.element_at_mut(p_pos).ok_or_else(|| no_paragraph(at))
}

/// Put `text` into the first run and empty the rest.
pub(super) fn assign_text(paragraph: &mut Element, text: &str) {
    let mut runs = paragraph.child_positions("w:r");
    if runs.is_empty() {
        let run = new_run(paragraph);
        paragraph.push(Node::Element(run));
        runs = paragraph.child_positions("w:r");
    }
    for (n, pos) in runs.into_iter().enumerate() {
        if let Some(run) = paragraph.element_at_mut(pos) {
            clear_run(run);
            if n == 0 {
                append_run_text(run, text);
            }
        }
    }
}

/// A fresh run carrying the paragraph mark's run properties, if any.
fn new_run(paragraph: &Element) -> Element {
    let mut run = Element::new("w:r");
    if let Some(mark_props) = paragraph.child("w:pPr").and_then(|ppr| ppr.child("w:rPr")) {
        run.push(Node::Element(mark_props.clone()));
    }
    run
}

/// Drop everything in a run except its formatting properties.
fn clear_run(run: &mut Element) {
    run.children
        .retain(|node| matches!(node, Node::Element(el) if el.is("w:rPr")));
}

fn append_run_text(run: &mut Element, text: &str) {
    let mut chunk = String::new();
    for ch in text.chars() {
        match ch {
            '\r' => {}
            '\t' | '\n' => {
                flush_text(run, &mut chunk);
                let name = if ch == '\t' { "w:tab" } else { "w:br" };
                let mut el = Element::new(name);
                el.self_closing = true;
                run.push(Node::Element(el));
            }
            _ => chunk.push(ch),
        }
    }
    flush_text(run, &mut chunk);
}

fn flush_text(run: &mut Element, chunk: &mut String) {
    if chunk.is_empty() {
        return;
    }
    let mut t = Element::new("w:t");
    if chunk.starts_with(char::is_whitespace) || chunk.ends_with(char::is_whitespace) {
        t = t.with_attribute("xml:space", "preserve");
    }
    t.push_text(chunk);
    run.push(Node::Element(t));
    chunk.clear();
}

/// Visible text of the paragraph's direct runs.
pub(super) fn paragraph_text(paragraph: &Element) -> String {
    let mut out = String::new();
    for run in paragraph.elements().filter(|el| el.is("w:r")) {
        for el in run.elements() {
            if el.is("w:t") {
                out.push_str(&el.text());
            } else if el.is("w:tab") {
                out.push('\t');
            } else if el.is("w:br") || el.is("w:cr") {
                out.push('\n');
            }
        }
    }
    out
}

/// Paragraph texts per grid row and grid column. Columns covered by a
/// spanned or merged cell repeat that cell; uncovered columns are empty.
pub(super) fn dump(index: usize, tbl: &Element) -> TableDump {
    let rows: Vec<Vec<Vec<String>>> = grid(tbl)
        .into_iter()
        .map(|cols| {
            cols.into_iter()
                .map(|cell| {
                    cell.and_then(|(tr_pos, tc_pos)| {
                        tbl.element_at(tr_pos).and_then(|tr| tr.element_at(tc_pos))
                    })
                    .map(|tc| {
                        tc.elements()
                            .filter(|el| el.is("w:p"))
                            .map(paragraph_text)
                            .collect()
                    })
                    .unwrap_or_default()
                })
                .collect()
        })
        .collect();
    TableDump { index, rows }
}
