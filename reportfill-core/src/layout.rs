//! Where each piece of a report lives inside the Word template.
//!
//! The defaults describe the standard ten-week report template: a heading
//! table with the student's identity, a marks table with one row per week
//! plus a summary row after each half of the term, and a comments table.
//! Config files may override any subset of these positions.

use serde::{Deserialize, Serialize};

/// A paragraph inside a table cell: top-level table index, grid row, grid
/// column, paragraph index within the cell. All zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRef {
    pub table: usize,
    pub row: usize,
    pub col: usize,
    #[serde(default)]
    pub paragraph: usize,
}

impl CellRef {
    pub const fn new(table: usize, row: usize, col: usize, paragraph: usize) -> Self {
        Self {
            table,
            row,
            col,
            paragraph,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateLayout {
    pub identity: IdentityLayout,
    pub marks: MarksLayout,
    /// Cell receiving the free-text comment; `None` when the template has none.
    pub comment: Option<CellRef>,
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            identity: IdentityLayout::default(),
            marks: MarksLayout::default(),
            comment: Some(CellRef::new(2, 0, 0, 1)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityLayout {
    pub id: CellRef,
    pub name: CellRef,
    pub course: CellRef,
    pub class: CellRef,
    pub start_date: CellRef,
    pub end_date: CellRef,
}

impl Default for IdentityLayout {
    fn default() -> Self {
        Self {
            id: CellRef::new(0, 0, 0, 2),
            name: CellRef::new(0, 0, 1, 2),
            course: CellRef::new(0, 0, 2, 1),
            class: CellRef::new(0, 1, 2, 1),
            start_date: CellRef::new(0, 0, 3, 2),
            end_date: CellRef::new(0, 0, 4, 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarksLayout {
    pub table: usize,
    /// Table row of each week, in week order. Its length is the term length.
    pub week_rows: Vec<usize>,
    /// Rows holding per-half summaries; they sit between week rows.
    pub summary_rows: Vec<usize>,
    pub date_column: usize,
    pub first_mark_column: usize,
    pub paragraph: usize,
}

impl Default for MarksLayout {
    fn default() -> Self {
        Self {
            table: 1,
            week_rows: vec![1, 2, 3, 4, 5, 7, 8, 9, 10, 11],
            summary_rows: vec![6, 12],
            date_column: 1,
            first_mark_column: 2,
            paragraph: 0,
        }
    }
}

impl MarksLayout {
    pub fn weeks(&self) -> usize {
        self.week_rows.len()
    }

    /// Table row of a 1-based week number.
    pub fn row_for_week(&self, week: usize) -> Option<usize> {
        week.checked_sub(1).and_then(|i| self.week_rows.get(i).copied())
    }

    /// Rows a marks block for `first..=last` spans: the weeks themselves plus
    /// every summary row after the first week up to the row following the
    /// last week.
    pub fn expected_rows(&self, first: usize, last: usize) -> Option<usize> {
        let first_row = self.row_for_week(first)?;
        let last_row = self.row_for_week(last)?;
        if last < first {
            return None;
        }
        let summaries = self
            .summary_rows
            .iter()
            .filter(|&&row| row > first_row && row <= last_row + 1)
            .count();
        Some(last - first + 1 + summaries)
    }

    pub fn cell(&self, row: usize, col: usize) -> CellRef {
        CellRef::new(self.table, row, col, self.paragraph)
    }
}
