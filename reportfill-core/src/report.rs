//! Writes one student's record into the cells of a report template.

use thiserror::Error;
use tracing::{debug, warn};

use crate::dates::{self, DateError};
use crate::docx::{DocxError, Document};
use crate::layout::{CellRef, TemplateLayout};
use crate::record::StudentRecord;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Docx(#[from] DocxError),
    #[error(transparent)]
    Date(#[from] DateError),
    #[error("week range {first}..={last} is outside the {weeks}-week term")]
    WeekRange {
        first: usize,
        last: usize,
        weeks: usize,
    },
    #[error("{given} week dates given but the template has {weeks} weeks")]
    TooManyDates { given: usize, weeks: usize },
    #[error("record has a comment but the layout has no comment cell")]
    NoCommentCell,
}

pub struct ReportWriter<'a> {
    document: Document,
    layout: &'a TemplateLayout,
}

impl<'a> ReportWriter<'a> {
    pub fn new(document: Document, layout: &'a TemplateLayout) -> Self {
        Self { document, layout }
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    fn put(&mut self, at: &CellRef, text: &str) -> Result<(), ReportError> {
        self.document.set_paragraph_text(at, text)?;
        Ok(())
    }

    /// Write the identity fields present on the record. Returns how many
    /// were written.
    pub fn write_identity(&mut self, record: &StudentRecord) -> Result<usize, ReportError> {
        let cells = &self.layout.identity;
        let fields = [
            (&cells.id, &record.id),
            (&cells.name, &record.name),
            (&cells.course, &record.course),
            (&cells.class, &record.class),
            (&cells.start_date, &record.start_date),
            (&cells.end_date, &record.end_date),
        ];
        let mut written = 0;
        for (at, value) in fields {
            if let Some(text) = value {
                self.document.set_paragraph_text(at, text)?;
                written += 1;
            }
        }
        Ok(written)
    }

    pub fn write_term_dates(&mut self, start: &str, end: &str) -> Result<(), ReportError> {
        let identity = self.layout.identity.clone();
        self.put(&identity.start_date, start)?;
        self.put(&identity.end_date, end)
    }

    /// One date per week, into the date column of each week row.
    pub fn write_week_dates<S: AsRef<str>>(&mut self, dates: &[S]) -> Result<(), ReportError> {
        let marks = &self.layout.marks;
        if dates.len() > marks.weeks() {
            return Err(ReportError::TooManyDates {
                given: dates.len(),
                weeks: marks.weeks(),
            });
        }
        let cells: Vec<CellRef> = marks
            .week_rows
            .iter()
            .map(|&row| marks.cell(row, marks.date_column))
            .collect();
        for (at, date) in cells.iter().zip(dates) {
            self.put(at, date.as_ref())?;
        }
        Ok(())
    }

    /// Write a block of marks starting at the row of `first_week`.
    ///
    /// Rows are consecutive table rows, so a block crossing the middle of
    /// the term also fills the summary row in between.
    pub fn write_marks(
        &mut self,
        first_week: usize,
        last_week: usize,
        marks: &[Vec<Option<String>>],
    ) -> Result<(), ReportError> {
        let layout = &self.layout.marks;
        let range_err = ReportError::WeekRange {
            first: first_week,
            last: last_week,
            weeks: layout.weeks(),
        };
        let Some(expected) = layout.expected_rows(first_week, last_week) else {
            return Err(range_err);
        };
        let Some(start_row) = layout.row_for_week(first_week) else {
            return Err(range_err);
        };
        if marks.len() > expected {
            warn!(
                first_week,
                last_week,
                rows = marks.len(),
                expected,
                "More mark rows than the week range covers; writing them anyway"
            );
        }

        let mut cells = Vec::new();
        for (i, row) in marks.iter().enumerate() {
            for (j, mark) in row.iter().enumerate() {
                if let Some(text) = mark {
                    cells.push((layout.cell(start_row + i, layout.first_mark_column + j), text));
                }
            }
        }
        debug!(cells = cells.len(), start_row, "Writing marks");
        for (at, text) in cells {
            self.put(&at, text)?;
        }
        Ok(())
    }

    pub fn write_comment(&mut self, comment: &str) -> Result<(), ReportError> {
        let at = self.layout.comment.ok_or(ReportError::NoCommentCell)?;
        self.put(&at, comment)
    }
}

/// Week dates for a record: its explicit `dates`, else derived from `sd`.
pub fn record_week_dates(
    record: &StudentRecord,
    weeks: usize,
    date_format: &str,
) -> Result<Option<Vec<String>>, ReportError> {
    if !record.dates.is_empty() {
        return Ok(Some(record.dates.clone()));
    }
    let Some(start) = record.start_date.as_deref() else {
        return Ok(None);
    };
    match dates::parse_date(start, date_format) {
        Ok(date) => {
            let mondays = dates::week_dates(date, weeks)?;
            Ok(Some(dates::format_dates(&mondays, date_format)))
        }
        Err(e) => {
            warn!(error = %e, "Start date not parseable; leaving week dates untouched");
            Ok(None)
        }
    }
}

/// Fill a template document with everything present on `record`.
pub fn render_report(
    document: Document,
    layout: &TemplateLayout,
    record: &StudentRecord,
    date_format: &str,
) -> Result<Document, ReportError> {
    let mut writer = ReportWriter::new(document, layout);
    let fields = writer.write_identity(record)?;

    match record_week_dates(record, layout.marks.weeks(), date_format)? {
        Some(week_dates) => writer.write_week_dates(&week_dates)?,
        None => warn!(
            student = record.display_name().unwrap_or("?"),
            "No week dates for record"
        ),
    }

    if !record.marks.is_empty() {
        let (first, last) = record.week_range(layout.marks.weeks());
        writer.write_marks(first, last, &record.marks)?;
    }

    if let Some(comment) = record.comment.as_deref() {
        writer.write_comment(comment)?;
    }

    debug!(fields, marks = record.marks.len(), "Rendered report");
    Ok(writer.into_document())
}
