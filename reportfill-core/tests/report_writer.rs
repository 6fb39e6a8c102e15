use reportfill_core::docx::{DocxError, Document};
use reportfill_core::fixture;
use reportfill_core::layout::{CellRef, TemplateLayout};
use reportfill_core::record::{parse_records, StudentRecord};
use reportfill_core::report::{render_report, ReportError, ReportWriter};

fn template() -> Document {
    Document::from_bytes(fixture::template_bytes()).expect("fixture template parses")
}

fn text(doc: &Document, table: usize, row: usize, col: usize, paragraph: usize) -> String {
    doc.paragraph_text(&CellRef::new(table, row, col, paragraph))
        .unwrap()
}

#[test]
fn fixture_matches_default_layout() {
    let doc = template();
    assert_eq!(doc.table_count(), 3);
    assert_eq!(text(&doc, 0, 0, 0, 2), "IDID");
    assert_eq!(text(&doc, 0, 1, 2, 1), "CLCL");
    assert_eq!(text(&doc, 1, 6, 0, 0), "Mid");
    assert_eq!(text(&doc, 2, 0, 0, 0), "Comments");
}

#[test]
fn full_record_lands_in_the_expected_cells() {
    let yaml = r#"
- {name: "Biggles", id: "666", course: "DDD", cl: "Int", sd: "03/01/2024", ed: "08/03/2024"}
- comment: "Steady progress."
- start: 1
  end: 10
  marks:
    - [K, L, M, N, O, P]
    - [L, M, N, O, P, Q]
    - [M, N, O, P, Q, R]
    - [N, O, P, Q, R, S]
    - [O, P, Q, R, S, T]
    - [P, Q, R, S, T, U]
    - [Q, R, S, T, U, V]
"#;
    let record = &parse_records(yaml).unwrap()[0];
    let layout = TemplateLayout::default();
    let doc = render_report(template(), &layout, record, "%d/%m/%Y").unwrap();

    assert_eq!(text(&doc, 0, 0, 0, 2), "666");
    assert_eq!(text(&doc, 0, 0, 1, 2), "Biggles");
    assert_eq!(text(&doc, 0, 0, 2, 1), "DDD");
    assert_eq!(text(&doc, 0, 1, 2, 1), "Int");
    assert_eq!(text(&doc, 0, 0, 3, 2), "03/01/2024");
    assert_eq!(text(&doc, 0, 0, 4, 2), "08/03/2024");
    // Labels are untouched.
    assert_eq!(text(&doc, 0, 0, 0, 0), "Student ID");

    // Week dates: Mondays from the start week, skipping the summary row.
    assert_eq!(text(&doc, 1, 1, 1, 0), "01/01/2024");
    assert_eq!(text(&doc, 1, 5, 1, 0), "29/01/2024");
    assert_eq!(text(&doc, 1, 6, 1, 0), "");
    assert_eq!(text(&doc, 1, 7, 1, 0), "05/02/2024");
    assert_eq!(text(&doc, 1, 11, 1, 0), "04/03/2024");

    // Marks start at week 1's row and run through the summary row.
    assert_eq!(text(&doc, 1, 1, 2, 0), "K");
    assert_eq!(text(&doc, 1, 1, 7, 0), "P");
    assert_eq!(text(&doc, 1, 6, 2, 0), "P");
    assert_eq!(text(&doc, 1, 7, 7, 0), "V");
    assert_eq!(text(&doc, 1, 8, 2, 0), "");

    assert_eq!(text(&doc, 2, 0, 0, 1), "Steady progress.");
}

#[test]
fn second_half_marks_start_after_the_summary_row() {
    let layout = TemplateLayout::default();
    let mut writer = ReportWriter::new(template(), &layout);
    writer
        .write_marks(6, 10, &[vec![Some("A".into()), None, Some("C".into())]])
        .unwrap();
    let doc = writer.into_document();
    assert_eq!(text(&doc, 1, 7, 2, 0), "A");
    assert_eq!(text(&doc, 1, 7, 3, 0), "");
    assert_eq!(text(&doc, 1, 7, 4, 0), "C");
}

#[test]
fn mark_rows_beyond_the_week_range_are_still_written() {
    let layout = TemplateLayout::default();
    assert_eq!(layout.marks.expected_rows(9, 10), Some(3));

    let mut writer = ReportWriter::new(template(), &layout);
    let rows: Vec<Vec<Option<String>>> = ["w9", "w10", "final", "extra"]
        .iter()
        .map(|m| vec![Some((*m).to_owned())])
        .collect();
    // Week 9 sits on row 10; week 10's block also covers the final summary row.
    writer.write_marks(9, 10, &rows[..3]).unwrap();
    let doc = writer.into_document();
    assert_eq!(text(&doc, 1, 10, 2, 0), "w9");
    assert_eq!(text(&doc, 1, 11, 2, 0), "w10");
    assert_eq!(text(&doc, 1, 12, 2, 0), "final");

    let mut writer = ReportWriter::new(template(), &layout);
    writer
        .write_marks(1, 2, &rows)
        .expect("rows past the expected count are written with a warning");
    let doc = writer.into_document();
    assert_eq!(text(&doc, 1, 1, 2, 0), "w9");
    assert_eq!(text(&doc, 1, 3, 2, 0), "final");
    assert_eq!(text(&doc, 1, 4, 2, 0), "extra");

    // From week 9 a fourth row would be past the end of the table.
    let mut writer = ReportWriter::new(template(), &layout);
    assert!(matches!(
        writer.write_marks(9, 10, &rows),
        Err(ReportError::Docx(DocxError::NoCell { row: 13, .. }))
    ));
}

#[test]
fn absent_fields_leave_template_text() {
    let record = StudentRecord {
        name: Some("Solo".into()),
        ..Default::default()
    };
    let doc = render_report(template(), &TemplateLayout::default(), &record, "%d/%m/%Y").unwrap();
    assert_eq!(text(&doc, 0, 0, 1, 2), "Solo");
    assert_eq!(text(&doc, 0, 0, 0, 2), "IDID");
    assert_eq!(text(&doc, 1, 1, 1, 0), "");
}

#[test]
fn explicit_dates_override_the_start_date() {
    let record = StudentRecord {
        start_date: Some("03/01/2024".into()),
        dates: vec!["A".into(), "B".into()],
        ..Default::default()
    };
    let doc = render_report(template(), &TemplateLayout::default(), &record, "%d/%m/%Y").unwrap();
    assert_eq!(text(&doc, 1, 1, 1, 0), "A");
    assert_eq!(text(&doc, 1, 2, 1, 0), "B");
    assert_eq!(text(&doc, 1, 3, 1, 0), "");
}

#[test]
fn invalid_week_ranges_are_rejected() {
    let layout = TemplateLayout::default();
    let mut writer = ReportWriter::new(template(), &layout);
    let marks = vec![vec![Some("x".to_owned())]];
    assert!(matches!(
        writer.write_marks(0, 3, &marks),
        Err(ReportError::WeekRange { .. })
    ));
    assert!(matches!(
        writer.write_marks(4, 2, &marks),
        Err(ReportError::WeekRange { .. })
    ));
    assert!(matches!(
        writer.write_marks(1, 11, &marks),
        Err(ReportError::WeekRange { weeks: 10, .. })
    ));
}

#[test]
fn too_many_dates_is_an_error() {
    let layout = TemplateLayout::default();
    let mut writer = ReportWriter::new(template(), &layout);
    let dates: Vec<String> = (0..11).map(|i| i.to_string()).collect();
    assert!(matches!(
        writer.write_week_dates(&dates),
        Err(ReportError::TooManyDates { given: 11, weeks: 10 })
    ));
}

#[test]
fn comment_without_comment_cell_fails() {
    let layout = TemplateLayout {
        comment: None,
        ..Default::default()
    };
    let mut writer = ReportWriter::new(template(), &layout);
    assert!(matches!(
        writer.write_comment("hi"),
        Err(ReportError::NoCommentCell)
    ));
}

#[test]
fn layout_pointing_past_the_template_reports_the_cell() {
    let mut layout = TemplateLayout::default();
    layout.identity.id = CellRef::new(0, 5, 0, 0);
    let record = StudentRecord {
        id: Some("1".into()),
        ..Default::default()
    };
    let err = render_report(template(), &layout, &record, "%d/%m/%Y").unwrap_err();
    assert!(matches!(
        err,
        ReportError::Docx(DocxError::NoCell { table: 0, row: 5, col: 0 })
    ));
}

#[test]
fn saved_document_reopens_with_edits_and_keeps_other_parts() {
    let mut doc = template();
    doc.set_paragraph_text(&CellRef::new(0, 0, 1, 2), "Ann & Bo <3")
        .unwrap();
    let bytes = doc.to_bytes().unwrap();

    let reopened = Document::from_bytes(bytes.clone()).unwrap();
    assert_eq!(text(&reopened, 0, 0, 1, 2), "Ann & Bo <3");

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_owned())
        .collect();
    assert_eq!(
        names,
        ["[Content_Types].xml", "_rels/.rels", "word/document.xml", "word/styles.xml"]
    );
    let mut styles = String::new();
    std::io::Read::read_to_string(&mut archive.by_name("word/styles.xml").unwrap(), &mut styles)
        .unwrap();
    assert_eq!(styles, fixture::STYLES_XML);
}

#[test]
fn package_without_main_part_is_rejected() {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    zip.start_file("other.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    let bytes = zip.finish().unwrap().into_inner();
    assert!(matches!(
        Document::from_bytes(bytes),
        Err(DocxError::MissingPart(_))
    ));
    assert!(matches!(
        Document::from_bytes(b"not a zip".to_vec()),
        Err(DocxError::Zip(_))
    ));
}
