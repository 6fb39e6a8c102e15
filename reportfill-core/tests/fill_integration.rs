use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use reportfill_core::contract::MockReportSink;
use reportfill_core::docx::Document;
use reportfill_core::fill::{fill_reports, FillConfig, FillError};
use reportfill_core::fixture;
use reportfill_core::layout::CellRef;
use reportfill_core::record::parse_records;
use reportfill_core::sink::DirectorySink;
use tempfile::tempdir;

const RECORDS: &str = r#"---
- {name: "Ann Lee", id: "1001", sd: "08/01/2024", ed: "15/03/2024"}
- comment: "Good term."
- {start: 1, end: 2, marks: [[A, B], [C, D]]}
...
---
- {comment: "nobody"}
...
---
- {name: "Bo Chen", id: 1002}
...
"#;

fn template_on_disk() -> (tempfile::TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("template.docx");
    fixture::write_template(&path).unwrap();
    (dir, path)
}

#[tokio::test]
async fn fill_hands_each_named_record_to_the_sink() {
    let (_dir, template) = template_on_disk();
    let records = parse_records(RECORDS).unwrap();
    let stored: Arc<Mutex<Vec<(String, Vec<u8>)>>> = Arc::default();

    let mut sink = MockReportSink::new();
    let seen = stored.clone();
    sink.expect_write_report()
        .times(2)
        .returning(move |name: &str, content: Vec<u8>| {
            seen.lock().unwrap().push((name.to_owned(), content));
            Ok(PathBuf::from("/virtual").join(name))
        });

    let report = fill_reports(&FillConfig::new(&template), &records, &sink)
        .await
        .expect("fill should succeed");

    assert_eq!(report.generated.len(), 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].index, 1);
    assert_eq!(report.generated[0].student, "Ann Lee");
    assert_eq!(report.generated[1].path, PathBuf::from("/virtual/1002_Bo_Chen.docx"));

    let stored = stored.lock().unwrap();
    assert_eq!(stored[0].0, "1001_Ann_Lee.docx");
    let ann = Document::from_bytes(stored[0].1.clone()).unwrap();
    assert_eq!(ann.paragraph_text(&CellRef::new(0, 0, 1, 2)).unwrap(), "Ann Lee");
    assert_eq!(ann.paragraph_text(&CellRef::new(1, 2, 3, 0)).unwrap(), "D");
    assert_eq!(ann.paragraph_text(&CellRef::new(1, 1, 1, 0)).unwrap(), "08/01/2024");
    assert_eq!(ann.paragraph_text(&CellRef::new(2, 0, 0, 1)).unwrap(), "Good term.");

    let bo = Document::from_bytes(stored[1].1.clone()).unwrap();
    assert_eq!(bo.paragraph_text(&CellRef::new(0, 0, 0, 2)).unwrap(), "1002");
    // Each report starts from a clean copy of the template.
    assert_eq!(bo.paragraph_text(&CellRef::new(2, 0, 0, 1)).unwrap(), "");
}

#[tokio::test]
async fn sink_failure_stops_the_batch() {
    let (_dir, template) = template_on_disk();
    let records = parse_records(RECORDS).unwrap();

    let mut sink = MockReportSink::new();
    sink.expect_write_report()
        .times(1)
        .returning(|_, _| Err("disk full".into()));

    let err = fill_reports(&FillConfig::new(&template), &records, &sink)
        .await
        .unwrap_err();
    match err {
        FillError::Sink { index, student, .. } => {
            assert_eq!(index, 0);
            assert_eq!(student, "Ann Lee");
        }
        other => panic!("expected sink error, got {other}"),
    }
}

#[tokio::test]
async fn missing_template_is_reported() {
    let sink = MockReportSink::new();
    let err = fill_reports(&FillConfig::new("/no/such/template.docx"), &[], &sink)
        .await
        .unwrap_err();
    assert!(matches!(err, FillError::Template { .. }));
}

#[tokio::test]
async fn directory_sink_writes_openable_documents() {
    let (dir, template) = template_on_disk();
    let out = dir.path().join("reports");
    let records = parse_records(RECORDS).unwrap();

    let report = fill_reports(&FillConfig::new(&template), &records, &DirectorySink::new(&out, false))
        .await
        .unwrap();

    for generated in &report.generated {
        assert!(generated.path.starts_with(&out));
        Document::open(&generated.path).expect("generated report opens");
    }
    assert!(out.join("1001_Ann_Lee.docx").exists());
}
