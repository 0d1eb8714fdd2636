//! Integration tests for planning a merge without running it.

use tempfile::TempDir;

use pdfstitch::classify::{FileKind, OfficeKind};
use pdfstitch::files::FileList;
use pdfstitch::job::{Job, JobStatus};
use pdfstitch::output::describe_planned_entry;

use crate::common::{driver, write_pdf, write_png, write_text};

#[tokio::test]
async fn test_plan_classifies_without_writing() {
    let dir = TempDir::new().unwrap();
    let mut files = FileList::new();
    files
        .add(write_pdf(&dir.path().join("a.pdf"), &[100.0, 100.0]))
        .unwrap();
    files.add(write_png(&dir.path().join("b.png"), 4, 4)).unwrap();
    files
        .add(write_text(&dir.path().join("c.pptx"), "slides"))
        .unwrap();
    files.add(write_text(&dir.path().join("d.txt"), "d")).unwrap();
    let output = dir.path().join("out.pdf");

    let driver = driver();
    let plan = driver
        .plan(&Job::from_list(&files, &output).with_delete_originals(true))
        .await
        .unwrap();

    let kinds: Vec<FileKind> = plan.entries.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            FileKind::Pdf,
            FileKind::Image,
            FileKind::Office(OfficeKind::Presentation),
            FileKind::Text,
        ]
    );
    assert_eq!(plan.entries[0].pages, Some(2));
    assert!(plan.entries[1..].iter().all(|e| e.pages.is_none()));
    assert!(!plan.has_problems());
    assert!(plan.delete_originals);

    assert!(!output.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 4);
    assert_eq!(driver.status(), JobStatus::Idle);
}

#[tokio::test]
async fn test_plan_reports_corrupt_pdf() {
    let dir = TempDir::new().unwrap();
    let mut files = FileList::new();
    files
        .add(write_text(&dir.path().join("broken.pdf"), "nope"))
        .unwrap();
    files.add(write_text(&dir.path().join("ok.txt"), "ok")).unwrap();

    let plan = driver()
        .plan(&Job::from_list(&files, dir.path().join("out.pdf")))
        .await
        .unwrap();

    assert!(plan.has_problems());
    assert!(plan.entries[0].problem.is_some());
    assert!(plan.entries[1].problem.is_none());
    assert!(describe_planned_entry(&plan.entries[0]).starts_with("broken.pdf [pdf] - "));
}

#[tokio::test]
async fn test_plan_serializes_to_json() {
    let dir = TempDir::new().unwrap();
    let mut files = FileList::new();
    files
        .add(write_pdf(&dir.path().join("a.pdf"), &[100.0]))
        .unwrap();

    let plan = driver()
        .plan(&Job::from_list(&files, dir.path().join("out.pdf")))
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::to_value(&plan).unwrap();

    assert_eq!(json["entries"][0]["kind"]["kind"], "pdf");
    assert_eq!(json["entries"][0]["pages"], 1);
    assert_eq!(json["delete_originals"], false);
}
