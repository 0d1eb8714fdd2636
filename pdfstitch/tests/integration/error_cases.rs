//! Integration tests for error handling and edge cases.

use rstest::rstest;
use std::path::Path;
use tempfile::TempDir;

use pdfstitch::config::Config;
use pdfstitch::error::StitchError;
use pdfstitch::files::{FileEntry, FileList};
use pdfstitch::job::{Job, JobStatus};

use crate::common::{driver, write_pdf, write_png, write_text};

fn entries_in(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn test_corrupt_input_leaves_nothing_behind() {
    let dir = TempDir::new().unwrap();
    let scratch_root = TempDir::new().unwrap();

    let mut files = FileList::new();
    files.add(write_png(&dir.path().join("a.png"), 8, 8)).unwrap();
    files
        .add(write_text(&dir.path().join("broken.pdf"), "this is not a pdf"))
        .unwrap();
    files.add(write_text(&dir.path().join("c.txt"), "c")).unwrap();
    let output = dir.path().join("out.pdf");

    let driver = driver().with_scratch_root(scratch_root.path());
    let err = driver
        .run(Job::from_list(&files, &output).with_delete_originals(true))
        .await
        .unwrap_err();

    assert!(matches!(err, StitchError::FailedToLoadPdf { .. }));
    assert!(!output.exists());
    assert_eq!(entries_in(scratch_root.path()), 0);
    // Sources and nothing else.
    assert_eq!(entries_in(dir.path()), 3);
    assert!(matches!(driver.status(), JobStatus::Failed { .. }));
    assert!(!driver.is_busy());
}

#[tokio::test]
async fn test_missing_office_suite_fails_the_job() {
    let dir = TempDir::new().unwrap();
    let scratch_root = TempDir::new().unwrap();

    let mut files = FileList::new();
    files.add(write_pdf(&dir.path().join("a.pdf"), &[100.0])).unwrap();
    files.add(write_text(&dir.path().join("b.xlsx"), "x")).unwrap();
    let output = dir.path().join("out.pdf");

    let driver = driver().with_scratch_root(scratch_root.path());
    let err = driver.run(Job::from_list(&files, &output)).await.unwrap_err();

    assert!(matches!(err, StitchError::OfficeUnavailable { .. }));
    assert!(!output.exists());
    assert_eq!(entries_in(scratch_root.path()), 0);
    match driver.status() {
        JobStatus::Failed { message } => assert!(message.contains("b.xlsx")),
        other => panic!("unexpected status: {other}"),
    }
}

#[tokio::test]
async fn test_failed_job_keeps_existing_output() {
    let dir = TempDir::new().unwrap();
    let output = write_pdf(&dir.path().join("out.pdf"), &[123.0]);
    let before = std::fs::read(&output).unwrap();

    let mut files = FileList::new();
    files
        .add(write_text(&dir.path().join("bad.pdf"), "garbage"))
        .unwrap();

    assert!(driver().run(Job::from_list(&files, &output)).await.is_err());
    assert_eq!(std::fs::read(&output).unwrap(), before);
}

#[tokio::test]
async fn test_empty_job() {
    let dir = TempDir::new().unwrap();
    let err = driver()
        .run(Job::new(vec![], dir.path().join("out.pdf")))
        .await
        .unwrap_err();
    assert!(matches!(err, StitchError::NoFilesToMerge));
}

#[tokio::test]
async fn test_output_cannot_be_an_input() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(&dir.path().join("a.pdf"), &[100.0]);

    let entry = FileEntry::new(&input).unwrap();
    let err = driver()
        .run(Job::new(vec![entry], &input))
        .await
        .unwrap_err();

    assert!(matches!(err, StitchError::InvalidConfig { .. }));
    assert!(!std::fs::read(&input).unwrap().is_empty());
}

#[rstest]
#[case("notes.odt")]
#[case("archive.zip")]
#[case("README")]
#[case("photo.tiff")]
fn test_unsupported_files_are_rejected(#[case] name: &str) {
    let dir = TempDir::new().unwrap();
    let path = write_text(&dir.path().join(name), "x");

    let mut files = FileList::new();
    assert!(matches!(
        files.add(&path),
        Err(StitchError::UnsupportedFileType { .. })
    ));
    assert!(files.is_empty());
}

#[test]
fn test_duplicates_and_missing_files_are_rejected() {
    let dir = TempDir::new().unwrap();
    let a = write_text(&dir.path().join("a.txt"), "a");

    let mut files = FileList::new();
    files.add(&a).unwrap();
    assert!(matches!(
        files.add(dir.path().join(".").join("a.txt")),
        Err(StitchError::DuplicateEntry { .. })
    ));
    assert!(matches!(
        files.add(dir.path().join("missing.png")),
        Err(StitchError::FileNotFound { .. })
    ));
    assert!(matches!(
        files.add(dir.path()),
        Err(StitchError::UnsupportedFileType { .. }) | Err(StitchError::NotAFile { .. })
    ));
    assert_eq!(files.len(), 1);
}

#[test]
fn test_config_rejects_output_among_inputs() {
    let config = Config::new(
        vec!["a.pdf".into(), "b.png".into()],
        "b.png".into(),
    );
    assert!(matches!(
        config.validate(),
        Err(StitchError::InvalidConfig { .. })
    ));
}
