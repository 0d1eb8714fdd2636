//! Integration tests for converting and merging mixed inputs.

use rstest::rstest;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

use pdfstitch::files::FileList;
use pdfstitch::job::{Job, JobStatus, delete_originals};

use crate::common::{
    ConsumingOffice, FakeOffice, driver, driver_with, page_widths, write_pdf, write_png, write_text,
};

fn job(paths: &[PathBuf], output: &Path) -> Job {
    let mut files = FileList::new();
    for path in paths {
        files.add(path).unwrap();
    }
    Job::from_list(&files, output)
}

#[tokio::test]
async fn test_mixed_inputs_keep_order() {
    let dir = TempDir::new().unwrap();
    let inputs = vec![
        write_png(&dir.path().join("a.png"), 30, 20),
        write_pdf(&dir.path().join("b.pdf"), &[100.0, 101.0, 102.0]),
        write_text(&dir.path().join("c.txt"), "hello\nworld\n"),
    ];
    let output = dir.path().join("out.pdf");

    let driver = driver();
    let report = driver.run(job(&inputs, &output)).await.unwrap();

    assert_eq!(report.files_merged, 3);
    assert_eq!(report.total_pages, 5);
    assert!(report.output_size > 0);
    assert!(report.deletion.is_none());
    assert_eq!(page_widths(&output), vec![30.0, 100.0, 101.0, 102.0, 595.0]);
    assert!(matches!(driver.status(), JobStatus::Done { pages: 5, .. }));

    for input in &inputs {
        assert!(input.exists(), "{} was removed", input.display());
    }
}

#[rstest]
#[case(&[1])]
#[case(&[2, 3])]
#[case(&[1, 4, 2, 1])]
#[tokio::test]
async fn test_page_count_is_sum_of_inputs(#[case] page_counts: &[usize]) {
    let dir = TempDir::new().unwrap();
    let inputs: Vec<PathBuf> = page_counts
        .iter()
        .enumerate()
        .map(|(i, &pages)| {
            let widths: Vec<f32> = (0..pages).map(|p| (100 * (i + 1) + p) as f32).collect();
            write_pdf(&dir.path().join(format!("part{i}.pdf")), &widths)
        })
        .collect();
    let output = dir.path().join("out.pdf");

    let report = driver().run(job(&inputs, &output)).await.unwrap();

    assert_eq!(report.total_pages, page_counts.iter().sum::<usize>());
    let expected: Vec<f32> = page_counts
        .iter()
        .enumerate()
        .flat_map(|(i, &pages)| (0..pages).map(move |p| (100 * (i + 1) + p) as f32))
        .collect();
    assert_eq!(page_widths(&output), expected);
}

#[tokio::test]
async fn test_rerun_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let inputs = vec![
        write_pdf(&dir.path().join("a.pdf"), &[300.0, 310.0]),
        write_png(&dir.path().join("b.png"), 16, 16),
        write_text(&dir.path().join("c.txt"), "same every time"),
    ];
    let first = dir.path().join("first.pdf");
    let second = dir.path().join("second.pdf");

    let driver = driver();
    driver.run(job(&inputs, &first)).await.unwrap();
    driver.run(job(&inputs, &second)).await.unwrap();

    assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
}

#[tokio::test]
async fn test_office_documents_go_through_renderer() {
    let dir = TempDir::new().unwrap();
    let docx = write_text(&dir.path().join("report.docx"), "not really a docx");
    let pdf = write_pdf(&dir.path().join("appendix.pdf"), &[200.0]);
    let output = dir.path().join("out.pdf");

    let driver = driver_with(FakeOffice {
        width: 612.0,
        delay: Duration::ZERO,
    });
    let report = driver.run(job(&[docx, pdf], &output)).await.unwrap();

    assert_eq!(report.total_pages, 2);
    assert_eq!(page_widths(&output), vec![612.0, 200.0]);
}

#[tokio::test]
async fn test_delete_originals_after_success() {
    let dir = TempDir::new().unwrap();
    let inputs = vec![
        write_png(&dir.path().join("a.png"), 10, 10),
        write_pdf(&dir.path().join("b.pdf"), &[100.0]),
        write_text(&dir.path().join("c.txt"), "bye"),
    ];
    let output = dir.path().join("out.pdf");

    let report = driver()
        .run(job(&inputs, &output).with_delete_originals(true))
        .await
        .unwrap();

    assert_eq!(report.total_pages, 3);
    let deletion = report.deletion.unwrap();
    assert!(deletion.is_complete());
    assert_eq!(deletion.removed, inputs);
    for input in &inputs {
        assert!(!input.exists());
    }
    assert!(output.exists());
}

#[test]
fn test_undeletable_source_does_not_stop_the_rest() {
    let dir = TempDir::new().unwrap();
    let a = write_text(&dir.path().join("a.txt"), "a");
    let gone = dir.path().join("gone.txt");
    let c = write_text(&dir.path().join("c.txt"), "c");

    let report = delete_originals([a.as_path(), gone.as_path(), c.as_path()]);

    assert_eq!(report.removed, vec![a.clone(), c.clone()]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].path, gone);
    assert!(!a.exists());
    assert!(!c.exists());
}

#[tokio::test]
async fn test_job_succeeds_when_a_source_cannot_be_removed() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(&dir.path().join("a.pdf"), &[100.0]);
    let memo = write_text(&dir.path().join("memo.docx"), "binary office data");
    let c = write_text(&dir.path().join("c.txt"), "c");
    let output = dir.path().join("out.pdf");

    let report = driver_with(ConsumingOffice)
        .run(job(&[a.clone(), memo.clone(), c.clone()], &output).with_delete_originals(true))
        .await
        .unwrap();

    assert_eq!(report.total_pages, 3);
    assert_eq!(page_widths(&output), vec![100.0, 300.0, 595.0]);

    let deletion = report.deletion.unwrap();
    assert_eq!(deletion.removed, vec![a.clone(), c.clone()]);
    assert_eq!(deletion.failed.len(), 1);
    assert_eq!(deletion.failed[0].path, memo);
    assert!(!a.exists() && !c.exists());
}

#[tokio::test]
async fn test_long_text_is_truncated_by_default() {
    let dir = TempDir::new().unwrap();
    let text: String = (0..200).map(|i| format!("line {i}\n")).collect();
    let input = write_text(&dir.path().join("long.txt"), &text);
    let output = dir.path().join("out.pdf");

    let report = driver().run(job(&[input], &output)).await.unwrap();

    assert_eq!(report.total_pages, 1);
}
