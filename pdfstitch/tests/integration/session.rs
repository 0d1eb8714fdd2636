//! Integration tests for the interactive session and the busy guard.

use std::time::Duration;
use tempfile::TempDir;

use pdfstitch::error::StitchError;
use pdfstitch::job::JobStatus;
use pdfstitch::session::Session;

use crate::common::{FakeOffice, driver_with, page_widths, write_pdf, write_text};

fn slow_session() -> Session {
    Session::new(driver_with(FakeOffice {
        width: 612.0,
        delay: Duration::from_millis(400),
    }))
}

#[tokio::test]
async fn test_second_merge_is_refused_while_running() {
    let dir = TempDir::new().unwrap();
    let mut session = slow_session();
    session
        .add_file(write_text(&dir.path().join("a.docx"), "a"))
        .unwrap();
    session
        .add_file(write_pdf(&dir.path().join("b.pdf"), &[100.0]))
        .unwrap();

    let handle = session.start_merge(dir.path().join("out.pdf")).unwrap();

    assert!(session.is_busy());
    assert!(matches!(
        session.start_merge(dir.path().join("other.pdf")),
        Err(StitchError::JobInProgress)
    ));
    assert!(matches!(
        session.add_file(write_text(&dir.path().join("c.txt"), "c")),
        Err(StitchError::JobInProgress)
    ));
    assert!(matches!(session.remove(0), Err(StitchError::JobInProgress)));
    assert!(matches!(
        session.move_entry(0, 1),
        Err(StitchError::JobInProgress)
    ));

    let report = handle.await.unwrap().unwrap();
    assert_eq!(report.total_pages, 2);
    assert!(!session.is_busy());
    assert!(!dir.path().join("other.pdf").exists());
    assert_eq!(
        page_widths(&dir.path().join("out.pdf")),
        vec![612.0, 100.0]
    );

    // Idle again: the list can change and a new merge can start.
    session
        .add_file(write_text(&dir.path().join("d.txt"), "d"))
        .unwrap();
    let report = session.merge(dir.path().join("again.pdf")).await.unwrap();
    assert_eq!(report.total_pages, 3);
}

#[tokio::test]
async fn test_status_is_observable() {
    let dir = TempDir::new().unwrap();
    let mut session = slow_session();
    session
        .add_file(write_text(&dir.path().join("a.doc"), "a"))
        .unwrap();

    let mut status = session.subscribe();
    let handle = session.start_merge(dir.path().join("out.pdf")).unwrap();

    let mut seen = Vec::new();
    while status.changed().await.is_ok() {
        let current = status.borrow_and_update().clone();
        let finished = current.is_finished();
        seen.push(current);
        if finished {
            break;
        }
    }
    handle.await.unwrap().unwrap();

    assert!(seen.iter().any(|s| matches!(
        s,
        JobStatus::Converting { index: 0, total: 1, name } if name == "a.doc"
    )));
    assert!(matches!(seen.last(), Some(JobStatus::Done { pages: 1, .. })));
    assert!(matches!(session.status(), JobStatus::Done { .. }));
}

#[tokio::test]
async fn test_list_survives_merge_with_delete_originals() {
    let dir = TempDir::new().unwrap();
    let mut session = slow_session();
    let a = write_pdf(&dir.path().join("a.pdf"), &[100.0]);
    session.add_file(&a).unwrap();
    session.set_delete_originals(true).unwrap();

    let report = session.merge(dir.path().join("out.pdf")).await.unwrap();

    assert_eq!(report.deletion.unwrap().removed, vec![a.clone()]);
    assert!(!a.exists());
    assert_eq!(session.files().len(), 1);
}
