//! Merging staged PDFs in-process.

use pdfstage::config::{Edit, OverwriteMode};
use pdfstage::flavor::MergePdfs;
use pdfstage::ingest::{IngestSource, candidates_from_paths, collect_paths_for_patterns};
use pdfstage::session::Session;
use pdfstage::submit::{LocalMergeService, SaveToDirectory, SubmitOutcome};
use pdfstage::view::Detached;
use std::sync::Arc;
use tempfile::tempdir;

use crate::common::{create_test_pdf, page_widths};

fn merge_session(out: &std::path::Path) -> Session<MergePdfs> {
    Session::new(
        Arc::new(LocalMergeService::new()),
        Arc::new(SaveToDirectory::new(out, OverwriteMode::NoClobber)),
        Arc::new(Detached),
        Arc::new(Detached),
    )
}

#[tokio::test]
async fn test_merge_follows_staged_order() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    create_test_pdf(&input.path().join("01-cover.pdf"), 1, 100);
    create_test_pdf(&input.path().join("02-body.pdf"), 2, 200);
    create_test_pdf(&input.path().join("03-appendix.pdf"), 1, 300);

    let pattern = input.path().join("*.pdf");
    let paths = collect_paths_for_patterns([pattern.to_string_lossy()]).unwrap();
    assert_eq!(paths.len(), 3);

    let session = merge_session(out.path());
    session
        .ingest(IngestSource::Picker, candidates_from_paths(&paths))
        .await
        .unwrap();
    assert!(session.apply_edit(Edit::Move { from: 2, to: 0 }));
    assert_eq!(
        session.rendered().labels(),
        ["03-appendix.pdf", "01-cover.pdf", "02-body.pdf"]
    );

    let outcome = session.submit().await;
    let SubmitOutcome::Delivered(delivery) = outcome else {
        panic!("expected a delivery");
    };
    assert_eq!(delivery.path, out.path().join("merged.pdf"));

    let merged = std::fs::read(&delivery.path).unwrap();
    assert_eq!(page_widths(&merged), [300, 100, 200, 200]);
}

#[tokio::test]
async fn test_removed_entry_is_left_out() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    let first = input.path().join("first.pdf");
    let second = input.path().join("second.pdf");
    create_test_pdf(&first, 2, 400);
    create_test_pdf(&second, 3, 500);

    let session = merge_session(out.path());
    session
        .ingest(IngestSource::PanelDrop, candidates_from_paths(&[&first, &second]))
        .await
        .unwrap();
    assert!(session.apply_edit(Edit::Remove { index: 0 }));
    assert!(!session.apply_edit(Edit::Remove { index: 5 }));

    assert!(session.submit().await.is_delivered());
    let merged = std::fs::read(out.path().join("merged.pdf")).unwrap();
    assert_eq!(page_widths(&merged), [500, 500, 500]);
}

#[tokio::test]
async fn test_corrupt_pdf_fails_without_output() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    let good = input.path().join("good.pdf");
    let bad = input.path().join("bad.pdf");
    create_test_pdf(&good, 1, 100);
    std::fs::write(&bad, b"not really a pdf").unwrap();

    let session = merge_session(out.path());
    session
        .ingest(IngestSource::Picker, candidates_from_paths(&[&good, &bad]))
        .await
        .unwrap();

    let outcome = session.submit().await;
    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert!(!out.path().join("merged.pdf").exists());
    assert_eq!(session.staging().len(), 2);
}
