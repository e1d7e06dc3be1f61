//! Submission against a real multipart service over HTTP.

use axum::http::StatusCode;
use pdfstage::StageError;
use pdfstage::config::OverwriteMode;
use pdfstage::flavor::{Flavor, ImagesToPdf, MergePdfs};
use pdfstage::ingest::{IngestSource, candidates_from_paths};
use pdfstage::session::Session;
use pdfstage::submit::{SaveToDirectory, SkipReason, SubmitOutcome, TriggerState};
use pdfstage::view::{Detached, Notifier};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;
use url::Url;

use crate::common::{artifact_for, closed_service_url, create_test_pdf, http_service, spawn_service, write_file};

#[derive(Default)]
struct Notices(Mutex<Vec<String>>);

impl Notices {
    fn all(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl Notifier for Notices {
    fn notify(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

fn image_session(base: Url, out: &Path, notices: Arc<Notices>) -> Session<ImagesToPdf> {
    Session::new(
        Arc::new(http_service(base)),
        Arc::new(SaveToDirectory::new(out, OverwriteMode::NoClobber)),
        Arc::new(Detached),
        notices,
    )
}

async fn stage_images(session: &Session<ImagesToPdf>, dir: &Path, names: &[&str]) {
    let paths: Vec<_> = names
        .iter()
        .map(|name| write_file(dir, name, name.as_bytes()))
        .collect();
    session
        .ingest(IngestSource::Picker, candidates_from_paths(&paths))
        .await
        .unwrap();
}

fn staged_names<F: Flavor>(session: &Session<F>) -> Vec<String> {
    session.rendered().labels().into_iter().map(String::from).collect()
}

#[tokio::test]
async fn test_rejection_keeps_sequence_and_notifies() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    let (base, service) = spawn_service(StatusCode::INTERNAL_SERVER_ERROR, Duration::ZERO).await;
    let notices = Arc::new(Notices::default());
    let session = image_session(base, out.path(), notices.clone());
    stage_images(&session, input.path(), &["a.png", "b.png"]).await;

    let outcome = session.submit().await;

    assert!(matches!(
        outcome,
        SubmitOutcome::Failed(StageError::ServiceRejected { status: 500, .. })
    ));
    assert_eq!(notices.all(), vec![ImagesToPdf::FAILURE_NOTICE.to_string()]);
    assert_eq!(staged_names(&session), ["a.png", "b.png"]);
    assert_eq!(session.controller().trigger_state(), TriggerState::idle::<ImagesToPdf>());
    assert_eq!(service.requests().len(), 1);
    assert!(!out.path().join("converted.pdf").exists());
}

#[tokio::test]
async fn test_unreachable_service_fails_once() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    let notices = Arc::new(Notices::default());
    let session = image_session(closed_service_url().await, out.path(), notices.clone());
    stage_images(&session, input.path(), &["a.png"]).await;

    let outcome = session.submit().await;

    assert!(matches!(outcome, SubmitOutcome::Failed(StageError::Transport { .. })));
    assert_eq!(notices.all(), vec![ImagesToPdf::FAILURE_NOTICE.to_string()]);
    assert!(!session.controller().is_in_flight());
    assert_eq!(staged_names(&session), ["a.png"]);
}

#[tokio::test]
async fn test_concurrent_submits_send_one_request() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    let (base, service) = spawn_service(StatusCode::OK, Duration::from_millis(200)).await;
    let session = image_session(base, out.path(), Arc::new(Notices::default()));
    stage_images(&session, input.path(), &["a.png"]).await;

    let mut trigger = session.controller().subscribe_trigger();
    let first = session.submit();
    let second = async {
        trigger.wait_for(|state| !state.enabled).await.unwrap();
        session.submit().await
    };
    let (first, second) = tokio::join!(first, second);

    assert!(first.is_delivered());
    assert!(matches!(second, SubmitOutcome::Skipped(SkipReason::AlreadyInFlight)));
    assert_eq!(service.requests().len(), 1);
    assert_eq!(session.controller().trigger_state(), TriggerState::idle::<ImagesToPdf>());
}

#[tokio::test]
async fn test_empty_submit_sends_nothing() {
    let out = tempdir().unwrap();
    let (base, service) = spawn_service(StatusCode::OK, Duration::ZERO).await;
    let notices = Arc::new(Notices::default());
    let session = image_session(base, out.path(), notices.clone());

    let outcome = session.submit().await;

    assert!(matches!(outcome, SubmitOutcome::Skipped(SkipReason::Empty)));
    assert_eq!(notices.all(), vec![ImagesToPdf::EMPTY_NOTICE.to_string()]);
    assert!(service.requests().is_empty());
}

#[tokio::test]
async fn test_merge_posts_pdfs_field() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    let (base, service) = spawn_service(StatusCode::OK, Duration::ZERO).await;
    let session: Session<MergePdfs> = Session::new(
        Arc::new(http_service(base)),
        Arc::new(SaveToDirectory::new(out.path(), OverwriteMode::NoClobber)),
        Arc::new(Detached),
        Arc::new(Detached),
    );

    let first = input.path().join("first.pdf");
    let second = input.path().join("second.pdf");
    create_test_pdf(&first, 1, 595);
    create_test_pdf(&second, 2, 612);
    session
        .ingest(IngestSource::PanelDrop, candidates_from_paths(&[&first, &second]))
        .await
        .unwrap();

    let outcome = session.submit().await;
    assert!(outcome.is_delivered());

    let requests = service.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.path, "/merge-pdfs");
    assert_eq!(request.file_names(), ["first.pdf", "second.pdf"]);
    assert!(request.parts.iter().all(|part| part.field == "pdfs"));
    assert!(request.parts.iter().all(|part| part.content_type == "application/pdf"));
    assert_eq!(request.parts[1].bytes, std::fs::read(&second).unwrap());
    assert!(!request.chunked);
    assert!(request.content_length.is_some_and(|len| len > 0));

    let saved = std::fs::read(out.path().join("merged.pdf")).unwrap();
    assert_eq!(saved, artifact_for(&["first.pdf", "second.pdf"]));
}

#[tokio::test]
async fn test_existing_output_is_not_clobbered() {
    let input = tempdir().unwrap();
    let out = tempdir().unwrap();
    let existing = write_file(out.path(), "converted.pdf", b"keep me");
    let (base, _service) = spawn_service(StatusCode::OK, Duration::ZERO).await;
    let notices = Arc::new(Notices::default());
    let session = image_session(base, out.path(), notices.clone());
    stage_images(&session, input.path(), &["a.png"]).await;

    let outcome = session.submit().await;

    assert!(matches!(outcome, SubmitOutcome::Failed(StageError::OutputExists { .. })));
    assert_eq!(std::fs::read(&existing).unwrap(), b"keep me");
    let notices = notices.all();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].starts_with("Output file already exists"));
    assert_eq!(session.controller().live_object_urls(), 0);
}
