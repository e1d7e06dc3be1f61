//! Shared helpers for the integration tests.
//!
//! Provides minimal PDFs built with lopdf and an in-process multipart
//! service that records every batch it receives.

#![allow(dead_code)]

use axum::Router;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::routing::post;
use lopdf::{Document, Object, Stream, dictionary};
use pdfstage::submit::HttpService;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use url::Url;

/// Write `bytes` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("Failed to write test file");
    path
}

/// Create a PDF with `pages` pages whose MediaBox is `width` points wide.
///
/// The width lets tests tell source documents apart after a merge.
pub fn create_test_pdf(path: &Path, pages: u32, width: i64) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();

    for _ in 0..pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(width),
                Object::Integer(842),
            ]),
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(pages as i64),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.compress();
    doc.save(path).expect("Failed to save test PDF");
}

/// Page widths of a PDF in page order.
pub fn page_widths(bytes: &[u8]) -> Vec<i64> {
    let doc = Document::load_mem(bytes).expect("Failed to load PDF");
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let page = doc.get_dictionary(page_id).expect("page dictionary");
            let media_box = page.get(b"MediaBox").and_then(Object::as_array).expect("MediaBox");
            media_box[2].as_i64().expect("integer width")
        })
        .collect()
}

/// One multipart part as the service saw it.
#[derive(Debug, Clone)]
pub struct RecordedPart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// One request as the service saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub content_length: Option<u64>,
    pub chunked: bool,
    pub parts: Vec<RecordedPart>,
}

impl RecordedRequest {
    pub fn file_names(&self) -> Vec<&str> {
        self.parts.iter().map(|part| part.file_name.as_str()).collect()
    }
}

/// In-process conversion service.
pub struct TestService {
    status: StatusCode,
    delay: Duration,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl TestService {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Body the test service answers successful batches with.
pub fn artifact_for(names: &[&str]) -> Vec<u8> {
    format!("%PDF-1.7\n% {}\n%%EOF\n", names.join(",")).into_bytes()
}

async fn record_batch(
    State(service): State<Arc<TestService>>,
    uri: Uri,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, Vec<u8>) {
    let content_length = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok());
    let chunked = headers
        .get(header::TRANSFER_ENCODING)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("chunked"));

    let mut parts = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let field_name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        parts.push(RecordedPart {
            field: field_name,
            file_name,
            content_type,
            bytes,
        });
    }

    let request = RecordedRequest {
        path: uri.path().to_string(),
        content_length,
        chunked,
        parts,
    };
    let names: Vec<&str> = request.file_names();
    let body = if service.status.is_success() {
        artifact_for(&names)
    } else {
        b"conversion failed".to_vec()
    };
    service.requests.lock().unwrap().push(request);

    if !service.delay.is_zero() {
        tokio::time::sleep(service.delay).await;
    }
    (service.status, body)
}

/// Start a service answering both endpoints with `status` after `delay`.
pub async fn spawn_service(status: StatusCode, delay: Duration) -> (Url, Arc<TestService>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test service");
    let addr = listener.local_addr().expect("test service address");
    let service = Arc::new(TestService {
        status,
        delay,
        requests: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/convert-images", post(record_batch))
        .route("/merge-pdfs", post(record_batch))
        .with_state(Arc::clone(&service));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let url = Url::parse(&format!("http://{addr}")).expect("test service URL");
    (url, service)
}

/// HTTP client for `base_url` that ignores proxy settings from the environment.
pub fn http_service(base_url: Url) -> HttpService {
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .expect("test HTTP client");
    HttpService::with_client(base_url, client)
}

/// A base URL nothing listens on.
pub async fn closed_service_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("address");
    drop(listener);
    Url::parse(&format!("http://{addr}")).expect("URL")
}
