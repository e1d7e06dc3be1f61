//! In-process merge backend built on lopdf.

use async_trait::async_trait;
use bytes::Bytes;
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, warn};

use crate::error::{Result, StageError};
use crate::flavor::{Flavor, MergePdfs};
use crate::submit::{BatchPart, BatchRequest, ConversionService, ServiceResponse};

/// Answers the merge endpoint without a network round-trip.
///
/// Statuses mirror what an HTTP service would return: 404 for any endpoint
/// other than the merge one, 400 for an empty batch, 422 when a part is not
/// a readable PDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalMergeService;

impl LocalMergeService {
    /// Create the backend.
    pub fn new() -> Self {
        Self
    }

    /// Merge `parts` in order into one PDF and serialize it.
    pub fn merge_parts(parts: &[BatchPart]) -> Result<Vec<u8>> {
        let mut documents = Vec::with_capacity(parts.len());
        for part in parts {
            let doc = Document::load_mem(&part.bytes).map_err(|err| {
                StageError::other(format!("{} is not a readable PDF: {err}", part.file_name))
            })?;
            debug!(file = %part.file_name, pages = doc.get_pages().len(), "loaded part");
            documents.push(doc);
        }

        let mut documents = documents.into_iter();
        let Some(mut merged) = documents.next() else {
            return Err(StageError::NothingStaged);
        };

        let mut max_id = merged.max_id;
        for mut doc in documents {
            // Shift incoming ids past everything already merged.
            doc.renumber_objects_with(max_id + 1);
            max_id = doc.max_id;

            let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
            merged.objects.extend(doc.objects);
            append_pages(&mut merged, page_ids)?;
        }

        merged.renumber_objects();
        merged.compress();

        let mut out = Vec::new();
        merged
            .save_to(&mut out)
            .map_err(|source| StageError::other(format!("failed to serialize merged PDF: {source}")))?;
        Ok(out)
    }
}

fn append_pages(merged: &mut Document, page_ids: Vec<ObjectId>) -> Result<()> {
    let pages_id = merged.catalog()?.get(b"Pages")?.as_reference()?;

    for &page_id in &page_ids {
        if let Ok(page) = merged.get_object_mut(page_id).and_then(Object::as_dict_mut) {
            page.set("Parent", Object::Reference(pages_id));
        }
    }

    let pages = merged.get_object_mut(pages_id)?.as_dict_mut()?;
    let added = page_ids.len() as i64;
    let kids = pages.get_mut(b"Kids")?.as_array_mut()?;
    kids.extend(page_ids.into_iter().map(Object::Reference));

    let count = pages.get(b"Count")?.as_i64()?;
    pages.set("Count", Object::Integer(count + added));
    Ok(())
}

#[async_trait]
impl ConversionService for LocalMergeService {
    async fn exchange(&self, request: BatchRequest) -> Result<ServiceResponse> {
        if request.endpoint != MergePdfs::ENDPOINT {
            warn!(endpoint = request.endpoint, "local backend only merges PDFs");
            return Ok(ServiceResponse::status(404));
        }
        if request.parts.is_empty() {
            return Ok(ServiceResponse::status(400));
        }

        let operation = request.operation;
        let merged = tokio::task::spawn_blocking(move || Self::merge_parts(&request.parts))
            .await
            .map_err(|err| StageError::transport(operation, err.to_string()))?;

        match merged {
            Ok(bytes) => Ok(ServiceResponse::ok(Bytes::from(bytes))),
            Err(err) => {
                warn!(error = %err, "local merge rejected batch");
                Ok(ServiceResponse::status(422))
            }
        }
    }
}
