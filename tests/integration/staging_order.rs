//! Publication order and atomicity of append batches.

use async_trait::async_trait;
use bytes::Bytes;
use pdfstage::staging::{Candidate, MediaFilter, Payload, SharedStaging};
use pdfstage::view::{Detached, RenderSink, RenderedList};
use pdfstage::{Result, StageError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Payload whose load takes as many milliseconds as its path says.
#[derive(Debug, Clone)]
struct Delayed;

#[async_trait]
impl Payload for Delayed {
    async fn load(candidate: &Candidate) -> Result<Self> {
        let millis: u64 = candidate
            .path
            .to_str()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| StageError::file_not_found(candidate.path.clone()))?;
        tokio::time::sleep(Duration::from_millis(millis)).await;
        Ok(Self)
    }

    fn media_type(&self) -> &str {
        "image/png"
    }

    async fn bytes(&self) -> Result<Bytes> {
        Ok(Bytes::new())
    }
}

#[derive(Default)]
struct Renders(Mutex<Vec<Vec<String>>>);

impl RenderSink for Renders {
    fn render(&self, list: &RenderedList) {
        let labels = list.labels().into_iter().map(String::from).collect();
        self.0.lock().unwrap().push(labels);
    }
}

fn batch(items: &[(&str, u64)]) -> Vec<Candidate> {
    items
        .iter()
        .map(|(name, millis)| Candidate::new(*name, "image/png", millis.to_string()))
        .collect()
}

fn labels(staging: &SharedStaging<Delayed>) -> Vec<String> {
    staging
        .snapshot()
        .iter()
        .map(|entry| entry.display_name().to_string())
        .collect()
}

fn new_staging(sink: Arc<dyn RenderSink>) -> SharedStaging<Delayed> {
    SharedStaging::new(MediaFilter::Prefix("image/"), sink)
}

#[tokio::test(start_paused = true)]
async fn test_batches_publish_in_call_order() {
    let renders = Arc::new(Renders::default());
    let staging = new_staging(renders.clone());

    let first = staging.append(batch(&[("a1", 300), ("a2", 10)]));
    let second = staging.append(batch(&[("b1", 5)]));
    let third = staging.append(batch(&[("c1", 100), ("c2", 1)]));
    let (first, second, third) = tokio::join!(first, second, third);

    assert_eq!(first.unwrap().appended, 2);
    assert_eq!(second.unwrap().appended, 1);
    assert_eq!(third.unwrap().appended, 2);
    assert_eq!(labels(&staging), ["a1", "a2", "b1", "c1", "c2"]);

    // Every render shows whole batches only.
    let renders = renders.0.lock().unwrap().clone();
    assert_eq!(
        renders,
        vec![
            vec!["a1", "a2"],
            vec!["a1", "a2", "b1"],
            vec!["a1", "a2", "b1", "c1", "c2"],
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_spawned_batches_keep_call_order() {
    let staging = new_staging(Arc::new(Detached));

    let slow = tokio::spawn(staging.append(batch(&[("slow", 500)])));
    let fast = tokio::spawn(staging.append(batch(&[("fast", 1)])));

    fast.await.unwrap().unwrap();
    slow.await.unwrap().unwrap();
    assert_eq!(labels(&staging), ["slow", "fast"]);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_batch_does_not_block_later_batches() {
    let staging = new_staging(Arc::new(Detached));

    let abandoned = staging.append(batch(&[("never", 1_000)]));
    let later = staging.append(batch(&[("later", 10)]));
    drop(abandoned);

    let report = tokio::time::timeout(Duration::from_secs(1), later)
        .await
        .expect("later batch was blocked")
        .unwrap();
    assert_eq!(report.appended, 1);
    assert_eq!(labels(&staging), ["later"]);
}

#[tokio::test(start_paused = true)]
async fn test_unpolled_earlier_batch_does_not_stall_later_batches() {
    let staging = new_staging(Arc::new(Detached));

    let first = staging.append(batch(&[("first", 200)]));
    let second = staging.append(batch(&[("second", 10)]));

    let report = tokio::time::timeout(Duration::from_secs(5), second)
        .await
        .expect("later batch waited on an unpolled earlier one")
        .unwrap();
    assert_eq!(report.appended, 1);
    assert_eq!(labels(&staging), ["first", "second"]);

    // The earlier handle still resolves to its own report.
    assert_eq!(first.await.unwrap().appended, 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_batch_publishes_nothing_and_releases_slot() {
    let staging = new_staging(Arc::new(Detached));

    let broken = staging.append(vec![
        Candidate::new("ok", "image/png", "5"),
        Candidate::new("bad", "image/png", "not-a-delay"),
    ]);
    let after = staging.append(batch(&[("after", 50)]));
    let (broken, after) = tokio::join!(broken, after);

    assert!(broken.is_err());
    assert_eq!(after.unwrap().appended, 1);
    assert_eq!(labels(&staging), ["after"]);
}

#[tokio::test(start_paused = true)]
async fn test_filter_keeps_valid_subset_in_order() {
    let staging = new_staging(Arc::new(Detached));

    let report = staging
        .append(vec![
            Candidate::new("a.png", "image/png", "3"),
            Candidate::new("notes.txt", "text/plain", "1"),
            Candidate::new("b.jpg", "image/jpeg", "1"),
            Candidate::new("doc.pdf", "application/pdf", "1"),
            Candidate::new("c.webp", "image/webp", "2"),
        ])
        .await
        .unwrap();

    assert_eq!(report.appended, 3);
    assert_eq!(report.dropped, 2);
    assert_eq!(labels(&staging), ["a.png", "b.jpg", "c.webp"]);
}

/// Minimal deterministic generator for operation sequences.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound.max(1)
    }
}

#[tokio::test(start_paused = true)]
async fn test_matches_reference_model() {
    let staging = new_staging(Arc::new(Detached));
    let mut model: Vec<String> = Vec::new();
    let mut rng = Lcg(7);
    let mut counter = 0;

    for _ in 0..200 {
        match rng.next(3) {
            0 => {
                let size = rng.next(3) + 1;
                let names: Vec<String> = (0..size)
                    .map(|_| {
                        counter += 1;
                        format!("f{counter}")
                    })
                    .collect();
                let candidates = names
                    .iter()
                    .map(|name| Candidate::new(name.clone(), "image/png", rng.next(20).to_string()))
                    .collect();
                staging.append(candidates).await.unwrap();
                model.extend(names);
            }
            1 => {
                let index = rng.next(model.len() + 2);
                let removed = staging.remove_at(index);
                assert_eq!(removed, index < model.len());
                if removed {
                    model.remove(index);
                }
            }
            _ => {
                let source = rng.next(model.len() + 1);
                let target = rng.next(model.len() + 1);
                let moved = staging.move_to(source, target);
                if source < model.len() && source != target {
                    let item = model.remove(source);
                    let target = target.min(model.len());
                    model.insert(target, item);
                    assert!(moved);
                } else {
                    assert!(!moved);
                }
            }
        }
        assert_eq!(labels(&staging), model);
    }
}
