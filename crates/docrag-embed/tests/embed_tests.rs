use std::sync::atomic::{AtomicUsize, Ordering};

use docrag_core::config::{EmbedPolicy, EmbeddingConfig};
use docrag_core::traits::Embedder;
use docrag_core::EmbedError;
use docrag_embed::{embed_texts, embed_texts_with_progress, get_default_embedder, FakeEmbedder, FAKE_EMBEDDING_DIM};

/// Fails for any text containing "bad"; counts calls.
struct FlakyEmbedder {
    inner: FakeEmbedder,
    calls: AtomicUsize,
}

impl FlakyEmbedder {
    fn new() -> Self { Self { inner: FakeEmbedder::new(8), calls: AtomicUsize::new(0) } }
}

impl Embedder for FlakyEmbedder {
    fn model_id(&self) -> &str { "flaky" }
    fn dim(&self) -> Option<usize> { Some(8) }
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.contains("bad") {
            return Err(EmbedError::Request("rate limited".to_string()));
        }
        self.inner.embed(text)
    }
}

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn fake_embedder_shapes_and_determinism() {
    let embedder = FakeEmbedder::new(64);
    let v1 = embedder.embed("hello world").expect("embed");
    let v2 = embedder.embed("hello world").expect("embed");
    assert_eq!(v1.len(), 64);
    assert_eq!(embedder.dim(), Some(64));

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");
    assert_eq!(v1, v2);

    let other = embedder.embed("completely different words").expect("embed");
    assert_ne!(v1, other);
}

#[test]
fn default_embedder_honours_fake_flag() {
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");
    let embedder = get_default_embedder(&EmbeddingConfig::default()).expect("embedder");
    assert_eq!(embedder.dim(), Some(FAKE_EMBEDDING_DIM));
    assert_eq!(embedder.embed("x").expect("embed").len(), FAKE_EMBEDDING_DIM);
}

#[test]
fn best_effort_skips_failures_and_keeps_positions() {
    let embedder = FlakyEmbedder::new();
    let input = texts(&["alpha", "bad one", "gamma", "bad two", "epsilon"]);
    let out = embed_texts(&embedder, &input, EmbedPolicy::BestEffort).expect("best effort");
    let positions: Vec<usize> = out.iter().map(|e| e.position).collect();
    assert_eq!(positions, vec![0, 2, 4]);
    assert_eq!(out[1].vector, embedder.inner.embed("gamma").expect("embed"));
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 5);
}

#[test]
fn fail_fast_stops_at_first_failure() {
    let embedder = FlakyEmbedder::new();
    let input = texts(&["alpha", "bad one", "gamma"]);
    let err = embed_texts(&embedder, &input, EmbedPolicy::FailFast).expect_err("fail fast");
    assert!(matches!(err, EmbedError::PartialFailure { position: 1, total: 3, .. }));
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn progress_reports_every_attempt() {
    let embedder = FlakyEmbedder::new();
    let input = texts(&["a", "bad", "c"]);
    let mut seen = Vec::new();
    let out = embed_texts_with_progress(&embedder, &input, EmbedPolicy::BestEffort, |n| seen.push(n)).expect("embed");
    assert_eq!(out.len(), 2);
    assert_eq!(seen, vec![1, 2, 3]);
}

#[test]
fn empty_input_embeds_nothing() {
    let embedder = FakeEmbedder::new(16);
    assert!(embed_texts(&embedder, &[], EmbedPolicy::FailFast).expect("empty").is_empty());
}
