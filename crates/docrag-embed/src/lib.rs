//! docrag-embed
//!
//! Embedding backends (`OpenAiEmbedder` for the hosted service, `FakeEmbedder`
//! for tests and offline runs) and the batch helper that applies the
//! configured failure policy.

use anyhow::{anyhow, Result};
use std::time::Duration;
use tracing::{debug, info, warn};

use docrag_core::config::{EmbedPolicy, EmbeddingConfig};
use docrag_core::traits::Embedder;
use docrag_core::EmbedError;

pub mod openai;

pub use openai::OpenAiEmbedder;

/// A vector together with the input position it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedded {
    pub position: usize,
    pub vector: Vec<f32>,
}

/// Embed `texts` in order, one service call per text.
///
/// Under `BestEffort` a failing text is logged and left out, so the output may
/// be shorter than the input; `position` ties each vector back to its text.
/// Under `FailFast` the first failure is returned as `PartialFailure`.
pub fn embed_texts(embedder: &dyn Embedder, texts: &[String], policy: EmbedPolicy) -> Result<Vec<Embedded>, EmbedError> {
    embed_texts_with_progress(embedder, texts, policy, |_| {})
}

/// Same as [`embed_texts`], calling `on_progress` after every attempted text.
pub fn embed_texts_with_progress<F>(
    embedder: &dyn Embedder,
    texts: &[String],
    policy: EmbedPolicy,
    mut on_progress: F,
) -> Result<Vec<Embedded>, EmbedError>
where
    F: FnMut(usize),
{
    let mut out = Vec::with_capacity(texts.len());
    for (position, text) in texts.iter().enumerate() {
        match embedder.embed(text) {
            Ok(vector) => out.push(Embedded { position, vector }),
            Err(e) => match policy {
                EmbedPolicy::BestEffort => {
                    let snippet: String = text.chars().take(50).collect();
                    warn!(position, error = %e, "skipping text that failed to embed: {snippet}...");
                }
                EmbedPolicy::FailFast => {
                    return Err(EmbedError::PartialFailure { position, total: texts.len(), reason: e.to_string() });
                }
            },
        }
        on_progress(position + 1);
    }
    if out.len() < texts.len() {
        warn!(embedded = out.len(), total = texts.len(), "some texts were not embedded");
    } else {
        debug!(total = texts.len(), model = embedder.model_id(), "embedded all texts");
    }
    Ok(out)
}

/// Deterministic hashed bag-of-words embedder. Same input, same vector; no
/// network or model files needed.
pub struct FakeEmbedder { dim: usize, id: String }

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim, id: format!("fake:xxh64:d{dim}") } }
}

impl Embedder for FakeEmbedder {
    fn model_id(&self) -> &str { &self.id }
    fn dim(&self) -> Option<usize> { Some(self.dim) }
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        use std::hash::{Hash, Hasher}; use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6); for x in &mut v { *x /= norm; } Ok(v)
    }
}

pub const FAKE_EMBEDDING_DIM: usize = 256;

fn use_fake_embeddings() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

/// Build the embedder selected by the environment: the `FakeEmbedder` when
/// `APP_USE_FAKE_EMBEDDINGS` is set, otherwise the OpenAI-compatible client
/// authenticated with the key in `config.api_key_env`.
pub fn get_default_embedder(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    if use_fake_embeddings() { info!("using FakeEmbedder"); return Ok(Box::new(FakeEmbedder::new(FAKE_EMBEDDING_DIM))); }
    let api_key = std::env::var(&config.api_key_env).map_err(|_| anyhow!("{} not found in environment", config.api_key_env))?;
    let embedder = OpenAiEmbedder::new(&api_key, &config.base_url, &config.model, Duration::from_secs(config.timeout_secs))?;
    info!(model = %config.model, "using OpenAI embeddings");
    Ok(Box::new(embedder))
}
