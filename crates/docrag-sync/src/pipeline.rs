use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use docrag_core::chunker::ChunkingConfig;
use docrag_core::config::EmbedPolicy;
use docrag_core::traits::Embedder;
use docrag_core::types::{Document, Metadata};
use docrag_core::{IndexError, Result};
use docrag_embed::embed_texts_with_progress;
use docrag_vector::VectorIndex;

/// Chunk, embed and index `docs`.
///
/// Returns `Ok(None)` when the documents produce no chunks at all. Chunks whose
/// embedding failed (best-effort policy) are dropped together with their
/// metadata; if none survive the build fails with `EmptyInput`.
pub fn index_documents(
    docs: &[Document],
    chunking: &ChunkingConfig,
    embedder: &dyn Embedder,
    policy: EmbedPolicy,
) -> Result<Option<VectorIndex>> {
    let updated_at = Utc::now();
    let mut texts = Vec::new();
    let mut metadatas = Vec::new();
    for doc in docs {
        for chunk in chunking.chunk(&doc.text)? {
            metadatas.push(Metadata::for_chunk(doc, &chunk, updated_at));
            texts.push(chunk);
        }
    }
    if texts.is_empty() {
        info!(documents = docs.len(), "no chunks to index");
        return Ok(None);
    }
    info!(documents = docs.len(), chunks = texts.len(), model = embedder.model_id(), "embedding chunks");

    let pb = ProgressBar::new(texts.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    let embedded = embed_texts_with_progress(embedder, &texts, policy, |n| pb.set_position(n as u64));
    pb.finish_and_clear();
    let embedded = embedded?;
    if embedded.is_empty() {
        return Err(IndexError::EmptyInput.into());
    }

    let mut vectors = Vec::with_capacity(embedded.len());
    let mut kept_texts = Vec::with_capacity(embedded.len());
    let mut kept_metas = Vec::with_capacity(embedded.len());
    for e in embedded {
        kept_texts.push(std::mem::take(&mut texts[e.position]));
        kept_metas.push(metadatas[e.position].clone());
        vectors.push(e.vector);
    }
    let index = VectorIndex::build(vectors, kept_texts, kept_metas)?;
    info!(chunks = index.len(), dim = index.dim(), "index built");
    Ok(Some(index))
}
