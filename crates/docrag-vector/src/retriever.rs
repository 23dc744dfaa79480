use tracing::debug;

use docrag_core::traits::Embedder;
use docrag_core::types::SearchHit;
use docrag_core::Result;

use crate::VectorIndex;

/// Embed `query` and return the `k` nearest chunks from `index`.
pub fn retrieve(index: &VectorIndex, embedder: &dyn Embedder, query: &str, k: usize) -> Result<Vec<SearchHit>> {
    let vector = embedder.embed(query)?;
    let hits = index.search(&vector, k)?;
    debug!(k, hits = hits.len(), "retrieved");
    Ok(hits)
}
