use tracing::debug;

use docrag_core::types::{Metadata, SearchHit};
use docrag_core::IndexError;

/// Vectors with their chunk texts and metadata, position-aligned.
///
/// Built once and never mutated; a rebuild produces a new value.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dim: usize,
    vectors: Vec<Vec<f32>>,
    texts: Vec<String>,
    metadatas: Vec<Metadata>,
}

impl VectorIndex {
    pub fn build(vectors: Vec<Vec<f32>>, texts: Vec<String>, metadatas: Vec<Metadata>) -> Result<Self, IndexError> {
        let dim = vectors.first().map(Vec::len).ok_or(IndexError::EmptyInput)?;
        if dim == 0 {
            return Err(IndexError::DimensionMismatch { expected: 1, found: 0, position: 0 });
        }
        if let Some((position, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dim) {
            return Err(IndexError::DimensionMismatch { expected: dim, found: v.len(), position });
        }
        if texts.len() != vectors.len() || metadatas.len() != vectors.len() {
            return Err(IndexError::LengthMismatch { vectors: vectors.len(), texts: texts.len(), metadatas: metadatas.len() });
        }
        debug!(entries = vectors.len(), dim, "built vector index");
        Ok(Self { dim, vectors, texts, metadatas })
    }

    /// The `min(k, len)` entries nearest to `query`, closest first. Equal
    /// distances keep insertion order; entries whose distance is NaN rank last.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, IndexError> {
        if query.len() != self.dim {
            return Err(IndexError::DimensionMismatch { expected: self.dim, found: query.len(), position: 0 });
        }
        let mut scored: Vec<(usize, f32)> =
            self.vectors.iter().enumerate().map(|(i, v)| (i, euclidean(v, query))).collect();
        // stable total order: NaN distances of either sign go last, ties stay in position order
        scored.sort_by(|a, b| a.1.is_nan().cmp(&b.1.is_nan()).then(a.1.total_cmp(&b.1)));
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(i, distance)| SearchHit { text: self.texts[i].clone(), metadata: self.metadatas[i].clone(), distance })
            .collect())
    }

    pub fn len(&self) -> usize { self.vectors.len() }
    pub fn is_empty(&self) -> bool { self.vectors.is_empty() }
    pub fn dim(&self) -> usize { self.dim }
    pub fn texts(&self) -> &[String] { &self.texts }
    pub fn metadatas(&self) -> &[Metadata] { &self.metadatas }
}

fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt()
}
