//! Fixed-size, overlapping character windows.
//!
//! Windows are measured in Unicode scalar values so a chunk never splits a
//! UTF-8 code point.

use serde::{Deserialize, Serialize};

use crate::error::ChunkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 500, chunk_overlap: 100 }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.chunk_size == 0 || self.chunk_overlap >= self.chunk_size {
            return Err(ChunkError::InvalidConfiguration { chunk_size: self.chunk_size, overlap: self.chunk_overlap });
        }
        Ok(())
    }

    pub fn chunk(&self, text: &str) -> Result<Vec<String>, ChunkError> {
        chunk(text, self.chunk_size, self.chunk_overlap)
    }
}

/// Split `text` into windows of `chunk_size` characters, each starting
/// `chunk_size - overlap` characters after the previous one. The last window
/// may be shorter. Empty input yields no chunks.
pub fn chunk(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>, ChunkError> {
    ChunkingConfig { chunk_size, chunk_overlap: overlap }.validate()?;
    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size - overlap;
    let mut chunks = Vec::with_capacity(chars.len().div_ceil(step));
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        start += step;
    }
    Ok(chunks)
}
