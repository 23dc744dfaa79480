//! Domain types shared by the extraction, indexing and retrieval stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of leading characters kept in `Metadata::text_preview`.
pub const PREVIEW_CHARS: usize = 100;

/// Where a document entered the system.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Scanned from the configured knowledge-base directories.
    #[default]
    Library,
    /// Copied into the session upload sandbox.
    Upload,
}

/// Plain text extracted from one source file.
///
/// - `text`: extracted content, trimmed; may be empty when extraction failed
/// - `source`: file name of the originating file
/// - `origin`: library scan or session upload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    pub source: String,
    pub origin: Origin,
}

impl Document {
    pub fn new(text: impl Into<String>, source: impl Into<String>, origin: Origin) -> Self {
        Self { text: text.into(), source: source.into(), origin }
    }

    pub fn is_empty(&self) -> bool { self.text.is_empty() }
}

/// Per-chunk metadata attached at index-build time and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    pub source: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_preview: Option<String>,
    #[serde(default)]
    pub origin: Origin,
}

impl Metadata {
    /// Metadata for `chunk` of `doc`, stamped with `updated_at`.
    pub fn for_chunk(doc: &Document, chunk: &str, updated_at: DateTime<Utc>) -> Self {
        let preview: String = chunk.chars().take(PREVIEW_CHARS).collect();
        Self {
            source: doc.source.clone(),
            updated_at,
            text_preview: (!preview.is_empty()).then_some(preview),
            origin: doc.origin,
        }
    }
}

/// One ranked result of a nearest-neighbour search.
///
/// `distance` is the Euclidean distance to the query; lower is better.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub text: String,
    pub metadata: Metadata,
    pub distance: f32,
}
