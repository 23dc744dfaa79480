use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation failed: {0}")]
    Operation(String),

    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractError),

    #[error("chunking error: {0}")]
    Chunking(#[from] ChunkError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbedError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-file extraction failures. Pipelines absorb these and treat the file as
/// empty; only direct `extract_file` callers see `UnsupportedFormat`.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("vision service error: {0}")]
    Vision(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("invalid chunking configuration: chunk_size={chunk_size}, overlap={overlap} (overlap must be smaller than a non-zero chunk_size)")]
    InvalidConfiguration { chunk_size: usize, overlap: usize },
}

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embedding request failed: {0}")]
    Request(String),

    #[error("malformed embedding response: {0}")]
    Response(String),

    #[error("embedding failed for text {position} of {total}: {reason}")]
    PartialFailure { position: usize, total: usize, reason: String },
}

/// Structural failures when building or querying a vector index. These are
/// always fatal for the operation that raised them.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("cannot build an index from zero vectors")]
    EmptyInput,

    #[error("vector {position} has dimension {found}, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize, position: usize },

    #[error("parallel inputs differ in length: {vectors} vectors, {texts} texts, {metadatas} metadata entries")]
    LengthMismatch { vectors: usize, texts: usize, metadatas: usize },
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest is corrupt: {0}")]
    Corrupt(String),

    #[error("manifest io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("manifest serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
