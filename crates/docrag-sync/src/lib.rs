//! docrag-sync
//!
//! Keeps the in-memory knowledge base in step with the files on disk. A
//! fingerprint manifest decides whether anything changed; any change triggers
//! a full extract, chunk, embed and build pass. Also hosts the per-session
//! upload sandbox and its secondary index.

pub mod manifest;
pub mod pipeline;
pub mod session;
pub mod sync;
pub mod upload;

pub use manifest::{fingerprint, Manifest, ManifestDiff};
pub use pipeline::index_documents;
pub use session::{context_text, Session, Turn};
pub use sync::KnowledgeBase;
pub use upload::UploadSandbox;
