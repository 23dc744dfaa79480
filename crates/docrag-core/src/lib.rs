#![deny(unused_variables)]
#![deny(unused_imports)]

//! docrag-core
//!
//! Shared domain types, the error taxonomy, collaborator traits, the chunker
//! and the Figment-backed configuration used by every other docrag crate.

pub mod chunker;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{ChunkError, EmbedError, Error, ExtractError, IndexError, ManifestError, Result};
