//! Session-scoped sandbox directory for ad-hoc uploads.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use docrag_core::chunker::ChunkingConfig;
use docrag_core::config::EmbedPolicy;
use docrag_core::traits::Embedder;
use docrag_core::types::Origin;
use docrag_core::Result;
use docrag_extract::{list_files, Extractor, FileKind, ALL_KINDS};
use docrag_vector::VectorIndex;

use crate::pipeline::index_documents;

#[derive(Debug, Clone)]
pub struct UploadSandbox {
    dir: PathBuf,
}

impl UploadSandbox {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy each existing, supported file into the sandbox and return the
    /// copies. Anything else is skipped with a warning.
    pub fn save(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.dir)?;
        let mut saved = Vec::new();
        for src in paths {
            if !src.is_file() {
                warn!(file = %src.display(), "file not found; skipping");
                continue;
            }
            if FileKind::from_path(src).is_none() {
                warn!(file = %src.display(), "unsupported file type; skipping");
                continue;
            }
            let Some(name) = src.file_name() else { continue };
            let dst = self.dir.join(name);
            match fs::copy(src, &dst) {
                Ok(_) => saved.push(dst),
                Err(e) => warn!(file = %src.display(), error = %e, "failed to copy upload"),
            }
        }
        info!(saved = saved.len(), requested = paths.len(), "uploads saved");
        Ok(saved)
    }

    pub fn files(&self) -> Vec<PathBuf> {
        if !self.dir.is_dir() {
            return Vec::new();
        }
        list_files(&self.dir, ALL_KINDS)
    }

    /// Index every sandbox file as an upload; `None` when nothing yields text.
    pub fn build_index(
        &self,
        extractor: &Extractor,
        embedder: &dyn Embedder,
        chunking: &ChunkingConfig,
        policy: EmbedPolicy,
    ) -> Result<Option<VectorIndex>> {
        let docs = extractor.extract_paths(&self.files(), Origin::Upload);
        if docs.is_empty() {
            info!("no indexable uploads");
            return Ok(None);
        }
        index_documents(&docs, chunking, embedder, policy)
    }

    /// Remove the sandbox directory and everything in it.
    pub fn clear(&self) -> Result<()> {
        if self.dir.is_dir() {
            fs::remove_dir_all(&self.dir)?;
            info!(dir = %self.dir.display(), "upload sandbox cleared");
        }
        Ok(())
    }
}
