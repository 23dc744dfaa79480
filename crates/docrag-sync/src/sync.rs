use std::path::{Path, PathBuf};

use tracing::info;

use docrag_core::chunker::ChunkingConfig;
use docrag_core::config::{EmbedPolicy, Settings};
use docrag_core::traits::Embedder;
use docrag_core::types::SearchHit;
use docrag_core::Result;
use docrag_extract::{list_files, Extractor, DOCUMENT_KINDS, IMAGE_KINDS};
use docrag_vector::VectorIndex;

use crate::manifest::Manifest;
use crate::pipeline::index_documents;
use crate::upload::UploadSandbox;

/// The primary index plus everything needed to rebuild it.
pub struct KnowledgeBase {
    extractor: Extractor,
    embedder: Box<dyn Embedder>,
    chunking: ChunkingConfig,
    policy: EmbedPolicy,
    manifest_path: PathBuf,
    index: Option<VectorIndex>,
    // set once this process has completed a rebuild
    warm: bool,
}

impl KnowledgeBase {
    pub fn new(
        extractor: Extractor,
        embedder: Box<dyn Embedder>,
        chunking: ChunkingConfig,
        policy: EmbedPolicy,
        manifest_path: impl Into<PathBuf>,
    ) -> Self {
        Self { extractor, embedder, chunking, policy, manifest_path: manifest_path.into(), index: None, warm: false }
    }

    /// Knowledge base configured from `settings`; `manifest_path` is taken as
    /// already resolved.
    pub fn from_settings(
        settings: &Settings,
        extractor: Extractor,
        embedder: Box<dyn Embedder>,
        manifest_path: impl Into<PathBuf>,
    ) -> Self {
        Self::new(extractor, embedder, settings.chunking, settings.embedding.policy, manifest_path)
    }

    /// Bring the index in line with `docs_dir` and `image_dir`.
    ///
    /// Returns `true` when a rebuild ran. Nothing is rebuilt when the file set
    /// and every fingerprint match the manifest, unless this process has no
    /// index yet. The manifest is written only after the new index is in
    /// place; on error both the index and the manifest keep their old state.
    pub fn sync(&mut self, docs_dir: &Path, image_dir: &Path) -> Result<bool> {
        let previous = Manifest::load(&self.manifest_path);
        let current = Manifest::scan(&current_files(docs_dir, image_dir));
        let diff = previous.diff(&current);
        let cold = !self.warm && !current.is_empty();
        if diff.is_empty() && !cold {
            info!(files = current.len(), "knowledge base is in sync");
            return Ok(false);
        }
        info!(
            added = diff.added.len(),
            removed = diff.removed.len(),
            changed = diff.changed.len(),
            cold,
            "changes detected; rebuilding index"
        );
        self.rebuild_from(docs_dir, image_dir, current)?;
        Ok(true)
    }

    /// Rebuild unconditionally, then record the current fingerprints.
    pub fn rebuild(&mut self, docs_dir: &Path, image_dir: &Path) -> Result<()> {
        let current = Manifest::scan(&current_files(docs_dir, image_dir));
        self.rebuild_from(docs_dir, image_dir, current)
    }

    fn rebuild_from(&mut self, docs_dir: &Path, image_dir: &Path, current: Manifest) -> Result<()> {
        let docs = self.extractor.load_library(docs_dir, image_dir);
        let index = index_documents(&docs, &self.chunking, self.embedder.as_ref(), self.policy)?;
        self.index = index;
        self.warm = true;
        current.save(&self.manifest_path)?;
        info!(documents = docs.len(), chunks = self.chunk_count(), "index rebuilt");
        Ok(())
    }

    pub fn index(&self) -> Option<&VectorIndex> {
        self.index.as_ref()
    }

    /// Number of chunks in the current index; zero when there is none.
    pub fn chunk_count(&self) -> usize {
        self.index.as_ref().map_or(0, VectorIndex::len)
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Top `k` chunks for `query`; empty when nothing is indexed.
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        match &self.index {
            Some(index) => docrag_vector::retrieve(index, self.embedder.as_ref(), query, k),
            None => Ok(Vec::new()),
        }
    }

    /// Index the sandbox contents with this knowledge base's extractor,
    /// chunking and embedder.
    pub fn index_uploads(&self, sandbox: &UploadSandbox) -> Result<Option<VectorIndex>> {
        sandbox.build_index(&self.extractor, self.embedder.as_ref(), &self.chunking, self.policy)
    }
}

fn current_files(docs_dir: &Path, image_dir: &Path) -> Vec<PathBuf> {
    let mut files = list_files(docs_dir, DOCUMENT_KINDS);
    files.extend(list_files(image_dir, IMAGE_KINDS));
    files
}
