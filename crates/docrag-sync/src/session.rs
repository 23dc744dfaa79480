use std::collections::VecDeque;
use std::path::PathBuf;

use tracing::debug;

use docrag_core::config::{RetrievalConfig, SessionConfig};
use docrag_core::types::SearchHit;
use docrag_core::Result;
use docrag_vector::VectorIndex;

use crate::sync::KnowledgeBase;
use crate::upload::UploadSandbox;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub user: String,
    pub assistant: String,
}

/// State of one interactive conversation: uploads, their index and a bounded
/// turn history.
pub struct Session {
    sandbox: UploadSandbox,
    upload_index: Option<VectorIndex>,
    history: VecDeque<Turn>,
    max_turns: usize,
    top_k: usize,
    upload_top_k: usize,
}

impl Session {
    pub fn new(sandbox: UploadSandbox, retrieval: &RetrievalConfig, session: &SessionConfig) -> Self {
        Self {
            sandbox,
            upload_index: None,
            history: VecDeque::with_capacity(session.max_turns),
            max_turns: session.max_turns,
            top_k: retrieval.top_k,
            upload_top_k: retrieval.upload_top_k,
        }
    }

    /// Copy `paths` into the sandbox and rebuild the upload index from
    /// everything it now holds.
    pub fn upload(&mut self, paths: &[PathBuf], kb: &KnowledgeBase) -> Result<Vec<PathBuf>> {
        let saved = self.sandbox.save(paths)?;
        self.upload_index = kb.index_uploads(&self.sandbox)?;
        Ok(saved)
    }

    pub fn clear_uploads(&mut self) -> Result<()> {
        self.sandbox.clear()?;
        self.upload_index = None;
        Ok(())
    }

    pub fn upload_index(&self) -> Option<&VectorIndex> {
        self.upload_index.as_ref()
    }

    pub fn sandbox(&self) -> &UploadSandbox {
        &self.sandbox
    }

    /// `top_k` hits from the knowledge base followed by `upload_top_k` hits
    /// from the uploads. The query is embedded once.
    pub fn retrieve(&self, kb: &KnowledgeBase, query: &str) -> Result<Vec<SearchHit>> {
        if kb.index().is_none() && self.upload_index.is_none() {
            return Ok(Vec::new());
        }
        let vector = kb.embedder().embed(query)?;
        let mut hits = match kb.index() {
            Some(index) => index.search(&vector, self.top_k)?,
            None => Vec::new(),
        };
        if let Some(index) = &self.upload_index {
            hits.extend(index.search(&vector, self.upload_top_k)?);
        }
        debug!(hits = hits.len(), "session retrieval");
        Ok(hits)
    }

    /// Append a turn, dropping the oldest beyond `max_turns`.
    pub fn record_turn(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.history.push_back(Turn { user: user.into(), assistant: assistant.into() });
        while self.history.len() > self.max_turns {
            self.history.pop_front();
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &Turn> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

/// Hit texts joined by blank lines, ready to be placed in a prompt.
pub fn context_text(hits: &[SearchHit]) -> String {
    hits.iter().map(|h| h.text.as_str()).collect::<Vec<_>>().join("\n\n")
}
