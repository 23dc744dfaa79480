//! docrag-extract
//!
//! Turns source files into `Document`s: PDFs page by page (`pdf`), plain text
//! and markdown as-is, and images through a `VisionDescriber` (`vision`).
//! Per-file failures degrade to an empty document so one bad file never stops
//! a library scan.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use docrag_core::traits::VisionDescriber;
use docrag_core::types::{Document, Origin};
use docrag_core::ExtractError;

pub mod pdf;
pub mod vision;

pub use vision::{get_default_vision, DisabledVision, OpenAiVision};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Text,
    Image,
}

/// Kinds scanned from the documents directory.
pub const DOCUMENT_KINDS: &[FileKind] = &[FileKind::Pdf, FileKind::Text];
/// Kinds scanned from the images directory.
pub const IMAGE_KINDS: &[FileKind] = &[FileKind::Image];
pub const ALL_KINDS: &[FileKind] = &[FileKind::Pdf, FileKind::Text, FileKind::Image];

impl FileKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" | "md" => Some(Self::Text),
            "png" | "jpg" | "jpeg" | "webp" => Some(Self::Image),
            _ => None,
        }
    }

    /// MIME type for `path`, derived from its extension.
    pub fn mime_type(path: &Path) -> Option<&'static str> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Some(match ext.as_str() {
            "pdf" => "application/pdf",
            "txt" => "text/plain",
            "md" => "text/markdown",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "webp" => "image/webp",
            _ => return None,
        })
    }
}

/// Regular files directly inside `dir` whose kind is one of `kinds`, sorted by
/// path. A missing directory yields an empty list.
pub fn list_files(dir: &Path, kinds: &[FileKind]) -> Vec<PathBuf> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "directory not found; nothing to list");
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| FileKind::from_path(p).is_some_and(|k| kinds.contains(&k)))
        .collect();
    files.sort();
    files
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| path.display().to_string())
}

fn read_text_lossy(path: &Path) -> Result<String, ExtractError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(_) => Ok(String::from_utf8_lossy(&fs::read(path)?).into_owned()),
    }
}

pub struct Extractor {
    vision: Box<dyn VisionDescriber>,
}

impl Extractor {
    pub fn new(vision: Box<dyn VisionDescriber>) -> Self {
        Self { vision }
    }

    /// Extract one file as a library document.
    pub fn extract_file(&self, path: &Path) -> Result<Document, ExtractError> {
        self.extract_file_as(path, Origin::Library)
    }

    /// Extract one file, tagging the document with `origin`.
    ///
    /// Only an unrecognised extension is an error; read, parse and vision
    /// failures are logged and produce an empty document.
    pub fn extract_file_as(&self, path: &Path, origin: Origin) -> Result<Document, ExtractError> {
        let kind = FileKind::from_path(path).ok_or_else(|| ExtractError::UnsupportedFormat(path.display().to_string()))?;
        let source = file_name(path);
        let text = match self.extract_text(path, kind) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "extraction failed; using empty text");
                String::new()
            }
        };
        debug!(file = %source, chars = text.chars().count(), "extracted");
        Ok(Document::new(text, source, origin))
    }

    fn extract_text(&self, path: &Path, kind: FileKind) -> Result<String, ExtractError> {
        match kind {
            FileKind::Pdf => pdf::extract_pdf_text(&fs::read(path)?),
            FileKind::Text => read_text_lossy(path),
            FileKind::Image => {
                let bytes = fs::read(path)?;
                let mime = FileKind::mime_type(path).unwrap_or("application/octet-stream");
                self.vision.describe(&bytes, mime)
            }
        }
    }

    /// Extract every listed file in `dir`, dropping empty documents.
    pub fn extract_dir(&self, dir: &Path, kinds: &[FileKind]) -> Vec<Document> {
        self.extract_paths(&list_files(dir, kinds), Origin::Library)
    }

    /// Extract `paths` in order with the given origin, dropping empty and
    /// unsupported ones.
    pub fn extract_paths(&self, paths: &[PathBuf], origin: Origin) -> Vec<Document> {
        paths
            .iter()
            .filter_map(|p| match self.extract_file_as(p, origin) {
                Ok(doc) if !doc.is_empty() => Some(doc),
                Ok(_) => None,
                Err(e) => {
                    warn!(file = %p.display(), error = %e, "skipping file");
                    None
                }
            })
            .collect()
    }

    /// Documents from `docs_dir` followed by image descriptions from
    /// `image_dir`.
    pub fn load_library(&self, docs_dir: &Path, image_dir: &Path) -> Vec<Document> {
        let mut docs = self.extract_dir(docs_dir, DOCUMENT_KINDS);
        docs.extend(self.extract_dir(image_dir, IMAGE_KINDS));
        docs
    }
}
