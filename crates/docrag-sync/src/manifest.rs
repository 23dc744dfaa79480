//! Persisted record of the file fingerprints the current index was built from.
//!
//! On disk it is a flat JSON object `{ "<absolute path>": "<blake3 hex>" }`.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use docrag_core::ManifestError;

/// BLAKE3 hex digest of the file's bytes.
pub fn fingerprint(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, String>,
}

/// Paths that differ between two manifests, each list sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<String>,
}

impl ManifestDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the manifest at `path`; a missing file is an empty manifest.
    pub fn try_load(path: &Path) -> Result<Self, ManifestError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&raw).map_err(|e| ManifestError::Corrupt(format!("{}: {e}", path.display())))
    }

    /// Like [`Manifest::try_load`], but any failure logs a warning and yields
    /// an empty manifest, which forces a rebuild.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable manifest");
                Self::default()
            }
        }
    }

    /// Write pretty JSON to `path` through a temp file in the same directory,
    /// so readers never observe a partial manifest.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&parent)?;
        serde_json::to_writer_pretty(&mut tmp, self)?;
        tmp.write_all(b"\n")?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| ManifestError::Io(e.error))?;
        debug!(path = %path.display(), entries = self.len(), "manifest saved");
        Ok(())
    }

    /// Fingerprint `files`. Keys are canonical absolute paths; files that
    /// cannot be read are left out with a warning.
    pub fn scan(files: &[PathBuf]) -> Self {
        let mut entries = BTreeMap::new();
        for file in files {
            let key = fs::canonicalize(file).unwrap_or_else(|_| file.clone());
            match fingerprint(file) {
                Ok(fp) => {
                    entries.insert(key.to_string_lossy().into_owned(), fp);
                }
                Err(e) => warn!(file = %file.display(), error = %e, "cannot fingerprint file; skipping"),
            }
        }
        Self { entries }
    }

    /// What changed going from `self` to `current`.
    pub fn diff(&self, current: &Manifest) -> ManifestDiff {
        let mut diff = ManifestDiff::default();
        for (path, fp) in &current.entries {
            match self.entries.get(path) {
                None => diff.added.push(path.clone()),
                Some(old) if old != fp => diff.changed.push(path.clone()),
                Some(_) => {}
            }
        }
        diff.removed = self.entries.keys().filter(|k| !current.entries.contains_key(*k)).cloned().collect();
        diff
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn insert(&mut self, path: impl Into<String>, fingerprint: impl Into<String>) {
        self.entries.insert(path.into(), fingerprint.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
