//! Corpus sources: where raw corpus text comes from.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::{resolve_with_base, CorporaConfig};
use crate::error::{Error, Result};
use crate::traits::CorpusSource;

/// Extensions picked up when a corpus path is a directory.
const CORPUS_EXTENSIONS: &[&str] = &["json", "txt"];

/// Reads corpora from the local filesystem.
///
/// Each corpus id maps to a path. A file path is read as UTF-8; a directory
/// path concatenates its `.json`/`.txt` files in sorted path order, one
/// newline between files. Symlinks are followed; entries that cannot be
/// walked are skipped with a warning. Invalid UTF-8 is reported as
/// unavailable rather than repaired.
#[derive(Debug, Clone, Default)]
pub struct FileCorpusSource {
    paths: HashMap<String, PathBuf>,
}

impl FileCorpusSource {
    pub fn new() -> Self { Self::default() }

    pub fn with_corpus(mut self, corpus_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.paths.insert(corpus_id.into(), path.into());
        self
    }

    /// Build from configuration, resolving relative paths against `base`.
    pub fn from_config(corpora: &CorporaConfig, base: &Path) -> Self {
        Self::new()
            .with_corpus(corpora.primary.id.clone(), resolve_with_base(base, &corpora.primary.path))
            .with_corpus(corpora.secondary.id.clone(), resolve_with_base(base, &corpora.secondary.path))
    }

    pub fn path_of(&self, corpus_id: &str) -> Option<&Path> { self.paths.get(corpus_id).map(PathBuf::as_path) }

    fn read_dir(&self, corpus_id: &str, dir: &Path) -> Result<String> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(corpus = corpus_id, error = %e, "skipping unreadable corpus entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().and_then(|s| s.to_str()).is_some_and(|ext| CORPUS_EXTENSIONS.contains(&ext)))
            .collect();
        files.sort();
        if files.is_empty() {
            return Err(Error::corpus_unavailable(corpus_id, format!("no corpus files under {}", dir.display())));
        }
        let mut parts = Vec::with_capacity(files.len());
        for file in &files {
            parts.push(fs::read_to_string(file).map_err(|e| Error::corpus_unavailable(corpus_id, format!("{}: {e}", file.display())))?);
        }
        debug!(corpus = corpus_id, files = files.len(), "read corpus directory");
        Ok(parts.join("\n"))
    }
}

impl CorpusSource for FileCorpusSource {
    fn load(&self, corpus_id: &str) -> Result<String> {
        let path = self
            .paths
            .get(corpus_id)
            .ok_or_else(|| Error::corpus_unavailable(corpus_id, "no path configured"))?;
        if path.is_dir() {
            return self.read_dir(corpus_id, path);
        }
        fs::read_to_string(path).map_err(|e| Error::corpus_unavailable(corpus_id, format!("{}: {e}", path.display())))
    }
}

/// Corpora held in memory; used by tests and by callers embedding the pipeline.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorpusSource {
    corpora: HashMap<String, String>,
}

impl InMemoryCorpusSource {
    pub fn new() -> Self { Self::default() }

    pub fn with_corpus(mut self, corpus_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.corpora.insert(corpus_id.into(), text.into());
        self
    }
}

impl CorpusSource for InMemoryCorpusSource {
    fn load(&self, corpus_id: &str) -> Result<String> {
        self.corpora
            .get(corpus_id)
            .cloned()
            .ok_or_else(|| Error::corpus_unavailable(corpus_id, "unknown corpus"))
    }
}
