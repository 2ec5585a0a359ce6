//! Process-wide read-through cache of chunked corpora.
//!
//! Entries are keyed by `(corpus_id, ChunkingConfig)` and only leave the cache
//! through [`CorpusCache::invalidate`] or [`CorpusCache::clear`]. Failed loads
//! are never cached.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::chunker::{Chunker, ChunkingConfig};
use crate::error::Result;
use crate::traits::CorpusSource;
use crate::types::Chunk;

type CacheKey = (String, ChunkingConfig);

#[derive(Debug, Default)]
pub struct CorpusCache {
    entries: RwLock<HashMap<CacheKey, Arc<[Chunk]>>>,
}

impl CorpusCache {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, corpus_id: &str, config: ChunkingConfig) -> Option<Arc<[Chunk]>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(&(corpus_id.to_string(), config)).cloned()
    }

    /// Return the cached chunks, or run `load` and cache its success.
    pub fn get_or_load<F>(&self, corpus_id: &str, config: ChunkingConfig, load: F) -> Result<Arc<[Chunk]>>
    where
        F: FnOnce() -> Result<Vec<Chunk>>,
    {
        if let Some(hit) = self.get(corpus_id, config) {
            debug!(corpus = corpus_id, "corpus cache hit");
            return Ok(hit);
        }
        let chunks: Arc<[Chunk]> = load()?.into();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // A concurrent loader may have won the race; keep its snapshot.
        let entry = entries.entry((corpus_id.to_string(), config)).or_insert(chunks);
        Ok(Arc::clone(entry))
    }

    /// Drop every entry of `corpus_id`, whatever its chunking parameters.
    pub fn invalidate(&self, corpus_id: &str) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|(id, _), _| id != corpus_id);
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    pub fn len(&self) -> usize { self.entries.read().unwrap_or_else(PoisonError::into_inner).len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Source + chunker + optional cache: the chunking boundary of the pipeline.
#[derive(Clone)]
pub struct ChunkStore {
    source: Arc<dyn CorpusSource>,
    chunker: Chunker,
    cache: Option<Arc<CorpusCache>>,
}

impl ChunkStore {
    pub fn new(source: Arc<dyn CorpusSource>, chunker: Chunker) -> Self {
        Self { source, chunker, cache: None }
    }

    pub fn with_cache(mut self, cache: Arc<CorpusCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&Arc<CorpusCache>> { self.cache.as_ref() }

    /// Load and chunk `corpus_id`, surfacing `CorpusUnavailable`.
    pub fn try_chunks(&self, corpus_id: &str) -> Result<Arc<[Chunk]>> {
        let load = || self.chunker.load(self.source.as_ref(), corpus_id);
        match &self.cache {
            Some(cache) => cache.get_or_load(corpus_id, self.chunker.config(), load),
            None => Ok(load()?.into()),
        }
    }

    /// Load and chunk `corpus_id`; an unavailable corpus is zero chunks.
    pub fn chunks(&self, corpus_id: &str) -> Arc<[Chunk]> {
        self.try_chunks(corpus_id).unwrap_or_else(|e| {
            warn!(corpus = corpus_id, error = %e, "corpus unavailable, continuing with no chunks");
            Arc::from(Vec::new())
        })
    }
}
