//! Structural corpus chunker.
//!
//! Cuts a corpus into a sliding window of character runs. The chunker is not
//! format aware: a single-line JSON blob is chunked exactly like prose.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::traits::CorpusSource;
use crate::types::Chunk;

/// Window parameters, counted in characters.
///
/// `max_size` is the length of every chunk but the last; `overlap` is the
/// number of trailing characters repeated at the start of the next chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { max_size: 1000, overlap: 200 }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(Error::InvalidConfig("chunking.max_size must be greater than 0".to_string()));
        }
        if self.overlap >= self.max_size {
            return Err(Error::InvalidConfig(format!(
                "chunking.overlap ({}) must be smaller than chunking.max_size ({})",
                self.overlap, self.max_size
            )));
        }
        Ok(())
    }

    fn step(&self) -> usize { self.max_size - self.overlap }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> ChunkingConfig { self.config }

    /// Load a corpus from `source` and chunk it.
    pub fn load(&self, source: &dyn CorpusSource, corpus_id: &str) -> Result<Vec<Chunk>> {
        let text = source.load(corpus_id)?;
        let chunks = self.chunk(corpus_id, &text);
        debug!(corpus = corpus_id, chars = text.chars().count(), chunks = chunks.len(), "chunked corpus");
        Ok(chunks)
    }

    /// Chunk `text`. Same input, same output; empty text yields no chunks.
    pub fn chunk(&self, corpus_id: &str, text: &str) -> Vec<Chunk> {
        // Byte offset of every character boundary, end of text included.
        let bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let total = bounds.len() - 1;
        let mut chunks = Vec::new();
        if total == 0 { return chunks; }

        let mut start = 0;
        loop {
            let end = (start + self.config.max_size).min(total);
            chunks.push(Chunk {
                corpus_id: corpus_id.to_string(),
                sequence_index: chunks.len(),
                text: text[bounds[start]..bounds[end]].to_string(),
            });
            if end == total { break; }
            start += self.config.step();
        }
        chunks
    }
}

/// Free-function form of [`Chunker::chunk`] that validates `config` first.
pub fn chunk(corpus_id: &str, text: &str, config: ChunkingConfig) -> Result<Vec<Chunk>> {
    Ok(Chunker::new(config)?.chunk(corpus_id, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(chunks: &[Chunk]) -> Vec<&str> { chunks.iter().map(|c| c.text.as_str()).collect() }

    #[test]
    fn windows_overlap_by_configured_amount() {
        let chunker = Chunker::new(ChunkingConfig { max_size: 4, overlap: 1 }).unwrap();
        let chunks = chunker.chunk("a", "abcdefghij");
        assert_eq!(texts(&chunks), vec!["abcd", "defg", "ghij"]);
        let indices: Vec<usize> = chunks.iter().map(|c| c.sequence_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = chunk("a", "hi", ChunkingConfig::default()).unwrap();
        assert_eq!(texts(&chunks), vec!["hi"]);
    }

    #[test]
    fn empty_text_is_no_chunks() {
        assert!(chunk("a", "", ChunkingConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn multibyte_characters_are_never_split() {
        let chunks = chunk("a", "éèàçù", ChunkingConfig { max_size: 2, overlap: 0 }).unwrap();
        assert_eq!(texts(&chunks), vec!["éè", "àç", "ù"]);
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        let err = Chunker::new(ChunkingConfig { max_size: 10, overlap: 10 }).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(Chunker::new(ChunkingConfig { max_size: 0, overlap: 0 }).is_err());
    }
}
