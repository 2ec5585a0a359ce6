use tracing::debug;

use orient_core::config::RetrievalConfig;
use orient_core::traits::Ranker;
use orient_core::types::{preview, sort_by_relevance, Chunk, RankedChunk};

use crate::tfidf::{cosine, VectorSpace};
use crate::tokenize::Analyzer;

/// Ranks chunks by TF-IDF cosine similarity to the query.
///
/// The vector space is rebuilt from the chunk set on every call; nothing is
/// kept between calls. `RankedChunk::index` is the chunk's position in the
/// slice passed to [`Ranker::rank`].
#[derive(Clone)]
pub struct TfIdfRanker {
    analyzer: Analyzer,
    preview_chars: usize,
}

impl Default for TfIdfRanker {
    fn default() -> Self { Self::from_config(&RetrievalConfig::default()) }
}

impl TfIdfRanker {
    pub fn new(analyzer: Analyzer, preview_chars: usize) -> Self { Self { analyzer, preview_chars } }

    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self::new(Analyzer::new(&config.stop_words), config.preview_chars)
    }

    /// Similarity of `query` to every chunk, in chunk order.
    pub fn scores(&self, query: &str, chunks: &[Chunk]) -> Vec<f64> {
        let space = VectorSpace::fit(&self.analyzer, chunks.iter().map(|c| c.text.as_str()));
        let q = space.embed(&self.analyzer, query);
        debug!(chunks = chunks.len(), vocabulary = space.vocabulary_len(), query_terms = q.len(), "built tf-idf space");
        space.rows().iter().map(|row| cosine(&q, row)).collect()
    }
}

impl Ranker for TfIdfRanker {
    fn rank(&self, query: &str, chunks: &[Chunk], top_n: usize) -> Vec<RankedChunk> {
        if chunks.is_empty() || top_n == 0 { return Vec::new(); }
        let mut ranked: Vec<RankedChunk> = self
            .scores(query, chunks)
            .into_iter()
            .zip(chunks)
            .enumerate()
            .map(|(index, (similarity, chunk))| RankedChunk { index, similarity, preview: preview(&chunk.text, self.preview_chars) })
            .collect();
        sort_by_relevance(&mut ranked);
        ranked.truncate(top_n);
        ranked
    }
}
