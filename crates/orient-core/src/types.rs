//! Domain types shared by the chunker, the ranker and the pipeline.

use serde::{Deserialize, Serialize};

pub type CorpusId = String;

/// A passage of a corpus and the unit of retrieval.
///
/// - `corpus_id`: the corpus the passage was cut from
/// - `sequence_index`: position within the corpus, unique and stable for a
///   given text and chunking configuration
/// - `text`: the passage itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub corpus_id: CorpusId,
    pub sequence_index: usize,
    pub text: String,
}

/// One scored entry of a ranking.
///
/// `index` is the `sequence_index` of the chunk. `similarity` is a cosine
/// similarity in `[0, 1]`; higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedChunk {
    pub index: usize,
    pub similarity: f64,
    pub preview: String,
}

/// The evidence handed to the answer stage for one corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextBundle {
    pub text: String,
    pub ranked: Vec<RankedChunk>,
}

impl ContextBundle {
    pub const SEPARATOR: &'static str = " ";

    /// Concatenate the ranked chunks' texts in rank order.
    pub fn from_ranked(ranked: Vec<RankedChunk>, chunks: &[Chunk]) -> Self {
        let text = ranked
            .iter()
            .filter_map(|r| chunks.get(r.index))
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(Self::SEPARATOR);
        Self { text, ranked }
    }

    pub fn is_empty(&self) -> bool { self.ranked.is_empty() }
}

/// What a text-generation call produced. `text` is `None` when the response
/// carried no extractable textual payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub text: Option<String>,
}

impl Completion {
    pub fn text(text: impl Into<String>) -> Self { Self { text: Some(text.into()) } }

    pub fn empty() -> Self { Self { text: None } }
}

/// Order ranked entries by descending similarity, ascending index on ties.
pub fn sort_by_relevance(ranked: &mut [RankedChunk]) {
    ranked.sort_by(|a, b| b.similarity.total_cmp(&a.similarity).then(a.index.cmp(&b.index)));
}

/// First `max_chars` characters of `text`.
pub fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
