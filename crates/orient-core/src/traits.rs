use crate::error::Result;
use crate::types::{Chunk, Completion, RankedChunk};

/// Returns the raw text of a named corpus, or fails with
/// [`crate::error::Error::CorpusUnavailable`].
pub trait CorpusSource: Send + Sync {
    fn load(&self, corpus_id: &str) -> Result<String>;
}

/// Opaque text completion: prompt in, completion out. May fail transiently.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> anyhow::Result<Completion>;
}

impl<F> TextGenerator for F
where
    F: Fn(&str) -> anyhow::Result<Completion> + Send + Sync,
{
    fn generate(&self, prompt: &str) -> anyhow::Result<Completion> { self(prompt) }
}

/// Scores chunks against a query and returns the best `top_n`.
pub trait Ranker: Send + Sync {
    fn rank(&self, query: &str, chunks: &[Chunk], top_n: usize) -> Vec<RankedChunk>;
}
