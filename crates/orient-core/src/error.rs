use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing required key '{0}' in input fields")]
    MissingField(String),

    #[error("Corpus '{corpus}' unavailable: {reason}")]
    CorpusUnavailable { corpus: String, reason: String },

    #[error("Generation failed: {0}")]
    GenerationFailure(String),
}

impl Error {
    pub fn corpus_unavailable(corpus: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::CorpusUnavailable { corpus: corpus.into(), reason: reason.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
