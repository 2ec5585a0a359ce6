//! The two presentation-facing operations and their JSON shapes.
//!
//! Field names on the wire are fixed (`chunks_fiches_metiers`, `top_chunks`,
//! ...) so existing front ends keep working; failures serialize as
//! `{"error": "..."}`.

use serde::{Deserialize, Serialize};
use tracing::info;

use orient_chain::Fields;
use orient_core::types::{sort_by_relevance, RankedChunk};

use crate::pipeline::Pipeline;
use crate::state::{PipelineError, PipelineState, Trace};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateChunksRequest {
    #[serde(default)]
    pub question: Option<String>,
}

/// Retrieval for both corpora plus the intermediate questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunksPayload {
    #[serde(rename = "chunks_fiches_metiers")]
    pub primary_context: String,
    #[serde(rename = "details_fiches_metiers")]
    pub primary_details: Vec<RankedChunk>,
    #[serde(rename = "chunks_jobs_json")]
    pub secondary_context: String,
    #[serde(rename = "details_jobs_json")]
    pub secondary_details: Vec<RankedChunk>,
    pub augmented_question: String,
    pub translated_question: String,
}

/// Input of [`Pipeline::answer_question`]. `question` is taken as the
/// effective question unless `augment` is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub context1: Option<String>,
    #[serde(default)]
    pub context2: Option<String>,
    #[serde(rename = "chunks", default)]
    pub chunk_details: Vec<RankedChunk>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub augment: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerPayload {
    pub answer: String,
    pub top_chunks: Vec<RankedChunk>,
}

/// `T` on success, `{ "error": message }` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Ok(T),
    Error { error: String },
}

impl<T> ApiResponse<T> {
    pub fn is_error(&self) -> bool { matches!(self, Self::Error { .. }) }
}

impl<T> From<Result<T, PipelineError>> for ApiResponse<T> {
    fn from(result: Result<T, PipelineError>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(e) => Self::Error { error: e.to_string() },
        }
    }
}

impl Pipeline {
    /// Augment, translate and rank both corpora without answering.
    pub fn generate_chunks(&self, question: Option<&str>) -> Result<ChunksPayload, PipelineError> {
        let mut trace = Trace::start();
        let prepared = self.prepare(&mut trace, Fields::new().with_opt("question", question))?;
        let retrieval = self.retrieve(&mut trace, &prepared);
        trace.advance(PipelineState::Done);
        info!(
            primary = retrieval.primary.ranked.len(),
            secondary = retrieval.secondary.ranked.len(),
            "chunks generated"
        );
        Ok(ChunksPayload {
            primary_context: retrieval.primary.text,
            primary_details: retrieval.primary.ranked,
            secondary_context: retrieval.secondary.text,
            secondary_details: retrieval.secondary.ranked,
            augmented_question: prepared.augmented,
            translated_question: prepared.translated,
        })
    }

    /// Answer from caller-supplied contexts. `top_chunks` is the caller's
    /// chunk list re-sorted by relevance and cut to `top_n`.
    pub fn answer_question(&self, request: &AnswerRequest) -> Result<AnswerPayload, PipelineError> {
        let mut trace = Trace::start();
        let question = match (request.augment, request.question.as_deref()) {
            (true, question) => Some(self.augment(&mut trace, Fields::new().with_opt("question", question))?),
            (false, question) => question.map(str::to_string),
        };
        let fields = Fields::new()
            .with_opt("context1", request.context1.as_deref())
            .with_opt("context2", request.context2.as_deref())
            .with_opt("question", question);
        let answer = self.respond(&mut trace, fields, request.language.as_deref())?;
        trace.advance(PipelineState::Done);

        let mut top_chunks = request.chunk_details.clone();
        sort_by_relevance(&mut top_chunks);
        top_chunks.truncate(self.options().top_n);
        Ok(AnswerPayload { answer: answer.text, top_chunks })
    }
}
