//! orient-pipeline
//!
//! Orchestrates one career-guidance request: augment the question, translate
//! it, rank both corpora, answer, translate the answer. Also exposes the two
//! presentation operations (`generate_chunks`, `answer_question`).

pub mod api;
pub mod pipeline;
pub mod state;

pub use api::{AnswerPayload, AnswerRequest, ApiResponse, ChunksPayload, GenerateChunksRequest};
pub use pipeline::{Answer, Pipeline, PipelineOptions, PreparedQuestion, Retrieval, RunReport};
pub use state::{PipelineError, PipelineState, Trace};
