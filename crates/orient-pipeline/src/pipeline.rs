use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use orient_chain::{Fields, StageError, StageSet};
use orient_core::cache::{ChunkStore, CorpusCache};
use orient_core::chunker::Chunker;
use orient_core::config::{FailurePolicy, Settings};
use orient_core::corpus::FileCorpusSource;
use orient_core::traits::{CorpusSource, Ranker, TextGenerator};
use orient_core::types::ContextBundle;
use orient_rank::TfIdfRanker;

use crate::state::{PipelineError, PipelineState, Trace};

/// Everything the orchestrator reads from configuration.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub primary_corpus: String,
    pub secondary_corpus: String,
    pub top_n: usize,
    pub pivot_language: String,
    pub answer_language: String,
    pub translate_answer: bool,
    pub answer_failure: FailurePolicy,
}

impl PipelineOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            primary_corpus: settings.corpora.primary.id.clone(),
            secondary_corpus: settings.corpora.secondary.id.clone(),
            top_n: settings.retrieval.top_n,
            pivot_language: settings.languages.pivot.clone(),
            answer_language: settings.languages.answer.clone(),
            translate_answer: settings.pipeline.translate_answer,
            answer_failure: settings.pipeline.answer_failure,
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self { Self::from_settings(&Settings::default()) }
}

/// The augmented question and its pivot-language translation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedQuestion {
    pub augmented: String,
    pub translated: String,
}

/// Ranked evidence from both corpora. Both bundles are empty when either
/// corpus produced no chunks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Retrieval {
    pub primary: ContextBundle,
    pub secondary: ContextBundle,
}

/// Final answer text. `degraded` is set when the text is a failure cause
/// kept under [`FailurePolicy::Degrade`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub text: String,
    pub degraded: bool,
}

/// Result of a full [`Pipeline::run`].
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub question: String,
    pub augmented_question: String,
    pub translated_question: String,
    pub retrieval: Retrieval,
    pub answer: Answer,
    pub trace: Trace,
}

pub struct Pipeline {
    generator: Box<dyn TextGenerator>,
    stages: StageSet,
    store: ChunkStore,
    ranker: Box<dyn Ranker>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        generator: Box<dyn TextGenerator>,
        stages: StageSet,
        store: ChunkStore,
        ranker: Box<dyn Ranker>,
        options: PipelineOptions,
    ) -> Self {
        Self { generator, stages, store, ranker, options }
    }

    /// Wire a pipeline from settings: file corpora, TF-IDF ranking, configured
    /// templates. `cache` is used only when `cache.enabled` is set.
    pub fn from_settings(
        settings: &Settings,
        generator: Box<dyn TextGenerator>,
        cache: Option<Arc<CorpusCache>>,
    ) -> anyhow::Result<Self> {
        let base = settings.corpora.base_dir();
        let source = FileCorpusSource::from_config(&settings.corpora, &base);
        Self::with_source(settings, generator, Arc::new(source), cache, &base)
    }

    pub fn with_source(
        settings: &Settings,
        generator: Box<dyn TextGenerator>,
        source: Arc<dyn CorpusSource>,
        cache: Option<Arc<CorpusCache>>,
        base: &Path,
    ) -> anyhow::Result<Self> {
        settings.validate()?;
        let mut store = ChunkStore::new(source, Chunker::new(settings.chunking)?);
        if let Some(cache) = cache.filter(|_| settings.cache.enabled) {
            store = store.with_cache(cache);
        }
        let stages = StageSet::from_config(&settings.prompts, base)?;
        let ranker = Box::new(TfIdfRanker::from_config(&settings.retrieval));
        Ok(Self::new(generator, stages, store, ranker, PipelineOptions::from_settings(settings)))
    }

    pub fn options(&self) -> &PipelineOptions { &self.options }

    pub fn store(&self) -> &ChunkStore { &self.store }

    /// Answer one question end to end.
    pub fn run(&self, question: &str, language: Option<&str>) -> Result<RunReport, PipelineError> {
        let mut trace = Trace::start();
        let prepared = self.prepare(&mut trace, Fields::new().with("question", question))?;
        let retrieval = self.retrieve(&mut trace, &prepared);
        let answer = self.respond(
            &mut trace,
            Fields::new()
                .with("context1", retrieval.primary.text.as_str())
                .with("context2", retrieval.secondary.text.as_str())
                .with("question", prepared.augmented.as_str()),
            language,
        )?;
        trace.advance(PipelineState::Done);
        Ok(RunReport {
            question: question.to_string(),
            augmented_question: prepared.augmented,
            translated_question: prepared.translated,
            retrieval,
            answer,
            trace,
        })
    }

    /// Augment the question, then translate it into the pivot language.
    /// Either failure ends the request.
    pub(crate) fn prepare(&self, trace: &mut Trace, question: Fields) -> Result<PreparedQuestion, PipelineError> {
        let augmented = self.augment(trace, question)?;
        let translated = self
            .stages
            .translate(self.generator.as_ref(), &augmented, &self.options.pivot_language)
            .map_err(|e| trace.fail(e))?;
        trace.advance(PipelineState::Translated);
        Ok(PreparedQuestion { augmented, translated })
    }

    pub(crate) fn augment(&self, trace: &mut Trace, question: Fields) -> Result<String, PipelineError> {
        let augmented = self
            .stages
            .augmentation
            .invoke(self.generator.as_ref(), &question)
            .map_err(|e| trace.fail(e))?;
        trace.advance(PipelineState::Augmented);
        Ok(augmented)
    }

    /// Rank the primary corpus against the augmented question and the
    /// secondary corpus against its translation.
    pub(crate) fn retrieve(&self, trace: &mut Trace, question: &PreparedQuestion) -> Retrieval {
        let primary = self.store.chunks(&self.options.primary_corpus);
        let secondary = self.store.chunks(&self.options.secondary_corpus);
        if primary.is_empty() || secondary.is_empty() {
            info!(
                primary = primary.len(),
                secondary = secondary.len(),
                "a corpus produced no chunks, continuing with empty context"
            );
            return Retrieval::default();
        }

        let ranked = self.ranker.rank(&question.augmented, &primary, self.options.top_n);
        trace.advance(PipelineState::Retrieved {
            corpus: self.options.primary_corpus.clone(),
            chunks: primary.len(),
            ranked: ranked.len(),
        });
        let primary_bundle = ContextBundle::from_ranked(ranked, &primary);

        let ranked = self.ranker.rank(&question.translated, &secondary, self.options.top_n);
        trace.advance(PipelineState::Retrieved {
            corpus: self.options.secondary_corpus.clone(),
            chunks: secondary.len(),
            ranked: ranked.len(),
        });
        let secondary_bundle = ContextBundle::from_ranked(ranked, &secondary);

        Retrieval { primary: primary_bundle, secondary: secondary_bundle }
    }

    /// Answer, then translate the answer when enabled. Generation failures
    /// here follow the configured [`FailurePolicy`]; contract errors always
    /// fail the request.
    pub(crate) fn respond(&self, trace: &mut Trace, fields: Fields, language: Option<&str>) -> Result<Answer, PipelineError> {
        let text = match self.stages.answer.invoke(self.generator.as_ref(), &fields) {
            Ok(text) => text,
            Err(e) => return self.degrade_or_fail(trace, e, PipelineState::Answered { degraded: true }),
        };
        trace.advance(PipelineState::Answered { degraded: false });

        if !self.options.translate_answer {
            return Ok(Answer { text, degraded: false });
        }
        let language = language.filter(|l| !l.trim().is_empty()).unwrap_or(&self.options.answer_language);
        match self.stages.translate(self.generator.as_ref(), &text, language) {
            Ok(translated) => {
                trace.advance(PipelineState::TranslatedFinal { language: language.to_string(), degraded: false });
                Ok(Answer { text: translated, degraded: false })
            }
            Err(e) => {
                let degraded = PipelineState::TranslatedFinal { language: language.to_string(), degraded: true };
                self.degrade_or_fail(trace, e, degraded)
            }
        }
    }

    /// `degraded` is the state recorded for the failing stage when the
    /// failure is kept as the answer.
    fn degrade_or_fail(&self, trace: &mut Trace, error: StageError, degraded: PipelineState) -> Result<Answer, PipelineError> {
        if error.is_generation_failure() && self.options.answer_failure == FailurePolicy::Degrade {
            warn!(stage = %error.stage(), error = %error, "answer degraded to failure cause");
            trace.advance(degraded);
            return Ok(Answer { text: error.to_string(), degraded: true });
        }
        Err(trace.fail(error))
    }
}
