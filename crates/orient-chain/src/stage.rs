use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use orient_core::error::Error as CoreError;
use orient_core::traits::TextGenerator;

use crate::template::PromptTemplate;

/// The closed set of chain stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    /// Rewrites a short or ambiguous question into an elaborated one.
    Augmentation,
    /// Translates `answer` into `language`.
    Translation,
    /// Answers `question` from two context bundles.
    Answer,
}

impl StageKind {
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Augmentation => &["question"],
            Self::Translation => &["answer", "language"],
            Self::Answer => &["context1", "context2", "question"],
        }
    }

    pub fn default_template(self) -> &'static str {
        match self {
            Self::Augmentation => include_str!("../templates/augmentation.hbs"),
            Self::Translation => include_str!("../templates/translation.hbs"),
            Self::Answer => include_str!("../templates/answer.hbs"),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Augmentation => "augmentation",
            Self::Translation => "translation",
            Self::Answer => "answer",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

#[derive(Debug, Error)]
pub enum StageError {
    #[error("Missing required key '{field}' in {stage} input")]
    MissingField { stage: StageKind, field: String },

    #[error("{stage} template: {message}")]
    Template { stage: StageKind, message: String },

    #[error("{stage} generation failed: {cause}")]
    Generation { stage: StageKind, cause: String },

    #[error("{stage} generation returned no content")]
    EmptyResponse { stage: StageKind },
}

impl StageError {
    pub fn stage(&self) -> StageKind {
        match self {
            Self::MissingField { stage, .. }
            | Self::Template { stage, .. }
            | Self::Generation { stage, .. }
            | Self::EmptyResponse { stage } => *stage,
        }
    }

    pub fn is_generation_failure(&self) -> bool {
        matches!(self, Self::Generation { .. } | Self::EmptyResponse { .. })
    }
}

impl From<StageError> for CoreError {
    fn from(e: StageError) -> Self {
        match e {
            StageError::MissingField { field, .. } => CoreError::MissingField(field),
            StageError::Template { .. } => CoreError::InvalidConfig(e.to_string()),
            StageError::Generation { .. } | StageError::EmptyResponse { .. } => CoreError::GenerationFailure(e.to_string()),
        }
    }
}

/// Named input values for a stage invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Fields(BTreeMap<String, String>);

impl Fields {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Insert `value` only when present; an absent value stays a missing field.
    pub fn with_opt(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.with(name, v),
            None => self,
        }
    }

    pub fn contains(&self, name: &str) -> bool { self.0.contains_key(name) }
}

/// One templated generation call: validate, render, generate, extract.
#[derive(Debug)]
pub struct ChainStage {
    kind: StageKind,
    template: PromptTemplate,
}

impl ChainStage {
    /// A stage using the built-in template for `kind`.
    pub fn new(kind: StageKind) -> Result<Self, StageError> { Self::with_template(kind, kind.default_template()) }

    pub fn with_template(kind: StageKind, source: impl Into<String>) -> Result<Self, StageError> {
        let template = PromptTemplate::parse(source).map_err(|message| StageError::Template { stage: kind, message })?;
        Ok(Self { kind, template })
    }

    pub fn kind(&self) -> StageKind { self.kind }

    /// First required field absent from `fields`, if any.
    pub fn validate(&self, fields: &Fields) -> Result<(), StageError> {
        match self.kind.required_fields().iter().find(|name| !fields.contains(name)) {
            Some(field) => Err(StageError::MissingField { stage: self.kind, field: (*field).to_string() }),
            None => Ok(()),
        }
    }

    pub fn render(&self, fields: &Fields) -> Result<String, StageError> {
        self.validate(fields)?;
        self.template.render(fields).map_err(|message| StageError::Template { stage: self.kind, message })
    }

    /// Run the stage. No generation call is made unless every required field
    /// is present and the template renders.
    pub fn invoke(&self, generator: &dyn TextGenerator, fields: &Fields) -> Result<String, StageError> {
        let prompt = self.render(fields)?;
        debug!(stage = %self.kind, prompt_chars = prompt.chars().count(), "invoking generation");
        let completion = generator
            .generate(&prompt)
            .map_err(|e| StageError::Generation { stage: self.kind, cause: format!("{e:#}") })?;
        match completion.text {
            Some(text) => {
                debug!(stage = %self.kind, response = %text, "generation response");
                Ok(text)
            }
            None => Err(StageError::EmptyResponse { stage: self.kind }),
        }
    }
}
