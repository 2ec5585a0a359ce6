//! orient-chain
//!
//! Chain stages: each wraps one prompt template and one call to a
//! `TextGenerator`. The three specializations differ only in their required
//! fields and template; they are composed by the pipeline, never nested.

pub mod stage;
pub mod template;

use std::fs;
use std::path::Path;

use anyhow::Context;

use orient_core::config::{resolve_with_base, PromptConfig};
use orient_core::traits::TextGenerator;

pub use stage::{ChainStage, Fields, StageError, StageKind};

/// The three stages of the pipeline, built once and shared by reference.
#[derive(Debug)]
pub struct StageSet {
    pub augmentation: ChainStage,
    pub translation: ChainStage,
    pub answer: ChainStage,
}

impl StageSet {
    /// Built-in templates.
    pub fn builtin() -> Result<Self, StageError> {
        Ok(Self {
            augmentation: ChainStage::new(StageKind::Augmentation)?,
            translation: ChainStage::new(StageKind::Translation)?,
            answer: ChainStage::new(StageKind::Answer)?,
        })
    }

    /// Built-in templates, overridden by any template file named in `prompts`.
    pub fn from_config(prompts: &PromptConfig, base: &Path) -> anyhow::Result<Self> {
        let load = |kind: StageKind, path: &Option<String>| -> anyhow::Result<ChainStage> {
            match path {
                Some(p) => {
                    let path = resolve_with_base(base, p);
                    let source = fs::read_to_string(&path)
                        .with_context(|| format!("reading {kind} template {}", path.display()))?;
                    Ok(ChainStage::with_template(kind, source)?)
                }
                None => Ok(ChainStage::new(kind)?),
            }
        };
        Ok(Self {
            augmentation: load(StageKind::Augmentation, &prompts.augmentation)?,
            translation: load(StageKind::Translation, &prompts.translation)?,
            answer: load(StageKind::Answer, &prompts.answer)?,
        })
    }

    pub fn augment(&self, generator: &dyn TextGenerator, question: &str) -> Result<String, StageError> {
        self.augmentation.invoke(generator, &Fields::new().with("question", question))
    }

    pub fn translate(&self, generator: &dyn TextGenerator, text: &str, language: &str) -> Result<String, StageError> {
        self.translation.invoke(generator, &Fields::new().with("answer", text).with("language", language))
    }

    pub fn answer(&self, generator: &dyn TextGenerator, context1: &str, context2: &str, question: &str) -> Result<String, StageError> {
        let fields = Fields::new().with("context1", context1).with("context2", context2).with("question", question);
        self.answer.invoke(generator, &fields)
    }
}
