//! Prompt templates rendered with Handlebars.
//!
//! Rendering is strict (a referenced but absent variable is an error) and
//! performs no HTML escaping: prompts are plain text.

use handlebars::Handlebars;
use serde::Serialize;

const TEMPLATE_NAME: &str = "prompt";

pub struct PromptTemplate {
    registry: Handlebars<'static>,
    source: String,
}

impl PromptTemplate {
    pub fn parse(source: impl Into<String>) -> Result<Self, String> {
        let source = source.into();
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        registry
            .register_template_string(TEMPLATE_NAME, &source)
            .map_err(|e| format!("invalid template: {e}"))?;
        Ok(Self { registry, source })
    }

    pub fn render<T: Serialize>(&self, data: &T) -> Result<String, String> {
        self.registry.render(TEMPLATE_NAME, data).map_err(|e| format!("render failed: {e}"))
    }
}

impl std::fmt::Debug for PromptTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptTemplate").field("chars", &self.source.chars().count()).finish()
    }
}
