//! orient-llm
//!
//! Text-generation collaborators behind `orient_core::traits::TextGenerator`:
//! an OpenAI-compatible chat-completions client and a deterministic fake.
//!
//! Respects `APP_USE_FAKE_GENERATION=1` to switch to the fake generator for
//! offline runs and tests.

pub mod fake;
pub mod openai;

use anyhow::Result;
use tracing::info;

use orient_core::config::GenerationConfig;
use orient_core::traits::TextGenerator;

pub use fake::FakeGenerator;
pub use openai::{GenerationError, OpenAiChatGenerator};

pub fn use_fake_generation() -> bool {
    std::env::var("APP_USE_FAKE_GENERATION")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub fn get_default_generator(config: &GenerationConfig) -> Result<Box<dyn TextGenerator>> {
    if use_fake_generation() {
        info!("using fake generator");
        return Ok(Box::new(FakeGenerator));
    }
    Ok(Box::new(OpenAiChatGenerator::new(config)?))
}
