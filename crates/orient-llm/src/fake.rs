use orient_core::traits::TextGenerator;
use orient_core::types::Completion;

/// Echoes the prompt back. Deterministic, never fails, makes no network call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeGenerator;

impl TextGenerator for FakeGenerator {
    fn generate(&self, prompt: &str) -> anyhow::Result<Completion> { Ok(Completion::text(prompt.trim())) }
}
