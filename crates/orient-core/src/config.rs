//! Configuration loader, typed settings and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (`__` separates nested keys, e.g.
//! `APP_RETRIEVAL__TOP_N=10`). Provides helpers to expand `~` and `${VAR}` and
//! to resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::chunker::ChunkingConfig;
use crate::error::Error;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?;
        Ok(config)
    }

    /// Defaults overlaid with an inline TOML document; no files, no env.
    pub fn from_toml_str(toml: &str) -> anyhow::Result<Self> {
        let figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::string(toml));
        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// The full typed configuration, validated.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub corpora: CorporaConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub generation: GenerationConfig,
    pub languages: LanguageConfig,
    pub prompts: PromptConfig,
    pub pipeline: PipelineConfig,
    pub cache: CacheConfig,
}

impl Settings {
    pub fn validate(&self) -> Result<(), Error> {
        self.chunking.validate()?;
        if self.retrieval.top_n == 0 {
            return Err(Error::InvalidConfig("retrieval.top_n must be greater than 0".to_string()));
        }
        if self.corpora.primary.id == self.corpora.secondary.id {
            return Err(Error::InvalidConfig(format!(
                "corpora.primary and corpora.secondary share the id '{}'",
                self.corpora.primary.id
            )));
        }
        if self.generation.model.trim().is_empty() {
            return Err(Error::InvalidConfig("generation.model must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub id: String,
    pub path: String,
}

/// The two corpora: `primary` is searched with the augmented question in the
/// audience's language, `secondary` with its pivot-language translation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorporaConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<String>,
    pub primary: CorpusConfig,
    pub secondary: CorpusConfig,
}

impl Default for CorporaConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            primary: CorpusConfig { id: "fiches-metiers".to_string(), path: "~/coding/fiches-metiers.json".to_string() },
            secondary: CorpusConfig { id: "jobs".to_string(), path: "~/coding/jobs.json".to_string() },
        }
    }
}

impl CorporaConfig {
    /// Directory relative corpus paths are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        match &self.base_dir {
            Some(dir) => expand_path(dir),
            None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_n: usize,
    pub preview_chars: usize,
    pub stop_words: Vec<String>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_n: 15, preview_chars: 100, stop_words: Vec::new() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub base_url: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub api_key_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: None,
            max_tokens: None,
            timeout_secs: 120,
            max_retries: 2,
            retry_backoff_ms: 1000,
        }
    }
}

impl GenerationConfig {
    /// Explicit `api_key`, else the variable named by `api_key_env`.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| env::var(&self.api_key_env).ok().filter(|k| !k.is_empty()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Language of the secondary corpus; the question is translated into it.
    pub pivot: String,
    /// Default language of the final answer.
    pub answer: String,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self { pivot: "English".to_string(), answer: "French".to_string() }
    }
}

/// Optional template files overriding the built-in prompts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub augmentation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

/// What the orchestrator does when answer generation (or the final
/// translation) fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// The failure cause becomes the answer text.
    #[default]
    Degrade,
    /// The request fails with an error response.
    Propagate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub translate_answer: bool,
    pub answer_failure: FailurePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { translate_answer: true, answer_failure: FailurePolicy::Degrade }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self { Self { enabled: true } }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let settings = Config::from_toml_str("").unwrap().settings().unwrap();
        assert_eq!(settings.chunking, ChunkingConfig { max_size: 1000, overlap: 200 });
        assert_eq!(settings.retrieval.top_n, 15);
        assert_eq!(settings.retrieval.preview_chars, 100);
        assert_eq!(settings.languages.pivot, "English");
        assert_eq!(settings.languages.answer, "French");
        assert_eq!(settings.pipeline.answer_failure, FailurePolicy::Degrade);
        assert!(settings.cache.enabled);
    }

    #[test]
    fn toml_overrides_nested_keys() {
        let config = Config::from_toml_str(
            r#"
            [chunking]
            max_size = 500
            overlap = 50

            [pipeline]
            answer_failure = "propagate"

            [corpora.secondary]
            id = "offres"
            path = "data/offres.json"
            "#,
        )
        .unwrap();
        let settings = config.settings().unwrap();
        assert_eq!(settings.chunking.max_size, 500);
        assert_eq!(settings.pipeline.answer_failure, FailurePolicy::Propagate);
        assert_eq!(settings.corpora.secondary.id, "offres");
        assert_eq!(settings.corpora.primary.id, "fiches-metiers");
        let top_n: usize = config.get("retrieval.top_n").unwrap();
        assert_eq!(top_n, 15);
    }

    #[test]
    fn env_file_and_app_vars_layer_over_base_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                "[chunking]\nmax_size = 500\noverlap = 50\n\n[languages]\nanswer = \"Spanish\"\n",
            )?;
            jail.create_file("config.test.toml", "[chunking]\noverlap = 100\n")?;
            jail.set_env("APP_RETRIEVAL__TOP_N", "7");
            jail.set_env("APP_PIPELINE__ANSWER_FAILURE", "propagate");

            let settings = Config::load_for_env("test")
                .and_then(|c| c.settings())
                .map_err(|e| figment::Error::from(e.to_string()))?;
            assert_eq!(settings.chunking, ChunkingConfig { max_size: 500, overlap: 100 });
            assert_eq!(settings.languages.answer, "Spanish");
            assert_eq!(settings.retrieval.top_n, 7);
            assert_eq!(settings.pipeline.answer_failure, FailurePolicy::Propagate);

            let dev = Config::load_for_env("dev")
                .and_then(|c| c.settings())
                .map_err(|e| figment::Error::from(e.to_string()))?;
            assert_eq!(dev.chunking.overlap, 50);
            assert_eq!(dev.retrieval.top_n, 7);
            Ok(())
        });
    }

    #[test]
    fn invalid_chunking_is_rejected() {
        let config = Config::from_toml_str("[chunking]\nmax_size = 100\noverlap = 100\n").unwrap();
        assert!(config.settings().is_err());
    }

    #[test]
    fn duplicate_corpus_ids_are_rejected() {
        let mut settings = Settings::default();
        settings.corpora.secondary.id = settings.corpora.primary.id.clone();
        assert!(matches!(settings.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn explicit_api_key_wins() {
        let generation = GenerationConfig {
            api_key: Some("sk-test".to_string()),
            api_key_env: "ORIENT_TEST_UNSET_KEY_VAR".to_string(),
            ..GenerationConfig::default()
        };
        assert_eq!(generation.resolve_api_key().as_deref(), Some("sk-test"));
        let missing = GenerationConfig { api_key_env: "ORIENT_TEST_UNSET_KEY_VAR".to_string(), ..GenerationConfig::default() };
        assert_eq!(missing.resolve_api_key(), None);
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let base = Path::new("/srv/orient");
        assert_eq!(resolve_with_base(base, "data/jobs.json"), PathBuf::from("/srv/orient/data/jobs.json"));
        assert_eq!(resolve_with_base(base, "/abs/jobs.json"), PathBuf::from("/abs/jobs.json"));
    }
}
