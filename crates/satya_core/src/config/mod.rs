use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::normalize::dates::FirstSeenMode;

pub const ENV_CONFIG_PATH: &str = "SATYATRACE_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "satyatrace.yaml";

pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_SERPAPI_KEY: &str = "SERPAPI_KEY";
pub const ENV_OLLAMA_BASE_URL: &str = "OLLAMA_BASE_URL";
pub const ENV_INDEX_DIR: &str = "SATYATRACE_INDEX_DIR";

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    #[default]
    Gemini,
    Ollama,
}

/// Reasoning service settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    /// Overrides the provider's default model.
    pub model: Option<String>,
    pub gemini_endpoint: String,
    pub timeout_secs: u64,
    /// Credentials never come from the config file.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            model: None,
            gemini_endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 30,
            api_key: None,
        }
    }
}

impl LlmConfig {
    pub fn model_name(&self) -> &str {
        match (&self.model, self.provider) {
            (Some(m), _) => m.as_str(),
            (None, LlmProvider::Gemini) => "gemini-pro",
            (None, LlmProvider::Ollama) => "llama3.1",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingsConfig {
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            model: "all-minilm".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Web-search provider settings used by the provenance tracer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub engine: String,
    pub timeout_secs: u64,
    /// Provider query-length limit; the claim is cut to this many chars.
    pub query_prefix_chars: usize,
    pub num_results: u32,
    /// How many leading results are sampled for hostname spread.
    pub host_sample: usize,
    pub first_seen_mode: FirstSeenMode,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://serpapi.com/search".to_string(),
            engine: "google".to_string(),
            timeout_secs: 10,
            query_prefix_chars: 100,
            num_results: 10,
            host_sample: 5,
            first_seen_mode: FirstSeenMode::Lexicographic,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub index_dir: PathBuf,
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            index_dir: PathBuf::from("knowledge_base"),
            top_k: 3,
        }
    }
}

/// Process configuration: YAML file (optional) then environment overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ollama_base_url: String,
    pub llm: LlmConfig,
    pub embeddings: EmbeddingsConfig,
    pub search: SearchConfig,
    pub retrieval: RetrievalConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama_base_url: "http://127.0.0.1:11434".to_string(),
            llm: LlmConfig::default(),
            embeddings: EmbeddingsConfig::default(),
            search: SearchConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the config file and the process environment.
    pub fn from_env() -> Self {
        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load_config_file(Path::new(&config_path)).unwrap_or_default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply overrides from a key lookup (the environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        self.llm.api_key = non_empty(ENV_GEMINI_API_KEY);
        self.search.api_key = non_empty(ENV_SERPAPI_KEY);
        if let Some(url) = non_empty(ENV_OLLAMA_BASE_URL) {
            self.ollama_base_url = url;
        }
        if let Some(dir) = non_empty(ENV_INDEX_DIR) {
            self.retrieval.index_dir = PathBuf::from(dir);
        }
    }

    /// Load configuration from a YAML file. Missing, empty or invalid files yield `None`
    /// or defaults; they never abort startup.
    pub fn load_config_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(Config::default());
                }

                match serde_yaml::from_str(contents) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded configuration from file");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }
}
