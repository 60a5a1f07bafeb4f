//! Configuration: `~/.mcai/config.toml` with `MCAI_*` environment overrides.
//!
//! Every section falls back to defaults, so an absent file or a partial one is
//! valid.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct McaiConfig {
    pub server: ServerConfig,
    pub router: RouterConfig,
    pub cache: CacheConfig,
    pub dataset: DatasetConfig,
    pub llm: LlmConfig,
    pub knowledge: KnowledgeConfig,
    pub emotion: EmotionConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub max_message_chars: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RouterConfig {
    pub history_turns: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// `"sqlite"`, `"memory"`, or `"none"`.
    pub backend: String,
    pub path: String,
    pub document_ttl_secs: u64,
    pub live_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatasetConfig {
    pub dir: String,
    pub min_shared_words: usize,
    pub long_word_len: usize,
    pub max_results: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    pub api_key_env: String,
    pub request_timeout_secs: u64,
    pub retry_backoff_ms: u64,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub builtin_enabled: bool,
    pub web_enabled: bool,
    pub encyclopedia_enabled: bool,
    pub web_endpoint: String,
    pub encyclopedia_endpoint: String,
    pub builtin_timeout_ms: u64,
    pub llm_timeout_ms: u64,
    pub dataset_timeout_ms: u64,
    pub web_timeout_ms: u64,
    pub encyclopedia_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmotionConfig {
    /// `"neuroscience"` or `"metaphysical"`.
    pub catalog: String,
}

impl Default for McaiConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            router: RouterConfig::default(),
            cache: CacheConfig::default(),
            dataset: DatasetConfig::default(),
            llm: LlmConfig::default(),
            knowledge: KnowledgeConfig::default(),
            emotion: EmotionConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            log_level: "info".into(),
            max_message_chars: 4000,
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self { history_turns: 5 }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        let path = default_mcai_dir()
            .join("cache.db")
            .to_string_lossy()
            .into_owned();
        Self {
            backend: "sqlite".into(),
            path,
            document_ttl_secs: 24 * 60 * 60,
            live_ttl_secs: 60 * 60,
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        let dir = default_mcai_dir()
            .join("datasets")
            .to_string_lossy()
            .into_owned();
        Self {
            dir,
            min_shared_words: 2,
            long_word_len: 12,
            max_results: 5,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            request_timeout_secs: 12,
            retry_backoff_ms: 500,
            max_tokens: 600,
        }
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            builtin_enabled: true,
            web_enabled: true,
            encyclopedia_enabled: true,
            web_endpoint: "https://api.duckduckgo.com/".into(),
            encyclopedia_endpoint: "https://en.wikipedia.org/api/rest_v1".into(),
            builtin_timeout_ms: 500,
            llm_timeout_ms: 30_000,
            dataset_timeout_ms: 2_000,
            web_timeout_ms: 8_000,
            encyclopedia_timeout_ms: 8_000,
        }
    }
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            catalog: "neuroscience".into(),
        }
    }
}

/// Returns `~/.mcai/`
pub fn default_mcai_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mcai")
}

/// Returns the default config file path: `~/.mcai/config.toml`
pub fn default_config_path() -> PathBuf {
    default_mcai_dir().join("config.toml")
}

impl McaiConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            McaiConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (MCAI_CACHE_PATH, MCAI_CACHE_BACKEND,
    /// MCAI_DATASET_DIR, MCAI_LOG_LEVEL, MCAI_PORT).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MCAI_CACHE_PATH") {
            self.cache.path = val;
        }
        if let Ok(val) = std::env::var("MCAI_CACHE_BACKEND") {
            self.cache.backend = val;
        }
        if let Ok(val) = std::env::var("MCAI_DATASET_DIR") {
            self.dataset.dir = val;
        }
        if let Ok(val) = std::env::var("MCAI_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("MCAI_PORT") {
            match val.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %val, "ignoring invalid MCAI_PORT"),
            }
        }
    }

    /// Resolve the cache database path, expanding `~` if needed.
    pub fn resolved_cache_path(&self) -> PathBuf {
        expand_tilde(&self.cache.path)
    }

    /// Resolve the dataset directory, expanding `~` if needed.
    pub fn resolved_dataset_dir(&self) -> PathBuf {
        expand_tilde(&self.dataset.dir)
    }

    /// The LLM API key, read from the env var named by `llm.api_key_env`.
    pub fn llm_api_key(&self) -> Option<String> {
        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = McaiConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.router.history_turns, 5);
        assert_eq!(config.cache.backend, "sqlite");
        assert_eq!(config.cache.document_ttl_secs, 86_400);
        assert_eq!(config.cache.live_ttl_secs, 3_600);
        assert_eq!(config.dataset.min_shared_words, 2);
        assert_eq!(config.dataset.long_word_len, 12);
        assert!(config.cache.path.ends_with("cache.db"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"
port = 8080

[cache]
backend = "memory"
live_ttl_secs = 600

[dataset]
dir = "/srv/mcai/datasets"
min_shared_words = 3

[emotion]
catalog = "metaphysical"
"#;
        let config: McaiConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cache.backend, "memory");
        assert_eq!(config.cache.live_ttl_secs, 600);
        assert_eq!(config.dataset.dir, "/srv/mcai/datasets");
        assert_eq!(config.dataset.min_shared_words, 3);
        assert_eq!(config.emotion.catalog, "metaphysical");
        // defaults still apply for unset fields
        assert_eq!(config.cache.document_ttl_secs, 86_400);
        assert_eq!(config.dataset.long_word_len, 12);
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = McaiConfig::default();
        std::env::set_var("MCAI_CACHE_PATH", "/tmp/override.db");
        std::env::set_var("MCAI_DATASET_DIR", "/tmp/datasets");
        std::env::set_var("MCAI_LOG_LEVEL", "trace");
        std::env::set_var("MCAI_PORT", "9090");

        config.apply_env_overrides();

        assert_eq!(config.cache.path, "/tmp/override.db");
        assert_eq!(config.dataset.dir, "/tmp/datasets");
        assert_eq!(config.server.log_level, "trace");
        assert_eq!(config.server.port, 9090);

        // Clean up
        std::env::remove_var("MCAI_CACHE_PATH");
        std::env::remove_var("MCAI_DATASET_DIR");
        std::env::remove_var("MCAI_LOG_LEVEL");
        std::env::remove_var("MCAI_PORT");
    }

    #[test]
    fn expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/var/lib/mcai"), PathBuf::from("/var/lib/mcai"));
    }
}
