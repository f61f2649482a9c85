//! Configuration management.
//!
//! Every tuning constant of the pipeline (retry backoff, similarity
//! threshold, backend split) lives here with its default, so call sites
//! never carry literals.

mod file_config;

pub use file_config::{default_config_path, find_config_file, ConfigFileError};

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::graph::GraphSettings;
use crate::sources::AggregatorSettings;
use crate::utils::RetryPolicy;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeys,

    /// Search backend settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Retry settings for enrichment lookups
    #[serde(default)]
    pub retry: RetryConfig,

    /// Similarity graph settings
    #[serde(default)]
    pub graph: GraphConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeys {
    /// Semantic Scholar API key (optional, for higher rate limits)
    #[serde(default)]
    pub semantic_scholar: Option<String>,
}

impl Default for ApiKeys {
    fn default() -> Self {
        Self {
            semantic_scholar: std::env::var("SEMANTIC_SCHOLAR_API_KEY").ok(),
        }
    }
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Per-request timeout for search backends
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,

    /// Share of the requested papers asked from arXiv
    #[serde(default = "default_primary_share")]
    pub primary_share: f64,

    /// Minimum number of papers asked from arXiv
    #[serde(default = "default_primary_min")]
    pub primary_min: usize,

    /// Smallest accepted `max_results`
    #[serde(default = "default_min_results")]
    pub min_results: usize,

    /// Largest accepted `max_results`
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// `max_results` used when none is given
    #[serde(default = "default_results")]
    pub default_results: usize,

    /// arXiv API endpoint
    #[serde(default = "default_arxiv_url")]
    pub arxiv_url: String,

    /// Semantic Scholar Graph API root
    #[serde(default = "default_semantic_url")]
    pub semantic_scholar_url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_search_timeout(),
            primary_share: default_primary_share(),
            primary_min: default_primary_min(),
            min_results: default_min_results(),
            max_results: default_max_results(),
            default_results: default_results(),
            arxiv_url: default_arxiv_url(),
            semantic_scholar_url: default_semantic_url(),
        }
    }
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn aggregator_settings(&self) -> AggregatorSettings {
        AggregatorSettings {
            primary_share: self.primary_share,
            primary_min: self.primary_min,
        }
    }
}

fn default_search_timeout() -> u64 {
    20
}

fn default_primary_share() -> f64 {
    0.6
}

fn default_primary_min() -> usize {
    4
}

fn default_min_results() -> usize {
    4
}

fn default_max_results() -> usize {
    20
}

fn default_results() -> usize {
    10
}

fn default_arxiv_url() -> String {
    crate::sources::ARXIV_API_URL.to_string()
}

fn default_semantic_url() -> String {
    crate::sources::SEMANTIC_API_BASE.to_string()
}

/// Retry configuration for metadata lookups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per request, including the first
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Linear backoff unit; retry k waits `k * backoff_step_ms`
    #[serde(default = "default_backoff_step")]
    pub backoff_step_ms: u64,

    /// Per-attempt timeout
    #[serde(default = "default_retry_timeout")]
    pub timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            backoff_step_ms: default_backoff_step(),
            timeout_secs: default_retry_timeout(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.attempts,
            backoff_step: Duration::from_millis(self.backoff_step_ms),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

fn default_attempts() -> u32 {
    3
}

fn default_backoff_step() -> u64 {
    600
}

fn default_retry_timeout() -> u64 {
    14
}

/// Similarity graph configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Minimum cosine similarity for an edge
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f64,

    /// Weight of the chain edges that join separate components
    #[serde(default = "default_fallback_weight")]
    pub fallback_edge_weight: f64,

    /// Vocabulary cap of the TF-IDF vectorizer
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Seed of the layout's random initial positions
    #[serde(default = "default_layout_seed")]
    pub layout_seed: u64,

    /// Number of force-directed iterations
    #[serde(default = "default_layout_iterations")]
    pub layout_iterations: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_threshold(),
            fallback_edge_weight: default_fallback_weight(),
            max_features: default_max_features(),
            layout_seed: default_layout_seed(),
            layout_iterations: default_layout_iterations(),
        }
    }
}

impl GraphConfig {
    pub fn settings(&self) -> GraphSettings {
        GraphSettings {
            similarity_threshold: self.similarity_threshold,
            fallback_edge_weight: self.fallback_edge_weight,
            max_features: self.max_features,
            layout_seed: self.layout_seed,
            layout_iterations: self.layout_iterations,
        }
    }
}

fn default_threshold() -> f64 {
    0.12
}

fn default_fallback_weight() -> f64 {
    0.05
}

fn default_max_features() -> usize {
    1200
}

fn default_layout_seed() -> u64 {
    42
}

fn default_layout_iterations() -> usize {
    50
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// "plain" or "json"
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.as_deref() == Some("json")
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigFileError> {
        toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))
    }
}

/// Load configuration from a file, with `SCHOLAR_SYNC__SECTION__KEY`
/// environment variables taking precedence
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix("SCHOLAR_SYNC")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize()
}

/// Get the default configuration (from env vars or defaults)
pub fn get_config() -> Config {
    Config::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.retry.attempts, 3);
        assert_eq!(config.retry.policy().backoff_step, Duration::from_millis(600));
        assert_eq!(config.graph.similarity_threshold, 0.12);
        assert_eq!(config.graph.settings().max_features, 1200);
        assert_eq!(config.search.aggregator_settings().primary_share, 0.6);
        assert_eq!(config.search.default_results, 10);
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scholar-sync.toml");
        std::fs::write(
            &path,
            r#"
[retry]
attempts = 5

[graph]
similarity_threshold = 0.2

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.retry.attempts, 5);
        assert_eq!(config.retry.backoff_step_ms, 600);
        assert_eq!(config.graph.similarity_threshold, 0.2);
        assert_eq!(config.graph.layout_seed, 42);
        assert_eq!(config.search.max_results, 20);
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "retry = = 3").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_to_toml_round_trip() {
        let rendered = Config::default().to_toml().unwrap();
        assert!(rendered.contains("[graph]"));
        assert!(rendered.contains("similarity_threshold = 0.12"));

        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.retry.timeout_secs, 14);
        assert_eq!(parsed.search.primary_min, 4);
    }
}
