use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration for a matching run.
///
/// Every section has defaults matching a stock local Ollama setup, so an
/// absent or partial config file still yields a usable configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Configuration for the scoring LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Configuration for embedding generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    /// Maximum number of embedding calls in flight during store sync.
    pub concurrency: usize,
}

/// Configuration for similarity retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of top-ranked postings handed to the scoring stage.
    pub top_n: usize,
}

/// Configuration for the LLM scoring stage.
///
/// The retry count and per-posting failure isolation are contract; the
/// delay between attempts is operational tuning and may be changed freely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Maximum number of scoring calls in flight at once.
    pub concurrency: usize,
    /// Additional attempts after the first failed one.
    pub max_retries: u32,
    /// Fixed delay between attempts, in milliseconds.
    pub retry_delay_ms: u64,
    /// Upper bound on a single LLM call; exceeding it consumes one attempt.
    pub timeout_secs: u64,
}

/// Storage configuration for the persisted vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub index_path: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "llama3.2".to_string(),
            base_url: "http://localhost:11434".to_string(),
            temperature: 0.2,
            max_tokens: 1024,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "nomic-embed-text".to_string(),
            concurrency: 4,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_n: 25 }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            max_retries: 2,
            retry_delay_ms: 500,
            timeout_secs: 120,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            index_path: "./data/jobscout_index.json".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            scoring: ScoringConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from `config.yaml` if it exists, otherwise use defaults.
    pub fn load_or_default() -> Self {
        Self::load("config.yaml").unwrap_or_default()
    }
}
