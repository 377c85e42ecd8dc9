//! Configuration management for Precis
//!
//! Settings live in a TOML file (`~/.precis/config.toml` unless overridden).
//! Every section is optional; missing values fall back to defaults. The API
//! credential is never stored in the file, only the name of the environment
//! variable that holds it.

use crate::chunking::{ChunkUnit, Chunker};
use crate::error::{ConfigError, InvalidArgument};
use crate::llm::openai::OPENAI_API_BASE;
use crate::llm::{PromptStyle, PromptTemplate, RetryPolicy, SamplingConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Chunking settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum units per chunk
    pub size: usize,
    /// Unit the size is measured in
    pub unit: ChunkUnit,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            size: 3000,
            unit: ChunkUnit::Words,
        }
    }
}

/// Model and endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Model identifier sent with every request
    pub name: String,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    /// Base URL of an OpenAI-compatible API
    pub api_base: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let sampling = SamplingConfig::default();
        Self {
            name: sampling.model,
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
            frequency_penalty: sampling.frequency_penalty,
            presence_penalty: sampling.presence_penalty,
            api_base: OPENAI_API_BASE.to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Retry settings for transient completion failures
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8000,
        }
    }
}

/// Prompt settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PromptConfig {
    /// Built-in wording to start from
    pub style: PromptStyle,
    /// Replaces the preset system message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Replaces the preset user instruction placed before the chunk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Appended to the PDF's file stem to name the summary file
    pub suffix: String,
    /// Prefix each block with `Summary N:`
    pub numbered: bool,
    /// Debug trace of every chunk sent for summarization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_file: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: "_summary.txt".to_string(),
            numbered: false,
            trace_file: None,
        }
    }
}

/// Precis configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub chunking: ChunkingConfig,
    pub model: ModelConfig,
    pub retry: RetryConfig,
    pub prompt: PromptConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Get the default config file path (~/.precis/config.toml)
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(precis_dir()?.join("config.toml"))
    }

    /// Load config from `path`, or from the default location.
    ///
    /// An explicit path must exist. A missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path()?, false),
        };

        if !explicit && !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Parse config from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Render config as pretty TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save config to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check value ranges before any processing starts
    pub fn validate(&self) -> Result<(), InvalidArgument> {
        if self.chunking.size == 0 {
            return Err(InvalidArgument("chunk size must be greater than zero".into()));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(InvalidArgument(format!(
                "temperature {} is outside 0..=2",
                self.model.temperature
            )));
        }
        for (name, value) in [
            ("frequency penalty", self.model.frequency_penalty),
            ("presence penalty", self.model.presence_penalty),
        ] {
            if !(-2.0..=2.0).contains(&value) {
                return Err(InvalidArgument(format!("{name} {value} is outside -2..=2")));
            }
        }
        if self.model.max_tokens == Some(0) {
            return Err(InvalidArgument("max tokens must be greater than zero".into()));
        }
        if self.model.timeout_secs == 0 {
            return Err(InvalidArgument("request timeout must be greater than zero".into()));
        }
        if self.output.suffix.is_empty() {
            return Err(InvalidArgument("output suffix must not be empty".into()));
        }
        Ok(())
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String, ConfigError> {
        match std::env::var(&self.model.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::MissingCredential(self.model.api_key_env.clone())),
        }
    }

    pub fn chunker(&self) -> Result<Chunker, InvalidArgument> {
        Chunker::new(self.chunking.size, self.chunking.unit)
    }

    pub fn sampling(&self) -> SamplingConfig {
        SamplingConfig {
            model: self.model.name.clone(),
            temperature: self.model.temperature,
            max_tokens: self.model.max_tokens,
            frequency_penalty: self.model.frequency_penalty,
            presence_penalty: self.model.presence_penalty,
        }
    }

    pub fn prompt_template(&self) -> PromptTemplate {
        let mut template = PromptTemplate::preset(self.prompt.style);
        if let Some(ref system) = self.prompt.system {
            template.system = system.clone();
        }
        if let Some(ref instruction) = self.prompt.instruction {
            template.instruction = instruction.clone();
        }
        template
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry.max_retries,
            initial_backoff: Duration::from_millis(self.retry.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.retry.max_backoff_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.model.timeout_secs)
    }
}

/// Get the base precis directory path (~/.precis)
pub fn precis_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".precis"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.chunking.size, 3000);
        assert_eq!(config.chunking.unit, ChunkUnit::Words);
        assert_eq!(config.model.name, "gpt-3.5-turbo-0125");
        assert_eq!(config.model.temperature, 0.0);
        assert_eq!(config.output.suffix, "_summary.txt");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = config.to_toml().unwrap();
        let parsed = Config::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed = Config::from_toml(
            r#"
            [chunking]
            unit = "characters"

            [model]
            temperature = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(parsed.chunking.unit, ChunkUnit::Characters);
        assert_eq!(parsed.chunking.size, 3000);
        assert_eq!(parsed.model.temperature, 0.5);
        assert_eq!(parsed.model.api_key_env, "OPENAI_API_KEY");
        assert_eq!(parsed.retry, RetryConfig::default());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let mut config = Config::default();
        config.chunking.size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_sampling_rejected() {
        let mut config = Config::default();
        config.model.temperature = 3.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.model.presence_penalty = -2.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_credential() {
        let mut config = Config::default();
        config.model.api_key_env = "PRECIS_TEST_KEY_THAT_IS_NEVER_SET".to_string();

        match config.api_key() {
            Err(ConfigError::MissingCredential(var)) => {
                assert_eq!(var, "PRECIS_TEST_KEY_THAT_IS_NEVER_SET")
            }
            other => panic!("expected missing credential, got {:?}", other),
        }
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.output.numbered = true;
        config.prompt.style = PromptStyle::Concise;
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_prompt_overrides() {
        let mut config = Config::default();
        config.prompt.system = Some("Be brief.".to_string());

        let template = config.prompt_template();
        assert_eq!(template.system, "Be brief.");
        assert_eq!(
            template.instruction,
            PromptTemplate::preset(PromptStyle::Detailed).instruction
        );
    }
}
