//! YAML configuration for the summarizer and the extraction policy.
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration.
//!
//! ```yaml
//! summarizer:
//!   api_base: https://api.openai.com/v1/
//!   model: gpt-4o-mini
//!   temperature: 0.7
//!   max_retries: 5
//! extraction:
//!   merge_intro_into_story: false
//!   missing_text_default: ""
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

use crate::extractor::ExtractionPolicy;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a professional news editor. Provide concise, factual summaries without editorial bias.";

/// Settings for the OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Base URL; `chat/completions` is joined onto it.
    pub api_base: String,
    /// Bearer token. Usually supplied through `API_KEY` instead.
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub system_prompt: String,
    /// Retries after the first failed attempt.
    pub max_retries: usize,
    /// First backoff delay; doubles per attempt.
    pub base_delay_ms: u64,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Summaries requested at the same time.
    pub concurrency: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1/".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_retries: 5,
            base_delay_ms: 1000,
            timeout_secs: 60,
            concurrency: 4,
        }
    }
}

/// Whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub summarizer: SummarizerConfig,
    pub extraction: ExtractionPolicy,
}

impl AppConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }
}

/// Load configuration from `path`.
///
/// # Arguments
///
/// * `path` - YAML file; missing keys take their defaults
///
/// # Returns
///
/// The parsed [`AppConfig`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid YAML for the
/// configuration shape.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_config(path: &Path) -> Result<AppConfig, Box<dyn Error>> {
    let yaml = fs::read_to_string(path).await?;
    let config = AppConfig::from_yaml(&yaml)?;
    info!(
        model = %config.summarizer.model,
        merge_intro = config.extraction.merge_intro_into_story,
        "Loaded configuration"
    );
    Ok(config)
}
