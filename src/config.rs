use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::suggest::SuggesterOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .pr-reviewer.toml.
/// All fields are optional; with zero config the tool only needs the
/// two credential environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// GitHub API settings
    #[serde(default)]
    pub github: GithubConfig,

    /// Completion-service settings
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Review pipeline tunables
    #[serde(default)]
    pub review: ReviewConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GithubConfig {
    /// GitHub API token. If None, falls back to the GITHUB_TOKEN env var.
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAiConfig {
    /// API key. If None, falls back to the OPENAI_API_KEY env var.
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewConfig {
    /// File extensions considered reviewable
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Characters of file content sent to the completion service
    #[serde(default = "default_content_budget")]
    pub content_budget: usize,

    /// Suggestions at or below this trimmed length are discarded
    #[serde(default = "default_min_suggestion_length")]
    pub min_suggestion_length: usize,

    /// Cap on individual comments when the batched review fails
    #[serde(default = "default_max_fallback_comments")]
    pub max_fallback_comments: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            content_budget: default_content_budget(),
            min_suggestion_length: default_min_suggestion_length(),
            max_fallback_comments: default_max_fallback_comments(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    [".ts", ".js", ".tsx", ".jsx"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_content_budget() -> usize {
    3000
}

fn default_min_suggestion_length() -> usize {
    50
}

fn default_max_fallback_comments() -> usize {
    10
}

impl Config {
    /// Load configuration from .pr-reviewer.toml in the current
    /// directory, falling back to defaults when the file is absent.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(".pr-reviewer.toml");
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Resolve the GitHub token: config file value takes precedence,
    /// falls back to the GITHUB_TOKEN env var.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
    }

    /// Resolve the completion-service key: config file value takes
    /// precedence, falls back to the OPENAI_API_KEY env var.
    pub fn openai_api_key(&self) -> Option<String> {
        self.openai
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }

    /// Suggester tunables with config overrides applied on top of the
    /// defaults.
    pub fn suggester_options(&self) -> SuggesterOptions {
        let defaults = SuggesterOptions::default();
        SuggesterOptions {
            model: self.openai.model.clone().unwrap_or(defaults.model),
            max_tokens: self.openai.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.openai.temperature.unwrap_or(defaults.temperature),
            content_budget: self.review.content_budget,
            min_suggestion_length: self.review.min_suggestion_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github.token.is_none());
        assert!(config.openai.api_key.is_none());
        assert_eq!(config.review.extensions.len(), 4);
        assert_eq!(config.review.content_budget, 3000);
        assert_eq!(config.review.min_suggestion_length, 50);
        assert_eq!(config.review.max_fallback_comments, 10);
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[openai]
model = "gpt-4o"
temperature = 0.5

[review]
extensions = [".ts"]
max_fallback_comments = 5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.openai.model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.review.extensions, vec![".ts"]);
        assert_eq!(config.review.max_fallback_comments, 5);
        // Unset sections keep their defaults
        assert_eq!(config.review.content_budget, 3000);
    }

    #[test]
    fn test_suggester_options_apply_overrides() {
        let config: Config = toml::from_str(
            r#"
[openai]
max_tokens = 250

[review]
content_budget = 1500
"#,
        )
        .unwrap();
        let options = config.suggester_options();
        assert_eq!(options.max_tokens, 250);
        assert_eq!(options.content_budget, 1500);
        // Defaults fill the gaps
        assert_eq!(options.model, "gpt-4o-mini");
        assert_eq!(options.min_suggestion_length, 50);
    }
}
