use std::{env, path::PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::info;

use crate::pipeline::ChunkConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/app.yaml";
pub const CONFIG_PATH_ENV: &str = "APP_CONFIG_PATH";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub intake: IntakeConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    pub min_tokens: usize,
    pub paragraph_token_limit: usize,
    pub link_coverage: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        let chunk = ChunkConfig::default();
        Self {
            min_tokens: chunk.min_tokens,
            paragraph_token_limit: chunk.paragraph_token_limit,
            link_coverage: chunk.link_coverage,
        }
    }
}

impl ExtractionConfig {
    pub fn chunk_config(&self) -> ChunkConfig {
        ChunkConfig {
            min_tokens: self.min_tokens,
            paragraph_token_limit: self.paragraph_token_limit,
            link_coverage: self.link_coverage,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct IntakeConfig {
    pub max_file_size_mb: u64,
    pub allowed_extensions: Vec<String>,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 25,
            allowed_extensions: vec!["pdf".into(), "docx".into()],
        }
    }
}

impl IntakeConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Loads the YAML config from `APP_CONFIG_PATH` or [`DEFAULT_CONFIG_PATH`].
///
/// A missing default file yields the built-in defaults; an explicitly
/// configured path must exist.
pub async fn load_config() -> Result<AppConfig> {
    let explicit = env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
    let path = explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    if explicit.is_none() && !fs::try_exists(&path).await.unwrap_or(false) {
        info!(path = %path.display(), "No config file found, using defaults");
        return Ok(AppConfig::default());
    }

    let config = load_config_from(&path).await?;
    info!(path = %path.display(), "Configuration loaded from disk");
    Ok(config)
}

pub async fn load_config_from(path: &std::path::Path) -> Result<AppConfig> {
    let contents = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn partial_yaml_falls_back_to_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("app.yaml");
        fs::write(&path, "extraction:\n  min_tokens: 25\n").await?;

        let config = load_config_from(&path).await?;
        assert_eq!(config.extraction.min_tokens, 25);
        assert_eq!(config.extraction.paragraph_token_limit, 400);
        assert_eq!(config.intake, IntakeConfig::default());
        assert_eq!(config.intake.max_file_size_bytes(), 25 * 1024 * 1024);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_yaml_is_reported() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("app.yaml");
        fs::write(&path, "extraction: [unclosed").await?;

        let err = load_config_from(&path).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
        Ok(())
    }

    #[test]
    fn extraction_maps_to_chunk_config() {
        let chunk = ExtractionConfig::default().chunk_config();
        assert_eq!(chunk, ChunkConfig::default());
    }
}
