//! Configuration management for the skill matcher

use crate::error::{Result, SkillMatcherError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub models: ModelConfig,
    pub matching: MatchingConfig,
    pub scoring: ScoringConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// HuggingFace repo id or local folder of a Model2Vec model
    pub embedding_model: String,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub fuzzy_cutoff: f64,
    pub semantic_threshold: f64,
    /// Overrides the catalog's own fallback weight when set
    pub default_category_weight: Option<f64>,
    /// Replaces the built-in catalog when set
    pub catalog_path: Option<PathBuf>,
    pub semantic_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub structured_weight: f64,
    pub semantic_weight: f64,
    pub critical_threshold: f64,
    pub medium_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            embedding_model: "minishlab/potion-base-8M".to_string(),
            batch_size: 32,
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            fuzzy_cutoff: 0.88,
            semantic_threshold: 0.65,
            default_category_weight: None,
            catalog_path: None,
            semantic_enabled: true,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            structured_weight: 0.6,
            semantic_weight: 0.4,
            critical_threshold: 0.30,
            medium_threshold: 0.15,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            detailed: false,
            color_output: true,
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Load an explicit configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SkillMatcherError::FileNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| SkillMatcherError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SkillMatcherError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("skill-matcher")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        let unit_values = [
            ("matching.fuzzy_cutoff", Some(self.matching.fuzzy_cutoff)),
            ("matching.semantic_threshold", Some(self.matching.semantic_threshold)),
            ("matching.default_category_weight", self.matching.default_category_weight),
            ("scoring.structured_weight", Some(self.scoring.structured_weight)),
            ("scoring.semantic_weight", Some(self.scoring.semantic_weight)),
            ("scoring.critical_threshold", Some(self.scoring.critical_threshold)),
            ("scoring.medium_threshold", Some(self.scoring.medium_threshold)),
        ];

        for (key, value) in unit_values.into_iter().filter_map(|(key, value)| Some((key, value?))) {
            if !(0.0..=1.0).contains(&value) {
                return Err(SkillMatcherError::Configuration(format!(
                    "{} must be within [0, 1], got {}",
                    key, value
                )));
            }
        }

        if self.scoring.medium_threshold > self.scoring.critical_threshold {
            return Err(SkillMatcherError::Configuration(format!(
                "scoring.medium_threshold ({}) exceeds scoring.critical_threshold ({})",
                self.scoring.medium_threshold, self.scoring.critical_threshold
            )));
        }

        if self.models.batch_size == 0 {
            return Err(SkillMatcherError::Configuration(
                "models.batch_size must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.matching.fuzzy_cutoff, 0.88);
        assert_eq!(config.matching.semantic_threshold, 0.65);
        assert_eq!(config.scoring.structured_weight, 0.6);
        assert_eq!(config.scoring.semantic_weight, 0.4);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            [scoring]
            structured_weight = 0.7
            semantic_weight = 0.3
            "#,
        )
        .unwrap();

        assert_eq!(config.scoring.structured_weight, 0.7);
        assert_eq!(config.scoring.critical_threshold, 0.30);
        assert_eq!(config.models.batch_size, 32);
        assert!(config.matching.semantic_enabled);
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let result = Config::from_toml_str(
            r#"
            [scoring]
            critical_threshold = 0.1
            medium_threshold = 0.2
            "#,
        );
        assert!(matches!(result, Err(SkillMatcherError::Configuration(_))));
    }

    #[test]
    fn test_category_weight_override_is_optional() {
        assert_eq!(Config::default().matching.default_category_weight, None);

        let config = Config::from_toml_str(
            r#"
            [matching]
            default_category_weight = 0.25
            "#,
        )
        .unwrap();
        assert_eq!(config.matching.default_category_weight, Some(0.25));

        let result = Config::from_toml_str(
            r#"
            [matching]
            default_category_weight = 2.0
            "#,
        );
        assert!(matches!(result, Err(SkillMatcherError::Configuration(_))));
    }

    #[test]
    fn test_rejects_out_of_range_cutoff() {
        let mut config = Config::default();
        config.matching.fuzzy_cutoff = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = Config::default();
        let content = toml::to_string_pretty(&config).unwrap();
        let parsed = Config::from_toml_str(&content).unwrap();
        assert_eq!(parsed.output.format, OutputFormat::Console);
        assert_eq!(parsed.models.embedding_model, config.models.embedding_model);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = Config::load_from(Path::new("/nonexistent/skill-matcher.toml"));
        assert!(matches!(result, Err(SkillMatcherError::FileNotFound(_))));
    }
}
