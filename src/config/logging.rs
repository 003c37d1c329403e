//! Logging configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Deployment environment
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,

    #[serde(default)]
    pub environment: Environment,
}

impl LoggingConfig {
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// JSON output is forced in production.
    pub fn use_json(&self) -> bool {
        self.json || self.is_production()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let base = self.level.split(',').next().unwrap_or_default().trim();
        match base.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" | "off" => Ok(()),
            _ => Err(ValidationError::InvalidLogLevel(self.level.clone())),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
            environment: Environment::default(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.use_json());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_forces_json() {
        let config = LoggingConfig {
            environment: Environment::Production,
            ..Default::default()
        };
        assert!(config.use_json());
    }

    #[test]
    fn test_level_with_directives_validates_base() {
        let ok = LoggingConfig {
            level: "debug,sqlx=warn".to_string(),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let bad = LoggingConfig {
            level: "loud".to_string(),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
