//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `LINGO_COACH` prefix
//! and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use lingo_coach::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod agent;
mod ai;
mod database;
mod error;
mod logging;
mod session;
mod storage;

pub use agent::AgentConfig;
pub use ai::AiConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::{Environment, LoggingConfig};
pub use session::{SessionConfig, MAX_CHAT_TURNS};
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// development setup (mock AI, in-memory repositories).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `LINGO_COACH` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// - `LINGO_COACH__AI__ENDPOINT_URL=...` -> `ai.endpoint_url = ...`
    /// - `LINGO_COACH__SESSION__MAX_CHAT_TURNS=40` -> `session.max_chat_turns = 40`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("LINGO_COACH")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.logging.validate()?;
        self.ai.validate()?;
        self.session.validate()?;
        self.agent.validate()?;
        self.database.validate()?;
        Ok(())
    }
}
