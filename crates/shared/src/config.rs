//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Approval engine configuration.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Identity directory configuration.
    #[serde(default)]
    pub directory: DirectoryConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Approval engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Company base currency code used for cached display amounts.
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
}

fn default_base_currency() -> String {
    "USD".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_currency: default_base_currency(),
        }
    }
}

/// Identity directory configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryConfig {
    /// Optional path to a JSON file of user profiles to seed at startup.
    #[serde(default)]
    pub seed: Option<String>,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("REMIT").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
