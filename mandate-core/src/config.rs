use std::env;
use std::path::PathBuf;

use crate::errors::ConfigError;

/// Runtime environment used by the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    fn from_str(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Development,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

/// Configuration shared by the server binaries, loaded from `MANDATE_`
/// prefixed environment variables.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub database_url: String,
    pub environment: Environment,
    pub http_bind: Option<String>,
    pub catalog_path: Option<PathBuf>,
}

impl CoreConfig {
    /// Loads configuration from the process environment. `DATABASE_URL` is
    /// accepted as a fallback for `MANDATE_DATABASE_URL` so the service works
    /// with unprefixed hosting defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = env::var("MANDATE_DATABASE_URL")
            .or_else(|_| env::var("DATABASE_URL"))
            .map_err(|_| ConfigError::MissingEnvVar("MANDATE_DATABASE_URL".into()))?;

        let environment = env::var("MANDATE_ENV")
            .map(|raw| Environment::from_str(&raw))
            .unwrap_or_default();

        let http_bind = env::var("MANDATE_HTTP_BIND").ok();
        let catalog_path = env::var("MANDATE_CATALOG_PATH").ok().map(PathBuf::from);

        Ok(Self {
            database_url,
            environment,
            http_bind,
            catalog_path,
        })
    }

    /// Returns the Postgres URL.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Whether the service is running in production.
    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }
}
