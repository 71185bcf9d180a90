use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

/// Artifact path used when `MODEL_PATH` is unset.
pub const DEFAULT_MODEL_PATH: &str = "./data/model.json";
/// Port used when `SERVER_PORT` is unset.
pub const DEFAULT_SERVER_PORT: u16 = 8000;
/// Version reported when `BUILD_VERSION` is unset.
pub const DEFAULT_BUILD_VERSION: &str = "1.0.0-dev";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable {key}: {value:?}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Offending value.
        value: String,
    },
    /// Configuration was initialized twice.
    #[error("Configuration already initialized")]
    AlreadyInitialized,
}

/// Runtime configuration for the fuzzy model server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Location of the model artifact loaded at startup.
    pub model_path: PathBuf,
    /// TCP port the HTTP server binds on all interfaces.
    pub server_port: u16,
    /// Build identifier reported by `GET /version`.
    pub build_version: String,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// `BUILD_VERSION` is reported verbatim whenever it is set, even if empty. Blank
    /// `MODEL_PATH` and `SERVER_PORT` values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Ok(Self {
            model_path: optional("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            server_port: optional("SERVER_PORT")
                .map(|value| {
                    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                        key: "SERVER_PORT".into(),
                        value,
                    })
                })
                .transpose()?
                .unwrap_or(DEFAULT_SERVER_PORT),
            build_version: lookup("BUILD_VERSION")
                .unwrap_or_else(|| DEFAULT_BUILD_VERSION.to_string()),
        })
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, falling back to the environment if `init_config` has not
/// run yet.
pub fn get_config() -> Result<&'static Config, ConfigError> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }
    let config = Config::from_env()?;
    Ok(CONFIG.get_or_init(|| config))
}

/// Load `.env` and the process environment, then install the result in the global cache.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)?;
    let config = get_config()?;
    tracing::debug!(
        model_path = %config.model_path.display(),
        server_port = config.server_port,
        build_version = %config.build_version,
        "Loaded configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_config(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = lookup_config(&[]).expect("defaults");
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(config.server_port, DEFAULT_SERVER_PORT);
        assert_eq!(config.build_version, "1.0.0-dev");
    }

    #[test]
    fn build_version_is_reported_verbatim() {
        let config = lookup_config(&[("BUILD_VERSION", "2024.06.1-rc3")]).expect("config");
        assert_eq!(config.build_version, "2024.06.1-rc3");
        let empty = lookup_config(&[("BUILD_VERSION", "")]).expect("config");
        assert_eq!(empty.build_version, "");
    }

    #[test]
    fn overrides_are_applied() {
        let config = lookup_config(&[
            ("MODEL_PATH", "/srv/models/lesson.json"),
            ("SERVER_PORT", " 9090 "),
        ])
        .expect("config");
        assert_eq!(config.model_path, PathBuf::from("/srv/models/lesson.json"));
        assert_eq!(config.server_port, 9090);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = lookup_config(&[("SERVER_PORT", "eighty")]).unwrap_err();
        let ConfigError::InvalidValue { key, value } = err else {
            panic!("expected an invalid value error");
        };
        assert_eq!(key, "SERVER_PORT");
        assert_eq!(value, "eighty");
    }
}
