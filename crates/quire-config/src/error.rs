use thiserror::Error;

/// Error type for quire-config operations
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Invalid value for '{key}': {reason}")]
  InvalidValue { key: String, reason: String },

  #[error("Unknown configuration key: {0}")]
  UnknownKey(String),

  #[error("TOML error: {0}")]
  Toml(#[from] toml::de::Error),
}
