use std::fmt;

/// Configuration file errors: an unparseable value, an unrecognized key, or
/// an unrecognized section. None of these are fatal to startup — the caller
/// logs a warning and falls back to `TelnetConfig::default()` (see
/// `main::load_config`). Only a bind failure is a fatal startup error, and
/// that one surfaces as a plain `std::io::Error` out of `main`.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String, String),
    UnknownKey(String),
    UnknownSection(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue(key, value) => {
                write!(f, "Invalid value '{}' for key '{}'", value, key)
            }
            ConfigError::UnknownKey(key) => write!(f, "Unknown configuration key: '{}'", key),
            ConfigError::UnknownSection(section) => write!(f, "Unknown section: '{}'", section),
        }
    }
}

impl std::error::Error for ConfigError {}
