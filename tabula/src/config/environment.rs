//! Environment variable handling for configuration overrides.
//!
//! This module provides support for `TABULA_*` environment variables that
//! override configuration file values.

use std::env;
use std::path::PathBuf;

use crate::config::schema::Config;
use crate::database::{JournalMode, DATA_DIR_ENV};
use crate::error::{Error, Result};

/// Busy timeout override, in milliseconds.
pub const BUSY_TIMEOUT_MS_ENV: &str = "TABULA_BUSY_TIMEOUT_MS";
/// Journal mode override.
pub const JOURNAL_MODE_ENV: &str = "TABULA_JOURNAL_MODE";
/// Foreign key enforcement override.
pub const FOREIGN_KEYS_ENV: &str = "TABULA_FOREIGN_KEYS";
/// Schema transaction policy override.
pub const ATOMIC_SCHEMA_CHANGES_ENV: &str = "TABULA_ATOMIC_SCHEMA_CHANGES";
/// Statement logging override.
pub const LOG_STATEMENTS_ENV: &str = "TABULA_LOG_STATEMENTS";

/// Handles environment variable overrides for configuration.
///
/// # Examples
///
/// ```no_run
/// use tabula::config::{Config, EnvironmentConfig};
///
/// let mut config = Config::default();
/// EnvironmentConfig::apply_overrides(&mut config).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply environment variable overrides to config.
    ///
    /// Reads all `TABULA_*` environment variables and applies them to the
    /// configuration with higher precedence than file-based configs.
    ///
    /// # Errors
    ///
    /// Returns an error if any environment variable value is invalid
    /// (e.g., non-numeric timeout, invalid boolean).
    pub fn apply_overrides(config: &mut Config) -> Result<()> {
        if let Ok(dir) = env::var(DATA_DIR_ENV) {
            config.data_dir = Some(PathBuf::from(dir));
        }

        if let Ok(ms) = env::var(BUSY_TIMEOUT_MS_ENV) {
            config.busy_timeout_ms = Some(ms.trim().parse().map_err(|_| Error::Validation {
                field: BUSY_TIMEOUT_MS_ENV.into(),
                message: "Must be a non-negative integer".into(),
            })?);
        }

        if let Ok(mode) = env::var(JOURNAL_MODE_ENV) {
            config.journal_mode = Some(JournalMode::parse(mode.trim()).map_err(|_| {
                Error::Validation {
                    field: JOURNAL_MODE_ENV.into(),
                    message: format!("Unknown journal mode '{mode}'"),
                }
            })?);
        }

        if let Ok(val) = env::var(FOREIGN_KEYS_ENV) {
            config.foreign_keys = Some(Self::parse_bool(FOREIGN_KEYS_ENV, &val)?);
        }

        if let Ok(val) = env::var(ATOMIC_SCHEMA_CHANGES_ENV) {
            config.atomic_schema_changes = Some(Self::parse_bool(ATOMIC_SCHEMA_CHANGES_ENV, &val)?);
        }

        if let Ok(val) = env::var(LOG_STATEMENTS_ENV) {
            config.log_statements = Some(Self::parse_bool(LOG_STATEMENTS_ENV, &val)?);
        }

        Ok(())
    }

    /// Parse a boolean value from a string.
    ///
    /// Accepts: true/1/yes/on for true, false/0/no/off for false (case-insensitive).
    fn parse_bool(field: &str, s: &str) -> Result<bool> {
        match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::Validation {
                field: field.into(),
                message: format!(
                    "Invalid boolean value: '{s}' (expected true/false/1/0/yes/no/on/off)"
                ),
            }),
        }
    }
}
