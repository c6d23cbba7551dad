//! Utility functions for CLI operations.
//!
//! This module provides common utility functions used across CLI commands,
//! including configuration loading, database path resolution and output
//! formatting.

use crate::error::CliError;
use std::path::PathBuf;
use std::time::SystemTime;
use tabula::database::inspect;
use tabula::database::DatabaseInfo;
use tabula::{Config, ConfigBuilder, DatabaseIdentity};

/// Global CLI options shared across all commands.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Override the data directory location.
    pub data_dir: Option<PathBuf>,

    /// Override the default busy timeout (in seconds).
    pub busy_timeout: Option<u32>,
}

/// Load hierarchical configuration.
///
/// Configuration is merged from multiple sources with precedence:
/// 1. Global options (highest priority)
/// 2. Environment variables
/// 3. Configuration file (`tabula.yaml` in the data directory)
/// 4. Built-in defaults (lowest priority)
pub fn load_configuration(global: &GlobalOptions) -> Result<Config, CliError> {
    let mut builder = ConfigBuilder::new();
    let mut overrides = Config::default();

    if let Some(ref data_dir) = global.data_dir {
        builder = builder.with_config_dir(data_dir);
        overrides.data_dir = Some(data_dir.clone());
    }

    if let Some(seconds) = global.busy_timeout {
        overrides.busy_timeout_ms = Some(u64::from(seconds) * 1000);
    }

    builder
        .with_config(overrides)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}

/// Resolve the path of database `name` from global options and configuration.
///
/// # Errors
///
/// Returns `InvalidArguments` if `name` is not a plain file name, or a
/// configuration error if no data directory can be determined.
pub fn resolve_database_path(global: &GlobalOptions, name: &str) -> Result<PathBuf, CliError> {
    // The version is irrelevant here; only the name is checked
    let identity = DatabaseIdentity::new(name, 1)?;

    let config = load_configuration(global)?;
    let db_config = config
        .to_database_config()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let path = db_config
        .database_path(identity.name())
        .ok_or_else(|| CliError::Config("no data directory configured".to_string()))?;
    log::debug!("resolved database {name} to {}", path.display());
    Ok(path)
}

/// Inspect database `name`, failing with `DatabaseNotFound` when it is missing.
pub fn inspect_database(global: &GlobalOptions, name: &str) -> Result<DatabaseInfo, CliError> {
    let path = resolve_database_path(global, name)?;
    if !path.exists() {
        return Err(CliError::DatabaseNotFound(path));
    }

    inspect(&path).map_err(CliError::from)
}

/// Format a timestamp for display.
pub fn format_timestamp(ts: SystemTime) -> String {
    use chrono::{DateTime, Utc};
    let dt: DateTime<Utc> = ts.into();
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format a byte count for display.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

    let mut unit = 0;
    let mut whole = bytes;
    while whole >= 1024 && unit < UNITS.len() - 1 {
        whole /= 1024;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} B")
    } else {
        // One decimal place is plenty for a summary line
        let scaled = bytes as f64 / 1024f64.powi(unit as i32);
        format!("{scaled:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_format_timestamp() {
        let ts = UNIX_EPOCH + Duration::from_secs(86_400);
        assert_eq!(format_timestamp(ts), "1970-01-02 00:00:00");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.0 KiB");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MiB");
    }

    #[test]
    fn test_resolve_database_path_uses_data_dir() {
        let global = GlobalOptions {
            data_dir: Some(PathBuf::from("/srv/tabula-test-nonexistent")),
            ..Default::default()
        };
        let path = resolve_database_path(&global, "app.db").unwrap();
        assert_eq!(path, PathBuf::from("/srv/tabula-test-nonexistent/app.db"));
    }

    #[test]
    fn test_resolve_database_path_rejects_paths() {
        let global = GlobalOptions {
            data_dir: Some(PathBuf::from("/srv/tabula-test-nonexistent")),
            ..Default::default()
        };
        let err = resolve_database_path(&global, "../app.db").unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
