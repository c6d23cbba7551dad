//! Configuration validation.

use std::path::Path;

use crate::config::schema::Config;
use crate::error::{Error, Result};

/// Longest busy timeout accepted, in milliseconds (one hour).
pub const MAX_BUSY_TIMEOUT_MS: u64 = 3_600_000;

/// Validates a merged configuration.
///
/// # Examples
///
/// ```
/// use tabula::config::{Config, ConfigValidator};
///
/// let config = Config::default();
/// ConfigValidator::validate(&config).unwrap();
///
/// let config = Config { busy_timeout_ms: Some(u64::MAX), ..Default::default() };
/// assert!(ConfigValidator::validate(&config).is_err());
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field.
    pub fn validate(config: &Config) -> Result<()> {
        if let Some(ref dir) = config.data_dir {
            Self::validate_data_dir(dir)?;
        }

        if let Some(ms) = config.busy_timeout_ms {
            if ms > MAX_BUSY_TIMEOUT_MS {
                return Err(Error::Validation {
                    field: "busy_timeout_ms".into(),
                    message: format!("must be at most {MAX_BUSY_TIMEOUT_MS} (got {ms})"),
                });
            }
        }

        Ok(())
    }

    fn validate_data_dir(dir: &Path) -> Result<()> {
        if dir.as_os_str().is_empty() {
            return Err(Error::Validation {
                field: "data_dir".into(),
                message: "cannot be empty".into(),
            });
        }

        if dir.to_string_lossy().contains('\0') {
            return Err(Error::Validation {
                field: "data_dir".into(),
                message: "cannot contain null bytes".into(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_empty_config() {
        ConfigValidator::validate(&Config::default()).unwrap();
    }

    #[test]
    fn test_validate_busy_timeout_bounds() {
        let at_limit = Config {
            busy_timeout_ms: Some(MAX_BUSY_TIMEOUT_MS),
            ..Default::default()
        };
        ConfigValidator::validate(&at_limit).unwrap();

        let zero = Config {
            busy_timeout_ms: Some(0),
            ..Default::default()
        };
        ConfigValidator::validate(&zero).unwrap();

        let over = Config {
            busy_timeout_ms: Some(MAX_BUSY_TIMEOUT_MS + 1),
            ..Default::default()
        };
        let err = ConfigValidator::validate(&over).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "busy_timeout_ms"));
    }

    #[test]
    fn test_validate_empty_data_dir() {
        let config = Config {
            data_dir: Some(PathBuf::new()),
            ..Default::default()
        };
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "data_dir"));
    }
}
