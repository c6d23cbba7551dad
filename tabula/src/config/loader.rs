//! Configuration file loading.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::{Error, Result};

/// File name looked up inside a configuration directory.
pub const CONFIG_FILE_NAME: &str = "tabula.yaml";

/// Loads configuration files.
///
/// # Examples
///
/// ```no_run
/// use tabula::config::ConfigLoader;
/// use std::path::Path;
///
/// if let Some(config) = ConfigLoader::load_from_dir(Path::new("/etc/app")).unwrap() {
///     println!("{config:?}");
/// }
/// ```
pub struct ConfigLoader;

impl ConfigLoader {
    /// Returns the configuration file path inside `dir`.
    #[must_use]
    pub fn config_path(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE_NAME)
    }

    /// Loads `<dir>/tabula.yaml` if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Config>> {
        let path = Self::config_path(dir);
        if !path.exists() {
            return Ok(None);
        }

        Self::load_file(&path).map(Some)
    }

    /// Load and parse a YAML configuration file.
    ///
    /// An empty file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the YAML is invalid.
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path).map_err(|e| Error::Validation {
            field: path.display().to_string(),
            message: format!("Failed to read configuration file: {e}"),
        })?;

        if contents.trim().is_empty() {
            return Ok(Config::default());
        }

        log::debug!("loading configuration from {}", path.display());
        Ok(serde_yaml::from_str(&contents)?)
    }
}
