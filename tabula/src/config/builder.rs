//! Layered configuration assembly.

use std::path::{Path, PathBuf};

use crate::config::environment::EnvironmentConfig;
use crate::config::loader::ConfigLoader;
use crate::config::merger::ConfigMerger;
use crate::config::schema::Config;
use crate::config::validator::ConfigValidator;
use crate::database::resolve_data_dir;
use crate::error::Result;

/// Builds a [`Config`] from files, the environment and explicit overrides.
///
/// Precedence, lowest to highest: the configuration file, `TABULA_*`
/// environment variables, then [`with_config`](Self::with_config).
///
/// # Examples
///
/// ```
/// use tabula::config::{Config, ConfigBuilder};
///
/// let config = ConfigBuilder::new()
///     .skip_files()
///     .skip_env()
///     .with_config(Config { busy_timeout_ms: Some(100), ..Default::default() })
///     .build()
///     .unwrap();
/// assert_eq!(config.busy_timeout_ms, Some(100));
/// ```
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_dir: Option<PathBuf>,
    config_file: Option<PathBuf>,
    skip_files: bool,
    skip_env: bool,
    overrides: Option<Config>,
}

impl ConfigBuilder {
    /// Creates a builder that reads `tabula.yaml` from the data directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `tabula.yaml` from `dir` instead of the data directory.
    #[must_use]
    pub fn with_config_dir(mut self, dir: &Path) -> Self {
        self.config_dir = Some(dir.to_path_buf());
        self
    }

    /// Reads this exact file, which must exist.
    #[must_use]
    pub fn with_config_file(mut self, path: &Path) -> Self {
        self.config_file = Some(path.to_path_buf());
        self
    }

    /// Skips configuration files entirely.
    #[must_use]
    pub const fn skip_files(mut self) -> Self {
        self.skip_files = true;
        self
    }

    /// Skips `TABULA_*` environment overrides.
    #[must_use]
    pub const fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Applies `config` on top of every other layer.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.overrides = Some(config);
        self
    }

    /// Loads, merges and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed, an environment
    /// variable holds an invalid value, or the merged result is invalid.
    pub fn build(self) -> Result<Config> {
        let mut layers = Vec::new();

        if !self.skip_files {
            if let Some(file) = self.file_layer()? {
                layers.push(file);
            }
        }

        if !self.skip_env {
            let mut env = Config::default();
            EnvironmentConfig::apply_overrides(&mut env)?;
            layers.push(env);
        }

        if let Some(overrides) = self.overrides {
            layers.push(overrides);
        }

        let config = ConfigMerger::merge(layers);
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    fn file_layer(&self) -> Result<Option<Config>> {
        if let Some(ref path) = self.config_file {
            return ConfigLoader::load_file(path).map(Some);
        }

        let dir = match self.config_dir {
            Some(ref dir) => dir.clone(),
            None => match resolve_data_dir() {
                Ok(dir) => dir,
                // No home directory means no default config file
                Err(_) => return Ok(None),
            },
        };
        ConfigLoader::load_from_dir(&dir)
    }
}
