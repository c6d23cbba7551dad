//! Configuration system for tabula.
//!
//! This module provides layered configuration with support for:
//! - A YAML configuration file (`tabula.yaml` in the data directory)
//! - Environment variable overrides (`TABULA_*`)
//! - Programmatic configuration via builder pattern
//! - Validation of the merged result
//!
//! # Configuration Precedence
//!
//! Configuration is merged from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Programmatic overrides (via `ConfigBuilder::with_config`)
//! 2. Environment variables (`TABULA_*`)
//! 3. Configuration file (`<data_dir>/tabula.yaml`)
//! 4. Built-in defaults
//!
//! # Examples
//!
//! ```
//! use std::path::PathBuf;
//! use tabula::config::{Config, ConfigBuilder};
//!
//! let custom = Config {
//!     data_dir: Some(PathBuf::from("/var/lib/app")),
//!     atomic_schema_changes: Some(false),
//!     ..Default::default()
//! };
//!
//! let config = ConfigBuilder::new()
//!     .skip_files()
//!     .skip_env()
//!     .with_config(custom)
//!     .build()
//!     .unwrap();
//!
//! let db = config.to_database_config().unwrap();
//! assert!(!db.atomic_schema_changes);
//! ```

pub mod builder;
pub mod environment;
pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

// Re-export key types at module root
pub use builder::ConfigBuilder;
pub use environment::EnvironmentConfig;
pub use loader::{ConfigLoader, CONFIG_FILE_NAME};
pub use merger::ConfigMerger;
pub use schema::Config;
pub use validator::ConfigValidator;
