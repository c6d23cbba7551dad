//! Configuration merging and precedence handling.

use crate::config::schema::Config;

/// Merges configuration layers according to precedence rules.
///
/// # Examples
///
/// ```
/// use tabula::config::{Config, ConfigMerger};
///
/// let low = Config { busy_timeout_ms: Some(100), foreign_keys: Some(true), ..Default::default() };
/// let high = Config { busy_timeout_ms: Some(900), ..Default::default() };
///
/// let mut result = low;
/// ConfigMerger::merge_into(&mut result, &high);
/// assert_eq!(result.busy_timeout_ms, Some(900));
/// assert_eq!(result.foreign_keys, Some(true));
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// Merge layers given from lowest to highest precedence.
    #[must_use]
    pub fn merge(layers: Vec<Config>) -> Config {
        let mut result = Config::default();
        for layer in &layers {
            Self::merge_into(&mut result, layer);
        }
        result
    }

    /// Merge source config into target (source overwrites target).
    ///
    /// Every field is a scalar: a `Some` in `source` replaces the target
    /// value, a `None` leaves it unchanged.
    pub fn merge_into(target: &mut Config, source: &Config) {
        if source.data_dir.is_some() {
            target.data_dir.clone_from(&source.data_dir);
        }

        if source.busy_timeout_ms.is_some() {
            target.busy_timeout_ms = source.busy_timeout_ms;
        }

        if source.journal_mode.is_some() {
            target.journal_mode = source.journal_mode;
        }

        if source.foreign_keys.is_some() {
            target.foreign_keys = source.foreign_keys;
        }

        if source.atomic_schema_changes.is_some() {
            target.atomic_schema_changes = source.atomic_schema_changes;
        }

        if source.log_statements.is_some() {
            target.log_statements = source.log_statements;
        }
    }
}
