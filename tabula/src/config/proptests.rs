//! Property-based tests for configuration merging.

use super::merger::ConfigMerger;
use super::schema::Config;
use crate::database::JournalMode;
use proptest::prelude::*;
use std::path::PathBuf;

fn journal_mode_strategy() -> impl Strategy<Value = JournalMode> {
    prop_oneof![
        Just(JournalMode::Wal),
        Just(JournalMode::Delete),
        Just(JournalMode::Truncate),
        Just(JournalMode::Persist),
    ]
}

// Strategy for generating configs
fn config_strategy() -> impl Strategy<Value = Config> {
    (
        prop::option::of("/[a-z]{1,10}(/[a-z]{1,10}){0,3}"),
        prop::option::of(0u64..100_000),
        prop::option::of(journal_mode_strategy()),
        prop::option::of(any::<bool>()),
        prop::option::of(any::<bool>()),
        prop::option::of(any::<bool>()),
    )
        .prop_map(
            |(data_dir, busy_timeout_ms, journal_mode, foreign_keys, atomic, log_statements)| {
                Config {
                    data_dir: data_dir.map(PathBuf::from),
                    busy_timeout_ms,
                    journal_mode,
                    foreign_keys,
                    atomic_schema_changes: atomic,
                    log_statements,
                }
            },
        )
}

proptest! {
    // Merging into the default yields the source unchanged
    #[test]
    fn merge_into_default_is_identity(config in config_strategy()) {
        let mut target = Config::default();
        ConfigMerger::merge_into(&mut target, &config);
        prop_assert_eq!(target, config);
    }

    // Merging is idempotent
    #[test]
    fn merge_is_idempotent(base in config_strategy(), layer in config_strategy()) {
        let mut once = base.clone();
        ConfigMerger::merge_into(&mut once, &layer);
        let mut twice = once.clone();
        ConfigMerger::merge_into(&mut twice, &layer);
        prop_assert_eq!(once, twice);
    }

    // Every set field of the higher layer wins, every unset field falls through
    #[test]
    fn higher_layer_wins_per_field(low in config_strategy(), high in config_strategy()) {
        let merged = ConfigMerger::merge(vec![low.clone(), high.clone()]);
        prop_assert_eq!(merged.data_dir, high.data_dir.or(low.data_dir));
        prop_assert_eq!(merged.busy_timeout_ms, high.busy_timeout_ms.or(low.busy_timeout_ms));
        prop_assert_eq!(merged.journal_mode, high.journal_mode.or(low.journal_mode));
        prop_assert_eq!(merged.foreign_keys, high.foreign_keys.or(low.foreign_keys));
        prop_assert_eq!(
            merged.atomic_schema_changes,
            high.atomic_schema_changes.or(low.atomic_schema_changes)
        );
        prop_assert_eq!(merged.log_statements, high.log_statements.or(low.log_statements));
    }

    // Valid configurations survive a YAML round trip
    #[test]
    fn yaml_roundtrip(config in config_strategy()) {
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        prop_assert_eq!(parsed, config);
    }
}
