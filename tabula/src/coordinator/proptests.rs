//! Property-based tests for registration order and lifecycle dispatch.

use super::SchemaCoordinator;
use crate::database::{get_schema_version, DatabaseConfig};
use crate::error::Error;
use crate::identity::DatabaseIdentity;
use crate::module::{HookResult, TableModule};
use proptest::prelude::*;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

const NAMES: [&str; 8] = ["m0", "m1", "m2", "m3", "m4", "m5", "m6", "m7"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seen {
    Create,
    Upgrade(u32, u32),
}

type Journal = Arc<Mutex<Vec<(usize, Seen)>>>;

struct Recording {
    index: usize,
    journal: Journal,
}

impl TableModule for Recording {
    fn name(&self) -> &'static str {
        NAMES[self.index]
    }

    fn create_tables(&self, _conn: &Connection) -> HookResult {
        self.journal.lock().unwrap().push((self.index, Seen::Create));
        Ok(())
    }

    fn on_upgrade(&self, _conn: &Connection, old_version: u32, new_version: u32) -> HookResult {
        self.journal
            .lock()
            .unwrap()
            .push((self.index, Seen::Upgrade(old_version, new_version)));
        Ok(())
    }
}

fn recording_modules(count: usize, journal: &Journal) -> Vec<Arc<dyn TableModule>> {
    (0..count)
        .map(|index| {
            Arc::new(Recording {
                index,
                journal: Arc::clone(journal),
            }) as Arc<dyn TableModule>
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    // A fresh database sees exactly one create per module, in registration order
    #[test]
    fn create_follows_registration_order(count in 1usize..8, version in 1u32..50) {
        let journal = Journal::default();
        let coordinator = SchemaCoordinator::new(
            DatabaseIdentity::new("app.db", version).unwrap(),
            DatabaseConfig::in_memory(),
            recording_modules(count, &journal),
        )
        .unwrap();

        coordinator.database().unwrap();

        let events = journal.lock().unwrap().clone();
        let order: Vec<usize> = events.iter().map(|(index, _)| *index).collect();
        prop_assert_eq!(order, (0..count).collect::<Vec<_>>());
        prop_assert!(events
            .iter()
            .all(|(_, seen)| *seen == Seen::Create));
    }

    // Reopening with a different version upgrades, is silent, or refuses
    #[test]
    fn reopen_dispatch_matches_version_order(count in 1usize..5, stored in 1u32..6, configured in 1u32..6) {
        let dir = tempdir().unwrap();
        let config = DatabaseConfig::new(dir.path());

        {
            let journal = Journal::default();
            let coordinator = SchemaCoordinator::new(
                DatabaseIdentity::new("app.db", stored).unwrap(),
                config.clone(),
                recording_modules(count, &journal),
            )
            .unwrap();
            coordinator.database().unwrap();
        }

        let journal = Journal::default();
        let coordinator = SchemaCoordinator::new(
            DatabaseIdentity::new("app.db", configured).unwrap(),
            config,
            recording_modules(count, &journal),
        )
        .unwrap();
        let result = coordinator.database().map(|_| ());
        let events = journal.lock().unwrap().clone();
        drop(coordinator);

        let on_disk = get_schema_version(&Connection::open(dir.path().join("app.db")).unwrap()).unwrap();

        if configured > stored {
            prop_assert!(result.is_ok());
            prop_assert_eq!(events.len(), count);
            for (position, (index, event)) in events.iter().enumerate() {
                prop_assert_eq!(*index, position);
                prop_assert_eq!(*event, Seen::Upgrade(stored, configured));
            }
            prop_assert_eq!(on_disk, configured);
        } else if configured == stored {
            prop_assert!(result.is_ok());
            prop_assert!(events.is_empty());
            prop_assert_eq!(on_disk, stored);
        } else {
            let is_downgrade = matches!(
                result,
                Err(Error::Downgrade { stored: s, configured: c }) if s == stored && c == configured
            );
            prop_assert!(is_downgrade);
            prop_assert!(events.is_empty());
            prop_assert_eq!(on_disk, stored);
        }
    }

    // Registration fails exactly at the first repeated instance
    #[test]
    fn duplicate_instances_rejected_at_first_repeat(picks in prop::collection::vec(0usize..4, 0..8)) {
        let journal = Journal::default();
        let pool = recording_modules(4, &journal);
        let modules: Vec<Arc<dyn TableModule>> = picks.iter().map(|&i| Arc::clone(&pool[i])).collect();

        let first_repeat = picks
            .iter()
            .enumerate()
            .find(|&(position, pick)| picks[..position].contains(pick))
            .map(|(position, &pick)| (position, NAMES[pick]));

        let result = SchemaCoordinator::new(
            DatabaseIdentity::new("app.db", 1).unwrap(),
            DatabaseConfig::in_memory(),
            modules,
        );

        match (result, first_repeat) {
            (Ok(coordinator), None) => {
                let expected: Vec<&str> = picks.iter().map(|&i| NAMES[i]).collect();
                prop_assert_eq!(coordinator.module_names(), expected);
            }
            (Err(Error::DuplicateModule { module, position }), Some((at, name))) => {
                prop_assert_eq!(position, at);
                prop_assert_eq!(module, name);
            }
            (other, expected) => {
                prop_assert!(false, "unexpected outcome {:?} (expected repeat {:?})", other.map(|_| ()), expected);
            }
        }
    }
}
