//! Command to assert the stored schema version of a database.

use crate::error::CliError;
use crate::utils::{inspect_database, GlobalOptions};
use clap::Args;

/// Assert that a database is at a given schema version.
#[derive(Args)]
pub struct AssertVersionCommand {
    /// Database file name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Expected schema version
    #[arg(value_name = "VERSION")]
    pub version: u32,

    /// Invert the assertion (fail if the version matches)
    #[arg(long)]
    pub not: bool,
}

impl AssertVersionCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        // 1. Read the stored version; a missing file is its own exit code
        let info = inspect_database(global, &self.name)?;

        // 2. Check assertion
        let matches = info.version == self.version;
        let success = if self.not { !matches } else { matches };

        if success {
            if global.verbose {
                eprintln!("{} is at version {}", info.path.display(), info.version);
            }
            Ok(())
        } else if self.not {
            Err(CliError::SemanticFailure(format!(
                "Assertion failed: {} is at version {}",
                info.path.display(),
                info.version
            )))
        } else {
            Err(CliError::SemanticFailure(format!(
                "Assertion failed: {} is at version {}, expected {}",
                info.path.display(),
                info.version,
                self.version
            )))
        }
    }
}
