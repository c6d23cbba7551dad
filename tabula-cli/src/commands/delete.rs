//! Command to delete a database and its journal files.

use crate::error::CliError;
use crate::utils::{resolve_database_path, GlobalOptions};
use clap::Args;
use tabula::database::{database_files, delete_database_files};

/// Delete a database file together with its WAL and journal companions.
///
/// Succeeds even when nothing exists.
#[derive(Args)]
pub struct DeleteCommand {
    /// Database file name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Show what would be deleted without deleting it
    #[arg(long)]
    pub dry_run: bool,
}

impl DeleteCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let path = resolve_database_path(global, &self.name)?;

        if self.dry_run {
            if !global.quiet {
                eprintln!("[DRY RUN] Would delete:");
                for file in database_files(&path).iter().filter(|f| f.exists()) {
                    eprintln!("  {}", file.display());
                }
            }
            return Ok(());
        }

        let existed = delete_database_files(&path)?;

        if global.verbose {
            if existed {
                eprintln!("Deleted {}", path.display());
            } else {
                eprintln!("Nothing to delete at {}", path.display());
            }
        }

        Ok(())
    }
}
