//! Command to show the resolved path of a database.

use crate::error::CliError;
use crate::utils::{resolve_database_path, GlobalOptions};
use clap::Args;

/// Show the path a database name resolves to.
#[derive(Args)]
pub struct ShowPathCommand {
    /// Database file name
    #[arg(value_name = "NAME")]
    pub name: String,
}

impl ShowPathCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let path = resolve_database_path(global, &self.name)?;

        println!("{}", path.display());
        Ok(())
    }
}
