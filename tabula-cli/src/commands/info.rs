//! Command to display a database's stored version and tables.

use crate::error::CliError;
use crate::utils::{format_size, format_timestamp, inspect_database, GlobalOptions};
use clap::{Args, ValueEnum};
use std::io::Write;
use tabula::database::DatabaseInfo;

/// Display the stored schema version, tables and file metadata.
#[derive(Args)]
pub struct InfoCommand {
    /// Database file name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Output format
    #[arg(long, value_enum, default_value = "text", ignore_case = true)]
    pub format: OutputFormat,
}

/// Output format for the info command.
#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable key/value lines
    Text,
    /// JSON object
    Json,
}

impl InfoCommand {
    /// Execute the info command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let info = inspect_database(global, &self.name)?;

        match self.format {
            OutputFormat::Text => format_as_text(&info)?,
            OutputFormat::Json => format_as_json(&info)?,
        }

        Ok(())
    }
}

/// Format database info as aligned key/value lines.
fn format_as_text(info: &DatabaseInfo) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle, "path:     {}", info.path.display())?;
    writeln!(handle, "version:  {}", info.version)?;
    writeln!(handle, "size:     {}", format_size(info.size_bytes))?;
    if let Some(modified) = info.modified {
        writeln!(handle, "modified: {}", format_timestamp(modified))?;
    }

    if info.tables.is_empty() {
        writeln!(handle, "tables:   (none)")?;
    } else {
        writeln!(handle, "tables:")?;
        for table in &info.tables {
            writeln!(handle, "  {table}")?;
        }
    }

    Ok(())
}

/// Format database info as JSON.
fn format_as_json(info: &DatabaseInfo) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    let json_data = serde_json::json!({
        "path": info.path.display().to_string(),
        "version": info.version,
        "tables": info.tables,
        "size_bytes": info.size_bytes,
        "modified": info.modified.map(format_timestamp),
    });

    serde_json::to_writer_pretty(&mut handle, &json_data)
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;

    writeln!(handle)?;

    Ok(())
}
