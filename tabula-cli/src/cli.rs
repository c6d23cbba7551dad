//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{
    AssertVersionCommand, CompletionsCommand, DeleteCommand, InfoCommand, ShowPathCommand,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line tool for inspecting and managing tabula databases.
#[derive(Parser)]
#[command(name = "tabula")]
#[command(version, about = "Inspect and manage tabula databases", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Override the data directory location
    #[arg(long, value_name = "PATH", global = true, env = "TABULA_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override the default busy timeout (in seconds)
    #[arg(long, value_name = "SECONDS", global = true, env = "TABULA_BUSY_TIMEOUT")]
    pub busy_timeout: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Show the resolved path of a database
    ShowPath(ShowPathCommand),

    /// Show the stored version and tables of a database
    Info(InfoCommand),

    /// Assert that a database is at a given schema version
    AssertVersion(AssertVersionCommand),

    /// Delete a database and its journal files
    Delete(DeleteCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
