//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `show_path`: Show the resolved path of a database
//! - `info`: Show the stored version and tables of a database
//! - `assert_version`: Assert the stored schema version
//! - `delete`: Delete a database and its journal files
//! - `completions`: Generate shell completion scripts

pub mod assert_version;
pub mod completions;
pub mod delete;
pub mod info;
pub mod show_path;

pub use assert_version::AssertVersionCommand;
pub use completions::CompletionsCommand;
pub use delete::DeleteCommand;
pub use info::InfoCommand;
pub use show_path::ShowPathCommand;
