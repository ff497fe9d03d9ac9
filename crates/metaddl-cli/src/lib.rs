//! # metaddl-cli
//!
//! The `metaddl` command-line tool.
//!
//! This crate provides:
//!
//! - **Command framework** - the [`Command`] trait and [`CommandRegistry`]
//!   for defining and dispatching subcommands
//! - **Built-in commands** - `diff`, `check` and `dialects`
//! - **Settings resolution** - global `--config` and `--log-level` options
//!   layered over `METADDL_*` environment variables
//!
//! Generated scripts go to stdout or the `--output` file; all logging goes
//! to stderr.
//!
//! ## Quick Start
//!
//! ```rust
//! use metaddl_cli::command::CommandRegistry;
//! use metaddl_cli::commands::register_builtin_commands;
//!
//! let mut registry = CommandRegistry::new();
//! register_builtin_commands(&mut registry);
//!
//! let names = registry.list_commands();
//! assert_eq!(names, vec!["check", "dialects", "diff"]);
//! ```

// These clippy lints are intentionally allowed:
// - result_large_err: MetaddlError is the crate-wide error type
// - doc_markdown: backtick requirements for documentation items are too strict
// - missing_const_for_fn: some functions may gain runtime logic later
// - module_name_repetitions: re-exports make module-prefixed names redundant
// - unused_async: command handlers maintain consistent async signatures
#![allow(clippy::result_large_err)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::unused_async)]

pub mod command;
pub mod commands;

pub use command::{load_settings, Command, CommandRegistry};
pub use commands::{register_builtin_commands, CheckCommand, DialectsCommand, DiffCommand};

use metaddl_core::logging::setup_logging;
use metaddl_core::MetaddlResult;

/// Resolves settings, installs logging and dispatches the chosen subcommand.
pub async fn run(registry: &CommandRegistry, matches: &clap::ArgMatches) -> MetaddlResult<()> {
    let settings = load_settings(matches)?;
    setup_logging(&settings);
    tracing::debug!(dialect = %settings.dialect, "settings resolved");
    registry.execute(matches, &settings).await
}
