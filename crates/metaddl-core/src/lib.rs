//! # metaddl-core
//!
//! Foundation types for the metaddl schema difference engine. This crate has no
//! metaddl dependencies and is shared by the parser, the classifier, the script
//! generators and the CLI.
//!
//! ## Modules
//!
//! - [`error`] - The error taxonomy and result alias
//! - [`settings`] - Run configuration (dialect, version table, logging)
//! - [`settings_loader`] - Loading settings from TOML/JSON and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{MetaddlError, MetaddlResult, ParseError};
pub use settings::Settings;
