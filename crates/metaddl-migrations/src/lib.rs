//! # metaddl-migrations
//!
//! The difference engine of metaddl: classifies what changed between two schema
//! snapshots and renders those changes as a versioned SQL migration script.
//!
//! ## Architecture
//!
//! - [`SchemaDiffer`] compares two [`SchemaModel`](metaddl_schema::SchemaModel)s
//!   and produces an ordered [`ChangeSet`].
//! - [`SchemaGenerator`] translates individual changes into dialect DDL;
//!   [`PostgresGenerator`] and [`MySqlGenerator`] are bundled.
//! - [`DialectRegistry`] resolves a dialect name to a fresh generator.
//! - [`ScriptWriter`] orders the statements, frames them and appends the
//!   version update built by [`VersionRecorder`].
//!
//! ## Module Overview
//!
//! - [`changes`] - `ChangeSet`, `SchemaChange`, `TableAlteration`
//! - [`autodetect`] - `SchemaDiffer`, `diff`
//! - [`schema_editor`] - `SchemaGenerator` trait and shared DDL helpers
//! - [`postgres`] - `PostgresGenerator`
//! - [`mysql`] - `MySqlGenerator`
//! - [`naming`] - `ConstraintNamer` for anonymous keys
//! - [`registry`] - `DialectRegistry`
//! - [`recorder`] - `VersionRecorder`
//! - [`script`] - `ScriptWriter`, `ScriptOptions`, `generate`

// Clippy overrides appropriate for a DDL generation crate.
#![allow(clippy::too_many_lines)]
#![allow(clippy::result_large_err)]
#![allow(clippy::format_push_string)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::use_self)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::unnecessary_literal_bound)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::cognitive_complexity)]

pub mod autodetect;
pub mod changes;
pub mod mysql;
pub mod naming;
pub mod postgres;
pub mod recorder;
pub mod registry;
pub mod schema_editor;
pub mod script;

// Re-export key types at the crate root.
pub use autodetect::{diff, SchemaDiffer};
pub use changes::{
    ChangeSet, ColumnChange, CommentChange, RenameCandidate, SchemaChange, TableAlteration,
};
pub use mysql::MySqlGenerator;
pub use naming::{ConstraintNamer, NameScope};
pub use postgres::PostgresGenerator;
pub use recorder::VersionRecorder;
pub use registry::{DialectRegistry, GeneratorFactory};
pub use schema_editor::{CommentTarget, SchemaGenerator};
pub use script::{generate, ScriptOptions, ScriptWriter};
