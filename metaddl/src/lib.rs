//! # metaddl
//!
//! A schema difference engine: parse two meta schema definitions, classify
//! what changed and render a versioned SQL migration script.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient access.
//! You can depend on `metaddl` to get the whole engine, or depend on
//! individual crates for finer-grained control.
//!
//! ```rust
//! use metaddl::migrations::{diff, generate, PostgresGenerator};
//! use metaddl::schema::{parse, SchemaModel};
//!
//! let to = parse("TABLE T { COLUMN id BIGINT PRIMARY_KEY }").unwrap();
//! let changes = diff(&SchemaModel::new(), &to);
//! let script = generate(&changes, &mut PostgresGenerator::new(), 1).unwrap();
//! assert!(script.contains("CREATE TABLE T ("));
//! ```

/// Error types, settings and logging setup.
pub use metaddl_core as core;

/// The meta definition language: model, parser and writer.
pub use metaddl_schema as schema;

/// Change classification, dialect generators and script rendering.
pub use metaddl_migrations as migrations;

/// The `metaddl` command-line tool.
#[cfg(feature = "cli")]
pub use metaddl_cli as cli;

/// Re-exports of the most commonly used types.
pub mod prelude {
    pub use metaddl_core::{MetaddlError, MetaddlResult, Settings};
    pub use metaddl_migrations::{
        diff, generate, ChangeSet, DialectRegistry, MySqlGenerator, PostgresGenerator,
        SchemaChange, SchemaGenerator, ScriptOptions, ScriptWriter,
    };
    pub use metaddl_schema::{parse, SchemaModel};
}
