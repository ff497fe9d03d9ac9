//! # metaddl-schema
//!
//! The schema snapshot model and the meta definition language that describes it.
//!
//! A meta definition is a hand-edited text file declaring tables, their columns,
//! keys and options, and views over those tables:
//!
//! ```text
//! # people and their organisations
//! TABLE org {
//!     COLUMN id BIGINT PRIMARY_KEY
//!     COLUMN name VARCHAR(100) MANDATORY
//! }
//!
//! TABLE person KEYTYPE LONG {
//!     COLUMN id BIGINT PRIMARY_KEY
//!     COLUMN org_id BIGINT FOREIGN_KEY(org)
//!     COLUMN name VARCHAR(50)
//! }
//! ```
//!
//! [`parse`] turns such text into an immutable [`SchemaModel`];
//! [`writer::to_meta`] renders a model back to canonical text.
//!
//! ## Modules
//!
//! - [`model`] - `SchemaModel`, `TableDef`, `ColumnDef`, `KeyDef`, `ViewDef`
//! - [`lexer`] - Tokenizer for meta source text
//! - [`parser`] - Two-pass parser producing a resolved `SchemaModel`
//! - [`writer`] - Canonical meta text rendering

#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]

pub mod lexer;
pub mod model;
pub mod parser;
pub mod writer;

pub use model::{
    ColumnDef, ColumnOption, ColumnRef, DataType, DefaultValue, FilterMarker, KeyDef, KeyKind,
    KeyReference, KeyType, SchemaModel, TableDef, ViewColumnRef, ViewDef, ViewJoin, ViewSource,
};
pub use parser::parse;
