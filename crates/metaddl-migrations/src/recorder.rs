//! Schema version bookkeeping.
//!
//! A [`VersionRecorder`] produces the statements that persist the schema
//! version a script brings the database to. The version lives in a single-row
//! table (`schema_version.version` by default) so later runs and deployment
//! tooling can tell which migration was applied last.

use metaddl_core::{MetaddlResult, Settings};
use metaddl_schema::{ColumnDef, DataType};

use crate::schema_editor::SchemaGenerator;

/// Builds the version table statements for a generator's dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecorder {
    table: String,
    column: String,
}

impl VersionRecorder {
    /// Creates a recorder for `table.column`.
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Returns the version table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the version column name.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Returns statements that create and seed the version table when it is
    /// missing. Both are safe to run against an existing table.
    pub fn ensure_table_sql(&self, generator: &dyn SchemaGenerator) -> MetaddlResult<Vec<String>> {
        let column = ColumnDef::new(self.column.clone(), DataType::Integer).mandatory();
        let table = generator.quote(&self.table);
        let column_name = generator.quote(&self.column);
        Ok(vec![
            format!(
                "CREATE TABLE IF NOT EXISTS {table} ({column_name} {})",
                generator.column_sql(&self.table, &column)?
            ),
            format!(
                "INSERT INTO {table} ({column_name}) SELECT 0 FROM (SELECT 1) AS seed \
                 WHERE NOT EXISTS (SELECT 1 FROM {table})"
            ),
        ])
    }

    /// Returns the statement persisting `version`.
    pub fn update_version_sql(&self, generator: &dyn SchemaGenerator, version: u32) -> String {
        format!(
            "UPDATE {} SET {} = {version}",
            generator.quote(&self.table),
            generator.quote(&self.column)
        )
    }
}

impl Default for VersionRecorder {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for VersionRecorder {
    fn from(settings: &Settings) -> Self {
        Self::new(settings.version_table.clone(), settings.version_column.clone())
    }
}
