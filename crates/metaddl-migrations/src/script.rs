//! Rendering a change set into a versioned migration script.
//!
//! [`ScriptWriter`] turns a [`ChangeSet`] into statements through a
//! [`SchemaGenerator`] and frames them with a header, an optional version
//! table bootstrap, the dialect's transaction statements and the trailing
//! version update.
//!
//! Statements are emitted in phases so that no statement refers to a table
//! that has already been dropped or is not yet created:
//!
//! 1. drop removed, altered and dependent views
//! 2. drop foreign keys that are going away
//! 3. drop removed tables, in reverse declaration order
//! 4. alter kept tables
//! 5. create added tables with their primary and unique keys
//! 6. add foreign keys
//! 7. create added and altered views

use std::collections::HashSet;
use std::fmt::Write as _;
use std::io;

use metaddl_core::logging::run_span;
use metaddl_core::{MetaddlResult, Settings};
use metaddl_schema::{KeyKind, TableDef};

use crate::changes::{ChangeSet, SchemaChange, TableAlteration};
use crate::recorder::VersionRecorder;
use crate::schema_editor::{CommentTarget, SchemaGenerator};

/// How the script around the change statements is framed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOptions {
    /// The table holding the schema version.
    pub version_table: String,
    /// The column holding the schema version.
    pub version_column: String,
    /// Whether to create and seed the version table if it is missing.
    pub ensure_version_table: bool,
    /// Whether to wrap the body in a transaction.
    pub transactional: bool,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for ScriptOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            version_table: settings.version_table.clone(),
            version_column: settings.version_column.clone(),
            ensure_version_table: settings.ensure_version_table,
            transactional: settings.transactional,
        }
    }
}

/// Renders change sets into migration scripts.
#[derive(Debug, Clone, Default)]
pub struct ScriptWriter {
    options: ScriptOptions,
}

impl ScriptWriter {
    /// Creates a writer with the given framing options.
    pub fn new(options: ScriptOptions) -> Self {
        Self { options }
    }

    /// Returns the framing options.
    pub fn options(&self) -> &ScriptOptions {
        &self.options
    }

    /// Returns the ordered change statements, without terminators or framing.
    ///
    /// # Errors
    ///
    /// Returns the first `UnsupportedChange` the generator reports.
    pub fn statements(
        &self,
        changes: &ChangeSet,
        generator: &mut dyn SchemaGenerator,
    ) -> MetaddlResult<Vec<String>> {
        let mut removed: Vec<&TableDef> = Vec::new();
        let mut altered: Vec<&TableAlteration> = Vec::new();
        let mut added: Vec<&TableDef> = Vec::new();
        for change in changes {
            match change {
                SchemaChange::TableRemoved(t) => removed.push(t),
                SchemaChange::TableAltered(a) => altered.push(a),
                SchemaChange::TableAdded(t) => added.push(t),
                _ => {}
            }
        }
        let removed_names: HashSet<&str> = removed.iter().map(|t| t.name.as_str()).collect();
        let mut out = Vec::new();

        // 1. views
        for change in changes {
            match change {
                SchemaChange::ViewRemoved(v) | SchemaChange::ViewAltered { from: v, .. } => {
                    out.extend(generator.drop_view(v)?);
                }
                _ => {}
            }
        }

        // 2. foreign keys
        for alteration in &altered {
            for key in alteration
                .dropped_keys
                .iter()
                .filter(|k| k.kind == KeyKind::Foreign)
            {
                out.extend(generator.drop_key(&alteration.table, key)?);
            }
        }
        for table in &removed {
            for key in table.foreign_keys().filter(|k| {
                k.references.as_ref().is_some_and(|r| {
                    r.table != table.name && removed_names.contains(r.table.as_str())
                })
            }) {
                out.extend(generator.drop_key(&table.name, key)?);
            }
        }

        // 3. removed tables
        for table in removed.iter().rev() {
            out.extend(generator.drop_table(table)?);
        }

        // 4. altered tables
        for alteration in &altered {
            out.extend(alter_table(generator, alteration)?);
        }

        // 5. added tables
        for table in &added {
            out.extend(generator.create_table(table)?);
        }

        // 6. new foreign keys
        for alteration in &altered {
            for key in alteration
                .added_keys
                .iter()
                .filter(|k| k.kind == KeyKind::Foreign)
            {
                out.extend(generator.add_key(&alteration.table, key)?);
            }
        }
        for table in &added {
            for key in table.foreign_keys() {
                out.extend(generator.add_key(&table.name, key)?);
            }
        }

        // 7. views
        for change in changes {
            match change {
                SchemaChange::ViewAdded(v) | SchemaChange::ViewAltered { to: v, .. } => {
                    out.extend(generator.create_view(v)?);
                }
                _ => {}
            }
        }

        Ok(out)
    }

    /// Renders the complete script for `version`.
    ///
    /// The generator is reset first, so one instance can render several
    /// scripts one after another. Nothing is returned unless every change
    /// could be rendered.
    pub fn render(
        &self,
        changes: &ChangeSet,
        generator: &mut dyn SchemaGenerator,
        version: u32,
    ) -> MetaddlResult<String> {
        let span = run_span(generator.name(), version);
        let _guard = span.enter();

        generator.reset();
        let body = self.statements(changes, generator)?;
        let recorder = VersionRecorder::new(
            self.options.version_table.clone(),
            self.options.version_column.clone(),
        );
        let ensure = if self.options.ensure_version_table {
            recorder.ensure_table_sql(generator)?
        } else {
            Vec::new()
        };
        let update = recorder.update_version_sql(generator, version);
        let terminator = generator.terminator();

        let mut script = String::new();
        let _ = writeln!(
            script,
            "-- metaddl {} migration script",
            env!("CARGO_PKG_VERSION")
        );
        let _ = writeln!(script, "-- dialect: {}", generator.name());
        let _ = writeln!(script, "-- schema version: {version}");
        if !ensure.is_empty() {
            script.push_str("-- Ensure Version Table\n");
            for stmt in &ensure {
                let _ = writeln!(script, "{stmt}{terminator}");
            }
        }
        if self.options.transactional {
            for stmt in generator.begin() {
                let _ = writeln!(script, "{stmt}{terminator}");
            }
        }
        for stmt in &body {
            let _ = writeln!(script, "{stmt}{terminator}");
        }
        script.push_str("-- Update Version\n");
        let _ = writeln!(script, "{update}{terminator}");
        if self.options.transactional {
            for stmt in generator.commit() {
                let _ = writeln!(script, "{stmt}{terminator}");
            }
        }

        tracing::info!(
            changes = changes.len(),
            statements = body.len(),
            "rendered migration script"
        );
        Ok(script)
    }

    /// Renders the script and writes it to `sink` in one piece.
    ///
    /// # Errors
    ///
    /// Generation errors are returned before anything is written; write
    /// failures surface as `IoError`.
    pub fn write_to<W: io::Write + ?Sized>(
        &self,
        changes: &ChangeSet,
        generator: &mut dyn SchemaGenerator,
        version: u32,
        sink: &mut W,
    ) -> MetaddlResult<()> {
        let script = self.render(changes, generator, version)?;
        sink.write_all(script.as_bytes())?;
        sink.flush()?;
        Ok(())
    }
}

/// Renders a change set with the default framing options.
///
/// # Examples
///
/// ```
/// use metaddl_migrations::{diff, generate, PostgresGenerator};
/// use metaddl_schema::parse;
///
/// let from = parse("TABLE T { COLUMN id BIGINT PRIMARY_KEY }").unwrap();
/// let to = parse("").unwrap();
/// let script = generate(&diff(&from, &to), &mut PostgresGenerator::new(), 2).unwrap();
/// assert!(script.contains("\nDROP TABLE T;\n"));
/// assert!(script.contains("UPDATE schema_version SET version = 2;"));
/// ```
pub fn generate(
    changes: &ChangeSet,
    generator: &mut dyn SchemaGenerator,
    version: u32,
) -> MetaddlResult<String> {
    ScriptWriter::default().render(changes, generator, version)
}

fn alter_table(
    generator: &mut dyn SchemaGenerator,
    alteration: &TableAlteration,
) -> MetaddlResult<Vec<String>> {
    let table = alteration.table.as_str();
    let mut out = Vec::new();
    for key in alteration
        .dropped_keys
        .iter()
        .filter(|k| k.kind != KeyKind::Foreign)
    {
        out.extend(generator.drop_key(table, key)?);
    }
    for column in &alteration.dropped_columns {
        out.extend(generator.drop_column(table, column)?);
    }
    for column in &alteration.added_columns {
        out.extend(generator.add_column(table, column)?);
    }
    for change in &alteration.altered_columns {
        out.extend(generator.alter_column(table, change)?);
    }
    for key in alteration
        .added_keys
        .iter()
        .filter(|k| k.kind != KeyKind::Foreign)
    {
        out.extend(generator.add_key(table, key)?);
    }
    if let Some(comment) = &alteration.comment {
        out.extend(generator.comment(CommentTarget::Table {
            table,
            comment: comment.to.as_deref(),
        })?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autodetect::diff;
    use crate::mysql::MySqlGenerator;
    use crate::postgres::PostgresGenerator;
    use metaddl_schema::parse;

    fn body(script: &str) -> Vec<&str> {
        script
            .lines()
            .filter(|l| !l.starts_with("--"))
            .collect()
    }

    // ── Framing ─────────────────────────────────────────────────────

    #[test]
    fn test_empty_change_set_has_only_framing() {
        let model = parse("TABLE T { COLUMN id BIGINT PRIMARY_KEY }").unwrap();
        let script = generate(&diff(&model, &model), &mut PostgresGenerator::new(), 3).unwrap();
        let expected = format!(
            "-- metaddl {} migration script\n\
             -- dialect: postgres\n\
             -- schema version: 3\n\
             BEGIN;\n\
             -- Update Version\n\
             UPDATE schema_version SET version = 3;\n\
             COMMIT;\n",
            env!("CARGO_PKG_VERSION")
        );
        assert_eq!(script, expected);
    }

    #[test]
    fn test_non_transactional_with_version_table() {
        let writer = ScriptWriter::new(ScriptOptions {
            ensure_version_table: true,
            transactional: false,
            ..ScriptOptions::default()
        });
        let script = writer
            .render(&ChangeSet::default(), &mut MySqlGenerator::new(), 1)
            .unwrap();
        assert!(!script.contains("START TRANSACTION"));
        assert!(script.contains("-- Ensure Version Table\nCREATE TABLE IF NOT EXISTS `schema_version`"));
        assert!(script.ends_with("UPDATE `schema_version` SET `version` = 1;\n"));
    }

    #[test]
    fn test_options_from_settings() {
        let settings = Settings {
            transactional: false,
            version_table: "v".into(),
            ..Settings::default()
        };
        let options = ScriptOptions::from(&settings);
        assert!(!options.transactional);
        assert_eq!(options.version_table, "v");
        assert_eq!(options.version_column, "version");
    }

    // ── Phases ──────────────────────────────────────────────────────

    #[test]
    fn test_drop_table() {
        let from = parse("TABLE T { COLUMN id BIGINT PRIMARY_KEY }").unwrap();
        let to = parse("").unwrap();
        let script = generate(&diff(&from, &to), &mut PostgresGenerator::new(), 2).unwrap();
        assert_eq!(script.matches("DROP TABLE T;").count(), 1);
        assert_eq!(
            body(&script),
            vec![
                "BEGIN;",
                "DROP TABLE T;",
                "UPDATE schema_version SET version = 2;",
                "COMMIT;"
            ]
        );
    }

    #[test]
    fn test_removed_tables_drop_foreign_keys_first() {
        let from = parse(
            "TABLE a { COLUMN id BIGINT PRIMARY_KEY }\n\
             TABLE b { COLUMN id BIGINT PRIMARY_KEY COLUMN a_id BIGINT FOREIGN_KEY(a) }",
        )
        .unwrap();
        let to = parse("").unwrap();
        let stmts = ScriptWriter::default()
            .statements(&diff(&from, &to), &mut PostgresGenerator::new())
            .unwrap();
        assert_eq!(
            stmts,
            vec![
                "ALTER TABLE b DROP CONSTRAINT b_a_id_fkey",
                "DROP TABLE b",
                "DROP TABLE a"
            ]
        );
    }

    #[test]
    fn test_added_tables_add_foreign_keys_after_creation() {
        let from = parse("").unwrap();
        let to = parse(
            "TABLE child { COLUMN id BIGINT PRIMARY_KEY COLUMN p_id BIGINT FOREIGN_KEY(parent) }\n\
             TABLE parent { COLUMN id BIGINT PRIMARY_KEY }",
        )
        .unwrap();
        let stmts = ScriptWriter::default()
            .statements(&diff(&from, &to), &mut PostgresGenerator::new())
            .unwrap();
        assert_eq!(stmts.len(), 3);
        assert!(stmts[0].starts_with("CREATE TABLE child"));
        assert!(stmts[1].starts_with("CREATE TABLE parent"));
        assert_eq!(
            stmts[2],
            "ALTER TABLE child ADD CONSTRAINT child_p_id_fkey FOREIGN KEY (p_id) REFERENCES parent (id)"
        );
    }

    #[test]
    fn test_altered_table_phase_order() {
        let from = parse(
            "TABLE t {\n\
                COLUMN id BIGINT PRIMARY_KEY\n\
                COLUMN old INTEGER\n\
                COLUMN name VARCHAR(50)\n\
                KEY uq_old UNIQUE (old)\n\
             }",
        )
        .unwrap();
        let to = parse(
            "TABLE t {\n\
                COMMENT 'things'\n\
                COLUMN id BIGINT PRIMARY_KEY\n\
                COLUMN name VARCHAR(100)\n\
                COLUMN code CHAR(3)\n\
                KEY uq_code UNIQUE (code)\n\
             }",
        )
        .unwrap();
        let stmts = ScriptWriter::default()
            .statements(&diff(&from, &to), &mut PostgresGenerator::new())
            .unwrap();
        assert_eq!(
            stmts,
            vec![
                "ALTER TABLE t DROP CONSTRAINT uq_old",
                "ALTER TABLE t DROP COLUMN old",
                "ALTER TABLE t ADD COLUMN code char(3)",
                "ALTER TABLE t ALTER COLUMN name TYPE varchar(100)",
                "ALTER TABLE t ADD CONSTRAINT uq_code UNIQUE (code)",
                "COMMENT ON TABLE t IS 'things'"
            ]
        );
    }

    #[test]
    fn test_dependent_view_dropped_and_recreated() {
        let from = parse(
            "TABLE t { COLUMN id BIGINT PRIMARY_KEY COLUMN n VARCHAR(10) }\n\
             VIEW v FROM t { COLUMN n = t.n }",
        )
        .unwrap();
        let to = parse(
            "TABLE t { COLUMN id BIGINT PRIMARY_KEY COLUMN n VARCHAR(20) }\n\
             VIEW v FROM t { COLUMN n = t.n }",
        )
        .unwrap();
        let stmts = ScriptWriter::default()
            .statements(&diff(&from, &to), &mut PostgresGenerator::new())
            .unwrap();
        assert_eq!(
            stmts,
            vec![
                "DROP VIEW v",
                "ALTER TABLE t ALTER COLUMN n TYPE varchar(20)",
                "CREATE VIEW v AS\nSELECT t.n AS n\nFROM t"
            ]
        );
    }

    // ── Failures ────────────────────────────────────────────────────

    #[test]
    fn test_unsupported_change_writes_nothing() {
        let from = parse("").unwrap();
        let to = parse("TABLE doc { COLUMN body CLOB DEFAULT('x') }").unwrap();
        let mut sink: Vec<u8> = Vec::new();
        let err = ScriptWriter::default()
            .write_to(&diff(&from, &to), &mut MySqlGenerator::new(), 1, &mut sink)
            .unwrap_err();
        assert_eq!(err.kind(), "unsupported_change");
        assert!(sink.is_empty());
    }

    #[test]
    fn test_write_to_sink() {
        let from = parse("").unwrap();
        let to = parse("TABLE T { COLUMN id BIGINT PRIMARY_KEY }").unwrap();
        let mut sink: Vec<u8> = Vec::new();
        ScriptWriter::default()
            .write_to(&diff(&from, &to), &mut PostgresGenerator::new(), 1, &mut sink)
            .unwrap();
        let text = String::from_utf8(sink).unwrap();
        assert!(text.contains("CREATE TABLE T (\n    id bigint NOT NULL,\n    CONSTRAINT T_pkey PRIMARY KEY (id)\n);"));
    }

    #[test]
    fn test_generator_reused_across_renders() {
        let from = parse("").unwrap();
        let to = parse("TABLE T { COLUMN id BIGINT PRIMARY_KEY }").unwrap();
        let changes = diff(&from, &to);
        let mut generator = PostgresGenerator::new();
        let first = generate(&changes, &mut generator, 1).unwrap();
        let second = generate(&changes, &mut generator, 1).unwrap();
        assert_eq!(first, second);
    }
}
