//! The PostgreSQL script generator.

use metaddl_core::{MetaddlError, MetaddlResult};
use metaddl_schema::{ColumnDef, DataType, KeyDef, KeyKind, TableDef, ViewDef};

use crate::changes::ColumnChange;
use crate::naming::ConstraintNamer;
use crate::schema_editor::{
    check_default, comment_literal, element, key_clause, type_family, view_query, CommentTarget,
    SchemaGenerator,
};

/// PostgreSQL limits identifiers to 63 bytes.
pub const POSTGRES_IDENTIFIER_LIMIT: usize = 63;

/// Keywords PostgreSQL never accepts as a bare table or column name: the
/// `reserved` and `reserved (can be function or type)` classes. Sorted.
const RESERVED_KEYWORDS: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric",
    "authorization", "binary", "both", "case", "cast", "check", "collate", "collation",
    "column", "concurrently", "constraint", "create", "cross", "current_catalog",
    "current_date", "current_role", "current_schema", "current_time", "current_timestamp",
    "current_user", "default", "deferrable", "desc", "distinct", "do", "else", "end",
    "except", "false", "fetch", "for", "foreign", "freeze", "from", "full", "grant",
    "group", "having", "ilike", "in", "initially", "inner", "intersect", "into", "is",
    "isnull", "join", "lateral", "leading", "left", "like", "limit", "localtime",
    "localtimestamp", "natural", "not", "notnull", "null", "offset", "on", "only", "or",
    "order", "outer", "overlaps", "placing", "primary", "references", "returning", "right",
    "select", "session_user", "similar", "some", "symmetric", "system_user", "table",
    "tablesample", "then", "to", "trailing", "true", "union", "unique", "user", "using",
    "variadic", "verbose", "when", "where", "window", "with",
];

/// Script generator for PostgreSQL.
///
/// Identifiers are emitted unquoted, so names keep PostgreSQL's case folding.
/// Reserved keywords are the exception: they are double-quoted in their
/// folded lowercase spelling, which names the same object.
/// Column changes become one `ALTER COLUMN` statement per changed attribute,
/// and a type change across type families adds a `USING` cast.
#[derive(Debug, Clone)]
pub struct PostgresGenerator {
    namer: ConstraintNamer,
}

impl PostgresGenerator {
    /// The dialect name.
    pub const NAME: &'static str = "postgres";

    /// Creates a generator with an empty constraint namer.
    pub fn new() -> Self {
        Self {
            namer: ConstraintNamer::new(Self::NAME, POSTGRES_IDENTIFIER_LIMIT),
        }
    }

    fn alter(&self, table: &str, column: &str, action: &str) -> String {
        format!(
            "ALTER TABLE {} ALTER COLUMN {} {action}",
            self.quote(table),
            self.quote(column)
        )
    }

    fn column_comment(&self, table: &str, column: &ColumnDef) -> String {
        format!(
            "COMMENT ON COLUMN {}.{} IS {}",
            self.quote(table),
            self.quote(&column.name),
            comment_literal(column.comment.as_deref())
        )
    }
}

impl Default for PostgresGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaGenerator for PostgresGenerator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn quote(&self, ident: &str) -> String {
        let folded = ident.to_ascii_lowercase();
        if RESERVED_KEYWORDS.binary_search(&folded.as_str()).is_ok() {
            format!("\"{folded}\"")
        } else {
            ident.to_string()
        }
    }

    fn column_type(&self, data_type: &DataType) -> String {
        pg_type_sql(data_type)
    }

    fn column_sql(&self, table: &str, column: &ColumnDef) -> MetaddlResult<String> {
        check_default(Self::NAME, table, column)?;
        let mut sql = self.column_type(&column.data_type);
        if let Some(value) = column.default() {
            sql.push_str(&format!(" DEFAULT {}", value.to_sql()));
        }
        if !column.is_nullable() {
            sql.push_str(" NOT NULL");
        }
        Ok(sql)
    }

    fn create_table(&mut self, table: &TableDef) -> MetaddlResult<Vec<String>> {
        let mut parts = Vec::with_capacity(table.columns.len() + table.keys.len());
        for column in &table.columns {
            parts.push(format!(
                "    {} {}",
                self.quote(&column.name),
                self.column_sql(&table.name, column)?
            ));
        }
        for key in table.keys.iter().filter(|k| k.kind != KeyKind::Foreign) {
            let clause = key_clause(Self::NAME, &table.name, key, |s| self.quote(s))?;
            let name = self.namer.name(&table.name, key)?;
            parts.push(format!("    CONSTRAINT {} {clause}", self.quote(&name)));
        }

        let mut stmts = vec![format!(
            "CREATE TABLE {} (\n{}\n)",
            self.quote(&table.name),
            parts.join(",\n")
        )];
        if let Some(comment) = &table.comment {
            stmts.extend(self.comment(CommentTarget::Table {
                table: &table.name,
                comment: Some(comment.as_str()),
            })?);
        }
        for column in table.columns.iter().filter(|c| c.comment.is_some()) {
            stmts.push(self.column_comment(&table.name, column));
        }
        Ok(stmts)
    }

    fn drop_table(&mut self, table: &TableDef) -> MetaddlResult<Vec<String>> {
        Ok(vec![format!("DROP TABLE {}", self.quote(&table.name))])
    }

    fn add_column(&mut self, table: &str, column: &ColumnDef) -> MetaddlResult<Vec<String>> {
        let mut stmts = vec![format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            self.quote(table),
            self.quote(&column.name),
            self.column_sql(table, column)?
        )];
        if column.comment.is_some() {
            stmts.push(self.column_comment(table, column));
        }
        Ok(stmts)
    }

    fn drop_column(&mut self, table: &str, column: &ColumnDef) -> MetaddlResult<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.quote(table),
            self.quote(&column.name)
        )])
    }

    fn alter_column(&mut self, table: &str, change: &ColumnChange) -> MetaddlResult<Vec<String>> {
        let (from, to) = (&change.from, &change.to);
        let name = change.name();
        let mut stmts = Vec::new();

        // An old default may not cast to the new type; drop it first.
        let mut default_dropped = false;
        if change.type_changed() {
            if from.data_type == DataType::Blob || to.data_type == DataType::Blob {
                return Err(MetaddlError::unsupported(
                    Self::NAME,
                    element(table, name),
                    format!(
                        "cannot convert between {} and {} in place",
                        from.data_type, to.data_type
                    ),
                ));
            }
            if from.default().is_some() {
                stmts.push(self.alter(table, name, "DROP DEFAULT"));
                default_dropped = true;
            }
            let type_sql = self.column_type(&to.data_type);
            if type_family(&from.data_type) == type_family(&to.data_type) {
                stmts.push(self.alter(table, name, &format!("TYPE {type_sql}")));
            } else {
                let cast = format!("TYPE {type_sql} USING {}::{type_sql}", self.quote(name));
                stmts.push(self.alter(table, name, &cast));
            }
        }

        if change.default_changed() || default_dropped {
            check_default(Self::NAME, table, to)?;
            match to.default() {
                Some(value) => {
                    stmts.push(self.alter(table, name, &format!("SET DEFAULT {}", value.to_sql())));
                }
                None if !default_dropped => stmts.push(self.alter(table, name, "DROP DEFAULT")),
                None => {}
            }
        }

        if change.nullability_changed() {
            let action = if to.is_nullable() {
                "DROP NOT NULL"
            } else {
                "SET NOT NULL"
            };
            stmts.push(self.alter(table, name, action));
        }

        if change.comment_changed() {
            stmts.push(self.column_comment(table, to));
        }
        Ok(stmts)
    }

    fn add_key(&mut self, table: &str, key: &KeyDef) -> MetaddlResult<Vec<String>> {
        let clause = key_clause(Self::NAME, table, key, |s| self.quote(s))?;
        let name = self.namer.name(table, key)?;
        Ok(vec![format!(
            "ALTER TABLE {} ADD CONSTRAINT {} {clause}",
            self.quote(table),
            self.quote(&name)
        )])
    }

    fn drop_key(&mut self, table: &str, key: &KeyDef) -> MetaddlResult<Vec<String>> {
        let name = self.namer.existing_name(table, key);
        Ok(vec![format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.quote(table),
            self.quote(&name)
        )])
    }

    fn create_view(&mut self, view: &ViewDef) -> MetaddlResult<Vec<String>> {
        let query = view_query(Self::NAME, view, |s| self.quote(s), |i| format!("${i}"))?;
        Ok(vec![format!(
            "CREATE VIEW {} AS\n{query}",
            self.quote(&view.name)
        )])
    }

    fn drop_view(&mut self, view: &ViewDef) -> MetaddlResult<Vec<String>> {
        Ok(vec![format!("DROP VIEW {}", self.quote(&view.name))])
    }

    fn comment(&mut self, target: CommentTarget<'_>) -> MetaddlResult<Vec<String>> {
        Ok(vec![match target {
            CommentTarget::Table { table, comment } => format!(
                "COMMENT ON TABLE {} IS {}",
                self.quote(table),
                comment_literal(comment)
            ),
            CommentTarget::Column { table, column } => self.column_comment(table, column),
        }])
    }

    fn begin(&self) -> Vec<String> {
        vec!["BEGIN".to_string()]
    }

    fn commit(&self) -> Vec<String> {
        vec!["COMMIT".to_string()]
    }

    fn reset(&mut self) {
        self.namer.reset();
    }
}

/// Maps a column type to PostgreSQL.
fn pg_type_sql(data_type: &DataType) -> String {
    match data_type {
        DataType::Integer => "integer".into(),
        DataType::BigInt => "bigint".into(),
        DataType::SmallInt => "smallint".into(),
        DataType::Varchar { length } => format!("varchar({length})"),
        DataType::Char { length } => format!("char({length})"),
        DataType::Clob => "text".into(),
        DataType::Decimal { precision, scale } => format!("numeric({precision},{scale})"),
        DataType::Double => "double precision".into(),
        DataType::Date => "date".into(),
        DataType::Time => "time".into(),
        DataType::Timestamp => "timestamp".into(),
        DataType::Boolean => "boolean".into(),
        DataType::Blob => "bytea".into(),
    }
}
