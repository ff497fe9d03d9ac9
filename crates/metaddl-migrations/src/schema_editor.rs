//! The dialect-neutral DDL generation interface.
//!
//! The [`SchemaGenerator`] trait defines one capability per kind of schema
//! change. Each SQL dialect has its own implementation producing literal
//! statements (without terminators) or refusing a change it cannot express
//! with [`MetaddlError::UnsupportedChange`]. The helpers below are shared by
//! the concrete generators.

use metaddl_core::{MetaddlError, MetaddlResult};
use metaddl_schema::model::quote_literal;
use metaddl_schema::{
    ColumnDef, DataType, DefaultValue, KeyDef, KeyKind, TableDef, ViewDef, ViewSource,
};

use crate::changes::ColumnChange;
use crate::mysql::MySqlGenerator;

/// What a comment is attached to.
#[derive(Debug, Clone, Copy)]
pub enum CommentTarget<'a> {
    /// A table comment; `None` clears it.
    Table {
        /// The table name.
        table: &'a str,
        /// The new comment.
        comment: Option<&'a str>,
    },
    /// A column comment, taken from the column definition.
    Column {
        /// The table name.
        table: &'a str,
        /// The full column definition.
        column: &'a ColumnDef,
    },
}

/// Generates DDL statements for one SQL dialect.
///
/// Generators may keep per-run state (constraint names handed out so far),
/// so every run must use its own instance or call [`SchemaGenerator::reset`]
/// first. Instances can be moved to other threads but are never shared.
pub trait SchemaGenerator: Send {
    /// Returns the dialect name written into script headers.
    fn name(&self) -> &'static str;

    /// Quotes an identifier as the dialect requires.
    fn quote(&self, ident: &str) -> String;

    /// Returns the dialect type for a column type.
    fn column_type(&self, data_type: &DataType) -> String;

    /// Returns the column definition fragment after the column name
    /// (type, default, nullability).
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedChange` if an option cannot be expressed.
    fn column_sql(&self, table: &str, column: &ColumnDef) -> MetaddlResult<String>;

    /// Creates a table with its primary and unique keys inline, plus comments.
    /// Foreign keys are added separately with [`SchemaGenerator::add_key`].
    fn create_table(&mut self, table: &TableDef) -> MetaddlResult<Vec<String>>;

    /// Drops a table.
    fn drop_table(&mut self, table: &TableDef) -> MetaddlResult<Vec<String>>;

    /// Adds a column to an existing table.
    fn add_column(&mut self, table: &str, column: &ColumnDef) -> MetaddlResult<Vec<String>>;

    /// Drops a column.
    fn drop_column(&mut self, table: &str, column: &ColumnDef) -> MetaddlResult<Vec<String>>;

    /// Alters a column's type, nullability, default or comment.
    fn alter_column(&mut self, table: &str, change: &ColumnChange) -> MetaddlResult<Vec<String>>;

    /// Adds a primary, unique or foreign key.
    fn add_key(&mut self, table: &str, key: &KeyDef) -> MetaddlResult<Vec<String>>;

    /// Drops a primary, unique or foreign key.
    fn drop_key(&mut self, table: &str, key: &KeyDef) -> MetaddlResult<Vec<String>>;

    /// Creates a view.
    fn create_view(&mut self, view: &ViewDef) -> MetaddlResult<Vec<String>>;

    /// Drops a view.
    fn drop_view(&mut self, view: &ViewDef) -> MetaddlResult<Vec<String>>;

    /// Sets or clears a table or column comment.
    fn comment(&mut self, target: CommentTarget<'_>) -> MetaddlResult<Vec<String>>;

    /// Statements opening the script's transaction.
    fn begin(&self) -> Vec<String>;

    /// Statements committing the script's transaction.
    fn commit(&self) -> Vec<String>;

    /// Clears per-run state.
    fn reset(&mut self);

    /// The statement terminator.
    fn terminator(&self) -> &'static str {
        ";"
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────

/// Broad type groups; values convert implicitly only within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeFamily {
    Numeric,
    Text,
    Temporal,
    Boolean,
    Binary,
}

pub(crate) const fn type_family(data_type: &DataType) -> TypeFamily {
    match data_type {
        DataType::Integer
        | DataType::BigInt
        | DataType::SmallInt
        | DataType::Decimal { .. }
        | DataType::Double => TypeFamily::Numeric,
        DataType::Varchar { .. } | DataType::Char { .. } | DataType::Clob => TypeFamily::Text,
        DataType::Date | DataType::Time | DataType::Timestamp => TypeFamily::Temporal,
        DataType::Boolean => TypeFamily::Boolean,
        DataType::Blob => TypeFamily::Binary,
    }
}

/// Formats `table.column` for error messages.
pub(crate) fn element(table: &str, column: &str) -> String {
    format!("{table}.{column}")
}

/// Rejects defaults whose literal cannot be stored in the column's type.
pub(crate) fn check_default(dialect: &str, table: &str, column: &ColumnDef) -> MetaddlResult<()> {
    let Some(value) = column.default() else {
        return Ok(());
    };
    let family = type_family(&column.data_type);
    let fits = match value {
        DefaultValue::Bool(_) => family == TypeFamily::Boolean,
        DefaultValue::Int(_) => matches!(family, TypeFamily::Numeric | TypeFamily::Text),
        DefaultValue::Text(text) => text_fits(dialect, &column.data_type, text),
        DefaultValue::Null | DefaultValue::Expression(_) => true,
    };
    if fits {
        Ok(())
    } else {
        Err(MetaddlError::unsupported(
            dialect,
            element(table, &column.name),
            format!("DEFAULT {value} does not fit type {}", column.data_type),
        ))
    }
}

/// Whether a quoted literal converts to a numeric or boolean column type.
/// Other types take any text; the database validates it.
fn text_fits(dialect: &str, data_type: &DataType, text: &str) -> bool {
    let text = text.trim();
    match data_type {
        DataType::SmallInt => text.parse::<i16>().is_ok(),
        DataType::Integer => text.parse::<i32>().is_ok(),
        DataType::BigInt => text.parse::<i64>().is_ok(),
        DataType::Decimal { .. } | DataType::Double => {
            text.parse::<f64>().is_ok_and(f64::is_finite)
        }
        DataType::Boolean => {
            // tinyint(1) in MySQL only takes numbers
            matches!(text, "0" | "1")
                || (dialect != MySqlGenerator::NAME
                    && matches!(
                        text.to_ascii_lowercase().as_str(),
                        "true" | "false" | "t" | "f" | "yes" | "no" | "y" | "n" | "on" | "off"
                    ))
        }
        _ => true,
    }
}

/// Renders a comment literal, `NULL` when absent.
pub(crate) fn comment_literal(comment: Option<&str>) -> String {
    comment.map_or_else(|| "NULL".to_string(), quote_literal)
}

/// Quotes and joins a column list.
pub(crate) fn column_list<Q: Fn(&str) -> String>(columns: &[String], quote: Q) -> String {
    columns
        .iter()
        .map(|c| quote(c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The constraint clause after `CONSTRAINT name`.
pub(crate) fn key_clause<Q: Fn(&str) -> String>(
    dialect: &str,
    table: &str,
    key: &KeyDef,
    quote: Q,
) -> MetaddlResult<String> {
    let columns = column_list(&key.columns, &quote);
    match key.kind {
        KeyKind::Primary => Ok(format!("PRIMARY KEY ({columns})")),
        KeyKind::Unique => Ok(format!("UNIQUE ({columns})")),
        KeyKind::Foreign => {
            let reference = key.references.as_ref().ok_or_else(|| {
                MetaddlError::unsupported(
                    dialect,
                    format!("{table} ({})", key.columns.join(", ")),
                    "foreign key without a referenced table",
                )
            })?;
            Ok(format!(
                "FOREIGN KEY ({columns}) REFERENCES {} ({})",
                quote(&reference.table),
                column_list(&reference.columns, &quote)
            ))
        }
    }
}

/// Builds the `SELECT` of a view.
///
/// Mandatory filter columns become `WHERE source = <placeholder>` terms,
/// numbered from 1 in column order. A view without columns has no valid
/// `SELECT` and is refused.
pub(crate) fn view_query<Q, P>(
    dialect: &str,
    view: &ViewDef,
    quote: Q,
    placeholder: P,
) -> MetaddlResult<String>
where
    Q: Fn(&str) -> String,
    P: Fn(usize) -> String,
{
    if view.columns.is_empty() {
        return Err(MetaddlError::unsupported(
            dialect,
            view.name.clone(),
            "a view needs at least one column",
        ));
    }

    let source_sql = |source: &ViewSource| match source {
        ViewSource::Column(r) => format!("{}.{}", quote(&r.table), quote(&r.column)),
        ViewSource::Expression(sql) => format!("({sql})"),
    };

    let select: Vec<String> = view
        .columns
        .iter()
        .map(|c| format!("{} AS {}", source_sql(&c.source), quote(&c.name)))
        .collect();

    let mut sql = format!("SELECT {}\nFROM {}", select.join(", "), quote(&view.from));
    for join in &view.joins {
        sql.push_str(&format!(
            "\nJOIN {} ON {}.{} = {}.{}",
            quote(&join.table),
            quote(&join.left.table),
            quote(&join.left.column),
            quote(&join.right.table),
            quote(&join.right.column)
        ));
    }

    let filters: Vec<String> = view
        .mandatory_filters()
        .enumerate()
        .map(|(i, c)| format!("{} = {}", source_sql(&c.source), placeholder(i + 1)))
        .collect();
    if !filters.is_empty() {
        sql.push_str(&format!("\nWHERE {}", filters.join(" AND ")));
    }
    Ok(sql)
}
