//! The in-memory schema snapshot.
//!
//! A [`SchemaModel`] holds the tables and views of one schema version, each
//! identified by a unique, case-sensitive name. Models are built once (by the
//! parser or by hand) and only read afterwards; every type here is plain data,
//! so models can be shared across threads freely.

use std::collections::BTreeSet;
use std::fmt;

use metaddl_core::{MetaddlError, MetaddlResult};
use serde::{Deserialize, Serialize};

// ── Column types ─────────────────────────────────────────────────────────

/// The declared type of a column.
///
/// Types are dialect neutral; each script generator maps them to its own
/// type names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DataType {
    /// 32-bit signed integer.
    Integer,
    /// 64-bit signed integer.
    BigInt,
    /// 16-bit signed integer.
    SmallInt,
    /// Variable-length string with a maximum length.
    Varchar {
        /// Maximum number of characters.
        length: u32,
    },
    /// Fixed-length string.
    Char {
        /// Number of characters.
        length: u32,
    },
    /// Unbounded character data.
    Clob,
    /// Fixed-precision decimal number.
    Decimal {
        /// Total number of digits.
        precision: u32,
        /// Digits after the decimal point.
        scale: u32,
    },
    /// 64-bit floating point number.
    Double,
    /// Date without time.
    Date,
    /// Time without date.
    Time,
    /// Date and time.
    Timestamp,
    /// True/false.
    Boolean,
    /// Unbounded binary data.
    Blob,
}

impl DataType {
    /// Returns the meta keyword for this type, without size parameters.
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::SmallInt => "SMALLINT",
            Self::Varchar { .. } => "VARCHAR",
            Self::Char { .. } => "CHAR",
            Self::Clob => "CLOB",
            Self::Decimal { .. } => "DECIMAL",
            Self::Double => "DOUBLE",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Boolean => "BOOLEAN",
            Self::Blob => "BLOB",
        }
    }

    /// Returns `true` for unbounded character or binary data.
    pub const fn is_large_object(&self) -> bool {
        matches!(self, Self::Clob | Self::Blob)
    }

    /// Returns `true` for the integral types.
    pub const fn is_integral(&self) -> bool {
        matches!(self, Self::Integer | Self::BigInt | Self::SmallInt)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Varchar { length } => write!(f, "VARCHAR({length})"),
            Self::Char { length } => write!(f, "CHAR({length})"),
            Self::Decimal { precision, scale } => write!(f, "DECIMAL({precision},{scale})"),
            other => f.write_str(other.keyword()),
        }
    }
}

// ── Column options ───────────────────────────────────────────────────────

/// A column default value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum DefaultValue {
    /// `NULL`.
    Null,
    /// `TRUE` or `FALSE`.
    Bool(bool),
    /// An integer literal.
    Int(i64),
    /// A string literal.
    Text(String),
    /// A bare SQL expression keyword such as `CURRENT_TIMESTAMP`.
    Expression(String),
}

impl DefaultValue {
    /// Renders the value as a SQL literal (strings quoted, quotes doubled).
    pub fn to_sql(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
            Self::Int(i) => i.to_string(),
            Self::Text(s) => quote_literal(s),
            Self::Expression(e) => e.clone(),
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Quotes a string as a single-quoted literal, doubling embedded quotes.
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// A `table.column` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnRef {
    /// The table name.
    pub table: String,
    /// The column name.
    pub column: String,
}

impl ColumnRef {
    /// Creates a new column reference.
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// A flag or attribute attached to a column.
///
/// Options are kept in a set, so two columns compare equal regardless of the
/// order their options were declared in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "option", content = "value")]
pub enum ColumnOption {
    /// Part of the table's primary key (implies NOT NULL).
    PrimaryKey,
    /// NOT NULL.
    Mandatory,
    /// Explicitly nullable.
    Nullable,
    /// Column default.
    Default(DefaultValue),
    /// References another table's column.
    ForeignKey(ColumnRef),
}

// ── Columns ──────────────────────────────────────────────────────────────

/// A single table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// The column name.
    pub name: String,
    /// The declared type.
    pub data_type: DataType,
    /// The option set.
    pub options: BTreeSet<ColumnOption>,
    /// An optional descriptive comment.
    pub comment: Option<String>,
}

impl ColumnDef {
    /// Creates a column with no options.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            options: BTreeSet::new(),
            comment: None,
        }
    }

    /// Adds an option.
    #[must_use]
    pub fn option(mut self, option: ColumnOption) -> Self {
        self.options.insert(option);
        self
    }

    /// Marks this column as part of the primary key.
    #[must_use]
    pub fn primary_key(self) -> Self {
        self.option(ColumnOption::PrimaryKey)
    }

    /// Marks this column NOT NULL.
    #[must_use]
    pub fn mandatory(self) -> Self {
        self.option(ColumnOption::Mandatory)
    }

    /// Marks this column explicitly nullable.
    #[must_use]
    pub fn nullable(self) -> Self {
        self.option(ColumnOption::Nullable)
    }

    /// Sets the default value, replacing any previous one.
    #[must_use]
    pub fn default_value(mut self, value: DefaultValue) -> Self {
        self.options.retain(|o| !matches!(o, ColumnOption::Default(_)));
        self.option(ColumnOption::Default(value))
    }

    /// Adds a foreign key option targeting `table.column`.
    #[must_use]
    pub fn foreign_key(self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.option(ColumnOption::ForeignKey(ColumnRef::new(table, column)))
    }

    /// Sets the comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Returns `true` if this column is part of the primary key.
    pub fn is_primary_key(&self) -> bool {
        self.options.contains(&ColumnOption::PrimaryKey)
    }

    /// Returns `true` if NULL values are allowed.
    pub fn is_nullable(&self) -> bool {
        !self.is_primary_key() && !self.options.contains(&ColumnOption::Mandatory)
    }

    /// Returns the default value, if any.
    pub fn default(&self) -> Option<&DefaultValue> {
        self.options.iter().find_map(|o| match o {
            ColumnOption::Default(v) => Some(v),
            _ => None,
        })
    }

    /// Returns the foreign key target, if any.
    pub fn foreign_key_target(&self) -> Option<&ColumnRef> {
        self.options.iter().find_map(|o| match o {
            ColumnOption::ForeignKey(r) => Some(r),
            _ => None,
        })
    }
}

// ── Keys ─────────────────────────────────────────────────────────────────

/// The kind of a key constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyKind {
    /// Primary key.
    Primary,
    /// Unique constraint.
    Unique,
    /// Foreign key.
    Foreign,
}

impl KeyKind {
    /// Returns the meta keyword.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Primary => "PRIMARY",
            Self::Unique => "UNIQUE",
            Self::Foreign => "FOREIGN",
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// The referenced side of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyReference {
    /// The referenced table.
    pub table: String,
    /// The referenced columns, positionally matching the key columns.
    pub columns: Vec<String>,
}

/// A primary, unique or foreign key constraint.
///
/// Anonymous keys (no `name`) come from column flags; script generators name
/// them deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDef {
    /// The constraint name, if declared.
    pub name: Option<String>,
    /// The key kind.
    pub kind: KeyKind,
    /// The constrained columns, in order.
    pub columns: Vec<String>,
    /// For foreign keys, the referenced table and columns.
    pub references: Option<KeyReference>,
}

impl KeyDef {
    /// Creates an anonymous primary key.
    pub fn primary(columns: &[&str]) -> Self {
        Self {
            name: None,
            kind: KeyKind::Primary,
            columns: columns.iter().map(ToString::to_string).collect(),
            references: None,
        }
    }

    /// Creates an anonymous unique key.
    pub fn unique(columns: &[&str]) -> Self {
        Self {
            name: None,
            kind: KeyKind::Unique,
            columns: columns.iter().map(ToString::to_string).collect(),
            references: None,
        }
    }

    /// Creates an anonymous foreign key.
    pub fn foreign(columns: &[&str], table: &str, ref_columns: &[&str]) -> Self {
        Self {
            name: None,
            kind: KeyKind::Foreign,
            columns: columns.iter().map(ToString::to_string).collect(),
            references: Some(KeyReference {
                table: table.to_string(),
                columns: ref_columns.iter().map(ToString::to_string).collect(),
            }),
        }
    }

    /// Names this key.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Compares kind, column tuple and reference, ignoring the name.
    pub fn same_shape(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.columns == other.columns
            && self.references == other.references
    }

    /// Returns `true` if this foreign key references `table`.
    pub fn references_table(&self, table: &str) -> bool {
        self.references.as_ref().is_some_and(|r| r.table == table)
    }
}

/// The primary key strategy of a table.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum KeyType {
    /// No primary key.
    #[default]
    None,
    /// A single `INTEGER` key column.
    Integer,
    /// A single `BIGINT` key column.
    Long,
    /// A single key column of any other type.
    Natural,
    /// Two or more key columns.
    Composite,
}

impl KeyType {
    /// Returns the meta keyword.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Integer => "INTEGER",
            Self::Long => "LONG",
            Self::Natural => "NATURAL",
            Self::Composite => "COMPOSITE",
        }
    }

    /// Parses a meta keyword.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "NONE" => Some(Self::None),
            "INTEGER" => Some(Self::Integer),
            "LONG" => Some(Self::Long),
            "NATURAL" => Some(Self::Natural),
            "COMPOSITE" => Some(Self::Composite),
            _ => None,
        }
    }

    /// Derives the key type implied by the given primary key column types.
    pub fn infer(key_types: &[&DataType]) -> Self {
        match key_types {
            [] => Self::None,
            [DataType::Integer] => Self::Integer,
            [DataType::BigInt] => Self::Long,
            [_] => Self::Natural,
            _ => Self::Composite,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// ── Tables ───────────────────────────────────────────────────────────────

/// A table definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    /// The table name.
    pub name: String,
    /// The primary key strategy.
    pub key_type: KeyType,
    /// The columns, in declaration order.
    pub columns: Vec<ColumnDef>,
    /// Primary, unique and foreign keys.
    pub keys: Vec<KeyDef>,
    /// The view used to query this table, if linked.
    pub query_view: Option<String>,
    /// An optional descriptive comment.
    pub comment: Option<String>,
}

impl TableDef {
    /// Creates an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_type: KeyType::None,
            columns: Vec::new(),
            keys: Vec::new(),
            query_view: None,
            comment: None,
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends a key.
    #[must_use]
    pub fn key(mut self, key: KeyDef) -> Self {
        self.keys.push(key);
        self
    }

    /// Links the query view.
    #[must_use]
    pub fn query_view(mut self, view: impl Into<String>) -> Self {
        self.query_view = Some(view.into());
        self
    }

    /// Sets the comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Completes the key set from the column flags and derives the key type.
    ///
    /// - Without an explicit primary key, the `PRIMARY_KEY` columns form an
    ///   anonymous one placed first; with one, its columns get the flag.
    /// - Each `FOREIGN_KEY` column option without a same-shaped foreign key
    ///   yields an anonymous one.
    ///
    /// Calling it twice is a no-op.
    #[must_use]
    pub fn finish(mut self) -> Self {
        if let Some(pk) = self.keys.iter().find(|k| k.kind == KeyKind::Primary) {
            let pk_columns = pk.columns.clone();
            for column in &mut self.columns {
                if pk_columns.contains(&column.name) {
                    column.options.insert(ColumnOption::PrimaryKey);
                }
            }
        } else {
            let flagged: Vec<&str> = self
                .columns
                .iter()
                .filter(|c| c.is_primary_key())
                .map(|c| c.name.as_str())
                .collect();
            if !flagged.is_empty() {
                self.keys.insert(0, KeyDef::primary(&flagged));
            }
        }

        let implied: Vec<KeyDef> = self
            .columns
            .iter()
            .filter_map(|c| {
                c.foreign_key_target().map(|target| {
                    KeyDef::foreign(&[c.name.as_str()], &target.table, &[target.column.as_str()])
                })
            })
            .collect();
        for key in implied {
            if !self.keys.iter().any(|k| k.same_shape(&key)) {
                self.keys.push(key);
            }
        }

        let key_types: Vec<&DataType> = self.primary_key_columns().map(|c| &c.data_type).collect();
        self.key_type = KeyType::infer(&key_types);
        self
    }

    /// Looks up a column by name.
    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns `true` if a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Returns the primary key constraint, if any.
    pub fn primary_key(&self) -> Option<&KeyDef> {
        self.keys.iter().find(|k| k.kind == KeyKind::Primary)
    }

    /// Returns the primary key columns in key order.
    pub fn primary_key_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        let names: Vec<String> = match self.primary_key() {
            Some(pk) => pk.columns.clone(),
            None => self
                .columns
                .iter()
                .filter(|c| c.is_primary_key())
                .map(|c| c.name.clone())
                .collect(),
        };
        names.into_iter().filter_map(move |n| self.get_column(&n))
    }

    /// Returns the foreign keys.
    pub fn foreign_keys(&self) -> impl Iterator<Item = &KeyDef> {
        self.keys.iter().filter(|k| k.kind == KeyKind::Foreign)
    }

    /// Returns the distinct tables referenced by this table's foreign keys.
    pub fn referenced_tables(&self) -> Vec<&str> {
        let mut tables: Vec<&str> = Vec::new();
        for key in self.foreign_keys() {
            if let Some(r) = &key.references {
                if !tables.contains(&r.table.as_str()) {
                    tables.push(&r.table);
                }
            }
        }
        tables
    }
}

// ── Views ────────────────────────────────────────────────────────────────

/// Query-scoping marker on a view column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterMarker {
    /// Not a filter column.
    #[default]
    None,
    /// Callers may filter on this column.
    Filter,
    /// Every query must bind a value for this column.
    Mandatory,
}

/// What a view column selects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewSource {
    /// A source table column.
    Column(ColumnRef),
    /// A raw SQL expression.
    Expression(String),
}

/// One output column of a view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewColumnRef {
    /// The output column name.
    pub name: String,
    /// The selected source.
    pub source: ViewSource,
    /// The query-scoping marker.
    pub filter: FilterMarker,
}

impl ViewColumnRef {
    /// Creates a column selecting `table.column`.
    pub fn column(name: impl Into<String>, table: &str, column: &str) -> Self {
        Self {
            name: name.into(),
            source: ViewSource::Column(ColumnRef::new(table, column)),
            filter: FilterMarker::None,
        }
    }

    /// Creates a column selecting a SQL expression.
    pub fn expression(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: ViewSource::Expression(sql.into()),
            filter: FilterMarker::None,
        }
    }

    /// Sets the filter marker.
    #[must_use]
    pub fn filter(mut self, filter: FilterMarker) -> Self {
        self.filter = filter;
        self
    }
}

/// An inner join of a view's source tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewJoin {
    /// The joined table.
    pub table: String,
    /// Left side of the equality condition.
    pub left: ColumnRef,
    /// Right side of the equality condition.
    pub right: ColumnRef,
}

/// A view definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDef {
    /// The view name.
    pub name: String,
    /// The base table.
    pub from: String,
    /// Joined tables, in order.
    pub joins: Vec<ViewJoin>,
    /// Output columns, in order.
    pub columns: Vec<ViewColumnRef>,
}

impl ViewDef {
    /// Creates a view over `from` with no columns.
    pub fn new(name: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            from: from.into(),
            joins: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Appends a join.
    #[must_use]
    pub fn join(mut self, table: &str, left: ColumnRef, right: ColumnRef) -> Self {
        self.joins.push(ViewJoin {
            table: table.to_string(),
            left,
            right,
        });
        self
    }

    /// Appends an output column.
    #[must_use]
    pub fn column(mut self, column: ViewColumnRef) -> Self {
        self.columns.push(column);
        self
    }

    /// Returns the base table followed by the joined tables.
    pub fn source_tables(&self) -> Vec<&str> {
        std::iter::once(self.from.as_str())
            .chain(self.joins.iter().map(|j| j.table.as_str()))
            .collect()
    }

    /// Returns `true` if the view reads from `table`.
    pub fn references_table(&self, table: &str) -> bool {
        self.source_tables().contains(&table)
    }

    /// Returns every table column the view reads, including join columns.
    pub fn referenced_columns(&self) -> Vec<&ColumnRef> {
        let mut refs: Vec<&ColumnRef> = Vec::new();
        for join in &self.joins {
            refs.push(&join.left);
            refs.push(&join.right);
        }
        for column in &self.columns {
            if let ViewSource::Column(r) = &column.source {
                refs.push(r);
            }
        }
        refs
    }

    /// Returns the columns every query must filter on.
    pub fn mandatory_filters(&self) -> impl Iterator<Item = &ViewColumnRef> {
        self.columns
            .iter()
            .filter(|c| c.filter == FilterMarker::Mandatory)
    }
}

// ── Schema ───────────────────────────────────────────────────────────────

/// A complete schema snapshot.
///
/// Tables and views share one namespace; insertion order is preserved and is
/// the declaration order used when scripts are generated.
///
/// # Examples
///
/// ```
/// use metaddl_schema::model::{ColumnDef, DataType, SchemaModel, TableDef};
///
/// let mut schema = SchemaModel::new();
/// schema
///     .add_table(TableDef::new("T").column(ColumnDef::new("id", DataType::BigInt).primary_key()))
///     .unwrap();
/// assert!(schema.table("T").is_some());
/// assert!(schema.add_table(TableDef::new("T")).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaModel {
    tables: Vec<TableDef>,
    views: Vec<ViewDef>,
}

impl SchemaModel {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table, completing its keys with [`TableDef::finish`].
    ///
    /// # Errors
    ///
    /// Returns `DuplicateDefinition` if a table or view with the same name exists.
    pub fn add_table(&mut self, table: TableDef) -> MetaddlResult<()> {
        self.ensure_free("table", &table.name)?;
        self.tables.push(table.finish());
        Ok(())
    }

    /// Adds a view.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateDefinition` if a table or view with the same name exists.
    pub fn add_view(&mut self, view: ViewDef) -> MetaddlResult<()> {
        self.ensure_free("view", &view.name)?;
        self.views.push(view);
        Ok(())
    }

    fn ensure_free(&self, kind: &'static str, name: &str) -> MetaddlResult<()> {
        if self.contains(name) {
            return Err(MetaddlError::DuplicateDefinition {
                kind,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Returns the tables in declaration order.
    pub fn tables(&self) -> &[TableDef] {
        &self.tables
    }

    /// Returns the views in declaration order.
    pub fn views(&self) -> &[ViewDef] {
        &self.views
    }

    /// Looks up a table by name.
    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Looks up a view by name.
    pub fn view(&self, name: &str) -> Option<&ViewDef> {
        self.views.iter().find(|v| v.name == name)
    }

    /// Returns `true` if a table or view has this name.
    pub fn contains(&self, name: &str) -> bool {
        self.table(name).is_some() || self.view(name).is_some()
    }

    /// Returns `true` if the schema has no tables and no views.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.views.is_empty()
    }

    /// Returns the table names in declaration order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }
}
