//! The classified differences between two schema snapshots.
//!
//! A [`ChangeSet`] is produced by one classifier run and consumed by one
//! script generation. It is plain data: it can be exported as JSON for
//! review tooling and re-read later.

use std::fmt::Write;

use metaddl_core::{MetaddlError, MetaddlResult};
use metaddl_schema::{ColumnDef, KeyDef, KeyKind, TableDef, ViewDef};
use serde::{Deserialize, Serialize};

/// A column present in both snapshots whose definition differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnChange {
    /// The definition in the "from" snapshot.
    pub from: ColumnDef,
    /// The definition in the "to" snapshot.
    pub to: ColumnDef,
}

impl ColumnChange {
    /// The column name (identical on both sides).
    pub fn name(&self) -> &str {
        &self.to.name
    }

    /// Returns `true` if the declared type changed.
    pub fn type_changed(&self) -> bool {
        self.from.data_type != self.to.data_type
    }

    /// Returns `true` if the column switched between NULL and NOT NULL.
    pub fn nullability_changed(&self) -> bool {
        self.from.is_nullable() != self.to.is_nullable()
    }

    /// Returns `true` if the default value changed.
    pub fn default_changed(&self) -> bool {
        self.from.default() != self.to.default()
    }

    /// Returns `true` if the comment changed.
    pub fn comment_changed(&self) -> bool {
        self.from.comment != self.to.comment
    }

    /// Returns `true` if the column definition itself must be altered
    /// (type, nullability or default). Key flag changes are carried by
    /// the table's key changes instead.
    pub fn definition_changed(&self) -> bool {
        self.type_changed() || self.nullability_changed() || self.default_changed()
    }
}

/// A table comment that changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentChange {
    /// The old comment.
    pub from: Option<String>,
    /// The new comment.
    pub to: Option<String>,
}

/// All differences within one table present in both snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableAlteration {
    /// The table name.
    pub table: String,
    /// Columns only in "to", in "to" declaration order.
    pub added_columns: Vec<ColumnDef>,
    /// Columns only in "from", in "from" declaration order.
    pub dropped_columns: Vec<ColumnDef>,
    /// Columns in both whose definition differs, in "to" declaration order.
    pub altered_columns: Vec<ColumnChange>,
    /// Keys only in "to" (compared by kind, columns and reference).
    pub added_keys: Vec<KeyDef>,
    /// Keys only in "from".
    pub dropped_keys: Vec<KeyDef>,
    /// The table comment change, if any.
    pub comment: Option<CommentChange>,
}

impl TableAlteration {
    /// Creates an empty alteration for `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            added_columns: Vec::new(),
            dropped_columns: Vec::new(),
            altered_columns: Vec::new(),
            added_keys: Vec::new(),
            dropped_keys: Vec::new(),
            comment: None,
        }
    }

    /// Returns `true` if nothing differs.
    pub fn is_empty(&self) -> bool {
        self.added_columns.is_empty()
            && self.dropped_columns.is_empty()
            && self.altered_columns.is_empty()
            && self.added_keys.is_empty()
            && self.dropped_keys.is_empty()
            && self.comment.is_none()
    }

    /// Returns `true` if `column` is dropped or changes type.
    pub fn invalidates_column(&self, column: &str) -> bool {
        self.dropped_columns.iter().any(|c| c.name == column)
            || self
                .altered_columns
                .iter()
                .any(|c| c.name() == column && c.type_changed())
    }
}

/// One classified difference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change")]
pub enum SchemaChange {
    /// A table only in "to"; carries the full definition.
    TableAdded(TableDef),
    /// A table only in "from"; carries the old definition.
    TableRemoved(TableDef),
    /// A table in both snapshots that differs.
    TableAltered(TableAlteration),
    /// A view only in "to".
    ViewAdded(ViewDef),
    /// A view only in "from".
    ViewRemoved(ViewDef),
    /// A view that must be dropped and recreated.
    ViewAltered {
        /// The old definition.
        from: ViewDef,
        /// The new definition.
        to: ViewDef,
    },
}

impl SchemaChange {
    /// Returns the name of the table or view this change concerns.
    pub fn name(&self) -> &str {
        match self {
            Self::TableAdded(t) | Self::TableRemoved(t) => &t.name,
            Self::TableAltered(a) => &a.table,
            Self::ViewAdded(v) | Self::ViewRemoved(v) => &v.name,
            Self::ViewAltered { to, .. } => &to.name,
        }
    }

    /// Returns a one-line human-readable summary.
    pub fn describe(&self) -> String {
        match self {
            Self::TableAdded(t) => format!("Create table {}", t.name),
            Self::TableRemoved(t) => format!("Drop table {}", t.name),
            Self::TableAltered(a) => format!("Alter table {}: {}", a.table, describe_alteration(a)),
            Self::ViewAdded(v) => format!("Create view {}", v.name),
            Self::ViewRemoved(v) => format!("Drop view {}", v.name),
            Self::ViewAltered { to, .. } => format!("Recreate view {}", to.name),
        }
    }
}

fn describe_alteration(a: &TableAlteration) -> String {
    let mut parts: Vec<String> = Vec::new();
    for c in &a.dropped_columns {
        parts.push(format!("drop column {}", c.name));
    }
    for c in &a.added_columns {
        parts.push(format!("add column {}", c.name));
    }
    for c in &a.altered_columns {
        parts.push(format!("alter column {}", c.name()));
    }
    for k in &a.dropped_keys {
        parts.push(format!("drop {}", describe_key(k)));
    }
    for k in &a.added_keys {
        parts.push(format!("add {}", describe_key(k)));
    }
    if a.comment.is_some() {
        parts.push("change comment".to_string());
    }
    parts.join(", ")
}

fn describe_key(key: &KeyDef) -> String {
    let mut out = match key.kind {
        KeyKind::Primary => "primary key".to_string(),
        KeyKind::Unique => "unique key".to_string(),
        KeyKind::Foreign => "foreign key".to_string(),
    };
    if let Some(name) = &key.name {
        let _ = write!(out, " {name}");
    }
    let _ = write!(out, " ({})", key.columns.join(", "));
    if let Some(r) = &key.references {
        let _ = write!(out, " -> {}({})", r.table, r.columns.join(", "));
    }
    out
}

/// A removed and an added table with identical columns.
///
/// Renames are always executed as drop + create; candidates are reported so
/// callers can warn before data is lost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameCandidate {
    /// The removed table.
    pub from: String,
    /// The added table.
    pub to: String,
}

/// The ordered result of one classifier run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    changes: Vec<SchemaChange>,
    #[serde(default)]
    rename_candidates: Vec<RenameCandidate>,
}

impl ChangeSet {
    /// Creates a change set from already ordered changes.
    pub fn new(changes: Vec<SchemaChange>) -> Self {
        Self {
            changes,
            rename_candidates: Vec::new(),
        }
    }

    /// Attaches rename candidates.
    #[must_use]
    pub fn with_rename_candidates(mut self, candidates: Vec<RenameCandidate>) -> Self {
        self.rename_candidates = candidates;
        self
    }

    /// Returns the changes in order.
    pub fn changes(&self) -> &[SchemaChange] {
        &self.changes
    }

    /// Iterates over the changes in order.
    pub fn iter(&self) -> std::slice::Iter<'_, SchemaChange> {
        self.changes.iter()
    }

    /// Returns the number of changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns `true` if the snapshots are structurally equal.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Returns the removed/added table pairs that look like renames.
    pub fn rename_candidates(&self) -> &[RenameCandidate] {
        &self.rename_candidates
    }

    /// Returns the one-line summaries of all changes.
    pub fn describe(&self) -> Vec<String> {
        self.changes.iter().map(SchemaChange::describe).collect()
    }

    /// Renders the change set as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a `SerializationError` if serialization fails.
    pub fn to_json(&self) -> MetaddlResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MetaddlError::SerializationError(e.to_string()))
    }

    /// Reads a change set exported with [`ChangeSet::to_json`].
    ///
    /// # Errors
    ///
    /// Returns a `SerializationError` if the JSON is malformed.
    pub fn from_json(json: &str) -> MetaddlResult<Self> {
        serde_json::from_str(json).map_err(|e| MetaddlError::SerializationError(e.to_string()))
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a SchemaChange;
    type IntoIter = std::slice::Iter<'a, SchemaChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

/// Returns `true` if two columns carry the same name, type and options.
pub(crate) fn same_shape(a: &ColumnDef, b: &ColumnDef) -> bool {
    a.name == b.name && a.data_type == b.data_type && a.options == b.options
}
