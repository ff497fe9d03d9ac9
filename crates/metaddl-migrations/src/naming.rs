//! Deterministic constraint names for anonymous keys.
//!
//! Keys declared through column flags carry no name; generators derive one
//! from the table and column names the way PostgreSQL does (`t_pkey`,
//! `t_col_key`, `t_col_fkey`), cut to the dialect's identifier limit. A name
//! depends only on the key and its table, so the run that drops a key finds
//! it under the name the creating run gave it.
//!
//! A [`ConstraintNamer`] also tracks the names created during one run and
//! refuses a second key under a name the dialect requires to be unique.

use std::collections::HashMap;

use metaddl_core::{MetaddlError, MetaddlResult};
use metaddl_schema::{KeyDef, KeyKind};

/// Where a constraint name must be unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameScope {
    /// Unique among the constraints of one table.
    Table,
    /// Unique across the whole schema.
    Schema,
}

/// Hands out constraint names for one generation run.
#[derive(Debug, Clone)]
pub struct ConstraintNamer {
    dialect: &'static str,
    limit: usize,
    index_scope: NameScope,
    foreign_scope: NameScope,
    /// name -> (table, scope) of every key created so far
    created: HashMap<String, Vec<(String, NameScope)>>,
}

impl ConstraintNamer {
    /// Creates a namer for identifiers of at most `limit` bytes.
    ///
    /// Primary and unique key names are schema-wide and foreign key names
    /// are per table, as in PostgreSQL; see [`ConstraintNamer::with_scopes`].
    pub fn new(dialect: &'static str, limit: usize) -> Self {
        Self {
            dialect,
            limit,
            index_scope: NameScope::Schema,
            foreign_scope: NameScope::Table,
            created: HashMap::new(),
        }
    }

    /// Sets where primary/unique and foreign key names must be unique.
    pub fn with_scopes(mut self, index: NameScope, foreign: NameScope) -> Self {
        self.index_scope = index;
        self.foreign_scope = foreign;
        self
    }

    /// Returns the identifier limit.
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Forgets every name handed out so far.
    pub fn reset(&mut self) {
        self.created.clear();
    }

    /// Returns the name a key was created under, without reserving it.
    ///
    /// A declared name wins, otherwise the derived name.
    pub fn existing_name(&self, table: &str, key: &KeyDef) -> String {
        key.name
            .clone()
            .unwrap_or_else(|| derived_name(table, key, self.limit))
    }

    /// Returns the name for a key being created and reserves it.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedChange` if another key created in this run
    /// already holds the name within the dialect's uniqueness scope.
    pub fn name(&mut self, table: &str, key: &KeyDef) -> MetaddlResult<String> {
        let name = self.existing_name(table, key);
        let scope = self.scope(key.kind);
        let holders = self.created.entry(name.clone()).or_default();
        if let Some((holder, _)) = holders
            .iter()
            .find(|(t, s)| scope == NameScope::Schema || *s == NameScope::Schema || t == table)
        {
            return Err(MetaddlError::unsupported(
                self.dialect,
                format!("{table} ({})", key.columns.join(", ")),
                format!(
                    "constraint name '{name}' is already used by a key on '{holder}'; \
                     give one of the keys an explicit name"
                ),
            ));
        }
        holders.push((table.to_string(), scope));
        Ok(name)
    }

    fn scope(&self, kind: KeyKind) -> NameScope {
        match kind {
            KeyKind::Primary | KeyKind::Unique => self.index_scope,
            KeyKind::Foreign => self.foreign_scope,
        }
    }
}

fn suffix(kind: KeyKind) -> &'static str {
    match kind {
        KeyKind::Primary => "pkey",
        KeyKind::Unique => "key",
        KeyKind::Foreign => "fkey",
    }
}

fn derived_name(table: &str, key: &KeyDef, limit: usize) -> String {
    let stem = if key.kind == KeyKind::Primary {
        table.to_string()
    } else {
        format!("{table}_{}", key.columns.join("_"))
    };
    let tail = format!("_{}", suffix(key.kind));
    let room = limit.saturating_sub(tail.len());
    format!("{}{tail}", truncate(&stem, room))
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
