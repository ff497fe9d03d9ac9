//! Change classification by comparing two schema snapshots.
//!
//! The [`SchemaDiffer`] compares a "from" [`SchemaModel`] against a "to"
//! [`SchemaModel`] and produces the [`ChangeSet`] needed to turn one into the
//! other. Tables and views are matched by name only; a renamed table shows
//! up as one removal plus one addition.
//!
//! The change set is ordered: view and table removals first (in "from"
//! order), then table and view alterations (in "to" order), then table and
//! view additions (in "to" order).

use metaddl_schema::{KeyDef, SchemaModel, TableDef, ViewDef};

use crate::changes::{
    same_shape, ChangeSet, ColumnChange, CommentChange, RenameCandidate, SchemaChange,
    TableAlteration,
};

/// Classifies the differences between two snapshots.
///
/// Both snapshots are borrowed read-only; the differ holds no other state,
/// so one snapshot pair can be diffed from several threads at once.
#[derive(Debug, Clone, Copy)]
pub struct SchemaDiffer<'a> {
    from: &'a SchemaModel,
    to: &'a SchemaModel,
}

impl<'a> SchemaDiffer<'a> {
    /// Creates a differ from the old and the new snapshot.
    pub fn new(from: &'a SchemaModel, to: &'a SchemaModel) -> Self {
        Self { from, to }
    }

    /// Computes the ordered change set.
    pub fn detect_changes(&self) -> ChangeSet {
        let removed_tables: Vec<&TableDef> = self
            .from
            .tables()
            .iter()
            .filter(|t| self.to.table(&t.name).is_none())
            .collect();
        let added_tables: Vec<&TableDef> = self
            .to
            .tables()
            .iter()
            .filter(|t| self.from.table(&t.name).is_none())
            .collect();

        let alterations: Vec<TableAlteration> = self
            .to
            .tables()
            .iter()
            .filter_map(|new| {
                let old = self.from.table(&new.name)?;
                let alteration = alter_table(old, new);
                (!alteration.is_empty()).then_some(alteration)
            })
            .collect();

        let mut changes = Vec::new();

        for view in self.from.views() {
            if self.to.view(&view.name).is_none() {
                changes.push(SchemaChange::ViewRemoved(view.clone()));
            }
        }
        for table in &removed_tables {
            changes.push(SchemaChange::TableRemoved((*table).clone()));
        }
        for alteration in &alterations {
            changes.push(SchemaChange::TableAltered(alteration.clone()));
        }
        for view in self.to.views() {
            if let Some(old) = self.from.view(&view.name) {
                if old != view || depends_on_invalidated(old, &alterations) {
                    changes.push(SchemaChange::ViewAltered {
                        from: old.clone(),
                        to: view.clone(),
                    });
                }
            }
        }
        for table in &added_tables {
            changes.push(SchemaChange::TableAdded((*table).clone()));
        }
        for view in self.to.views() {
            if self.from.view(&view.name).is_none() {
                changes.push(SchemaChange::ViewAdded(view.clone()));
            }
        }

        for change in &changes {
            tracing::debug!(change = %change.describe(), "classified schema change");
        }

        let candidates = rename_candidates(&removed_tables, &added_tables);
        for candidate in &candidates {
            tracing::warn!(
                from = %candidate.from,
                to = %candidate.to,
                "table looks renamed; it will be dropped and recreated"
            );
        }

        ChangeSet::new(changes).with_rename_candidates(candidates)
    }
}

/// Convenience wrapper around [`SchemaDiffer::detect_changes`].
///
/// # Examples
///
/// ```
/// use metaddl_migrations::diff;
/// use metaddl_schema::parse;
///
/// let from = parse("TABLE T { COLUMN id BIGINT PRIMARY_KEY }").unwrap();
/// let to = parse("").unwrap();
/// let changes = diff(&from, &to);
/// assert_eq!(changes.describe(), vec!["Drop table T"]);
/// assert!(diff(&from, &from).is_empty());
/// ```
pub fn diff(from: &SchemaModel, to: &SchemaModel) -> ChangeSet {
    SchemaDiffer::new(from, to).detect_changes()
}

fn alter_table(old: &TableDef, new: &TableDef) -> TableAlteration {
    let mut alteration = TableAlteration::new(new.name.clone());

    for column in &old.columns {
        if !new.has_column(&column.name) {
            alteration.dropped_columns.push(column.clone());
        }
    }
    for column in &new.columns {
        match old.get_column(&column.name) {
            None => alteration.added_columns.push(column.clone()),
            Some(previous) if previous != column => {
                alteration.altered_columns.push(ColumnChange {
                    from: previous.clone(),
                    to: column.clone(),
                });
            }
            Some(_) => {}
        }
    }

    alteration.dropped_keys = keys_missing_from(&old.keys, &new.keys);
    alteration.added_keys = keys_missing_from(&new.keys, &old.keys);
    for (before, after) in renamed_keys(old, new) {
        tracing::warn!(
            table = %new.name,
            from = ?before.name,
            to = ?after.name,
            "key renamed in the definition only; the database keeps the old constraint name"
        );
    }

    if old.comment != new.comment {
        alteration.comment = Some(CommentChange {
            from: old.comment.clone(),
            to: new.comment.clone(),
        });
    }

    alteration
}

/// Keys of `keys` with no same-shaped counterpart in `other`.
fn keys_missing_from(keys: &[KeyDef], other: &[KeyDef]) -> Vec<KeyDef> {
    keys.iter()
        .filter(|k| !other.iter().any(|o| o.same_shape(k)))
        .cloned()
        .collect()
}

/// Pairs of same-shaped keys whose declared names differ.
fn renamed_keys<'a>(old: &'a TableDef, new: &'a TableDef) -> Vec<(&'a KeyDef, &'a KeyDef)> {
    new.keys
        .iter()
        .filter_map(|after| {
            old.keys
                .iter()
                .find(|before| before.same_shape(after) && before.name != after.name)
                .map(|before| (before, after))
        })
        .collect()
}

/// A view reading a dropped or retyped column must be recreated around the change.
fn depends_on_invalidated(view: &ViewDef, alterations: &[TableAlteration]) -> bool {
    view.referenced_columns().iter().any(|r| {
        alterations
            .iter()
            .any(|a| a.table == r.table && a.invalidates_column(&r.column))
    })
}

fn rename_candidates(removed: &[&TableDef], added: &[&TableDef]) -> Vec<RenameCandidate> {
    let mut candidates = Vec::new();
    for old in removed {
        for new in added {
            let same_columns = old.columns.len() == new.columns.len()
                && old
                    .columns
                    .iter()
                    .zip(&new.columns)
                    .all(|(a, b)| same_shape(a, b));
            if same_columns {
                candidates.push(RenameCandidate {
                    from: old.name.clone(),
                    to: new.name.clone(),
                });
            }
        }
    }
    candidates
}
