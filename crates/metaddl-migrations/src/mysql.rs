//! The MySQL script generator.

use metaddl_core::{MetaddlError, MetaddlResult};
use metaddl_schema::model::quote_literal;
use metaddl_schema::{ColumnDef, DataType, DefaultValue, KeyDef, KeyKind, TableDef, ViewDef};

use crate::changes::ColumnChange;
use crate::naming::{ConstraintNamer, NameScope};
use crate::schema_editor::{
    check_default, element, key_clause, view_query, CommentTarget, SchemaGenerator,
};

/// MySQL limits identifiers to 64 characters.
pub const MYSQL_IDENTIFIER_LIMIT: usize = 64;

/// Script generator for MySQL.
///
/// Identifiers are backtick-quoted. Comments are part of the column and
/// table definitions, so a column change always rewrites the whole column
/// with `MODIFY COLUMN`.
#[derive(Debug, Clone)]
pub struct MySqlGenerator {
    namer: ConstraintNamer,
}

impl MySqlGenerator {
    /// The dialect name.
    pub const NAME: &'static str = "mysql";

    /// Creates a generator with an empty constraint namer.
    pub fn new() -> Self {
        Self {
            namer: ConstraintNamer::new(Self::NAME, MYSQL_IDENTIFIER_LIMIT)
                .with_scopes(NameScope::Table, NameScope::Schema),
        }
    }

    fn modify_column(&self, table: &str, column: &ColumnDef) -> MetaddlResult<String> {
        Ok(format!(
            "ALTER TABLE {} MODIFY COLUMN {} {}",
            self.quote(table),
            self.quote(&column.name),
            self.column_sql(table, column)?
        ))
    }
}

impl Default for MySqlGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaGenerator for MySqlGenerator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn quote(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn column_type(&self, data_type: &DataType) -> String {
        mysql_type_sql(data_type)
    }

    fn column_sql(&self, table: &str, column: &ColumnDef) -> MetaddlResult<String> {
        check_default(Self::NAME, table, column)?;
        let mut sql = self.column_type(&column.data_type);
        if !column.is_nullable() {
            sql.push_str(" NOT NULL");
        }
        match column.default() {
            Some(DefaultValue::Null) | None => {}
            Some(_) if column.data_type.is_large_object() => {
                return Err(MetaddlError::unsupported(
                    Self::NAME,
                    element(table, &column.name),
                    format!("DEFAULT on a {} column", column.data_type),
                ));
            }
            Some(value) => sql.push_str(&format!(" DEFAULT {}", value.to_sql())),
        }
        if let Some(comment) = &column.comment {
            sql.push_str(&format!(" COMMENT {}", quote_literal(comment)));
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

        let mut sql = format!(
            "CREATE TABLE {} (\n{}\n)",
            self.quote(&table.name),
            parts.join(",\n")
        );
        if let Some(comment) = &table.comment {
            sql.push_str(&format!(" COMMENT = {}", quote_literal(comment)));
        }
        Ok(vec![sql])
    }

    fn drop_table(&mut self, table: &TableDef) -> MetaddlResult<Vec<String>> {
        Ok(vec![format!("DROP TABLE {}", self.quote(&table.name))])
    }

    fn add_column(&mut self, table: &str, column: &ColumnDef) -> MetaddlResult<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            self.quote(table),
            self.quote(&column.name),
            self.column_sql(table, column)?
        )])
    }

    fn drop_column(&mut self, table: &str, column: &ColumnDef) -> MetaddlResult<Vec<String>> {
        Ok(vec![format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.quote(table),
            self.quote(&column.name)
        )])
    }

    fn alter_column(&mut self, table: &str, change: &ColumnChange) -> MetaddlResult<Vec<String>> {
        if !change.definition_changed() && !change.comment_changed() {
            return Ok(Vec::new());
        }
        Ok(vec![self.modify_column(table, &change.to)?])
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
        let table_sql = self.quote(table);
        let name = self.quote(&self.namer.existing_name(table, key));
        Ok(vec![match key.kind {
            KeyKind::Primary => format!("ALTER TABLE {table_sql} DROP PRIMARY KEY"),
            KeyKind::Unique => format!("ALTER TABLE {table_sql} DROP INDEX {name}"),
            KeyKind::Foreign => format!("ALTER TABLE {table_sql} DROP FOREIGN KEY {name}"),
        }])
    }

    fn create_view(&mut self, view: &ViewDef) -> MetaddlResult<Vec<String>> {
        let query = view_query(Self::NAME, view, |s| self.quote(s), |_| "?".to_string())?;
        Ok(vec![format!(
            "CREATE VIEW {} AS\n{query}",
            self.quote(&view.name)
        )])
    }

    fn drop_view(&mut self, view: &ViewDef) -> MetaddlResult<Vec<String>> {
        Ok(vec![format!("DROP VIEW {}", self.quote(&view.name))])
    }

    fn comment(&mut self, target: CommentTarget<'_>) -> MetaddlResult<Vec<String>> {
        match target {
            CommentTarget::Table { table, comment } => Ok(vec![format!(
                "ALTER TABLE {} COMMENT = {}",
                self.quote(table),
                quote_literal(comment.unwrap_or(""))
            )]),
            CommentTarget::Column { table, column } => Ok(vec![self.modify_column(table, column)?]),
        }
    }

    fn begin(&self) -> Vec<String> {
        vec!["START TRANSACTION".to_string()]
    }

    fn commit(&self) -> Vec<String> {
        vec!["COMMIT".to_string()]
    }

    fn reset(&mut self) {
        self.namer.reset();
    }
}

/// Maps a column type to MySQL.
fn mysql_type_sql(data_type: &DataType) -> String {
    match data_type {
        DataType::Integer => "int".into(),
        DataType::BigInt => "bigint".into(),
        DataType::SmallInt => "smallint".into(),
        DataType::Varchar { length } => format!("varchar({length})"),
        DataType::Char { length } => format!("char({length})"),
        DataType::Clob => "longtext".into(),
        DataType::Decimal { precision, scale } => format!("decimal({precision},{scale})"),
        DataType::Double => "double".into(),
        DataType::Date => "date".into(),
        DataType::Time => "time".into(),
        DataType::Timestamp => "datetime".into(),
        DataType::Boolean => "tinyint(1)".into(),
        DataType::Blob => "longblob".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metaddl_schema::{FilterMarker, ViewColumnRef};

    fn mysql() -> MySqlGenerator {
        MySqlGenerator::new()
    }

    #[test]
    fn test_type_mapping() {
        let g = mysql();
        assert_eq!(g.column_type(&DataType::Integer), "int");
        assert_eq!(g.column_type(&DataType::Clob), "longtext");
        assert_eq!(g.column_type(&DataType::Timestamp), "datetime");
        assert_eq!(g.column_type(&DataType::Boolean), "tinyint(1)");
        assert_eq!(g.column_type(&DataType::Blob), "longblob");
    }

    #[test]
    fn test_quote_escapes_backticks() {
        assert_eq!(mysql().quote("a`b"), "`a``b`");
    }

    #[test]
    fn test_create_table() {
        let mut g = mysql();
        let table = TableDef::new("T")
            .column(ColumnDef::new("id", DataType::BigInt).primary_key())
            .column(ColumnDef::new("name", DataType::Varchar { length: 50 }).comment("label"))
            .comment("things")
            .finish();
        assert_eq!(
            g.create_table(&table).unwrap(),
            vec![
                "CREATE TABLE `T` (\n    `id` bigint NOT NULL,\n    \
                 `name` varchar(50) COMMENT 'label',\n    \
                 CONSTRAINT `T_pkey` PRIMARY KEY (`id`)\n) COMMENT = 'things'"
            ]
        );
    }

    #[test]
    fn test_default_on_large_object_unsupported() {
        let g = mysql();
        let col = ColumnDef::new("body", DataType::Clob).default_value(DefaultValue::Text("".into()));
        let err = g.column_sql("doc", &col).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported change for dialect mysql: doc.body: DEFAULT on a CLOB column"
        );
        let col = ColumnDef::new("body", DataType::Clob).default_value(DefaultValue::Null);
        assert_eq!(g.column_sql("doc", &col).unwrap(), "longtext");
    }

    #[test]
    fn test_alter_column_modifies() {
        let mut g = mysql();
        let change = ColumnChange {
            from: ColumnDef::new("name", DataType::Varchar { length: 50 }),
            to: ColumnDef::new("name", DataType::Varchar { length: 100 }).mandatory(),
        };
        assert_eq!(
            g.alter_column("T", &change).unwrap(),
            vec!["ALTER TABLE `T` MODIFY COLUMN `name` varchar(100) NOT NULL"]
        );
    }

    #[test]
    fn test_drop_keys() {
        let mut g = mysql();
        assert_eq!(
            g.drop_key("T", &KeyDef::primary(&["id"])).unwrap(),
            vec!["ALTER TABLE `T` DROP PRIMARY KEY"]
        );
        assert_eq!(
            g.drop_key("T", &KeyDef::unique(&["code"])).unwrap(),
            vec!["ALTER TABLE `T` DROP INDEX `T_code_key`"]
        );
        assert_eq!(
            g.drop_key("T", &KeyDef::foreign(&["o"], "O", &["id"]).named("fk_o"))
                .unwrap(),
            vec!["ALTER TABLE `T` DROP FOREIGN KEY `fk_o`"]
        );
    }

    #[test]
    fn test_view_uses_question_marks() {
        let mut g = mysql();
        let view = ViewDef::new("v", "t")
            .column(ViewColumnRef::column("a", "t", "a").filter(FilterMarker::Mandatory))
            .column(ViewColumnRef::column("b", "t", "b").filter(FilterMarker::Mandatory));
        let stmts = g.create_view(&view).unwrap();
        assert_eq!(
            stmts,
            vec![
                "CREATE VIEW `v` AS\nSELECT `t`.`a` AS `a`, `t`.`b` AS `b`\nFROM `t`\n\
                 WHERE `t`.`a` = ? AND `t`.`b` = ?"
            ]
        );
    }

    #[test]
    fn test_comments() {
        let mut g = mysql();
        assert_eq!(
            g.comment(CommentTarget::Table {
                table: "T",
                comment: None
            })
            .unwrap(),
            vec!["ALTER TABLE `T` COMMENT = ''"]
        );
        let col = ColumnDef::new("n", DataType::Integer).comment("count");
        assert_eq!(
            g.comment(CommentTarget::Column {
                table: "T",
                column: &col
            })
            .unwrap(),
            vec!["ALTER TABLE `T` MODIFY COLUMN `n` int COMMENT 'count'"]
        );
    }

    #[test]
    fn test_transaction_statements() {
        let g = mysql();
        assert_eq!(g.begin(), vec!["START TRANSACTION"]);
        assert_eq!(g.commit(), vec!["COMMIT"]);
    }
}
