//! Renders a [`SchemaModel`] back to meta source text.
//!
//! The output is canonical: one item per line, `KEYTYPE` always spelled out,
//! column options in a fixed order, and only named keys written as `KEY`
//! lines (anonymous keys are implied by the column flags). Parsing the
//! output of [`to_meta`] yields a model equal to the input for every model
//! the parser can produce.

use std::fmt::Write;

use crate::model::{
    quote_literal, ColumnDef, ColumnOption, DefaultValue, FilterMarker, KeyDef, SchemaModel,
    TableDef, ViewDef, ViewSource,
};

/// Renders the whole schema, tables first, then views.
pub fn to_meta(schema: &SchemaModel) -> String {
    let mut out = String::new();
    for (i, table) in schema.tables().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_table(&mut out, table);
    }
    for view in schema.views() {
        if !out.is_empty() {
            out.push('\n');
        }
        write_view(&mut out, view);
    }
    out
}

fn write_table(out: &mut String, table: &TableDef) {
    let _ = writeln!(out, "TABLE {} KEYTYPE {} {{", table.name, table.key_type);
    if let Some(comment) = &table.comment {
        let _ = writeln!(out, "    COMMENT {}", quote_literal(comment));
    }
    for column in &table.columns {
        let _ = writeln!(out, "    {}", column_line(column));
    }
    for key in table.keys.iter().filter(|k| k.name.is_some()) {
        let _ = writeln!(out, "    {}", key_line(key));
    }
    if let Some(view) = &table.query_view {
        let _ = writeln!(out, "    QUERY_VIEW {view}");
    }
    out.push_str("}\n");
}

fn column_line(column: &ColumnDef) -> String {
    let mut line = format!("COLUMN {} {}", column.name, column.data_type);
    for option in &column.options {
        line.push(' ');
        match option {
            ColumnOption::PrimaryKey => line.push_str("PRIMARY_KEY"),
            ColumnOption::Mandatory => line.push_str("MANDATORY"),
            ColumnOption::Nullable => line.push_str("NULLABLE"),
            ColumnOption::Default(value) => {
                let _ = write!(line, "DEFAULT({})", literal(value));
            }
            ColumnOption::ForeignKey(target) => {
                let _ = write!(line, "FOREIGN_KEY({target})");
            }
        }
    }
    if let Some(comment) = &column.comment {
        let _ = write!(line, " COMMENT {}", quote_literal(comment));
    }
    line
}

fn literal(value: &DefaultValue) -> String {
    match value {
        DefaultValue::Null => "NULL".to_string(),
        DefaultValue::Bool(true) => "TRUE".to_string(),
        DefaultValue::Bool(false) => "FALSE".to_string(),
        DefaultValue::Int(i) => i.to_string(),
        DefaultValue::Text(s) => quote_literal(s),
        DefaultValue::Expression(e) => e.clone(),
    }
}

fn key_line(key: &KeyDef) -> String {
    let mut line = format!(
        "KEY {} {} ({})",
        key.name.as_deref().unwrap_or_default(),
        key.kind,
        key.columns.join(", ")
    );
    if let Some(reference) = &key.references {
        let _ = write!(
            line,
            " REFERENCES {} ({})",
            reference.table,
            reference.columns.join(", ")
        );
    }
    line
}

fn write_view(out: &mut String, view: &ViewDef) {
    let _ = writeln!(out, "VIEW {} FROM {} {{", view.name, view.from);
    for join in &view.joins {
        let _ = writeln!(out, "    JOIN {} ON {} = {}", join.table, join.left, join.right);
    }
    for column in &view.columns {
        let source = match &column.source {
            ViewSource::Column(r) => r.to_string(),
            ViewSource::Expression(sql) => format!("EXPR {}", quote_literal(sql)),
        };
        let marker = match column.filter {
            FilterMarker::None => "",
            FilterMarker::Filter => " FILTER",
            FilterMarker::Mandatory => " MANDATORY_FILTER",
        };
        let _ = writeln!(out, "    COLUMN {} = {source}{marker}", column.name);
    }
    out.push_str("}\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnRef, DataType, ViewColumnRef};
    use crate::parser::parse;

    #[test]
    fn test_to_meta_table() {
        let mut schema = SchemaModel::new();
        schema
            .add_table(
                TableDef::new("T")
                    .column(ColumnDef::new("id", DataType::BigInt).primary_key())
                    .column(
                        ColumnDef::new("name", DataType::Varchar { length: 50 })
                            .mandatory()
                            .comment("it's a name"),
                    ),
            )
            .unwrap();
        assert_eq!(
            to_meta(&schema),
            "TABLE T KEYTYPE LONG {\n    COLUMN id BIGINT PRIMARY_KEY\n    COLUMN name VARCHAR(50) MANDATORY COMMENT 'it''s a name'\n}\n"
        );
    }

    #[test]
    fn test_to_meta_view() {
        let mut schema = SchemaModel::new();
        schema
            .add_table(TableDef::new("a").column(ColumnDef::new("x", DataType::Integer)))
            .unwrap();
        schema
            .add_view(
                ViewDef::new("v", "a")
                    .column(ViewColumnRef::column("x", "a", "x").filter(FilterMarker::Mandatory))
                    .column(ViewColumnRef::expression("n", "count(*)")),
            )
            .unwrap();
        let text = to_meta(&schema);
        assert!(text.contains("VIEW v FROM a {\n    COLUMN x = a.x MANDATORY_FILTER\n    COLUMN n = EXPR 'count(*)'\n}\n"));
    }

    #[test]
    fn test_to_meta_skips_anonymous_keys() {
        let mut schema = SchemaModel::new();
        schema
            .add_table(
                TableDef::new("c")
                    .column(ColumnDef::new("id", DataType::Integer).primary_key())
                    .column(ColumnDef::new("p", DataType::Integer).foreign_key("c", "id")),
            )
            .unwrap();
        let text = to_meta(&schema);
        assert!(!text.contains("KEY "));
        assert!(text.contains("FOREIGN_KEY(c.id)"));
    }

    #[test]
    fn test_roundtrip_with_named_keys() {
        let src = "
            TABLE member KEYTYPE COMPOSITE {
                COMMENT 'group membership'
                COLUMN person_id BIGINT
                COLUMN group_id BIGINT FOREIGN_KEY(grp.id)
                COLUMN since DATE DEFAULT(CURRENT_DATE) NULLABLE
                KEY member_pk PRIMARY (person_id, group_id)
            }
            TABLE grp { COLUMN id BIGINT PRIMARY_KEY COLUMN label CHAR(3) KEY grp_label UNIQUE (label) }
            VIEW member_view FROM member {
                JOIN grp ON member.group_id = grp.id
                COLUMN who = member.person_id FILTER
                COLUMN label = grp.label
            }
        ";
        let model = parse(src).unwrap();
        let again = parse(&to_meta(&model)).unwrap();
        assert_eq!(again, model);
        assert_eq!(
            again.view("member_view").unwrap().joins[0].right,
            ColumnRef::new("grp", "id")
        );
    }
}
