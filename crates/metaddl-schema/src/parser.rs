//! Meta parser.
//!
//! Turns meta source text into a [`SchemaModel`] in two passes. The first
//! pass walks the token stream and builds draft definitions, rejecting
//! malformed syntax with a [`MetaddlError::Parse`]. The second pass resolves
//! every cross reference (foreign keys, query views, view sources) against
//! the complete set of drafts, so definitions may refer to tables declared
//! further down the file. Missing targets fail with
//! [`MetaddlError::UnresolvedReference`].

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use metaddl_core::{MetaddlError, MetaddlResult};

use crate::lexer::{tokenize, Token, TokenKind};
use crate::model::{
    ColumnDef, ColumnOption, ColumnRef, DataType, DefaultValue, FilterMarker, KeyDef, KeyKind,
    KeyReference, KeyType, SchemaModel, TableDef, ViewColumnRef, ViewDef, ViewJoin, ViewSource,
};

/// Parses meta source text into a schema model.
///
/// # Errors
///
/// Returns [`MetaddlError::Parse`] for syntax violations and
/// [`MetaddlError::UnresolvedReference`] for dangling references.
///
/// # Examples
///
/// ```
/// use metaddl_schema::parse;
///
/// let schema = parse("TABLE T { COLUMN id BIGINT PRIMARY_KEY }").unwrap();
/// assert_eq!(schema.tables().len(), 1);
/// ```
pub fn parse(source: &str) -> MetaddlResult<SchemaModel> {
    let tokens = tokenize(source)?;
    let (tables, views) = ParserState::new(&tokens).parse_file()?;
    let schema = resolve(tables, views)?;
    tracing::debug!(
        tables = schema.tables().len(),
        views = schema.views().len(),
        "parsed meta definition"
    );
    Ok(schema)
}

impl FromStr for SchemaModel {
    type Err = MetaddlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

// ============================================================
// Drafts
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    line: usize,
    column: usize,
}

impl Span {
    const fn of(token: &Token) -> Self {
        Self {
            line: token.line,
            column: token.column,
        }
    }
}

#[derive(Debug)]
struct DraftRef {
    table: String,
    column: Option<String>,
    span: Span,
}

#[derive(Debug)]
struct DraftColumn {
    def: ColumnDef,
    foreign_key: Option<DraftRef>,
    span: Span,
}

#[derive(Debug)]
struct DraftKey {
    name: String,
    kind: KeyKind,
    columns: Vec<String>,
    references: Option<(String, Vec<String>)>,
    span: Span,
}

#[derive(Debug)]
struct DraftTable {
    name: String,
    key_type: Option<(KeyType, Span)>,
    columns: Vec<DraftColumn>,
    keys: Vec<DraftKey>,
    query_view: Option<(String, Span)>,
    comment: Option<String>,
}

impl DraftTable {
    fn column(&self, name: &str) -> Option<&DraftColumn> {
        self.columns.iter().find(|c| c.def.name == name)
    }

    /// Primary key column names: the explicit key if declared, else the flags.
    fn primary_key_columns(&self) -> Vec<&str> {
        self.keys
            .iter()
            .find(|k| k.kind == KeyKind::Primary)
            .map_or_else(
                || {
                    self.columns
                        .iter()
                        .filter(|c| c.def.is_primary_key())
                        .map(|c| c.def.name.as_str())
                        .collect()
                },
                |k| k.columns.iter().map(String::as_str).collect(),
            )
    }
}

#[derive(Debug)]
struct DraftView {
    def: ViewDef,
    from_span: Span,
    join_spans: Vec<Span>,
    column_spans: Vec<Span>,
}

// ============================================================
// Pass 1: syntax
// ============================================================

struct ParserState<'a> {
    tokens: &'a [Token],
    pos: usize,
    names: HashSet<String>,
}

impl<'a> ParserState<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            names: HashSet::new(),
        }
    }

    fn parse_file(mut self) -> MetaddlResult<(Vec<DraftTable>, Vec<DraftView>)> {
        let mut tables = Vec::new();
        let mut views = Vec::new();

        while let Some(token) = self.next() {
            match &token.kind {
                TokenKind::Ident(kw) if kw == "TABLE" => tables.push(self.parse_table(token)?),
                TokenKind::Ident(kw) if kw == "VIEW" => views.push(self.parse_view(token)?),
                other => {
                    return Err(error_at(
                        token,
                        format!("expected TABLE or VIEW, found {}", other.describe()),
                    ));
                }
            }
        }

        Ok((tables, views))
    }

    // ── Tables ──────────────────────────────────────────────────────

    fn parse_table(&mut self, keyword: &Token) -> MetaddlResult<DraftTable> {
        let (name, name_token) = self.expect_ident("table name")?;
        self.claim_name(&name, name_token)?;

        let key_type = if self.eat_keyword("KEYTYPE") {
            let (word, token) = self.expect_ident("key type")?;
            let key_type = KeyType::from_keyword(&word)
                .ok_or_else(|| error_at(token, format!("unknown KEYTYPE '{word}'")))?;
            Some((key_type, Span::of(token)))
        } else {
            None
        };
        self.expect(&TokenKind::LBrace, "'{'")?;

        let mut table = DraftTable {
            name,
            key_type,
            columns: Vec::new(),
            keys: Vec::new(),
            query_view: None,
            comment: None,
        };

        loop {
            let Some(token) = self.next() else {
                return Err(error_at(
                    keyword,
                    format!("unterminated block for table '{}'", table.name),
                ));
            };
            match &token.kind {
                TokenKind::RBrace => {
                    if table.columns.is_empty() {
                        return Err(error_at(
                            token,
                            format!("table '{}' has no columns", table.name),
                        ));
                    }
                    break;
                }
                TokenKind::Ident(kw) => match kw.as_str() {
                    "COLUMN" => {
                        let column = self.parse_column(&table.name)?;
                        if table.column(&column.def.name).is_some() {
                            return Err(parse_error(
                                column.span,
                                format!(
                                    "duplicate column '{}' in table '{}'",
                                    column.def.name, table.name
                                ),
                            ));
                        }
                        table.columns.push(column);
                    }
                    "KEY" => {
                        let key = self.parse_key(&table)?;
                        table.keys.push(key);
                    }
                    "QUERY_VIEW" => {
                        let (view, view_token) = self.expect_ident("view name")?;
                        if table.query_view.is_some() {
                            return Err(error_at(
                                token,
                                format!("table '{}' already has a QUERY_VIEW", table.name),
                            ));
                        }
                        table.query_view = Some((view, Span::of(view_token)));
                    }
                    "COMMENT" => {
                        let text = self.expect_string("comment")?;
                        if table.comment.is_some() {
                            return Err(error_at(
                                token,
                                format!("table '{}' already has a COMMENT", table.name),
                            ));
                        }
                        table.comment = Some(text);
                    }
                    other => {
                        return Err(error_at(
                            token,
                            format!("unknown keyword '{other}' in table '{}'", table.name),
                        ));
                    }
                },
                other => {
                    return Err(error_at(
                        token,
                        format!("expected a table item, found {}", other.describe()),
                    ));
                }
            }
        }

        check_primary_flags(&table)?;
        Ok(table)
    }

    fn parse_column(&mut self, table: &str) -> MetaddlResult<DraftColumn> {
        let (name, name_token) = self.expect_ident("column name")?;
        let data_type = self.parse_data_type()?;
        let mut column = DraftColumn {
            def: ColumnDef::new(name, data_type),
            foreign_key: None,
            span: Span::of(name_token),
        };

        while let Some(token) = self.peek() {
            let TokenKind::Ident(word) = &token.kind else {
                break;
            };
            match word.as_str() {
                "PRIMARY_KEY" => {
                    self.pos += 1;
                    column.def.options.insert(ColumnOption::PrimaryKey);
                }
                "MANDATORY" | "NULLABLE" => {
                    self.pos += 1;
                    let (this, other) = if word == "MANDATORY" {
                        (ColumnOption::Mandatory, ColumnOption::Nullable)
                    } else {
                        (ColumnOption::Nullable, ColumnOption::Mandatory)
                    };
                    if column.def.options.contains(&other) {
                        return Err(error_at(
                            token,
                            format!(
                                "column '{table}.{}' cannot be both MANDATORY and NULLABLE",
                                column.def.name
                            ),
                        ));
                    }
                    column.def.options.insert(this);
                }
                "DEFAULT" => {
                    self.pos += 1;
                    if column.def.default().is_some() {
                        return Err(error_at(
                            token,
                            format!("column '{table}.{}' has two DEFAULTs", column.def.name),
                        ));
                    }
                    self.expect(&TokenKind::LParen, "'('")?;
                    let value = self.parse_literal()?;
                    self.expect(&TokenKind::RParen, "')'")?;
                    column.def.options.insert(ColumnOption::Default(value));
                }
                "FOREIGN_KEY" => {
                    self.pos += 1;
                    if column.foreign_key.is_some() {
                        return Err(error_at(
                            token,
                            format!("column '{table}.{}' has two FOREIGN_KEYs", column.def.name),
                        ));
                    }
                    self.expect(&TokenKind::LParen, "'('")?;
                    let (target, target_token) = self.expect_ident("table name")?;
                    let target_column = if self.eat(&TokenKind::Dot) {
                        Some(self.expect_ident("column name")?.0)
                    } else {
                        None
                    };
                    self.expect(&TokenKind::RParen, "')'")?;
                    column.foreign_key = Some(DraftRef {
                        table: target,
                        column: target_column,
                        span: Span::of(target_token),
                    });
                }
                "COMMENT" => {
                    self.pos += 1;
                    if column.def.comment.is_some() {
                        return Err(error_at(
                            token,
                            format!("column '{table}.{}' has two COMMENTs", column.def.name),
                        ));
                    }
                    column.def.comment = Some(self.expect_string("comment")?);
                }
                _ => break,
            }
        }

        Ok(column)
    }

    fn parse_data_type(&mut self) -> MetaddlResult<DataType> {
        let (word, token) = self.expect_ident("data type")?;
        let data_type = match word.as_str() {
            "INTEGER" => DataType::Integer,
            "BIGINT" => DataType::BigInt,
            "SMALLINT" => DataType::SmallInt,
            "VARCHAR" => DataType::Varchar {
                length: self.parse_size()?,
            },
            "CHAR" => DataType::Char {
                length: self.parse_size()?,
            },
            "CLOB" => DataType::Clob,
            "DECIMAL" => {
                self.expect(&TokenKind::LParen, "'('")?;
                let precision = self.expect_positive("precision")?;
                self.expect(&TokenKind::Comma, "','")?;
                let scale = self.expect_unsigned("scale")?;
                self.expect(&TokenKind::RParen, "')'")?;
                if scale > precision {
                    return Err(error_at(
                        token,
                        format!("DECIMAL scale {scale} exceeds precision {precision}"),
                    ));
                }
                DataType::Decimal { precision, scale }
            }
            "DOUBLE" => DataType::Double,
            "DATE" => DataType::Date,
            "TIME" => DataType::Time,
            "TIMESTAMP" => DataType::Timestamp,
            "BOOLEAN" => DataType::Boolean,
            "BLOB" => DataType::Blob,
            other => return Err(error_at(token, format!("unknown data type '{other}'"))),
        };
        Ok(data_type)
    }

    fn parse_size(&mut self) -> MetaddlResult<u32> {
        self.expect(&TokenKind::LParen, "'('")?;
        let length = self.expect_positive("length")?;
        self.expect(&TokenKind::RParen, "')'")?;
        Ok(length)
    }

    fn parse_literal(&mut self) -> MetaddlResult<DefaultValue> {
        let token = self.next_or_eof("a default value")?;
        match &token.kind {
            TokenKind::Number(n) => Ok(DefaultValue::Int(*n)),
            TokenKind::Str(s) => Ok(DefaultValue::Text(s.clone())),
            TokenKind::Ident(word) => Ok(match word.as_str() {
                "TRUE" => DefaultValue::Bool(true),
                "FALSE" => DefaultValue::Bool(false),
                "NULL" => DefaultValue::Null,
                _ => DefaultValue::Expression(word.clone()),
            }),
            other => Err(error_at(
                token,
                format!("expected a default value, found {}", other.describe()),
            )),
        }
    }

    fn parse_key(&mut self, table: &DraftTable) -> MetaddlResult<DraftKey> {
        let (name, name_token) = self.expect_ident("key name")?;
        if table.keys.iter().any(|k| k.name == name) {
            return Err(error_at(
                name_token,
                format!("duplicate key '{name}' in table '{}'", table.name),
            ));
        }

        let (word, kind_token) = self.expect_ident("PRIMARY, UNIQUE or FOREIGN")?;
        let kind = match word.as_str() {
            "PRIMARY" => KeyKind::Primary,
            "UNIQUE" => KeyKind::Unique,
            "FOREIGN" => KeyKind::Foreign,
            other => return Err(error_at(kind_token, format!("unknown key kind '{other}'"))),
        };
        if kind == KeyKind::Primary && table.keys.iter().any(|k| k.kind == KeyKind::Primary) {
            return Err(error_at(
                kind_token,
                format!("table '{}' declares a second PRIMARY key", table.name),
            ));
        }

        let columns = self.parse_name_list()?;

        let references = if self.peek_keyword("REFERENCES") {
            let token = self.next_or_eof("REFERENCES")?;
            if kind != KeyKind::Foreign {
                return Err(error_at(
                    token,
                    format!("{kind} key '{name}' cannot have REFERENCES"),
                ));
            }
            let (target, _) = self.expect_ident("table name")?;
            let ref_columns = self.parse_name_list()?;
            if ref_columns.len() != columns.len() {
                return Err(error_at(
                    token,
                    format!(
                        "key '{name}' has {} columns but references {}",
                        columns.len(),
                        ref_columns.len()
                    ),
                ));
            }
            Some((target, ref_columns))
        } else {
            None
        };
        if kind == KeyKind::Foreign && references.is_none() {
            return Err(error_at(
                name_token,
                format!("FOREIGN key '{name}' requires REFERENCES"),
            ));
        }

        Ok(DraftKey {
            name,
            kind,
            columns,
            references,
            span: Span::of(name_token),
        })
    }

    fn parse_name_list(&mut self) -> MetaddlResult<Vec<String>> {
        self.expect(&TokenKind::LParen, "'('")?;
        let mut names = vec![self.expect_ident("column name")?.0];
        while self.eat(&TokenKind::Comma) {
            names.push(self.expect_ident("column name")?.0);
        }
        self.expect(&TokenKind::RParen, "')'")?;
        Ok(names)
    }

    // ── Views ───────────────────────────────────────────────────────

    fn parse_view(&mut self, keyword: &Token) -> MetaddlResult<DraftView> {
        let (name, name_token) = self.expect_ident("view name")?;
        self.claim_name(&name, name_token)?;
        self.expect_keyword("FROM")?;
        let (from, from_token) = self.expect_ident("table name")?;
        self.expect(&TokenKind::LBrace, "'{'")?;

        let mut view = DraftView {
            def: ViewDef::new(name, from),
            from_span: Span::of(from_token),
            join_spans: Vec::new(),
            column_spans: Vec::new(),
        };

        loop {
            let Some(token) = self.next() else {
                return Err(error_at(
                    keyword,
                    format!("unterminated block for view '{}'", view.def.name),
                ));
            };
            match &token.kind {
                TokenKind::RBrace => {
                    if view.def.columns.is_empty() {
                        return Err(error_at(
                            token,
                            format!("view '{}' has no columns", view.def.name),
                        ));
                    }
                    break;
                }
                TokenKind::Ident(kw) if kw == "JOIN" => {
                    let (table, table_token) = self.expect_ident("table name")?;
                    self.expect_keyword("ON")?;
                    let left = self.parse_column_ref()?;
                    self.expect(&TokenKind::Equals, "'='")?;
                    let right = self.parse_column_ref()?;
                    view.def.joins.push(ViewJoin { table, left, right });
                    view.join_spans.push(Span::of(table_token));
                }
                TokenKind::Ident(kw) if kw == "COLUMN" => {
                    let (alias, alias_token) = self.expect_ident("column alias")?;
                    if view.def.columns.iter().any(|c| c.name == alias) {
                        return Err(error_at(
                            alias_token,
                            format!("duplicate column '{alias}' in view '{}'", view.def.name),
                        ));
                    }
                    self.expect(&TokenKind::Equals, "'='")?;
                    let source = if self.eat_keyword("EXPR") {
                        ViewSource::Expression(self.expect_string("SQL expression")?)
                    } else {
                        ViewSource::Column(self.parse_column_ref()?)
                    };
                    let filter = if self.eat_keyword("MANDATORY_FILTER") {
                        FilterMarker::Mandatory
                    } else if self.eat_keyword("FILTER") {
                        FilterMarker::Filter
                    } else {
                        FilterMarker::None
                    };
                    view.def.columns.push(ViewColumnRef {
                        name: alias,
                        source,
                        filter,
                    });
                    view.column_spans.push(Span::of(alias_token));
                }
                TokenKind::Ident(other) => {
                    return Err(error_at(
                        token,
                        format!("unknown keyword '{other}' in view '{}'", view.def.name),
                    ));
                }
                other => {
                    return Err(error_at(
                        token,
                        format!("expected a view item, found {}", other.describe()),
                    ));
                }
            }
        }

        Ok(view)
    }

    fn parse_column_ref(&mut self) -> MetaddlResult<ColumnRef> {
        let (table, _) = self.expect_ident("table name")?;
        self.expect(&TokenKind::Dot, "'.'")?;
        let (column, _) = self.expect_ident("column name")?;
        Ok(ColumnRef { table, column })
    }

    // ── Token helpers ───────────────────────────────────────────────

    fn claim_name(&mut self, name: &str, token: &Token) -> MetaddlResult<()> {
        if !self.names.insert(name.to_string()) {
            return Err(error_at(token, format!("duplicate definition of '{name}'")));
        }
        Ok(())
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn next_or_eof(&mut self, expected: &str) -> MetaddlResult<&'a Token> {
        match self.next() {
            Some(token) => Ok(token),
            None => Err(self.eof_error(expected)),
        }
    }

    fn eof_error(&self, expected: &str) -> MetaddlError {
        let (line, column) = self
            .tokens
            .last()
            .map_or((1, 1), |t| (t.line, t.column));
        MetaddlError::parse(
            line,
            column,
            format!("unexpected end of input, expected {expected}"),
        )
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token { kind: TokenKind::Ident(w), .. }) if w == keyword)
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> MetaddlResult<()> {
        let token = self.next_or_eof(keyword)?;
        match &token.kind {
            TokenKind::Ident(w) if w == keyword => Ok(()),
            other => Err(error_at(
                token,
                format!("expected {keyword}, found {}", other.describe()),
            )),
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().is_some_and(|t| &t.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> MetaddlResult<&'a Token> {
        let token = self.next_or_eof(expected)?;
        if &token.kind == kind {
            Ok(token)
        } else {
            Err(error_at(
                token,
                format!("expected {expected}, found {}", token.kind.describe()),
            ))
        }
    }

    fn expect_ident(&mut self, expected: &str) -> MetaddlResult<(String, &'a Token)> {
        let token = self.next_or_eof(expected)?;
        match &token.kind {
            TokenKind::Ident(name) => Ok((name.clone(), token)),
            other => Err(error_at(
                token,
                format!("expected {expected}, found {}", other.describe()),
            )),
        }
    }

    fn expect_string(&mut self, expected: &str) -> MetaddlResult<String> {
        let token = self.next_or_eof(expected)?;
        match &token.kind {
            TokenKind::Str(s) => Ok(s.clone()),
            other => Err(error_at(
                token,
                format!("expected {expected} string, found {}", other.describe()),
            )),
        }
    }

    fn expect_unsigned(&mut self, expected: &str) -> MetaddlResult<u32> {
        let token = self.next_or_eof(expected)?;
        match &token.kind {
            TokenKind::Number(n) => u32::try_from(*n)
                .map_err(|_| error_at(token, format!("{expected} {n} is out of range"))),
            other => Err(error_at(
                token,
                format!("expected {expected}, found {}", other.describe()),
            )),
        }
    }

    fn expect_positive(&mut self, expected: &str) -> MetaddlResult<u32> {
        let position = self.peek().map(|t| (t.line, t.column));
        let value = self.expect_unsigned(expected)?;
        if value == 0 {
            let (line, column) = position.unwrap_or((1, 1));
            return Err(MetaddlError::parse(
                line,
                column,
                format!("{expected} must be positive"),
            ));
        }
        Ok(value)
    }
}

fn error_at(token: &Token, message: impl Into<String>) -> MetaddlError {
    MetaddlError::parse(token.line, token.column, message)
}

fn parse_error(span: Span, message: impl Into<String>) -> MetaddlError {
    MetaddlError::parse(span.line, span.column, message)
}

/// An explicit PRIMARY key and PRIMARY_KEY flags must name the same columns.
fn check_primary_flags(table: &DraftTable) -> MetaddlResult<()> {
    let Some(key) = table.keys.iter().find(|k| k.kind == KeyKind::Primary) else {
        return Ok(());
    };
    let mut flagged: Vec<&str> = table
        .columns
        .iter()
        .filter(|c| c.def.is_primary_key())
        .map(|c| c.def.name.as_str())
        .collect();
    if flagged.is_empty() {
        return Ok(());
    }
    let mut declared: Vec<&str> = key.columns.iter().map(String::as_str).collect();
    flagged.sort_unstable();
    declared.sort_unstable();
    if flagged != declared {
        return Err(parse_error(
            key.span,
            format!(
                "PRIMARY key '{}' does not match the PRIMARY_KEY columns of table '{}'",
                key.name, table.name
            ),
        ));
    }
    Ok(())
}

// ============================================================
// Pass 2: references
// ============================================================

fn unresolved(entity: String, reference: String, span: Span) -> MetaddlError {
    MetaddlError::UnresolvedReference {
        entity,
        reference,
        line: span.line,
        column: span.column,
    }
}

fn resolve(tables: Vec<DraftTable>, views: Vec<DraftView>) -> MetaddlResult<SchemaModel> {
    let by_name: HashMap<&str, &DraftTable> =
        tables.iter().map(|t| (t.name.as_str(), t)).collect();
    let view_names: HashSet<&str> = views.iter().map(|v| v.def.name.as_str()).collect();

    let mut resolved_tables = Vec::with_capacity(tables.len());
    for table in &tables {
        resolved_tables.push(resolve_table(table, &by_name, &view_names)?);
    }

    let mut schema = SchemaModel::new();
    for table in resolved_tables {
        schema.add_table(table)?;
    }
    for view in views {
        check_view(&view, &by_name)?;
        schema.add_view(view.def)?;
    }
    Ok(schema)
}

fn resolve_table(
    draft: &DraftTable,
    by_name: &HashMap<&str, &DraftTable>,
    view_names: &HashSet<&str>,
) -> MetaddlResult<TableDef> {
    let mut table = TableDef::new(draft.name.clone());
    table.comment.clone_from(&draft.comment);

    for column in &draft.columns {
        let mut def = column.def.clone();
        if let Some(fk) = &column.foreign_key {
            let entity = format!("table {}, column {}", draft.name, def.name);
            let target = resolve_foreign_target(fk, &entity, by_name)?;
            def.options.insert(ColumnOption::ForeignKey(target));
        }
        table.columns.push(def);
    }

    for key in &draft.keys {
        let entity = format!("table {}, key {}", draft.name, key.name);
        for name in &key.columns {
            if draft.column(name).is_none() {
                return Err(unresolved(
                    entity,
                    format!("column {}.{name}", draft.name),
                    key.span,
                ));
            }
        }
        let references = match &key.references {
            Some((target, columns)) => {
                let target_table = by_name
                    .get(target.as_str())
                    .ok_or_else(|| unresolved(entity.clone(), format!("table {target}"), key.span))?;
                for name in columns {
                    if target_table.column(name).is_none() {
                        return Err(unresolved(
                            entity,
                            format!("column {target}.{name}"),
                            key.span,
                        ));
                    }
                }
                Some(KeyReference {
                    table: target.clone(),
                    columns: columns.clone(),
                })
            }
            None => None,
        };
        table.keys.push(KeyDef {
            name: Some(key.name.clone()),
            kind: key.kind,
            columns: key.columns.clone(),
            references,
        });
    }

    if let Some((view, span)) = &draft.query_view {
        if !view_names.contains(view.as_str()) {
            return Err(unresolved(
                format!("table {}", draft.name),
                format!("view {view}"),
                *span,
            ));
        }
        table.query_view = Some(view.clone());
    }

    if let Some((declared, span)) = draft.key_type {
        let key_types: Vec<&DataType> = draft
            .primary_key_columns()
            .into_iter()
            .filter_map(|name| draft.column(name).map(|c| &c.def.data_type))
            .collect();
        let inferred = KeyType::infer(&key_types);
        if declared != inferred {
            return Err(parse_error(
                span,
                format!(
                    "KEYTYPE {declared} is inconsistent with the primary key of table '{}' ({inferred})",
                    draft.name
                ),
            ));
        }
    }

    Ok(table)
}

fn resolve_foreign_target(
    fk: &DraftRef,
    entity: &str,
    by_name: &HashMap<&str, &DraftTable>,
) -> MetaddlResult<ColumnRef> {
    let target = by_name
        .get(fk.table.as_str())
        .ok_or_else(|| unresolved(entity.to_string(), format!("table {}", fk.table), fk.span))?;

    let column = match &fk.column {
        Some(column) => {
            if target.column(column).is_none() {
                return Err(unresolved(
                    entity.to_string(),
                    format!("column {}.{column}", fk.table),
                    fk.span,
                ));
            }
            column.clone()
        }
        None => match target.primary_key_columns().as_slice() {
            [single] => (*single).to_string(),
            _ => {
                return Err(unresolved(
                    entity.to_string(),
                    format!("single-column primary key of table {}", fk.table),
                    fk.span,
                ));
            }
        },
    };

    Ok(ColumnRef::new(fk.table.clone(), column))
}

fn check_view(view: &DraftView, by_name: &HashMap<&str, &DraftTable>) -> MetaddlResult<()> {
    let def = &view.def;
    let mut sources: Vec<&DraftTable> = Vec::new();

    let from = by_name.get(def.from.as_str()).copied().ok_or_else(|| {
        unresolved(
            format!("view {}", def.name),
            format!("table {}", def.from),
            view.from_span,
        )
    })?;
    sources.push(from);

    for (join, span) in def.joins.iter().zip(&view.join_spans) {
        let entity = format!("view {}, join {}", def.name, join.table);
        let joined = by_name
            .get(join.table.as_str())
            .copied()
            .ok_or_else(|| unresolved(entity.clone(), format!("table {}", join.table), *span))?;
        sources.push(joined);
        for side in [&join.left, &join.right] {
            check_source_column(side, &sources, &entity, *span)?;
        }
    }

    for (column, span) in def.columns.iter().zip(&view.column_spans) {
        if let ViewSource::Column(source) = &column.source {
            let entity = format!("view {}, column {}", def.name, column.name);
            check_source_column(source, &sources, &entity, *span)?;
        }
    }

    Ok(())
}

fn check_source_column(
    reference: &ColumnRef,
    sources: &[&DraftTable],
    entity: &str,
    span: Span,
) -> MetaddlResult<()> {
    let table = sources
        .iter()
        .find(|t| t.name == reference.table)
        .ok_or_else(|| {
            unresolved(
                entity.to_string(),
                format!("source table {}", reference.table),
                span,
            )
        })?;
    if table.column(&reference.column).is_none() {
        return Err(unresolved(
            entity.to_string(),
            format!("column {reference}"),
            span,
        ));
    }
    Ok(())
}
