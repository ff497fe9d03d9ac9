//! Tokenizer for meta definitions.
//!
//! Splits source text into identifiers, integer literals, single-quoted
//! strings and punctuation, tracking the 1-based line and column of every
//! token. `#` and `--` start comments that run to the end of the line.

use metaddl_core::ParseError;

/// The kind of a token, with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A keyword or name: `[A-Za-z_][A-Za-z0-9_]*`.
    Ident(String),
    /// An integer literal, optionally negative.
    Number(i64),
    /// A single-quoted string with `''` unescaped.
    Str(String),
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `=`
    Equals,
}

impl TokenKind {
    /// A short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Ident(s) => format!("'{s}'"),
            Self::Number(n) => format!("number {n}"),
            Self::Str(_) => "string literal".to_string(),
            Self::LBrace => "'{'".to_string(),
            Self::RBrace => "'}'".to_string(),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
            Self::Comma => "','".to_string(),
            Self::Dot => "'.'".to_string(),
            Self::Equals => "'='".to_string(),
        }
    }
}

/// A token with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What was read.
    pub kind: TokenKind,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
}

struct Cursor<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }
}

/// Tokenizes a meta definition.
///
/// # Errors
///
/// Returns a [`ParseError`] for unterminated strings, integer literals that
/// overflow `i64`, and characters outside the grammar.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut cursor = Cursor::new(source);
    let mut tokens = Vec::new();

    while let Some(c) = cursor.peek() {
        let line = cursor.line;
        let column = cursor.column;

        if c.is_whitespace() {
            cursor.bump();
            continue;
        }
        if c == '#' || (c == '-' && cursor.peek_second() == Some('-')) {
            cursor.skip_line();
            continue;
        }

        let kind = match c {
            '{' => single(&mut cursor, TokenKind::LBrace),
            '}' => single(&mut cursor, TokenKind::RBrace),
            '(' => single(&mut cursor, TokenKind::LParen),
            ')' => single(&mut cursor, TokenKind::RParen),
            ',' => single(&mut cursor, TokenKind::Comma),
            '.' => single(&mut cursor, TokenKind::Dot),
            '=' => single(&mut cursor, TokenKind::Equals),
            '\'' => read_string(&mut cursor, line, column)?,
            '-' if cursor.peek_second().is_some_and(|d| d.is_ascii_digit()) => {
                cursor.bump();
                read_number(&mut cursor, true, line, column)?
            }
            d if d.is_ascii_digit() => read_number(&mut cursor, false, line, column)?,
            a if a.is_ascii_alphabetic() || a == '_' => read_ident(&mut cursor),
            other => {
                return Err(ParseError::new(
                    line,
                    column,
                    format!("unexpected character '{other}'"),
                ));
            }
        };
        tokens.push(Token { kind, line, column });
    }

    Ok(tokens)
}

fn single(cursor: &mut Cursor<'_>, kind: TokenKind) -> TokenKind {
    cursor.bump();
    kind
}

fn read_string(cursor: &mut Cursor<'_>, line: usize, column: usize) -> Result<TokenKind, ParseError> {
    cursor.bump();
    let mut value = String::new();
    loop {
        match cursor.bump() {
            Some('\'') => {
                if cursor.peek() == Some('\'') {
                    cursor.bump();
                    value.push('\'');
                } else {
                    return Ok(TokenKind::Str(value));
                }
            }
            Some(c) => value.push(c),
            None => return Err(ParseError::new(line, column, "unterminated string literal")),
        }
    }
}

fn read_number(
    cursor: &mut Cursor<'_>,
    negative: bool,
    line: usize,
    column: usize,
) -> Result<TokenKind, ParseError> {
    let mut digits = String::new();
    if negative {
        digits.push('-');
    }
    while let Some(c) = cursor.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        cursor.bump();
    }
    digits
        .parse::<i64>()
        .map(TokenKind::Number)
        .map_err(|_| ParseError::new(line, column, format!("integer literal {digits} out of range")))
}

fn read_ident(cursor: &mut Cursor<'_>) -> TokenKind {
    let mut ident = String::new();
    while let Some(c) = cursor.peek() {
        if !(c.is_ascii_alphanumeric() || c == '_') {
            break;
        }
        ident.push(c);
        cursor.bump();
    }
    TokenKind::Ident(ident)
}
