//! Core error types for metaddl.
//!
//! Every failure the engine can report is a variant of [`MetaddlError`]. The
//! variants follow the stages of a run: parsing a meta definition, resolving
//! its cross references, resolving a dialect, and rendering the changes for
//! that dialect. Each carries enough context (source location, entity name,
//! dialect) to fix the meta file or add dialect support.

use std::fmt;

use thiserror::Error;

/// A syntax error in a meta definition, tied to a source location.
///
/// Lines and columns are 1-based and point at the first character of the
/// offending token.
///
/// # Examples
///
/// ```
/// use metaddl_core::error::ParseError;
///
/// let err = ParseError::new(3, 7, "unknown keyword 'COLUMNS'");
/// assert_eq!(err.to_string(), "line 3, column 7: unknown keyword 'COLUMNS'");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The 1-based source line.
    pub line: usize,
    /// The 1-based source column.
    pub column: usize,
    /// What went wrong.
    pub message: String,
}

impl ParseError {
    /// Creates a new parse error at the given location.
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// The primary error type for metaddl.
#[derive(Error, Debug)]
pub enum MetaddlError {
    // ── Meta definitions ─────────────────────────────────────────────

    /// The meta source is syntactically malformed.
    #[error("Parse error: {0}")]
    Parse(ParseError),

    /// A key, view or link references a table or column that does not exist.
    #[error(
        "Unresolved reference at line {line}, column {column}: {entity} references unknown {reference}"
    )]
    UnresolvedReference {
        /// The referring element (e.g. `table person, key fk_org`).
        entity: String,
        /// The missing target (e.g. `column org.uuid`).
        reference: String,
        /// The 1-based source line of the reference.
        line: usize,
        /// The 1-based source column of the reference.
        column: usize,
    },

    /// A schema model already holds a table or view with this name.
    #[error("Duplicate definition: {kind} {name}")]
    DuplicateDefinition {
        /// `table` or `view`.
        kind: &'static str,
        /// The clashing name.
        name: String,
    },

    // ── Generation ───────────────────────────────────────────────────

    /// A computed change cannot be expressed by the selected dialect.
    #[error("Unsupported change for dialect {dialect}: {element}: {reason}")]
    UnsupportedChange {
        /// The dialect that rejected the change.
        dialect: String,
        /// The offending element (e.g. `person.photo`).
        element: String,
        /// Why the dialect cannot express it.
        reason: String,
    },

    /// No generator is registered under the requested dialect name.
    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value or command-line argument is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred while exporting a change set or model.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// Writing to the output sink or reading an input failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<ParseError> for MetaddlError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl MetaddlError {
    /// Shorthand for building a [`MetaddlError::Parse`].
    pub fn parse(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Parse(ParseError::new(line, column, message))
    }

    /// Shorthand for building a [`MetaddlError::UnsupportedChange`].
    pub fn unsupported(
        dialect: impl Into<String>,
        element: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnsupportedChange {
            dialect: dialect.into(),
            element: element.into(),
            reason: reason.into(),
        }
    }

    /// Returns a stable short code for this error's category.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse",
            Self::UnresolvedReference { .. } => "unresolved_reference",
            Self::DuplicateDefinition { .. } => "duplicate_definition",
            Self::UnsupportedChange { .. } => "unsupported_change",
            Self::UnknownDialect(_) => "unknown_dialect",
            Self::ConfigurationError(_) => "configuration",
            Self::SerializationError(_) => "serialization",
            Self::IoError(_) => "io",
        }
    }

    /// Returns the process exit code the CLI uses for this error.
    ///
    /// - `Parse`, `UnresolvedReference`, `DuplicateDefinition` -> 65 (bad input data)
    /// - `UnsupportedChange` -> 70 (cannot produce output)
    /// - `UnknownDialect`, `ConfigurationError` -> 78 (bad configuration)
    /// - `SerializationError`, `IoError` -> 74 (I/O failure)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Parse(_)
            | Self::UnresolvedReference { .. }
            | Self::DuplicateDefinition { .. } => 65,
            Self::UnsupportedChange { .. } => 70,
            Self::UnknownDialect(_) | Self::ConfigurationError(_) => 78,
            Self::SerializationError(_) | Self::IoError(_) => 74,
        }
    }
}

/// A convenience type alias for `Result<T, MetaddlError>`.
pub type MetaddlResult<T> = Result<T, MetaddlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new(12, 4, "unterminated block for table 'person'");
        assert_eq!(
            err.to_string(),
            "line 12, column 4: unterminated block for table 'person'"
        );
    }

    #[test]
    fn test_parse_error_converts() {
        let err: MetaddlError = ParseError::new(1, 1, "boom").into();
        assert!(matches!(err, MetaddlError::Parse(ref p) if p.line == 1));
        assert_eq!(err.to_string(), "Parse error: line 1, column 1: boom");
    }

    #[test]
    fn test_unresolved_reference_display() {
        let err = MetaddlError::UnresolvedReference {
            entity: "table person, column org_id".into(),
            reference: "table org".into(),
            line: 4,
            column: 30,
        };
        let msg = err.to_string();
        assert!(msg.contains("line 4, column 30"));
        assert!(msg.contains("table person, column org_id"));
        assert!(msg.contains("unknown table org"));
    }

    #[test]
    fn test_unsupported_change_names_element() {
        let err = MetaddlError::unsupported("mysql", "doc.body", "DEFAULT on a CLOB column");
        assert_eq!(
            err.to_string(),
            "Unsupported change for dialect mysql: doc.body: DEFAULT on a CLOB column"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(MetaddlError::parse(1, 1, "x").kind(), "parse");
        assert_eq!(MetaddlError::UnknownDialect("x".into()).kind(), "unknown_dialect");
        assert_eq!(
            MetaddlError::ConfigurationError("x".into()).kind(),
            "configuration"
        );
        assert_eq!(MetaddlError::unsupported("pg", "t", "r").kind(), "unsupported_change");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(MetaddlError::parse(1, 1, "x").exit_code(), 65);
        assert_eq!(MetaddlError::unsupported("pg", "t", "r").exit_code(), 70);
        assert_eq!(MetaddlError::UnknownDialect("oracle".into()).exit_code(), 78);
        let io = MetaddlError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(io.exit_code(), 74);
        assert_eq!(io.kind(), "io");
    }
}
