//! Run configuration for metaddl.
//!
//! [`Settings`] carries everything a diff run needs besides the two meta
//! sources themselves: which dialect to render for, which schema version the
//! script stamps, how the version table is named, and how loudly to log.
//! Every field has a default so partial configuration files are valid.

use serde::{Deserialize, Serialize};

/// The complete set of run settings.
///
/// # Examples
///
/// ```
/// use metaddl_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert_eq!(settings.dialect, "postgres");
/// assert_eq!(settings.version_table, "schema_version");
/// assert!(settings.transactional);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ── Generation ───────────────────────────────────────────────────

    /// The dialect name resolved through the dialect registry.
    pub dialect: String,
    /// The schema version the generated script persists, if fixed by config.
    pub schema_version: Option<u32>,

    // ── Version table ────────────────────────────────────────────────

    /// The table holding the persisted schema version.
    pub version_table: String,
    /// The column of [`Settings::version_table`] holding the version number.
    pub version_column: String,
    /// Whether the script creates and seeds the version table if missing.
    pub ensure_version_table: bool,
    /// Whether the script body is wrapped in a transaction.
    pub transactional: bool,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log filter (e.g. "warn", "metaddl_migrations=debug").
    pub log_level: String,
    /// Whether to use the human-readable log format.
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dialect: "postgres".to_string(),
            schema_version: None,
            version_table: "schema_version".to_string(),
            version_column: "version".to_string(),
            ensure_version_table: false,
            transactional: true,
            log_level: "warn".to_string(),
            debug: false,
        }
    }
}
