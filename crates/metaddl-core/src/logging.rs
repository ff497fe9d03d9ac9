//! Logging integration for metaddl.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-run spans.
//! Log output always goes to stderr; stdout is reserved for generated scripts.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The filter is read from `settings.log_level`, falling back to `warn` when
/// it does not parse. In debug mode a pretty, human-readable format is used;
/// otherwise a structured JSON format is used. Installing a second subscriber
/// is a no-op.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one diff run.
///
/// # Examples
///
/// ```
/// use metaddl_core::logging::run_span;
///
/// let span = run_span("postgres", 2);
/// let _guard = span.enter();
/// tracing::info!("generating script");
/// ```
pub fn run_span(dialect: &str, schema_version: u32) -> tracing::Span {
    tracing::info_span!("diff_run", dialect = dialect, schema_version = schema_version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_logging_twice_is_harmless() {
        let settings = Settings {
            log_level: "not a valid filter [[[".into(),
            ..Settings::default()
        };
        setup_logging(&settings);
        setup_logging(&Settings::default());
    }

    #[test]
    fn test_run_span_enters() {
        let span = run_span("mysql", 3);
        let _guard = span.enter();
        tracing::debug!("inside run span");
    }
}
