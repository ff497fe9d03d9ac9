//! The `diff` command.
//!
//! Reads two meta definitions, classifies their differences and renders a
//! migration script for the selected dialect (or the change list as JSON).
//! Without `--from` the "from" schema is empty, which yields the initial
//! migration creating everything in `--to`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use metaddl_core::{MetaddlError, MetaddlResult, Settings};
use metaddl_migrations::{diff, DialectRegistry, ScriptOptions, ScriptWriter};
use metaddl_schema::SchemaModel;
use tokio::io::AsyncWriteExt;

use crate::command::Command;

/// What the `diff` command emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// The migration script.
    Sql,
    /// The change list as JSON.
    Json,
}

/// The parsed arguments of one `diff` invocation.
#[derive(Debug, Clone)]
pub struct DiffArgs {
    /// The old meta definition; `None` means an empty schema.
    pub from: Option<PathBuf>,
    /// The new meta definition.
    pub to: PathBuf,
    /// Overrides the configured dialect.
    pub dialect: Option<String>,
    /// Overrides the configured schema version.
    pub schema_version: Option<u32>,
    /// Where to write the output; stdout when `None`.
    pub output: Option<PathBuf>,
    /// What to emit.
    pub format: OutputFormat,
}

impl DiffArgs {
    /// Extracts the arguments from clap matches.
    pub fn from_matches(matches: &clap::ArgMatches) -> MetaddlResult<Self> {
        let to = matches
            .get_one::<PathBuf>("to")
            .cloned()
            .ok_or_else(|| MetaddlError::ConfigurationError("--to is required".to_string()))?;
        let format = match matches.get_one::<String>("format").map(String::as_str) {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Sql,
        };
        Ok(Self {
            from: matches.get_one::<PathBuf>("from").cloned(),
            to,
            dialect: matches.get_one::<String>("dialect").cloned(),
            schema_version: matches.get_one::<u32>("schema-version").copied(),
            output: matches.get_one::<PathBuf>("output").cloned(),
            format,
        })
    }
}

/// Diffs two meta definitions into a migration script.
#[derive(Debug, Clone, Default)]
pub struct DiffCommand {
    dialects: DialectRegistry,
}

impl DiffCommand {
    /// Creates the command over a custom dialect registry.
    pub fn with_dialects(dialects: DialectRegistry) -> Self {
        Self { dialects }
    }

    /// Runs the whole pipeline and returns the rendered output.
    ///
    /// The dialect is resolved before any file is read, so a bad dialect
    /// name fails without touching the inputs.
    pub async fn run(&self, args: &DiffArgs, settings: &Settings) -> MetaddlResult<String> {
        let dialect = args.dialect.as_deref().unwrap_or(&settings.dialect);
        let mut generator = self.dialects.create(dialect)?;

        let from = match &args.from {
            Some(path) => read_model(path).await?,
            None => SchemaModel::new(),
        };
        let to = read_model(&args.to).await?;
        let changes = diff(&from, &to);
        tracing::info!(
            from = ?args.from,
            to = %args.to.display(),
            changes = changes.len(),
            "classified schema changes"
        );

        match args.format {
            OutputFormat::Json => changes.to_json(),
            OutputFormat::Sql => {
                let version = args.schema_version.or(settings.schema_version).ok_or_else(|| {
                    MetaddlError::ConfigurationError(
                        "no schema version given; pass --schema-version or set schema_version"
                            .to_string(),
                    )
                })?;
                ScriptWriter::new(ScriptOptions::from(settings)).render(
                    &changes,
                    generator.as_mut(),
                    version,
                )
            }
        }
    }
}

/// Reads and parses one meta definition file.
pub async fn read_model(path: &Path) -> MetaddlResult<SchemaModel> {
    let source = tokio::fs::read_to_string(path).await?;
    let model = metaddl_schema::parse(&source)?;
    tracing::debug!(
        path = %path.display(),
        tables = model.tables().len(),
        views = model.views().len(),
        "parsed meta definition"
    );
    Ok(model)
}

#[async_trait]
impl Command for DiffCommand {
    fn name(&self) -> &'static str {
        "diff"
    }

    fn help(&self) -> &'static str {
        "Generate a migration script from two meta definitions"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("from")
                .long("from")
                .value_parser(clap::value_parser!(PathBuf))
                .help("The old meta definition (omit for an initial migration)"),
        )
        .arg(
            clap::Arg::new("to")
                .long("to")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("The new meta definition"),
        )
        .arg(
            clap::Arg::new("dialect")
                .short('d')
                .long("dialect")
                .help("Target SQL dialect (see `metaddl dialects`)"),
        )
        .arg(
            clap::Arg::new("schema-version")
                .long("schema-version")
                .value_parser(clap::value_parser!(u32))
                .help("Schema version the script records"),
        )
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Write to this file instead of stdout"),
        )
        .arg(
            clap::Arg::new("format")
                .long("format")
                .value_parser(["sql", "json"])
                .default_value("sql")
                .help("Emit the SQL script or the change list as JSON"),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> MetaddlResult<()> {
        let args = DiffArgs::from_matches(matches)?;
        let output = self.run(&args, settings).await?;

        match &args.output {
            Some(path) => {
                tokio::fs::write(path, output.as_bytes()).await?;
                tracing::info!(path = %path.display(), "wrote migration script");
            }
            None => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(output.as_bytes()).await?;
                stdout.flush().await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(args: &[&str]) -> clap::ArgMatches {
        let cmd = DiffCommand::default();
        cmd.add_arguments(clap::Command::new("diff"))
            .try_get_matches_from(args)
            .unwrap()
    }

    #[test]
    fn test_args_from_matches() {
        let m = parse_args(&[
            "diff",
            "--from",
            "a.meta",
            "--to",
            "b.meta",
            "--dialect",
            "mysql",
            "--schema-version",
            "3",
        ]);
        let args = DiffArgs::from_matches(&m).unwrap();
        assert_eq!(args.from, Some(PathBuf::from("a.meta")));
        assert_eq!(args.to, PathBuf::from("b.meta"));
        assert_eq!(args.dialect.as_deref(), Some("mysql"));
        assert_eq!(args.schema_version, Some(3));
        assert_eq!(args.format, OutputFormat::Sql);
        assert!(args.output.is_none());
    }

    #[test]
    fn test_to_is_required() {
        let cmd = DiffCommand::default();
        let result = cmd
            .add_arguments(clap::Command::new("diff"))
            .try_get_matches_from(["diff", "--from", "a.meta"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_schema_version_rejected() {
        let cmd = DiffCommand::default();
        let result = cmd
            .add_arguments(clap::Command::new("diff"))
            .try_get_matches_from(["diff", "--to", "b.meta", "--schema-version", "two"]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unknown_dialect_fails_before_reading() {
        let args = DiffArgs::from_matches(&parse_args(&[
            "diff",
            "--to",
            "/nonexistent/b.meta",
            "--dialect",
            "oracle",
        ]))
        .unwrap();
        let err = DiffCommand::default()
            .run(&args, &Settings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MetaddlError::UnknownDialect(_)));
    }

    #[tokio::test]
    async fn test_missing_input_is_io_error() {
        let args = DiffArgs::from_matches(&parse_args(&["diff", "--to", "/nonexistent/b.meta"]))
            .unwrap();
        let err = DiffCommand::default()
            .run(&args, &Settings::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "io");
    }
}
