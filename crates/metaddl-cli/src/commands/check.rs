//! The `check` command.
//!
//! Parses meta definition files and reports what each declares, without
//! diffing anything. Useful as a pre-commit gate for hand-edited sources.

use std::path::PathBuf;

use async_trait::async_trait;
use metaddl_core::{MetaddlError, MetaddlResult, Settings};
use serde::Serialize;

use crate::command::Command;
use crate::commands::diff::read_model;

/// Validates meta definition files.
pub struct CheckCommand;

/// The summary of one successfully parsed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// The checked file.
    pub path: PathBuf,
    /// Number of tables declared.
    pub tables: usize,
    /// Number of views declared.
    pub views: usize,
}

impl std::fmt::Display for CheckReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} table(s), {} view(s)",
            self.path.display(),
            self.tables,
            self.views
        )
    }
}

/// Parses every file in order and stops at the first invalid one.
pub async fn check_files(paths: &[PathBuf]) -> MetaddlResult<Vec<CheckReport>> {
    let mut reports = Vec::with_capacity(paths.len());
    for path in paths {
        let model = read_model(path).await.map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "meta definition rejected");
            e
        })?;
        reports.push(CheckReport {
            path: path.clone(),
            tables: model.tables().len(),
            views: model.views().len(),
        });
    }
    Ok(reports)
}

#[async_trait]
impl Command for CheckCommand {
    fn name(&self) -> &'static str {
        "check"
    }

    fn help(&self) -> &'static str {
        "Parse meta definition files and report their contents"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("files")
                .required(true)
                .num_args(1..)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Meta definition files to check"),
        )
        .arg(
            clap::Arg::new("json")
                .long("json")
                .action(clap::ArgAction::SetTrue)
                .help("Print the reports as JSON"),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, _settings: &Settings) -> MetaddlResult<()> {
        let paths: Vec<PathBuf> = matches
            .get_many::<PathBuf>("files")
            .map_or_else(Vec::new, |files| files.cloned().collect());

        let reports = check_files(&paths).await?;

        if matches.get_flag("json") {
            let json = serde_json::to_string_pretty(&reports)
                .map_err(|e| MetaddlError::SerializationError(e.to_string()))?;
            println!("{json}");
        } else {
            for report in &reports {
                println!("{report}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_display() {
        let report = CheckReport {
            path: PathBuf::from("shop.meta"),
            tables: 3,
            views: 1,
        };
        assert_eq!(report.to_string(), "shop.meta: 3 table(s), 1 view(s)");
    }

    #[test]
    fn test_files_required() {
        let result = CheckCommand
            .add_arguments(clap::Command::new("check"))
            .try_get_matches_from(["check"]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_check_no_files() {
        assert!(check_files(&[]).await.unwrap().is_empty());
    }
}
