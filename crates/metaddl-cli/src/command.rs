//! Command framework for the metaddl CLI.
//!
//! This module provides the [`Command`] trait for defining subcommands and
//! [`CommandRegistry`] for registering and dispatching them.
//!
//! ## Defining a Custom Command
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use metaddl_cli::command::Command;
//! use metaddl_core::{MetaddlResult, Settings};
//!
//! struct VersionCommand;
//!
//! #[async_trait]
//! impl Command for VersionCommand {
//!     fn name(&self) -> &str { "version" }
//!     fn help(&self) -> &str { "Print the tool version" }
//!
//!     async fn handle(
//!         &self,
//!         _matches: &clap::ArgMatches,
//!         _settings: &Settings,
//!     ) -> MetaddlResult<()> {
//!         println!("{}", env!("CARGO_PKG_VERSION"));
//!         Ok(())
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use metaddl_core::{settings_loader, MetaddlError, MetaddlResult, Settings};

/// A subcommand that can be registered and invoked through the CLI.
///
/// Implementations define a name, help text, optional arguments and an
/// async handler. Commands must be `Send + Sync` so the registry can be
/// shared across tasks.
#[async_trait]
pub trait Command: Send + Sync {
    /// Returns the name of this command (used to invoke it from the CLI).
    fn name(&self) -> &str;

    /// Returns a short help description for this command.
    fn help(&self) -> &str;

    /// Adds custom arguments to the clap command.
    ///
    /// The default implementation returns the command unchanged.
    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// Executes the command with the given argument matches and settings.
    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> MetaddlResult<()>;
}

/// A registry of CLI commands.
///
/// Commands are registered by name and can be looked up, listed, or executed.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// Creates a new empty command registry.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Registers a command, replacing any command with the same name.
    pub fn register(&mut self, command: Box<dyn Command>) {
        let name = command.name().to_string();
        self.commands.insert(name, command);
    }

    /// Returns the command with the given name, if registered.
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Returns a sorted list of all registered command names.
    pub fn list_commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Builds the top-level clap `Command` with every registered subcommand
    /// and the global `--config` and `--log-level` options.
    pub fn build_cli(&self) -> clap::Command {
        let mut app = clap::Command::new("metaddl")
            .about("Diff meta schema definitions into versioned SQL migration scripts")
            .version(env!("CARGO_PKG_VERSION"))
            .subcommand_required(true)
            .arg(
                clap::Arg::new("config")
                    .long("config")
                    .global(true)
                    .value_parser(clap::value_parser!(PathBuf))
                    .help("Settings file (.toml or .json)"),
            )
            .arg(
                clap::Arg::new("log-level")
                    .long("log-level")
                    .global(true)
                    .help("Log filter, e.g. debug or metaddl_migrations=trace"),
            );

        let mut entries: Vec<_> = self.commands.iter().collect();
        entries.sort_by_key(|(name, _)| (*name).clone());

        for (name, cmd) in entries {
            // clap wants 'static names; commands are registered once at startup.
            let static_name: &'static str = Box::leak(name.clone().into_boxed_str());
            let subcmd = clap::Command::new(static_name).about(cmd.help().to_string());
            app = app.subcommand(cmd.add_arguments(subcmd));
        }

        app
    }

    /// Executes the command identified by the given argument matches.
    pub async fn execute(&self, matches: &clap::ArgMatches, settings: &Settings) -> MetaddlResult<()> {
        let (name, sub_matches) = matches.subcommand().ok_or_else(|| {
            MetaddlError::ConfigurationError("No subcommand specified".to_string())
        })?;

        let cmd = self
            .get(name)
            .ok_or_else(|| MetaddlError::ConfigurationError(format!("Unknown command: {name}")))?;

        tracing::debug!(command = name, "dispatching command");
        cmd.handle(sub_matches, settings).await
    }
}

/// Resolves the run settings from the global options.
///
/// `--config` loads a TOML or JSON file, otherwise defaults are used;
/// `METADDL_*` environment variables apply on top, then `--log-level`.
pub fn load_settings(matches: &clap::ArgMatches) -> MetaddlResult<Settings> {
    let mut settings = match matches.get_one::<PathBuf>("config") {
        Some(path) => settings_loader::from_file_with_env(path)?,
        None => settings_loader::from_env(),
    };
    if let Some(level) = matches.get_one::<String>("log-level") {
        settings.log_level.clone_from(level);
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestCommand {
        cmd_name: String,
    }

    impl TestCommand {
        fn new(name: &str) -> Self {
            Self {
                cmd_name: name.to_string(),
            }
        }
    }

    #[async_trait]
    impl Command for TestCommand {
        fn name(&self) -> &str {
            &self.cmd_name
        }

        fn help(&self) -> &'static str {
            "A test command"
        }

        fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
            cmd.arg(
                clap::Arg::new("verbose")
                    .long("verbose")
                    .action(clap::ArgAction::SetTrue),
            )
        }

        async fn handle(
            &self,
            _matches: &clap::ArgMatches,
            _settings: &Settings,
        ) -> MetaddlResult<()> {
            Ok(())
        }
    }

    struct FailingCommand;

    #[async_trait]
    impl Command for FailingCommand {
        fn name(&self) -> &'static str {
            "fail"
        }

        fn help(&self) -> &'static str {
            "A command that always fails"
        }

        async fn handle(
            &self,
            _matches: &clap::ArgMatches,
            _settings: &Settings,
        ) -> MetaddlResult<()> {
            Err(MetaddlError::UnknownDialect("oracle".to_string()))
        }
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(CommandRegistry::default().is_empty());
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("test")));
        assert_eq!(registry.len(), 1);

        let cmd = registry.get("test").unwrap();
        assert_eq!(cmd.name(), "test");
        assert_eq!(cmd.help(), "A test command");
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_list_commands_sorted() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("zebra")));
        registry.register(Box::new(TestCommand::new("alpha")));
        registry.register(Box::new(TestCommand::new("alpha")));
        assert_eq!(registry.list_commands(), vec!["alpha", "zebra"]);
    }

    #[test]
    fn test_build_cli_with_arguments() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("test")));

        let matches = registry
            .build_cli()
            .try_get_matches_from(["metaddl", "test", "--verbose"])
            .unwrap();
        let (name, sub_matches) = matches.subcommand().unwrap();
        assert_eq!(name, "test");
        assert!(sub_matches.get_flag("verbose"));
    }

    #[test]
    fn test_global_options() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("test")));

        let matches = registry
            .build_cli()
            .try_get_matches_from(["metaddl", "test", "--log-level", "debug"])
            .unwrap();
        let settings = load_settings(&matches).unwrap();
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_missing_config_file() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("test")));

        let matches = registry
            .build_cli()
            .try_get_matches_from(["metaddl", "--config", "/nonexistent/metaddl.toml", "test"])
            .unwrap();
        assert!(load_settings(&matches).is_err());
    }

    #[tokio::test]
    async fn test_execute_success() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(TestCommand::new("test")));

        let matches = registry
            .build_cli()
            .try_get_matches_from(["metaddl", "test"])
            .unwrap();
        let result = registry.execute(&matches, &Settings::default()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_execute_failing_command() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(FailingCommand));

        let matches = registry
            .build_cli()
            .try_get_matches_from(["metaddl", "fail"])
            .unwrap();
        let err = registry
            .execute(&matches, &Settings::default())
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 78);
    }
}
