//! The `dialects` command.

use async_trait::async_trait;
use metaddl_core::{MetaddlResult, Settings};
use metaddl_migrations::DialectRegistry;

use crate::command::Command;

/// Lists the dialect names `diff --dialect` accepts.
#[derive(Debug, Clone, Default)]
pub struct DialectsCommand {
    dialects: DialectRegistry,
}

impl DialectsCommand {
    /// Creates the command over a custom dialect registry.
    pub fn with_dialects(dialects: DialectRegistry) -> Self {
        Self { dialects }
    }

    /// Returns one line per registered name, marking the configured default.
    pub fn lines(&self, settings: &Settings) -> Vec<String> {
        let default = settings.dialect.trim().to_ascii_lowercase();
        self.dialects
            .names()
            .into_iter()
            .map(|name| {
                if name == default {
                    format!("{name} (default)")
                } else {
                    name.to_string()
                }
            })
            .collect()
    }
}

#[async_trait]
impl Command for DialectsCommand {
    fn name(&self) -> &'static str {
        "dialects"
    }

    fn help(&self) -> &'static str {
        "List the available SQL dialects"
    }

    async fn handle(&self, _matches: &clap::ArgMatches, settings: &Settings) -> MetaddlResult<()> {
        for line in self.lines(settings) {
            println!("{line}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_mark_default() {
        let lines = DialectsCommand::default().lines(&Settings::default());
        assert_eq!(lines.len(), 5);
        assert!(lines.contains(&"postgres (default)".to_string()));
        assert!(lines.contains(&"mysql".to_string()));
    }

    #[test]
    fn test_custom_registry() {
        let cmd = DialectsCommand::with_dialects(DialectRegistry::new());
        assert!(cmd.lines(&Settings::default()).is_empty());
    }
}
