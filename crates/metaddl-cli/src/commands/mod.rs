//! Built-in commands.
//!
//! Each command implements the [`Command`](crate::command::Command) trait.

pub mod check;
pub mod dialects;
pub mod diff;

pub use check::CheckCommand;
pub use dialects::DialectsCommand;
pub use diff::DiffCommand;

use crate::command::CommandRegistry;

/// Registers all built-in commands into the given registry.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(DiffCommand::default()));
    registry.register(Box::new(CheckCommand));
    registry.register(Box::new(DialectsCommand::default()));
}
