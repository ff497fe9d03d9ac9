use std::process::ExitCode;

use metaddl_cli::{register_builtin_commands, CommandRegistry};

#[tokio::main]
async fn main() -> ExitCode {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);

    let matches = registry.build_cli().get_matches();

    match metaddl_cli::run(&registry, &matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
        }
    }
}
