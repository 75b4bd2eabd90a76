// copyguard/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug copyguard gate ... to see every rule firing.
    // Logs go to stderr so `--format json` output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            project_dir,
            module,
            intent,
            file,
            text,
            format,
            annotate,
        } => commands::evaluate::execute(commands::evaluate::EvaluateArgs {
            project_dir,
            module,
            intent,
            file,
            text,
            format,
            annotate,
        }),

        Commands::Sanitize {
            project_dir,
            module,
            input,
            output,
        } => commands::sanitize::execute(project_dir, module, input, output),

        Commands::Gate {
            project_dir,
            document,
            format,
            output,
        } => commands::gate::execute(project_dir, document, format, output),

        Commands::Rules {
            project_dir,
            module,
        } => commands::rules::execute(project_dir, module),
    }
}
