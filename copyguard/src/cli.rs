// copyguard/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "copyguard")]
#[command(about = "Quality gates and slot sanitization for LLM-generated marketing copy", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 📝 Scores a piece of copy against the rule registry
    Evaluate {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Registry module key (ex: "PRICING")
        #[arg(long, short)]
        module: String,

        /// Campaign intent, for intent-scoped rules (ex: "event_promo")
        #[arg(long)]
        intent: Option<String>,

        /// Read the copy from a file (stdin when neither a file nor TEXT is given)
        #[arg(long, short, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// The copy itself
        text: Option<String>,

        /// Output format: table | json
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Prefix hard-fail findings as review labels
        #[arg(long)]
        annotate: bool,
    },

    /// 🧼 Coerces a raw LLM reply into a module's slot shape
    Sanitize {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Module id from the catalog (ex: "FEATURES")
        #[arg(long, short)]
        module: String,

        /// File holding the raw reply (JSON, fenced JSON or prose around a JSON object)
        #[arg(long, short)]
        input: PathBuf,

        /// Write the sanitized module here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// 🚦 Reviews a brochure document (cross-page gate + per-module scores)
    Gate {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Brochure document (JSON)
        #[arg(long, short)]
        document: PathBuf,

        /// Output format: table | json
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Also save the JSON review to this file
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// 📋 Lists the compiled rules
    Rules {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Only rules applying to this module key
        #[arg(long, short)]
        module: Option<String>,
    },
}
