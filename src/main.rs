mod anchors;
mod catalog;
mod commands;
mod config;
mod diagnostics;
mod error;
mod filter;
mod include;
mod selector;
mod types;
mod xref;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "docsplice",
    about = "Selective include expansion and cross-page anchor resolution for AsciiDoc docs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand every page in the catalog and report broken includes and references
    Check {
        /// Docs root containing modules/
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Expand include directives and xref macros in one document
    Expand {
        /// Path to the source page
        file: PathBuf,
        /// Write output here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Docs root containing modules/
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { root } => commands::check(&root),
        Commands::Expand { file, output, root } => {
            commands::expand(&root, &file, output.as_deref())
        },
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        },
    }
}
