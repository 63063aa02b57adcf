//! Lectern CLI - process e-books and inspect processed output

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse and validate a group count (must be at least 1)
fn parse_max_groups(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if n < 1 {
        Err("max groups must be at least 1".to_string())
    } else {
        Ok(n)
    }
}

#[derive(Parser)]
#[command(name = "lectern")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process an EPUB into a render-ready data directory
    Process {
        /// EPUB file path
        input: String,

        /// Output directory (default: <name>_data beside the input)
        #[arg(short, long)]
        output_dir: Option<String>,
    },

    /// Display information about a processed book
    Info {
        /// Data directory produced by `process`
        data_dir: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Preview how a chapter is split into paragraph groups
    Groups {
        /// Data directory produced by `process`
        data_dir: String,

        /// Chapter position (0-based)
        chapter: usize,

        /// Minimum characters per group
        #[arg(long, default_value = "500")]
        min_chars: usize,

        /// Maximum number of groups (must be at least 1)
        #[arg(long, default_value = "10", value_parser = parse_max_groups)]
        max_groups: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "lectern_cli=debug,lectern_core=debug"
    } else {
        "lectern_cli=info,lectern_core=warn"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Process { input, output_dir } => {
            commands::process(&input, output_dir.as_deref())
        }

        Commands::Info { data_dir, json } => commands::info(&data_dir, json),

        Commands::Groups {
            data_dir,
            chapter,
            min_chars,
            max_groups,
            json,
        } => commands::groups(&data_dir, chapter, min_chars, max_groups, json),
    }
}
