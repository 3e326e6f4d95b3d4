use clap::{Parser, Subcommand};
use pff_client::commands;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "pff",
    about = "Tool for working with PFF game-asset archives",
    version,
    author,
    long_about = "A command-line tool for PFF asset containers: inspect archive contents, \
                  extract archives into editable directory trees, and pack directory trees \
                  back into archives."
)]
struct Cli {
    /// Set the logging level
    #[arg(short, long, value_enum, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the contents of an archive
    Inspect {
        /// Archive file to inspect
        archive: PathBuf,
    },

    /// Extract an archive into a directory tree with a manifest
    Extract {
        /// Archive file to extract
        archive: PathBuf,

        /// Destination directory (created if missing)
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Pack an extracted directory tree into an archive
    Pack {
        /// Source directory containing manifest.json
        source: PathBuf,

        /// Archive file to write
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .init();

    // Handle commands
    match cli.command {
        Commands::Inspect { archive } => commands::inspect::handle(&archive)?,
        Commands::Extract { archive, output } => commands::extract::handle(&archive, &output)?,
        Commands::Pack { source, output } => commands::pack::handle(&source, &output)?,
    }

    Ok(())
}
