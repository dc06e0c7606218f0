mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cellspot", about = "Cell detection in microscopy videos")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show metadata of a SER video, image or image directory
    Info(commands::info::InfoArgs),
    /// Detect cells and write annotated frames and box files
    Run(commands::run::RunArgs),
    /// Print or save the default pipeline config as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Run(args) => commands::run::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
