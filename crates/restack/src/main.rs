use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod logging;

#[derive(Parser)]
#[command(name = "restack")]
#[command(about = "Restart and update services of a compose-managed stack")]
#[command(version)]
struct Cli {
    /// Compose file path (default: compose CLI discovery)
    #[arg(short = 'f', long, global = true)]
    file: Option<PathBuf>,

    /// Compose project name
    #[arg(short = 'p', long, global = true)]
    project: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Restart services of the stack
    Restart(commands::restart::RestartArgs),

    /// List the services declared by the stack
    Services,

    /// Show running state and health of every declared service
    Status {
        /// Output format: table or json
        #[arg(long, default_value = "table")]
        format: String,
    },
}

fn main() -> Result<()> {
    logging::init();

    smol::block_on(async {
        let cli = Cli::parse();
        let settings = config::Settings::load(cli.file, cli.project);

        match cli.command {
            Commands::Restart(args) => commands::restart::run(&settings, args).await,
            Commands::Services => commands::services::run(&settings).await,
            Commands::Status { format } => commands::status::run(&settings, &format).await,
        }
    })
}
