use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use divtrack::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for divtrack::AppCommand {
    fn from(cmd: Commands) -> divtrack::AppCommand {
        match cmd {
            Commands::List => divtrack::AppCommand::List,
            Commands::Summary { ticker } => divtrack::AppCommand::Summary { ticker },
            Commands::Refresh => divtrack::AppCommand::Refresh,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List tracked companies
    List,
    /// Display per-year valuation metrics and recommendations
    Summary {
        /// Restrict the summary to one ticker
        ticker: Option<String>,
    },
    /// Refresh cached market quotes for all companies
    Refresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => divtrack::cli::setup::setup(),
        Some(cmd) => divtrack::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
