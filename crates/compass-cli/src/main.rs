use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use compass_infrastructure::{CompassPaths, ConfigService};

mod app;
mod commands;
mod display;
mod logging;
mod navigator;

use app::App;
use commands::run::RunArgs;

#[derive(Parser)]
#[command(name = "compass")]
#[command(about = "Compass - candidate alignment review client", long_about = None)]
struct Cli {
    /// Directory holding config.toml and logs (defaults to the user config dir)
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Analysis service origin, overriding the configuration
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Mirror all log output to the terminal
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the whole workflow once: configure, ingest, analyze
    Run(RunArgs),
    /// List past analyses
    History,
    /// Print a past report
    Report {
        /// Report identifier
        id: String,
    },
    /// Write a past report as a standalone HTML page
    Render {
        /// Report identifier
        id: String,
        /// Output file
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },
    /// Export a past report as a paged A4 PDF
    Export {
        /// Report identifier
        #[arg(long)]
        id: String,
        /// Output directory, overriding the configuration
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },
    /// Interactive shell
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = CompassPaths::new(cli.config_dir.as_deref());
    let logs_dir = paths.logs_dir().ok();
    let _log_guard = logging::init(logs_dir.as_deref(), cli.verbose)?;

    let config_service = ConfigService::new(paths);

    let base_url = cli.base_url;
    let bootstrap = || App::bootstrap(&config_service, base_url.clone());

    match cli.command {
        Commands::Run(args) => commands::run::execute(&bootstrap()?, args).await?,
        Commands::History => commands::history::execute(&bootstrap()?).await?,
        Commands::Report { id } => commands::report::execute(&bootstrap()?, &id).await?,
        Commands::Render { id, out } => {
            commands::render::execute(&bootstrap()?, &id, &out).await?
        }
        Commands::Export { id, out_dir } => {
            commands::export::execute(&bootstrap()?, &id, out_dir).await?
        }
        Commands::Shell => commands::shell::execute(bootstrap()?).await?,
    }

    Ok(())
}
