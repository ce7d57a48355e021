use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use crate::app::App;

pub mod app;
pub mod config;
pub mod engine;
pub mod event;

#[derive(Parser, Debug)]
#[command(about)]
struct Cli {
    #[arg(short, long, value_name = "FILE", default_value = config::DEFAULT_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sample continuously and write the daily usage log
    Run,
    /// Validate the configuration file and print the effective settings
    Validate,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    match &cli.command {
        Some(Commands::Validate) => {
            let config = config::load_from_file(cli.config)?;
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Some(Commands::Run) | None => {
            fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
                )
                .init();
            info!("Resource monitor starting");
            let mut app = App::new(cli.config)?;
            app.run().await
        }
    }
}
