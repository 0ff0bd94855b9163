use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marquee_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "marquee")]
#[command(author, version, about = "Preview, simulate and check the marquee widget")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (defaults to ~/.config/marquee/config.toml)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the terminal preview
    Run {
        /// Write logs to stderr while the preview is open
        #[arg(long)]
        log: bool,
    },
    /// Replay a scenario file and print a JSON report
    Simulate {
        /// Scenario file (TOML)
        scenario: PathBuf,
        /// Wait between steps in wall-clock time
        #[arg(long)]
        realtime: bool,
    },
    /// Resolve widget attributes and print the result
    Check {
        /// Attribute as KEY=VALUE, e.g. `--attr max=768` or `--attr data-mc-skew=4`
        #[arg(short = 'a', long = "attr", value_name = "KEY=VALUE")]
        attrs: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Arc::new(match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    });

    // The preview owns the terminal, so it only logs when asked to
    let logging = !matches!(cli.command, Some(Commands::Run { log: false }) | None);
    if logging {
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(
                std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
            ))
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    match cli.command {
        Some(Commands::Run { .. }) | None => commands::run::run(config).await,
        Some(Commands::Simulate { scenario, realtime }) => {
            commands::simulate::run(&scenario, realtime).await
        }
        Some(Commands::Check { attrs }) => commands::check::run(&config, &attrs),
    }
}
