//! Docserve CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "docserve")]
#[command(about = "Documentation server for remote TypeScript modules", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "DOCSERVE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the documentation server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "DOCSERVE_PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "DOCSERVE_HOST")]
        host: Option<String>,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },
    /// Print the documentation of a module as JSON
    Doc {
        /// Module URL
        url: String,

        /// Dotted path of an item within the module
        item: Option<String>,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("docserve={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut settings = docserve_core::Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { port, host, open } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            if let Some(host) = host {
                settings.server.host = host;
            }
            tracing::info!("Docserve v{}", env!("CARGO_PKG_VERSION"));
            commands::serve(settings, open).await
        }
        Commands::Doc { url, item } => commands::doc(settings, url, item).await,
        Commands::Version => {
            println!("Docserve v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
