use clap::Parser;
use rootcause::cli::handle_analyze;
use rootcause::cli::handle_config_command;
use rootcause::cli::handle_seed;
use rootcause::cli::handle_serve_api;
use rootcause::cli::Cli;
use rootcause::cli::Commands;
use rootcause::config::AppConfig;
use rootcause::logging;
use rootcause::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The submit client only talks to a running service
    if let Commands::Analyze { url } = &cli.command {
        logging::init_simple_logging();
        return handle_analyze(url).await;
    }

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging; the guard flushes the log file on exit
    let _guard = if cli.verbose {
        logging::init_logging_with_level(&config.logging, "debug")?
    } else {
        logging::init_logging(&config.logging)?
    };
    info!("Configuration loaded successfully");

    // Execute the requested command
    match cli.command {
        Commands::Serve { host, port, cors } => {
            handle_serve_api(&config, host, port, cors).await?;
        }
        Commands::Seed => {
            handle_seed(&config).await?;
        }
        Commands::Config => {
            handle_config_command(&config)?;
        }
        Commands::Analyze { .. } => {}
    }

    Ok(())
}
