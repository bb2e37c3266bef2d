//! CLI command definitions and argument parsing

use clap::Parser;
use clap::Subcommand;

/// Default service address used by `analyze`
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8000";

#[derive(Parser)]
#[command(name = "rootcause")]
#[command(about = "AI customer support root cause analyzer")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP analysis service
    Serve {
        /// Host to bind to (default: from config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (default: from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable permissive CORS
        #[arg(long)]
        cors: bool,
    },
    /// Read a ticket from stdin and analyze it with a running service
    Analyze {
        /// Base URL of the analysis service
        #[arg(long, default_value = DEFAULT_SERVICE_URL)]
        url: String,
    },
    /// Seed the similarity index with the built-in incident corpus
    Seed,
    /// Show current configuration
    Config,
}
