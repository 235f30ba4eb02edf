//! Binary crate for the `kma-weather` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Serving the weather tool over MCP on stdio
//! - Human-friendly output formatting

use clap::Parser;

mod cli;
mod mcp;
mod output;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional; its values win over the process environment.
    kma_weather_core::config::load_dotenv();

    // stdout carries MCP traffic in `serve`, so logs always go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
