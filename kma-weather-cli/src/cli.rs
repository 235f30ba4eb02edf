use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use kma_weather_core::{
    Config, KmaProvider, LocationResolver, ObservationWindow, WeatherOutcome,
    provider_from_settings,
};

use crate::{mcp::WeatherMcpServer, output};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "kma-weather", version, about = "Current weather for Korean regions (KMA)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the MCP tool server on stdin/stdout.
    Serve,

    /// Show current weather for a region.
    Show {
        /// Region name in Korean or English, e.g. "부산" or "Busan".
        #[arg(default_value = "서울")]
        city: String,

        /// Print the raw JSON result instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// List the regions that can be looked up.
    Locations,

    /// Store a KMA API hub key in the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve => {
                let settings = Config::load()?.resolve();
                let provider = provider_from_settings(settings)?;
                WeatherMcpServer::new(Arc::from(provider)).run_stdio().await?;
            }
            Command::Show { city, json } => {
                let settings = Config::load()?.resolve();
                let provider = KmaProvider::new(settings)?;

                let resolution = provider.resolver().resolve(&city);
                if let Some(note) = &resolution.note {
                    eprintln!("Note: {note}");
                }

                let outcome = provider
                    .fetch_resolved(&resolution, &ObservationWindow::current())
                    .await;
                if json {
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                } else {
                    print!("{}", output::render(&outcome));
                }

                if let WeatherOutcome::Error(err) = outcome {
                    anyhow::bail!("weather lookup failed: {}", err.message);
                }
            }
            Command::Locations => {
                print!("{}", output::render_locations(LocationResolver::default().entries()));
            }
            Command::Configure => {
                let mut cfg = Config::load()?;

                let api_key = inquire::Password::new("KMA API hub key:")
                    .without_confirmation()
                    .prompt()
                    .context("Failed to read API key")?;

                cfg.set_api_key(api_key);
                if cfg.api_key.is_none() {
                    anyhow::bail!("API key must not be empty");
                }
                cfg.save()?;

                println!("Saved API key to {}", Config::config_file_path()?.display());
            }
        }

        Ok(())
    }
}
