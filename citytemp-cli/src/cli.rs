use std::sync::Arc;

use anyhow::Context;
use citytemp_core::{Config, db, provider_from_config, refresh_temperatures};
use clap::{Parser, Subcommand};
use inquire::{Password, Text};

use crate::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citytemp", version, about = "City temperature service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    Serve {
        /// Address to listen on, e.g. "0.0.0.0:8000". Overrides the config file.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Refresh every city's temperature once and print the results.
    Refresh,

    /// Interactively set the weather API key and database location.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { bind } => {
                let mut config = Config::from_env()?;
                if let Some(bind) = bind {
                    config.server.bind = bind;
                }
                serve(config).await
            }
            Command::Refresh => refresh(Config::from_env()?).await,
            Command::Configure => configure(),
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let pool = db::connect(&config.database_url)
        .await
        .context("Failed to open database")?;
    let provider = match provider_from_config(&config) {
        Ok(provider) => Some(provider.into()),
        Err(err) => {
            tracing::warn!("{err:#}; temperature refresh is disabled");
            None
        }
    };

    let state = Arc::new(server::AppState { pool, provider });
    server::run(&config.server.bind, state).await
}

async fn refresh(config: Config) -> anyhow::Result<()> {
    let pool = db::connect(&config.database_url)
        .await
        .context("Failed to open database")?;
    let provider = provider_from_config(&config)?;

    let temperatures = refresh_temperatures(&pool, provider.as_ref()).await?;

    for t in &temperatures {
        println!(
            "city {:>4}  {:>6.1} °C  at {}",
            t.city_id,
            t.temperature,
            t.date_time.format("%Y-%m-%d %H:%M:%S UTC"),
        );
    }
    println!("{} temperature(s) up to date", temperatures.len());

    pool.close().await;
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("WeatherAPI.com API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let base_url = Text::new("Weather API URL:")
        .with_default(&config.weather.base_url)
        .prompt()
        .context("Failed to read API URL")?;

    let database_url = Text::new("Database URL:")
        .with_default(&config.database_url)
        .prompt()
        .context("Failed to read database URL")?;

    if !api_key.trim().is_empty() {
        config.weather.api_key = Some(api_key.trim().to_string());
    }
    config.weather.base_url = base_url;
    config.database_url = database_url;

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}
