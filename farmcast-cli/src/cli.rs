use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use farmcast_core::{
    Config, Coordinate, DefaultLocation, DegradationController, UnsupportedGeolocator, advise,
};
use inquire::{CustomType, Password, PasswordDisplayMode, Text};
use std::{sync::Arc, time::Duration};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "farmcast", version, about = "Farm weather and advice that keeps working offline")]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the provider API key and the fallback location.
    Configure,

    /// Show current weather, the daily forecast and farming advice.
    Show {
        #[command(flatten)]
        position: Position,

        /// Print machine-readable JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Refresh periodically; failed refreshes fall back to the last good data.
    Watch {
        #[command(flatten)]
        position: Position,

        /// Seconds between refreshes.
        #[arg(long, default_value_t = 600)]
        every: u64,

        /// Stop after this many refreshes.
        #[arg(long)]
        count: Option<u32>,
    },
}

/// Explicit farm position; without it the device position (or the
/// configured default) is used.
#[derive(Debug, Args)]
pub struct Position {
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

impl Position {
    pub fn coordinate(&self) -> anyhow::Result<Option<Coordinate>> {
        let (Some(lat), Some(lon)) = (self.lat, self.lon) else {
            return Ok(None);
        };
        let coord = Coordinate::new(lat, lon);
        if !coord.is_valid() {
            bail!("Coordinate ({lat}, {lon}) is outside valid latitude/longitude ranges");
        }
        Ok(Some(coord))
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { position, json } => {
                let controller = controller()?;
                let snapshot = controller.fetch(position.coordinate()?).await;
                let advisories = advise(&snapshot);

                if json {
                    println!("{}", output::json(&snapshot, &advisories)?);
                } else {
                    print!("{}", output::render(&snapshot, &advisories, Utc::now())?);
                }
                Ok(())
            }
            Command::Watch { position, every, count } => {
                if every == 0 {
                    bail!("--every must be at least 1 second");
                }
                let coord = position.coordinate()?;
                let controller = controller()?;
                let mut ticker = tokio::time::interval(Duration::from_secs(every));
                let mut done = 0u32;

                loop {
                    ticker.tick().await;
                    let snapshot = controller.fetch(coord).await;
                    print!("{}", output::render(&snapshot, &advise(&snapshot), Utc::now())?);
                    println!();

                    done += 1;
                    if count.is_some_and(|n| done >= n) {
                        return Ok(());
                    }
                }
            }
        }
    }
}

fn controller() -> anyhow::Result<DegradationController> {
    let config = Config::load()?;
    DegradationController::from_config(&config, Arc::new(UnsupportedGeolocator))
        .context("Failed to build weather provider client")
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load_from(&Config::config_file_path()?)?;

    let api_key = Password::new("OpenWeather API key (leave empty for offline sample data):")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()?;
    config.set_api_key(api_key);

    let current = config.default_location.clone();
    let city = Text::new("Fallback location name:").with_default(&current.city).prompt()?;
    let country = Text::new("Fallback location country:").with_default(&current.country).prompt()?;
    let latitude = CustomType::<f64>::new("Fallback latitude:")
        .with_default(current.latitude)
        .with_error_message("Please enter a decimal number")
        .prompt()?;
    let longitude = CustomType::<f64>::new("Fallback longitude:")
        .with_default(current.longitude)
        .with_error_message("Please enter a decimal number")
        .prompt()?;

    config.default_location = DefaultLocation { latitude, longitude, city, country };
    config.validate()?;
    let path = config.save()?;

    println!("Saved configuration to {}", path.display());
    if !config.is_provider_configured() {
        println!("No API key set: farmcast will show built-in sample weather.");
    }
    Ok(())
}
