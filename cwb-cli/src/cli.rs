use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use cwb_core::{Config, CwbClient, FetchParams, WeatherService, location, moment};
use tokio::sync::watch;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cwb", version, about = "Taiwan weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the dashboard once and exit.
    Show {
        /// Display city name, e.g. "臺北市". Defaults to the configured city.
        city: Option<String>,
    },

    /// Interactive dashboard with a settings screen.
    Dashboard,

    /// Store the CWB authorization key and default city.
    Configure,

    /// List the supported cities.
    Cities,
}

/// The dashboard's screens. Closed set, matched exhaustively in the
/// interactive loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Dashboard,
    Settings,
}

const MENU_REFRESH: &str = "Refresh";
const MENU_SETTINGS: &str = "Settings";
const MENU_QUIT: &str = "Quit";

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Show { city } => show(city).await,
            Command::Dashboard => dashboard().await,
            Command::Configure => configure(),
            Command::Cities => {
                for city in location::supported_cities() {
                    println!("{city}");
                }
                Ok(())
            }
        }
    }
}

async fn show(city: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let city = city.as_deref().unwrap_or_else(|| config.city_or_default());

    let location = location::resolve(city)?;
    tracing::debug!(city = %location.city_name, station = %location.location_name, "resolved city");

    let client = CwbClient::new(config.base_url_or_default(), config.authorization_key()?);
    let service = WeatherService::new(client, fetch_params(&location));

    service.refresh().await.context("fetch cycle failed")?;

    let moment = moment::moment_of(location.sunrise_city_name, Utc::now());
    render::dashboard(&location, moment, &service.snapshot());
    Ok(())
}

async fn dashboard() -> Result<()> {
    let mut config = Config::load()?;
    let authorization_key = config.authorization_key()?.to_owned();
    let mut location = location::resolve(config.city_or_default())?;

    let client = CwbClient::new(config.base_url_or_default(), authorization_key);
    let (service, mut receiver) = WeatherService::start(client, fetch_params(&location));
    wait_settled(&mut receiver).await;

    let mut screen = Screen::Dashboard;
    loop {
        match screen {
            Screen::Dashboard => {
                let moment = moment::moment_of(location.sunrise_city_name, Utc::now());
                render::dashboard(&location, moment, &service.snapshot());

                let choice = inquire::Select::new(
                    "Next:",
                    vec![MENU_REFRESH, MENU_SETTINGS, MENU_QUIT],
                )
                .prompt()?;

                match choice {
                    MENU_REFRESH => {
                        // A failed cycle is surfaced through the snapshot's
                        // error marker, so the loop keeps rendering.
                        let _ = service.refresh().await;
                    }
                    MENU_SETTINGS => screen = Screen::Settings,
                    _ => break,
                }
            }
            Screen::Settings => {
                let city =
                    inquire::Select::new("City:", location::supported_cities()).prompt()?;

                config.set_city(city);
                config.save()?;

                location = location::resolve(city)?;
                let _ = service
                    .set_location(location.location_name, location.city_name)
                    .await;

                screen = Screen::Dashboard;
            }
        }
    }

    Ok(())
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let key = inquire::Text::new("CWB authorization key:").prompt()?;
    if !key.trim().is_empty() {
        config.set_authorization_key(key.trim());
    }

    let city = inquire::Select::new("Default city:", location::supported_cities()).prompt()?;
    config.set_city(city);

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn fetch_params(location: &location::Location) -> FetchParams {
    FetchParams {
        location_name: location.location_name.into(),
        city_name: location.city_name.into(),
    }
}

/// Wait until the published snapshot leaves the loading state.
async fn wait_settled(receiver: &mut watch::Receiver<cwb_core::WeatherSnapshot>) {
    loop {
        if !receiver.borrow_and_update().is_loading {
            return;
        }
        if receiver.changed().await.is_err() {
            return;
        }
    }
}
