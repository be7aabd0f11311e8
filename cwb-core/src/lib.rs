//! Core library for the `cwb` weather dashboard.
//!
//! This crate defines:
//! - Configuration handling (credentials, selected city, endpoint base URL)
//! - The static city table and day/night resolver
//! - The CWB open-data client (current observation + 36h forecast)
//! - The weather data service that merges both feeds into one snapshot
//!
//! It is used by `cwb-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod moment;
pub mod service;

pub use client::CwbClient;
pub use config::Config;
pub use error::{ErrorKind, FetchError};
pub use location::Location;
pub use model::{CurrentObservation, ForecastSummary, WeatherSnapshot};
pub use moment::Moment;
pub use service::{FetchParams, WeatherService};
