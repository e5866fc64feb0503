//! Core library for the `citytemp` service.
//!
//! This crate defines:
//! - Configuration handling (file, `.env`, environment)
//! - The city and temperature data model and its SQLite persistence
//! - Abstraction over the weather provider
//! - The batch temperature refresh routine
//!
//! It is used by `citytemp-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod provider;
pub mod refresh;

pub use config::{Config, ServerConfig, WeatherApiConfig};
pub use error::{Error, Result};
pub use model::{City, CityCreate, Temperature, TemperatureCreate};
pub use provider::{WeatherProvider, provider_from_config};
pub use refresh::{refresh_temperatures, refresh_temperatures_at};
