use crate::{Config, provider::weatherapi::WeatherApiProvider};
use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};

pub mod weatherapi;

/// Source of current temperatures, looked up by city name.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current temperature in degrees Celsius.
    async fn current_temperature(&self, city_name: &str) -> anyhow::Result<f64>;
}

/// Construct the WeatherAPI.com provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.weather_api_key()?;

    let provider = WeatherApiProvider::new(
        config.weather.base_url.clone(),
        api_key.to_owned(),
        Duration::from_secs(config.weather.timeout_secs),
    )?;

    Ok(Box::new(provider))
}
