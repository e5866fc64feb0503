use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const CITY_NAME_MAX_LEN: usize = 64;
pub const CITY_INFO_MAX_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct City {
    pub id: i64,
    pub name: String,
    pub additional_info: String,
}

/// Payload for creating or overwriting a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityCreate {
    pub name: String,
    pub additional_info: String,
}

impl CityCreate {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("city name must not be empty".into()));
        }
        if self.name.chars().count() > CITY_NAME_MAX_LEN {
            return Err(Error::Validation(format!(
                "city name must be at most {CITY_NAME_MAX_LEN} characters"
            )));
        }
        if self.additional_info.chars().count() > CITY_INFO_MAX_LEN {
            return Err(Error::Validation(format!(
                "additional_info must be at most {CITY_INFO_MAX_LEN} characters"
            )));
        }
        Ok(())
    }

    pub fn into_city(self, id: i64) -> City {
        City { id, name: self.name, additional_info: self.additional_info }
    }
}

/// Latest temperature reading for a city, in degrees Celsius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Temperature {
    pub id: i64,
    pub city_id: i64,
    pub date_time: DateTime<Utc>,
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureCreate {
    pub city_id: i64,
    pub date_time: DateTime<Utc>,
    pub temperature: f64,
}

impl TemperatureCreate {
    pub fn into_temperature(self, id: i64) -> Temperature {
        Temperature {
            id,
            city_id: self.city_id,
            date_time: self.date_time,
            temperature: self.temperature,
        }
    }
}
