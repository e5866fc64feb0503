//! Batch refresh of every city's temperature from the weather provider.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{
    db::{cities, temperatures},
    error::{Error, Result},
    model::{Temperature, TemperatureCreate},
    provider::WeatherProvider,
};

/// Refresh all cities, stamping every row with the current time.
pub async fn refresh_temperatures(
    pool: &SqlitePool,
    provider: &dyn WeatherProvider,
) -> Result<Vec<Temperature>> {
    refresh_temperatures_at(pool, provider, Utc::now()).await
}

/// Refresh all cities sequentially, stamping every written row with `now`.
///
/// Each city's write commits in its own transaction. The first provider or
/// database failure aborts the batch; cities processed before it keep their
/// new readings.
pub async fn refresh_temperatures_at(
    pool: &SqlitePool,
    provider: &dyn WeatherProvider,
    now: DateTime<Utc>,
) -> Result<Vec<Temperature>> {
    let city_list = cities::list(&mut *pool.acquire().await?).await?;
    tracing::info!(cities = city_list.len(), "refreshing temperatures");

    for city in city_list {
        let existing = temperatures::find_by_city(&mut *pool.acquire().await?, city.id).await?;

        let current = provider
            .current_temperature(&city.name)
            .await
            .map_err(|source| Error::Provider { city: city.name.clone(), source })?;

        let reading = TemperatureCreate { city_id: city.id, date_time: now, temperature: current };

        let mut tx = pool.begin().await?;
        match existing {
            None => {
                temperatures::create(&mut tx, reading).await?;
            }
            Some(row) => {
                temperatures::update(&mut tx, row.id, reading).await?;
            }
        }
        tx.commit().await?;

        tracing::debug!(city_id = city.id, city = %city.name, temperature = current, "temperature stored");
    }

    temperatures::list(&mut *pool.acquire().await?, None).await
}
