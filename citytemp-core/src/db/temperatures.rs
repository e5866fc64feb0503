use sqlx::SqliteConnection;

use crate::{
    error::Result,
    model::{Temperature, TemperatureCreate},
};

/// All temperature rows, optionally restricted to one city. A city id of 0
/// never names a row and is treated as no filter.
pub async fn list(conn: &mut SqliteConnection, city_id: Option<i64>) -> Result<Vec<Temperature>> {
    let temperatures = match city_id.filter(|id| *id != 0) {
        Some(city_id) => {
            sqlx::query_as::<_, Temperature>(
                "SELECT id, city_id, date_time, temperature FROM temperature WHERE city_id = ?",
            )
            .bind(city_id)
            .fetch_all(&mut *conn)
            .await?
        }
        None => {
            sqlx::query_as::<_, Temperature>(
                "SELECT id, city_id, date_time, temperature FROM temperature",
            )
            .fetch_all(&mut *conn)
            .await?
        }
    };
    Ok(temperatures)
}

/// The temperature row owned by a city, if one exists yet.
pub async fn find_by_city(conn: &mut SqliteConnection, city_id: i64) -> Result<Option<Temperature>> {
    let temperature = sqlx::query_as::<_, Temperature>(
        "SELECT id, city_id, date_time, temperature FROM temperature WHERE city_id = ?",
    )
    .bind(city_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(temperature)
}

pub async fn create(conn: &mut SqliteConnection, temperature: TemperatureCreate) -> Result<Temperature> {
    let result = sqlx::query(
        "INSERT INTO temperature (city_id, date_time, temperature) VALUES (?, ?, ?)",
    )
    .bind(temperature.city_id)
    .bind(temperature.date_time)
    .bind(temperature.temperature)
    .execute(&mut *conn)
    .await?;

    Ok(temperature.into_temperature(result.last_insert_rowid()))
}

/// Overwrite the value and timestamp of an existing row. The owning city is
/// never changed; the result echoes the submitted fields.
pub async fn update(
    conn: &mut SqliteConnection,
    temperature_id: i64,
    temperature: TemperatureCreate,
) -> Result<Temperature> {
    sqlx::query("UPDATE temperature SET temperature = ?, date_time = ? WHERE id = ?")
        .bind(temperature.temperature)
        .bind(temperature.date_time)
        .bind(temperature_id)
        .execute(&mut *conn)
        .await?;

    Ok(temperature.into_temperature(temperature_id))
}
