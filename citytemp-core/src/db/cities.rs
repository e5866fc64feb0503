use sqlx::SqliteConnection;

use crate::{
    error::{Error, Result},
    model::{City, CityCreate},
};

/// All cities, in store order.
pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<City>> {
    let cities = sqlx::query_as::<_, City>("SELECT id, name, additional_info FROM city")
        .fetch_all(&mut *conn)
        .await?;
    Ok(cities)
}

pub async fn get(conn: &mut SqliteConnection, city_id: i64) -> Result<City> {
    sqlx::query_as::<_, City>("SELECT id, name, additional_info FROM city WHERE id = ?")
        .bind(city_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(Error::CityNotFound(city_id))
}

pub async fn create(conn: &mut SqliteConnection, city: CityCreate) -> Result<City> {
    let result = sqlx::query("INSERT INTO city (name, additional_info) VALUES (?, ?)")
        .bind(&city.name)
        .bind(&city.additional_info)
        .execute(&mut *conn)
        .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(city_id = id, name = %city.name, "city created");

    Ok(city.into_city(id))
}

/// Overwrite a city's fields. The returned value echoes the submitted fields
/// without reading the row back.
pub async fn update(conn: &mut SqliteConnection, city_id: i64, city: CityCreate) -> Result<City> {
    sqlx::query("UPDATE city SET name = ?, additional_info = ? WHERE id = ?")
        .bind(&city.name)
        .bind(&city.additional_info)
        .bind(city_id)
        .execute(&mut *conn)
        .await?;

    Ok(city.into_city(city_id))
}

/// Delete a city by id. Deleting an absent id is not an error; the city's
/// temperature row goes with it through the foreign key cascade.
pub async fn delete(conn: &mut SqliteConnection, city_id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM city WHERE id = ?")
        .bind(city_id)
        .execute(&mut *conn)
        .await?;

    tracing::debug!(city_id, rows = result.rows_affected(), "city deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{temperatures, test_pool};
    use crate::model::TemperatureCreate;

    fn berlin() -> CityCreate {
        CityCreate { name: "Berlin".into(), additional_info: "capital".into() }
    }

    #[tokio::test]
    async fn created_city_is_retrievable() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.expect("connection");

        let created = create(&mut conn, berlin()).await.expect("create");
        assert_eq!(created.id, 1);

        let fetched = get(&mut conn, created.id).await.expect("get");
        assert_eq!(fetched, created);
        assert_eq!(fetched.name, "Berlin");
        assert_eq!(fetched.additional_info, "capital");
    }

    #[tokio::test]
    async fn created_ids_are_unique() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.expect("connection");

        let a = create(&mut conn, berlin()).await.expect("create");
        let b = create(&mut conn, berlin()).await.expect("create");
        assert_ne!(a.id, b.id);

        assert_eq!(list(&mut conn).await.expect("list").len(), 2);
    }

    #[tokio::test]
    async fn missing_city_is_not_found_with_id() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.expect("connection");

        let err = get(&mut conn, 42).await.unwrap_err();
        assert!(matches!(err, Error::CityNotFound(42)));
        assert_eq!(err.to_string(), "City with id 42 not found");
    }

    #[tokio::test]
    async fn update_changes_only_target_row() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.expect("connection");

        let first = create(&mut conn, berlin()).await.expect("create");
        let second = create(
            &mut conn,
            CityCreate { name: "Paris".into(), additional_info: "france".into() },
        )
        .await
        .expect("create");

        let payload = CityCreate { name: "Munich".into(), additional_info: "bavaria".into() };
        let updated = update(&mut conn, first.id, payload.clone()).await.expect("update");
        assert_eq!(updated, payload.into_city(first.id));

        assert_eq!(get(&mut conn, first.id).await.expect("get"), updated);
        assert_eq!(get(&mut conn, second.id).await.expect("get"), second);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.expect("connection");

        let city = create(&mut conn, berlin()).await.expect("create");
        delete(&mut conn, city.id).await.expect("delete");

        assert!(matches!(get(&mut conn, city.id).await, Err(Error::CityNotFound(_))));
    }

    #[tokio::test]
    async fn deleting_absent_city_succeeds() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.expect("connection");

        delete(&mut conn, 999).await.expect("delete of absent id is a no-op");
    }

    #[tokio::test]
    async fn delete_cascades_to_temperature() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.expect("connection");

        let city = create(&mut conn, berlin()).await.expect("create");
        temperatures::create(
            &mut conn,
            TemperatureCreate { city_id: city.id, date_time: chrono::Utc::now(), temperature: 3.0 },
        )
        .await
        .expect("temperature");

        delete(&mut conn, city.id).await.expect("delete");

        assert!(temperatures::list(&mut conn, None).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn rolled_back_create_leaves_no_row() {
        let pool = test_pool().await;

        let mut tx = pool.begin().await.expect("begin");
        create(&mut tx, berlin()).await.expect("create");
        tx.rollback().await.expect("rollback");

        let mut conn = pool.acquire().await.expect("connection");
        assert!(list(&mut conn).await.expect("list").is_empty());
    }
}
