use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use citytemp_core::{
    City, CityCreate, Error, Temperature, WeatherProvider,
    db::{cities, temperatures},
    refresh_temperatures,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub pool: SqlitePool,
    /// Absent when no API key is configured; only the refresh route needs it.
    pub provider: Option<Arc<dyn WeatherProvider>>,
}

type SharedState = Arc<AppState>;

// --- Errors ---

/// Maps core errors onto HTTP responses.
#[derive(Debug)]
pub struct ApiError(Error);

impl<E> From<E> for ApiError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            Error::CityNotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            Error::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            Error::ProviderUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, self.0.to_string()),
            other => {
                tracing::error!(error = %other, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

// --- Request/Response Structs ---

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(rename = "Message")]
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self { message: message.to_string() })
    }
}

#[derive(Debug, Deserialize)]
pub struct TemperatureQuery {
    city_id: Option<i64>,
}

// --- Route Handlers ---

async fn home() -> Json<MessageResponse> {
    MessageResponse::new("The server is running")
}

async fn list_cities(State(state): State<SharedState>) -> Result<Json<Vec<City>>, ApiError> {
    let mut conn = state.pool.acquire().await?;
    Ok(Json(cities::list(&mut conn).await?))
}

async fn get_city(
    State(state): State<SharedState>,
    Path(city_id): Path<i64>,
) -> Result<Json<City>, ApiError> {
    let mut conn = state.pool.acquire().await?;
    Ok(Json(cities::get(&mut conn, city_id).await?))
}

async fn create_city(
    State(state): State<SharedState>,
    Json(payload): Json<CityCreate>,
) -> Result<Json<City>, ApiError> {
    payload.validate()?;

    let mut tx = state.pool.begin().await?;
    let city = cities::create(&mut tx, payload).await?;
    tx.commit().await?;

    Ok(Json(city))
}

async fn update_city(
    State(state): State<SharedState>,
    Path(city_id): Path<i64>,
    Json(payload): Json<CityCreate>,
) -> Result<Json<City>, ApiError> {
    payload.validate()?;

    let mut tx = state.pool.begin().await?;
    let city = cities::update(&mut tx, city_id, payload).await?;
    tx.commit().await?;

    Ok(Json(city))
}

async fn delete_city(
    State(state): State<SharedState>,
    Path(city_id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut tx = state.pool.begin().await?;
    cities::delete(&mut tx, city_id).await?;
    tx.commit().await?;

    Ok(MessageResponse::new("Item was deleted"))
}

async fn list_temperatures(
    State(state): State<SharedState>,
    Query(query): Query<TemperatureQuery>,
) -> Result<Json<Vec<Temperature>>, ApiError> {
    let mut conn = state.pool.acquire().await?;
    Ok(Json(temperatures::list(&mut conn, query.city_id).await?))
}

async fn update_temperatures(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Temperature>>, ApiError> {
    let provider = state.provider.as_deref().ok_or_else(|| {
        Error::ProviderUnavailable("no weather API key configured".to_string())
    })?;
    let rows = refresh_temperatures(&state.pool, provider).await?;
    Ok(Json(rows))
}

// --- Router ---

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/cities/", get(list_cities).post(create_city))
        .route("/cities/{city_id}/", get(get_city).put(update_city).delete(delete_city))
        .route("/temperatures/", get(list_temperatures))
        .route("/temperatures/update/", post(update_temperatures))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(bind: &str, state: SharedState) -> anyhow::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind to address {bind}"))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
