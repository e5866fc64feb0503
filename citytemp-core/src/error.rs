use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("City with id {0} not found")]
    CityNotFound(i64),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Weather provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The weather provider could not produce a temperature for a city.
    #[error("Weather provider failed for city '{city}': {source:#}")]
    Provider {
        city: String,
        #[source]
        source: anyhow::Error,
    },
}
