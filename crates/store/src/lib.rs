pub mod drivers;
pub mod error;
pub mod riders;
pub mod rides;

use std::env;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub use drivers::DriverRepo;
pub use error::{StoreError, Result};
pub use riders::RiderRepo;
pub use rides::RideRepo;

const DEFAULT_DATABASE_URL: &str = "sqlite://./data/dispatch.db";

/// Durable storage for the pipeline: driver and rider profiles, and the full
/// ride history. Backed by a local sqlite file so the whole system can run
/// without any external database.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options: SqliteConnectOptions = database_url
            .parse::<SqliteConnectOptions>()
            .map_err(error::convert_error)?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(error::convert_error)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|why| StoreError::Other(why.into()))?;

        Ok(Self { pool })
    }

    /// Reads `DATABASE_URL` from the environment, falling back to a local
    /// sqlite file under `./data`.
    pub async fn connect_from_env() -> Result<Self> {
        let url = env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        tracing::info!(database_url = %url, "connecting to store");
        Self::connect(&url).await
    }

    pub fn drivers(&self) -> DriverRepo {
        DriverRepo::new(self.pool.clone())
    }

    pub fn riders(&self) -> RiderRepo {
        RiderRepo::new(self.pool.clone())
    }

    pub fn rides(&self) -> RideRepo {
        RideRepo::new(self.pool.clone())
    }
}
