use model::{Rider, RiderId};
use sqlx::SqlitePool;

use crate::error::{convert_error, Result};

#[derive(sqlx::FromRow)]
struct RiderRow {
    id: i64,
    name: String,
    phone: String,
    rating: f64,
}

impl From<RiderRow> for Rider {
    fn from(row: RiderRow) -> Self {
        Rider {
            name: row.name,
            phone: row.phone,
            rating: row.rating,
        }
    }
}

#[derive(Clone)]
pub struct RiderRepo {
    pool: SqlitePool,
}

impl RiderRepo {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, rider: &Rider) -> Result<RiderId> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO riders (name, phone, rating) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(&rider.name)
        .bind(&rider.phone)
        .bind(rider.rating)
        .fetch_one(&self.pool)
        .await
        .map_err(convert_error)?;

        Ok(RiderId::new(id))
    }

    pub async fn get(&self, id: RiderId) -> Result<Rider> {
        let row: RiderRow = sqlx::query_as("SELECT * FROM riders WHERE id = ?")
            .bind(id.raw())
            .fetch_one(&self.pool)
            .await
            .map_err(convert_error)?;
        Ok(row.into())
    }
}
