use model::{Driver, DriverId, Point, VehicleType};
use sqlx::SqlitePool;

use crate::error::{convert_error, Result};

#[derive(sqlx::FromRow)]
struct DriverRow {
    id: i64,
    name: String,
    phone: String,
    vehicle_type: String,
    vehicle_plate: String,
    rating: f64,
    is_online: bool,
    lat: Option<f64>,
    lon: Option<f64>,
}

fn vehicle_type_to_str(vehicle_type: VehicleType) -> &'static str {
    match vehicle_type {
        VehicleType::Bike => "bike",
        VehicleType::Sedan => "sedan",
        VehicleType::Suv => "suv",
    }
}

fn vehicle_type_from_str(value: &str) -> VehicleType {
    match value {
        "bike" => VehicleType::Bike,
        "suv" => VehicleType::Suv,
        _ => VehicleType::Sedan,
    }
}

impl From<DriverRow> for Driver {
    fn from(row: DriverRow) -> Self {
        Driver {
            name: row.name,
            phone: row.phone,
            vehicle_type: vehicle_type_from_str(&row.vehicle_type),
            vehicle_plate: row.vehicle_plate,
            rating: row.rating,
            is_online: row.is_online,
            position: match (row.lat, row.lon) {
                (Some(lat), Some(lon)) => Some(Point::new(lat, lon)),
                _ => None,
            },
        }
    }
}

/// Durable driver profiles. Live position is kept in
/// [`model::live_index::LiveDriverIndex`] by each service that needs it, not
/// here; this table only records the last known position for cold starts.
#[derive(Clone)]
pub struct DriverRepo {
    pool: SqlitePool,
}

impl DriverRepo {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, driver: &Driver) -> Result<DriverId> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO drivers (name, phone, vehicle_type, vehicle_plate, rating, is_online)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&driver.name)
        .bind(&driver.phone)
        .bind(vehicle_type_to_str(driver.vehicle_type))
        .bind(&driver.vehicle_plate)
        .bind(driver.rating)
        .bind(driver.is_online)
        .fetch_one(&self.pool)
        .await
        .map_err(convert_error)?;

        Ok(DriverId::new(id))
    }

    pub async fn get(&self, id: DriverId) -> Result<Driver> {
        let row: DriverRow = sqlx::query_as("SELECT * FROM drivers WHERE id = ?")
            .bind(id.raw())
            .fetch_one(&self.pool)
            .await
            .map_err(convert_error)?;
        Ok(row.into())
    }

    pub async fn set_availability(&self, id: DriverId, is_online: bool) -> Result<()> {
        sqlx::query("UPDATE drivers SET is_online = ? WHERE id = ?")
            .bind(is_online)
            .bind(id.raw())
            .execute(&self.pool)
            .await
            .map_err(convert_error)?;
        Ok(())
    }

    pub async fn record_last_position(&self, id: DriverId, position: Point) -> Result<()> {
        sqlx::query("UPDATE drivers SET lat = ?, lon = ? WHERE id = ?")
            .bind(position.lat)
            .bind(position.lon)
            .bind(id.raw())
            .execute(&self.pool)
            .await
            .map_err(convert_error)?;
        Ok(())
    }

    /// Online drivers of `vehicle_type` with a known last position, i.e. the
    /// candidate pool the matching service selects from.
    pub async fn online_candidates(&self, vehicle_type: VehicleType) -> Result<Vec<(DriverId, Point)>> {
        let rows: Vec<DriverRow> = sqlx::query_as(
            "SELECT * FROM drivers
             WHERE is_online = 1 AND vehicle_type = ? AND lat IS NOT NULL AND lon IS NOT NULL",
        )
        .bind(vehicle_type_to_str(vehicle_type))
        .fetch_all(&self.pool)
        .await
        .map_err(convert_error)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = DriverId::new(row.id);
                let position = Point::new(row.lat.unwrap(), row.lon.unwrap());
                (id, position)
            })
            .collect())
    }
}
