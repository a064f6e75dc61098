use chrono::{DateTime, Utc};
use model::{DriverId, Location, Point, Ride, RideId, RideStatus, RiderId, VehicleType};
use sqlx::SqlitePool;

use crate::error::{convert_error, Result};

#[derive(sqlx::FromRow)]
struct RideRow {
    id: i64,
    rider_id: i64,
    driver_id: Option<i64>,
    pickup_lat: f64,
    pickup_lon: f64,
    pickup_address: String,
    destination_lat: f64,
    destination_lon: f64,
    destination_address: String,
    vehicle_type: String,
    fare: Option<f64>,
    distance_km: Option<f64>,
    status: String,
    requested_at: DateTime<Utc>,
    matched_at: Option<DateTime<Utc>>,
    accepted_at: Option<DateTime<Utc>>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
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

fn status_to_str(status: RideStatus) -> &'static str {
    match status {
        RideStatus::Requested => "requested",
        RideStatus::Matched => "matched",
        RideStatus::Accepted => "accepted",
        RideStatus::Started => "started",
        RideStatus::Completed => "completed",
        RideStatus::Cancelled => "cancelled",
    }
}

fn status_from_str(value: &str) -> RideStatus {
    match value {
        "matched" => RideStatus::Matched,
        "accepted" => RideStatus::Accepted,
        "started" => RideStatus::Started,
        "completed" => RideStatus::Completed,
        "cancelled" => RideStatus::Cancelled,
        _ => RideStatus::Requested,
    }
}

impl From<RideRow> for Ride {
    fn from(row: RideRow) -> Self {
        Ride {
            rider_id: RiderId::new(row.rider_id),
            driver_id: row.driver_id.map(DriverId::new),
            pickup: Location {
                point: Point::new(row.pickup_lat, row.pickup_lon),
                address: row.pickup_address,
            },
            destination: Location {
                point: Point::new(row.destination_lat, row.destination_lon),
                address: row.destination_address,
            },
            vehicle_type: vehicle_type_from_str(&row.vehicle_type),
            fare: row.fare,
            distance_km: row.distance_km,
            status: status_from_str(&row.status),
            requested_at: row.requested_at,
            matched_at: row.matched_at,
            accepted_at: row.accepted_at,
            started_at: row.started_at,
            completed_at: row.completed_at,
        }
    }
}

#[derive(Clone)]
pub struct RideRepo {
    pool: SqlitePool,
}

impl RideRepo {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        rider_id: RiderId,
        pickup: &Location,
        destination: &Location,
        vehicle_type: VehicleType,
        requested_at: DateTime<Utc>,
    ) -> Result<RideId> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO rides (
                rider_id, pickup_lat, pickup_lon, pickup_address,
                destination_lat, destination_lon, destination_address,
                vehicle_type, status, requested_at
             )
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'requested', ?)
             RETURNING id",
        )
        .bind(rider_id.raw())
        .bind(pickup.point.lat)
        .bind(pickup.point.lon)
        .bind(&pickup.address)
        .bind(destination.point.lat)
        .bind(destination.point.lon)
        .bind(&destination.address)
        .bind(vehicle_type_to_str(vehicle_type))
        .bind(requested_at)
        .fetch_one(&self.pool)
        .await
        .map_err(convert_error)?;

        Ok(RideId::new(id))
    }

    pub async fn get(&self, id: RideId) -> Result<Ride> {
        let row: RideRow = sqlx::query_as("SELECT * FROM rides WHERE id = ?")
            .bind(id.raw())
            .fetch_one(&self.pool)
            .await
            .map_err(convert_error)?;
        Ok(row.into())
    }

    pub async fn mark_matched(
        &self,
        id: RideId,
        driver_id: DriverId,
        distance_km: f64,
        fare: f64,
        matched_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE rides
             SET driver_id = ?, distance_km = ?, fare = ?, status = 'matched', matched_at = ?
             WHERE id = ?",
        )
        .bind(driver_id.raw())
        .bind(distance_km)
        .bind(fare)
        .bind(matched_at)
        .bind(id.raw())
        .execute(&self.pool)
        .await
        .map_err(convert_error)?;
        Ok(())
    }

    pub async fn mark_accepted(&self, id: RideId, accepted_at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE rides SET status = 'accepted', accepted_at = ? WHERE id = ?")
            .bind(accepted_at)
            .bind(id.raw())
            .execute(&self.pool)
            .await
            .map_err(convert_error)?;
        Ok(())
    }

    pub async fn mark_started(&self, id: RideId, started_at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE rides SET status = 'started', started_at = ? WHERE id = ?")
            .bind(started_at)
            .bind(id.raw())
            .execute(&self.pool)
            .await
            .map_err(convert_error)?;
        Ok(())
    }

    /// Marks a ride completed, overwriting the fare with the final figure.
    /// Per the ride lifecycle, completion fare always wins over the fare
    /// estimated at match time.
    pub async fn mark_completed(
        &self,
        id: RideId,
        fare: f64,
        completed_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE rides SET status = 'completed', fare = ?, completed_at = ? WHERE id = ?",
        )
        .bind(fare)
        .bind(completed_at)
        .bind(id.raw())
        .execute(&self.pool)
        .await
        .map_err(convert_error)?;
        Ok(())
    }

    pub async fn mark_cancelled(&self, id: RideId) -> Result<()> {
        sqlx::query("UPDATE rides SET status = 'cancelled' WHERE id = ?")
            .bind(id.raw())
            .execute(&self.pool)
            .await
            .map_err(convert_error)?;
        Ok(())
    }
}
