use std::sync::Arc;

use bus::{topics, Producer};
use chrono::Utc;
use model::events::{DriverAvailabilityChanged, DriverLocationUpdated, RideUpdate};
use model::{DriverId, Point, RideId, RideStatus, VehicleType};
use store::Store;

use crate::error::ServiceError;

/// Owns driver-initiated writes: availability, position, and the ride
/// lifecycle events a driver's app triggers (accept/start/complete). Ride
/// state itself is never mutated here — only the Ride Service, reacting to
/// `ride-updates`, does that.
#[derive(Clone)]
pub struct DriverService {
    store: Store,
    producer: Arc<dyn Producer>,
}

impl DriverService {
    pub fn new(store: Store, producer: Arc<dyn Producer>) -> Self {
        Self { store, producer }
    }

    pub async fn update_driver_availability(
        &self,
        driver_id: DriverId,
        is_online: bool,
    ) -> Result<(), ServiceError> {
        self.store.drivers().set_availability(driver_id, is_online).await?;

        let event = DriverAvailabilityChanged {
            driver_id,
            is_online,
            timestamp: Utc::now().timestamp_millis(),
        };
        self.producer
            .publish(topics::DRIVER_AVAILABILITY, &driver_id.to_string(), &event)
            .await?;
        Ok(())
    }

    /// Updates the stored position unconditionally, but only publishes when
    /// the driver is currently online, so offline drivers never contribute
    /// noise to the live index.
    pub async fn update_driver_location(
        &self,
        driver_id: DriverId,
        position: Point,
        vehicle_type: VehicleType,
    ) -> Result<(), ServiceError> {
        let driver = self.store.drivers().get(driver_id).await?;
        self.store
            .drivers()
            .record_last_position(driver_id, position)
            .await?;

        if !driver.is_online {
            tracing::debug!(driver_id = %driver_id, "suppressing location publish for offline driver");
            return Ok(());
        }

        let event = DriverLocationUpdated {
            driver_id,
            lat: position.lat,
            lon: position.lon,
            vehicle_type,
            timestamp: Utc::now().timestamp_millis(),
        };
        self.producer
            .publish(topics::DRIVER_LOCATIONS, &driver_id.to_string(), &event)
            .await?;
        Ok(())
    }

    pub async fn accept_ride(&self, ride_id: RideId, driver_id: DriverId) -> Result<(), ServiceError> {
        self.publish_ride_update(ride_id, driver_id, RideStatus::Accepted, None).await
    }

    pub async fn start_ride(&self, ride_id: RideId, driver_id: DriverId) -> Result<(), ServiceError> {
        self.publish_ride_update(ride_id, driver_id, RideStatus::Started, None).await
    }

    pub async fn complete_ride(
        &self,
        ride_id: RideId,
        driver_id: DriverId,
        fare: f64,
    ) -> Result<(), ServiceError> {
        self.publish_ride_update(ride_id, driver_id, RideStatus::Completed, Some(fare))
            .await
    }

    async fn publish_ride_update(
        &self,
        ride_id: RideId,
        driver_id: DriverId,
        status: RideStatus,
        fare: Option<f64>,
    ) -> Result<(), ServiceError> {
        let event = RideUpdate {
            ride_id,
            driver_id: Some(driver_id),
            status,
            fare,
            updated_at: Utc::now(),
        };
        self.producer
            .publish(topics::RIDE_UPDATES, &ride_id.to_string(), &event)
            .await?;
        Ok(())
    }
}
