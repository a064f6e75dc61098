use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::driver::{DriverId, VehicleType};
use crate::ride::{RideId, RideStatus};
use crate::rider::RiderId;

/// Topic names, centralized so producers and consumers never hand-type a string.
pub mod topics {
    pub const RIDE_REQUESTS: &str = "ride-requests";
    pub const RIDE_MATCHES: &str = "ride-matches";
    pub const RIDE_UPDATES: &str = "ride-updates";
    pub const DRIVER_LOCATIONS: &str = "driver-locations";
    pub const DRIVER_AVAILABILITY: &str = "driver-availability";
}

/// Published by the ride service when a rider requests a trip. Keyed by `ride_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideRequested {
    pub ride_id: RideId,
    pub rider_id: RiderId,
    pub pickup_lat: f64,
    pub pickup_lon: f64,
    pub pickup_address: String,
    pub destination_lat: f64,
    pub destination_lon: f64,
    pub destination_address: String,
    pub vehicle_type: VehicleType,
    pub requested_at: DateTime<Utc>,
}

/// Published by the matching service once a driver has been selected for a
/// ride. Keyed by `ride_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideMatched {
    pub ride_id: RideId,
    pub driver_id: DriverId,
    pub driver_name: String,
    pub vehicle_type: VehicleType,
    pub distance_to_pickup_km: f64,
    pub trip_distance_km: f64,
    pub estimated_fare: f64,
    pub matched_at: DateTime<Utc>,
}

/// Published on every ride status change after matching (accept, start,
/// complete, cancel). Keyed by `ride_id`. `fare` is only present once the
/// ride completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideUpdate {
    pub ride_id: RideId,
    pub driver_id: Option<DriverId>,
    pub status: RideStatus,
    pub fare: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

/// Published by the driver service on every location ping from an online
/// driver. Keyed by `driver_id`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DriverLocationUpdated {
    pub driver_id: DriverId,
    pub lat: f64,
    pub lon: f64,
    pub vehicle_type: VehicleType,
    pub timestamp: i64,
}

/// Published by the driver service whenever a driver goes online or offline.
/// Keyed by `driver_id`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DriverAvailabilityChanged {
    pub driver_id: DriverId,
    pub is_online: bool,
    pub timestamp: i64,
}
