use model::{DriverId, RideId, RideStatus};
use serde::{Deserialize, Serialize};

/// Frames a connected client may send. Unrecognized or malformed frames are
/// ignored rather than closing the connection.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Heartbeat,
    GetNearby { lat: f64, lon: f64, radius: Option<f64> },
    GetAll,
}

/// Frames the gateway pushes to a client, across every stream kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Heartbeat { status: &'static str },
    LocationUpdated { driver_id: DriverId, lat: f64, lon: f64, timestamp: i64 },
    AvailabilityUpdated { driver_id: DriverId, is_online: bool, timestamp: i64 },
    RideUpdate {
        ride_id: RideId,
        status: RideStatus,
        driver_id: Option<DriverId>,
        timestamp: i64,
    },
    AllDriverLocations { drivers: Vec<DriverLocation> },
    NearbyDrivers { drivers: Vec<DriverLocation> },
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DriverLocation {
    pub driver_id: DriverId,
    pub lat: f64,
    pub lon: f64,
    pub distance_km: f64,
}

impl From<model::live_index::Candidate> for DriverLocation {
    fn from(candidate: model::live_index::Candidate) -> Self {
        Self {
            driver_id: candidate.driver_id,
            lat: candidate.position.lat,
            lon: candidate.position.lon,
            distance_km: candidate.distance_km,
        }
    }
}

pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 5.0;
