use serde::{Deserialize, Serialize};

use crate::geo::Point;
use crate::id::{HasId, Id};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Bike,
    Sedan,
    Suv,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub name: String,
    pub phone: String,
    pub vehicle_type: VehicleType,
    pub vehicle_plate: String,
    pub rating: f64,
    pub is_online: bool,
    pub position: Option<Point>,
}

impl HasId for Driver {
    type IdType = i64;
}

pub type DriverId = Id<Driver>;

impl Default for Driver {
    fn default() -> Self {
        Self {
            name: String::new(),
            phone: String::new(),
            vehicle_type: VehicleType::Sedan,
            vehicle_plate: String::new(),
            rating: 5.0,
            is_online: false,
            position: None,
        }
    }
}

/// A point-in-time observation of a driver's location, as held by the live
/// driver index (see [`crate::live_index`]).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DriverObservation {
    pub driver_id: DriverId,
    pub position: Point,
    pub vehicle_type: VehicleType,
    pub timestamp: i64,
}
