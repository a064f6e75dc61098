use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::driver::{DriverId, VehicleType};
use crate::geo::Point;
use crate::id::{HasId, Id};
use crate::rider::RiderId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    Requested,
    Matched,
    Accepted,
    Started,
    Completed,
    Cancelled,
}

/// A driver- or rider-initiated event that may advance a ride's status.
/// Named after the bus payloads that carry it (`ride-matches`, `ride-updates`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideEvent {
    Match,
    Accept,
    Start,
    Complete,
    Cancel,
}

/// Applies `event` to `current` per the FSM in the ride lifecycle table.
/// Returns `None` when the transition is illegal; callers must treat that as
/// a logged no-op, never as an error that aborts the caller.
pub fn apply_transition(current: RideStatus, event: RideEvent) -> Option<RideStatus> {
    use RideEvent::*;
    use RideStatus::*;
    match (current, event) {
        (Requested, Match) => Some(Matched),
        (Matched, Accept) => Some(Accepted),
        (Accepted, Start) => Some(Started),
        (Started, Complete) => Some(Completed),
        (Requested | Matched | Accepted, Cancel) => Some(Cancelled),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub point: Point,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ride {
    pub rider_id: RiderId,
    pub driver_id: Option<DriverId>,
    pub pickup: Location,
    pub destination: Location,
    pub vehicle_type: VehicleType,
    pub fare: Option<f64>,
    pub distance_km: Option<f64>,
    pub status: RideStatus,
    pub requested_at: DateTime<Utc>,
    pub matched_at: Option<DateTime<Utc>>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl HasId for Ride {
    type IdType = i64;
}

pub type RideId = Id<Ride>;

#[cfg(test)]
mod tests {
    use super::*;
    use RideEvent::*;
    use RideStatus::*;

    #[test]
    fn happy_path_transitions_are_legal() {
        let mut status = Requested;
        for (event, expected) in [
            (Match, Matched),
            (Accept, Accepted),
            (Start, Started),
            (Complete, Completed),
        ] {
            status = apply_transition(status, event).expect("legal transition");
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn cancel_is_legal_from_any_pre_start_state() {
        for from in [Requested, Matched, Accepted] {
            assert_eq!(apply_transition(from, Cancel), Some(Cancelled));
        }
    }

    #[test]
    fn replaying_events_after_completion_is_a_no_op() {
        for event in [Match, Accept, Start, Complete, Cancel] {
            assert_eq!(apply_transition(Completed, event), None);
        }
    }

    #[test]
    fn out_of_order_events_are_rejected() {
        assert_eq!(apply_transition(Requested, Accept), None);
        assert_eq!(apply_transition(Requested, Start), None);
        assert_eq!(apply_transition(Matched, Start), None);
        assert_eq!(apply_transition(Cancelled, Match), None);
    }
}
