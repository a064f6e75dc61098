use std::collections::HashMap;

use crate::driver::{DriverId, DriverObservation, VehicleType};
use crate::geo::{haversine_distance, Point};

/// An in-memory, eventually-consistent view of where online drivers are
/// right now. Every service that needs "drivers near a point" (matching,
/// the nearby-drivers stream in the gateway) builds its own copy of this by
/// consuming the same `driver-locations` / `driver-availability` topics;
/// there is no shared mutable state between services.
#[derive(Debug, Default)]
pub struct LiveDriverIndex {
    observations: HashMap<DriverId, DriverObservation>,
    online: HashMap<DriverId, bool>,
}

/// A driver found by a nearby-drivers query, together with its distance
/// from the query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub driver_id: DriverId,
    pub position: Point,
    pub vehicle_type: VehicleType,
    pub distance_km: f64,
}

impl LiveDriverIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a location ping. Out-of-order pings (an older timestamp than
    /// the one already on file) are dropped so the index never regresses.
    pub fn observe(&mut self, observation: DriverObservation) {
        match self.observations.get(&observation.driver_id) {
            Some(existing) if existing.timestamp > observation.timestamp => return,
            _ => {
                self.observations.insert(observation.driver_id, observation);
            }
        }
    }

    pub fn set_online(&mut self, driver_id: DriverId, is_online: bool) {
        self.online.insert(driver_id, is_online);
        if !is_online {
            self.observations.remove(&driver_id);
        }
    }

    pub fn is_online(&self, driver_id: DriverId) -> bool {
        self.online.get(&driver_id).copied().unwrap_or(false)
    }

    /// Returns the `limit` online drivers of `vehicle_type` closest to
    /// `origin`, nearest first. Ties are broken by driver id so the result
    /// is deterministic for a given index snapshot.
    pub fn nearest(
        &self,
        origin: Point,
        vehicle_type: VehicleType,
        limit: usize,
    ) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = self
            .observations
            .values()
            .filter(|obs| obs.vehicle_type == vehicle_type)
            .filter(|obs| self.is_online(obs.driver_id))
            .map(|obs| Candidate {
                driver_id: obs.driver_id,
                position: obs.position,
                vehicle_type: obs.vehicle_type,
                distance_km: haversine_distance(origin, obs.position),
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap()
                .then_with(|| a.driver_id.raw().cmp(&b.driver_id.raw()))
        });
        candidates.truncate(limit);
        candidates
    }

    /// Returns every online driver within `radius_km` of `origin`, nearest
    /// first, regardless of vehicle type. Used by the nearby-drivers stream,
    /// which does not filter by vehicle type.
    pub fn within_radius(&self, origin: Point, radius_km: f64) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = self
            .observations
            .values()
            .filter(|obs| self.is_online(obs.driver_id))
            .map(|obs| Candidate {
                driver_id: obs.driver_id,
                position: obs.position,
                vehicle_type: obs.vehicle_type,
                distance_km: haversine_distance(origin, obs.position),
            })
            .filter(|candidate| candidate.distance_km <= radius_km)
            .collect();

        candidates.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap()
                .then_with(|| a.driver_id.raw().cmp(&b.driver_id.raw()))
        });
        candidates
    }

    /// A full snapshot of every online driver currently in the index, for
    /// the initial push to a newly opened nearby-drivers stream.
    pub fn snapshot(&self) -> Vec<Candidate> {
        self.observations
            .values()
            .filter(|obs| self.is_online(obs.driver_id))
            .map(|obs| Candidate {
                driver_id: obs.driver_id,
                position: obs.position,
                vehicle_type: obs.vehicle_type,
                distance_km: 0.0,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(id: i64, lat: f64, lon: f64, timestamp: i64) -> DriverObservation {
        DriverObservation {
            driver_id: DriverId::new(id),
            position: Point::new(lat, lon),
            vehicle_type: VehicleType::Sedan,
            timestamp,
        }
    }

    #[test]
    fn nearest_returns_closest_online_driver_first() {
        let mut index = LiveDriverIndex::new();
        index.set_online(DriverId::new(1), true);
        index.set_online(DriverId::new(2), true);
        index.observe(observation(1, 40.7580, -73.9855, 1));
        index.observe(observation(2, 40.7061, -73.9969, 1));

        let results = index.nearest(Point::new(40.7484, -73.9857), VehicleType::Sedan, 5);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].driver_id, DriverId::new(1));
    }

    #[test]
    fn offline_drivers_are_excluded() {
        let mut index = LiveDriverIndex::new();
        index.set_online(DriverId::new(1), true);
        index.observe(observation(1, 40.7580, -73.9855, 1));
        index.set_online(DriverId::new(1), false);

        let results = index.nearest(Point::new(40.7484, -73.9857), VehicleType::Sedan, 5);
        assert!(results.is_empty());
    }

    #[test]
    fn stale_observations_do_not_overwrite_newer_ones() {
        let mut index = LiveDriverIndex::new();
        index.set_online(DriverId::new(1), true);
        index.observe(observation(1, 40.7580, -73.9855, 10));
        index.observe(observation(1, 0.0, 0.0, 5));

        let results = index.nearest(Point::new(40.7580, -73.9855), VehicleType::Sedan, 5);
        assert_eq!(results[0].distance_km, 0.0);
    }

    #[test]
    fn limit_truncates_the_result_set() {
        let mut index = LiveDriverIndex::new();
        for id in 1..=5 {
            index.set_online(DriverId::new(id), true);
            index.observe(observation(id, 40.75, -73.98, 1));
        }
        let results = index.nearest(Point::new(40.75, -73.98), VehicleType::Sedan, 2);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn within_radius_excludes_drivers_beyond_the_radius_and_ignores_vehicle_type() {
        let mut index = LiveDriverIndex::new();
        index.set_online(DriverId::new(1), true);
        index.set_online(DriverId::new(2), true);
        index.observe(observation(1, 40.7580, -73.9855, 1));
        let mut far = observation(2, 41.8781, -87.6298, 1);
        far.vehicle_type = VehicleType::Bike;
        index.observe(far);

        let results = index.within_radius(Point::new(40.7580, -73.9855), 5.0);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].driver_id, DriverId::new(1));
    }

    #[test]
    fn snapshot_includes_every_online_driver() {
        let mut index = LiveDriverIndex::new();
        index.set_online(DriverId::new(1), true);
        index.set_online(DriverId::new(2), true);
        index.observe(observation(1, 40.75, -73.98, 1));
        index.observe(observation(2, 40.76, -73.99, 1));

        assert_eq!(index.snapshot().len(), 2);
    }
}
