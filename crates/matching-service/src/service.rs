use std::sync::Arc;

use bus::{topics, Producer};
use chrono::Utc;
use model::events::{RideMatched, RideRequested};
use model::geo::{haversine_distance, round2, Point};
use model::tariff::quote_trip;
use model::DriverId;
use store::Store;

use crate::error::ServiceError;

/// Consumes ride requests and assigns the nearest qualifying online driver.
/// Holds no state of its own beyond the store handle and producer; the
/// candidate pool is queried fresh for every request.
#[derive(Clone)]
pub struct MatchingService {
    store: Store,
    producer: Arc<dyn Producer>,
}

impl MatchingService {
    pub fn new(store: Store, producer: Arc<dyn Producer>) -> Self {
        Self { store, producer }
    }

    /// Matches a single ride request. Requests with no qualifying online
    /// driver are dropped silently (logged at warn level); there is no
    /// retry topic, so a later `driver-availability` event is what gives
    /// the rider another chance.
    pub async fn match_ride(&self, request: RideRequested) -> Result<(), ServiceError> {
        let pickup = Point::new(request.pickup_lat, request.pickup_lon);
        let destination = Point::new(request.destination_lat, request.destination_lon);

        let candidates = self
            .store
            .drivers()
            .online_candidates(request.vehicle_type)
            .await?;

        let winner = candidates
            .into_iter()
            .map(|(driver_id, position)| {
                let distance_to_pickup_km = haversine_distance(pickup, position);
                (driver_id, distance_to_pickup_km)
            })
            .min_by(|(a_id, a_dist), (b_id, b_dist)| {
                a_dist
                    .partial_cmp(b_dist)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a_id.cmp(b_id))
            });

        let Some((driver_id, distance_to_pickup_km)) = winner else {
            tracing::warn!(ride_id = %request.ride_id, vehicle_type = ?request.vehicle_type, "no online driver available, dropping request");
            return Ok(());
        };
        let distance_to_pickup_km = round2(distance_to_pickup_km);

        let quote = quote_trip(request.vehicle_type, pickup, destination);
        let matched_at = Utc::now();

        self.store
            .rides()
            .mark_matched(request.ride_id, driver_id, quote.distance_km, quote.fare, matched_at)
            .await?;

        let driver_name = self.driver_name(driver_id).await?;

        let event = RideMatched {
            ride_id: request.ride_id,
            driver_id,
            driver_name,
            vehicle_type: request.vehicle_type,
            distance_to_pickup_km,
            trip_distance_km: quote.distance_km,
            estimated_fare: quote.fare,
            matched_at,
        };

        self.producer
            .publish(topics::RIDE_MATCHES, &request.ride_id.to_string(), &event)
            .await?;

        Ok(())
    }

    async fn driver_name(&self, driver_id: DriverId) -> Result<String, ServiceError> {
        Ok(self.store.drivers().get(driver_id).await?.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tie_break_picks_the_smaller_driver_id() {
        let candidates = vec![
            (DriverId::new(7), 1.2_f64),
            (DriverId::new(3), 1.2_f64),
            (DriverId::new(9), 0.9_f64),
        ];

        let winner = candidates
            .into_iter()
            .min_by(|(a_id, a_dist), (b_id, b_dist)| {
                a_dist
                    .partial_cmp(b_dist)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a_id.cmp(b_id))
            })
            .unwrap();

        assert_eq!(winner.0, DriverId::new(9));
    }

    #[test]
    fn equidistant_candidates_break_ties_deterministically() {
        let candidates = vec![(DriverId::new(5), 2.0_f64), (DriverId::new(2), 2.0_f64)];

        let winner = candidates
            .into_iter()
            .min_by(|(a_id, a_dist), (b_id, b_dist)| {
                a_dist
                    .partial_cmp(b_dist)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a_id.cmp(b_id))
            })
            .unwrap();

        assert_eq!(winner.0, DriverId::new(2));
    }
}
