use std::sync::Arc;

use bus::{topics, Producer};
use chrono::Utc;
use model::events::{RideMatched, RideRequested, RideUpdate};
use model::{Location, RideEvent, RideId, RideStatus, RiderId, VehicleType};
use serde::Deserialize;
use store::Store;

use crate::error::ServiceError;

#[derive(Debug, Deserialize)]
pub struct CreateRideRequest {
    pub rider_id: i64,
    pub pickup: Location,
    pub destination: Location,
    pub vehicle_type: VehicleType,
}

/// Owns the rider-initiated side of the ride lifecycle: creating ride rows
/// and advancing them in response to `ride-matches` and `ride-updates`.
#[derive(Clone)]
pub struct RideService {
    store: Store,
    producer: Arc<dyn Producer>,
}

impl RideService {
    pub fn new(store: Store, producer: Arc<dyn Producer>) -> Self {
        Self { store, producer }
    }

    /// Inserts the ride row, then publishes `ride-requests`. The row is the
    /// source of truth as soon as the insert commits; a publish failure is
    /// logged but does not roll the row back or fail the request, since the
    /// caller already has a durable ride id.
    pub async fn create_ride_request(
        &self,
        request: CreateRideRequest,
    ) -> Result<RideId, ServiceError> {
        let requested_at = Utc::now();
        let ride_id = self
            .store
            .rides()
            .create(
                RiderId::new(request.rider_id),
                &request.pickup,
                &request.destination,
                request.vehicle_type,
                requested_at,
            )
            .await?;

        let event = RideRequested {
            ride_id,
            rider_id: RiderId::new(request.rider_id),
            pickup_lat: request.pickup.point.lat,
            pickup_lon: request.pickup.point.lon,
            pickup_address: request.pickup.address,
            destination_lat: request.destination.point.lat,
            destination_lon: request.destination.point.lon,
            destination_address: request.destination.address,
            vehicle_type: request.vehicle_type,
            requested_at,
        };

        if let Err(err) = self
            .producer
            .publish(topics::RIDE_REQUESTS, &ride_id.to_string(), &event)
            .await
        {
            tracing::warn!(ride_id = %ride_id, error = %err, "ride request row committed but publish failed");
        }

        Ok(ride_id)
    }

    pub async fn get(&self, ride_id: RideId) -> Result<model::Ride, ServiceError> {
        Ok(self.store.rides().get(ride_id).await?)
    }

    /// Applies a `ride-matches` event. A ride not currently `requested` is an
    /// idempotent no-op (duplicate delivery, or the match arrived twice).
    pub async fn apply_match(&self, event: RideMatched) -> Result<(), ServiceError> {
        let ride = self.store.rides().get(event.ride_id).await?;
        if model::ride::apply_transition(ride.status, RideEvent::Match).is_none() {
            tracing::info!(ride_id = %event.ride_id, status = ?ride.status, "ignoring duplicate ride-matches event");
            return Ok(());
        }

        self.store
            .rides()
            .mark_matched(
                event.ride_id,
                event.driver_id,
                event.trip_distance_km,
                event.estimated_fare,
                event.matched_at,
            )
            .await?;
        Ok(())
    }

    /// Applies a `ride-updates` event, mapping its target status to the FSM
    /// event that would produce it and checking the transition is legal
    /// before touching the row.
    pub async fn apply_update(&self, event: RideUpdate) -> Result<(), ServiceError> {
        let ride = self.store.rides().get(event.ride_id).await?;
        let Some(fsm_event) = event_for_status(event.status) else {
            tracing::warn!(ride_id = %event.ride_id, status = ?event.status, "ride-updates event has no matching FSM event");
            return Ok(());
        };

        if model::ride::apply_transition(ride.status, fsm_event).is_none() {
            tracing::info!(ride_id = %event.ride_id, from = ?ride.status, to = ?event.status, "ignoring illegal or duplicate ride-updates event");
            return Ok(());
        }

        let rides = self.store.rides();
        match event.status {
            RideStatus::Accepted => rides.mark_accepted(event.ride_id, event.updated_at).await?,
            RideStatus::Started => rides.mark_started(event.ride_id, event.updated_at).await?,
            RideStatus::Completed => {
                let fare = event
                    .fare
                    .ok_or(ServiceError::MissingFare(event.ride_id.raw()))?;
                rides.mark_completed(event.ride_id, fare, event.updated_at).await?
            }
            RideStatus::Cancelled => rides.mark_cancelled(event.ride_id).await?,
            RideStatus::Requested | RideStatus::Matched => {
                tracing::warn!(ride_id = %event.ride_id, status = ?event.status, "ride-updates cannot target this status");
            }
        }
        Ok(())
    }
}

fn event_for_status(status: RideStatus) -> Option<RideEvent> {
    match status {
        RideStatus::Accepted => Some(RideEvent::Accept),
        RideStatus::Started => Some(RideEvent::Start),
        RideStatus::Completed => Some(RideEvent::Complete),
        RideStatus::Cancelled => Some(RideEvent::Cancel),
        RideStatus::Requested | RideStatus::Matched => None,
    }
}
