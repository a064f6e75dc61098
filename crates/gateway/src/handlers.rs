use async_trait::async_trait;
use bus::worker::Handler;
use bus::Message;
use model::events::{DriverAvailabilityChanged, DriverLocationUpdated, RideUpdate};
use model::{DriverObservation, Point};

use crate::error::ServiceError;
use crate::frames::ServerFrame;
use crate::state::GatewayState;

/// Updates the live driver index from `driver-locations` and pushes the new
/// position to every session watching that driver.
pub struct DriverLocationsHandler {
    pub state: GatewayState,
}

#[async_trait]
impl Handler for DriverLocationsHandler {
    type Error = ServiceError;

    async fn handle(&mut self, message: Message) -> Result<(), Self::Error> {
        let event: DriverLocationUpdated = message.decode().map_err(ServiceError::Bus)?;

        self.state.live_index().write().unwrap().observe(DriverObservation {
            driver_id: event.driver_id,
            position: Point::new(event.lat, event.lon),
            vehicle_type: event.vehicle_type,
            timestamp: event.timestamp,
        });

        let driver_id = event.driver_id.raw();
        for session in self.state.drivers().members(&driver_id) {
            let delivered = self.state.registry().send(
                session,
                ServerFrame::LocationUpdated {
                    driver_id: event.driver_id,
                    lat: event.lat,
                    lon: event.lon,
                    timestamp: event.timestamp,
                },
            );
            if !delivered {
                self.state.drivers().remove(&driver_id, session);
            }
        }
        Ok(())
    }
}

/// Updates the live driver index from `driver-availability`. Going offline
/// drops the driver from the index entirely (per the index invariant);
/// going online only marks the driver eligible — it has no position until
/// the next `driver-locations` event.
pub struct DriverAvailabilityHandler {
    pub state: GatewayState,
}

#[async_trait]
impl Handler for DriverAvailabilityHandler {
    type Error = ServiceError;

    async fn handle(&mut self, message: Message) -> Result<(), Self::Error> {
        let event: DriverAvailabilityChanged = message.decode().map_err(ServiceError::Bus)?;

        self.state
            .live_index()
            .write()
            .unwrap()
            .set_online(event.driver_id, event.is_online);

        let driver_id = event.driver_id.raw();
        for session in self.state.drivers().members(&driver_id) {
            let delivered = self.state.registry().send(
                session,
                ServerFrame::AvailabilityUpdated {
                    driver_id: event.driver_id,
                    is_online: event.is_online,
                    timestamp: event.timestamp,
                },
            );
            if !delivered {
                self.state.drivers().remove(&driver_id, session);
            }
        }
        Ok(())
    }
}

/// Looks up the ride's rider from the authoritative store and pushes the
/// status change to both the rider's sessions and any sessions watching the
/// ride directly.
pub struct RideUpdatesHandler {
    pub state: GatewayState,
}

#[async_trait]
impl Handler for RideUpdatesHandler {
    type Error = ServiceError;

    async fn handle(&mut self, message: Message) -> Result<(), Self::Error> {
        let event: RideUpdate = message.decode().map_err(ServiceError::Bus)?;
        let ride = self.state.store().rides().get(event.ride_id).await?;

        let timestamp = event.updated_at.timestamp_millis();
        let rider_id = ride.rider_id.raw();
        let ride_id = event.ride_id.raw();

        for session in self.state.riders().members(&rider_id) {
            let delivered = self.state.registry().send(
                session,
                ServerFrame::RideUpdate {
                    ride_id: event.ride_id,
                    status: event.status,
                    driver_id: event.driver_id,
                    timestamp,
                },
            );
            if !delivered {
                self.state.riders().remove(&rider_id, session);
            }
        }
        for session in self.state.rides().members(&ride_id) {
            let delivered = self.state.registry().send(
                session,
                ServerFrame::RideUpdate {
                    ride_id: event.ride_id,
                    status: event.status,
                    driver_id: event.driver_id,
                    timestamp,
                },
            );
            if !delivered {
                self.state.rides().remove(&ride_id, session);
            }
        }
        Ok(())
    }
}
