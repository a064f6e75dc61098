use async_trait::async_trait;
use bus::worker::Handler;
use bus::Message;
use model::events::{RideMatched, RideUpdate};

use crate::error::ServiceError;
use crate::service::RideService;

pub struct RideMatchesHandler {
    pub service: RideService,
}

#[async_trait]
impl Handler for RideMatchesHandler {
    type Error = ServiceError;

    async fn handle(&mut self, message: Message) -> Result<(), Self::Error> {
        let event: RideMatched = message.decode().map_err(ServiceError::Bus)?;
        self.service.apply_match(event).await
    }
}

pub struct RideUpdatesHandler {
    pub service: RideService,
}

#[async_trait]
impl Handler for RideUpdatesHandler {
    type Error = ServiceError;

    async fn handle(&mut self, message: Message) -> Result<(), Self::Error> {
        let event: RideUpdate = message.decode().map_err(ServiceError::Bus)?;
        self.service.apply_update(event).await
    }
}
