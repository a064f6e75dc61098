use async_trait::async_trait;
use bus::worker::Handler;
use bus::Message;
use model::events::RideRequested;

use crate::error::ServiceError;
use crate::service::MatchingService;

pub struct RideRequestsHandler {
    pub service: MatchingService,
}

#[async_trait]
impl Handler for RideRequestsHandler {
    type Error = ServiceError;

    async fn handle(&mut self, message: Message) -> Result<(), Self::Error> {
        let event: RideRequested = message.decode().map_err(ServiceError::Bus)?;
        self.service.match_ride(event).await
    }
}
