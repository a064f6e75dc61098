pub mod error;
pub mod handlers;
pub mod http;
pub mod service;

pub use error::ServiceError;
pub use service::{CreateRideRequest, RideService};
