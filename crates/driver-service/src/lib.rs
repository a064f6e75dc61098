pub mod error;
pub mod http;
pub mod service;

pub use error::ServiceError;
pub use service::DriverService;
