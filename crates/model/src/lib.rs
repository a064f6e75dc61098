pub mod driver;
pub mod events;
pub mod geo;
pub mod id;
pub mod live_index;
pub mod ride;
pub mod rider;
pub mod tariff;

pub use driver::{Driver, DriverId, DriverObservation, VehicleType};
pub use geo::Point;
pub use id::{HasId, Id};
pub use live_index::{Candidate, LiveDriverIndex};
pub use ride::{Location, Ride, RideEvent, RideId, RideStatus};
pub use rider::{Rider, RiderId};
pub use tariff::Quote;
