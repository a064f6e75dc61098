use crate::driver::VehicleType;
use crate::geo::{haversine_distance, round2, Point};

struct Rate {
    base: f64,
    per_km: f64,
}

fn rate(vehicle_type: VehicleType) -> Rate {
    match vehicle_type {
        VehicleType::Bike => Rate {
            base: 2.0,
            per_km: 0.5,
        },
        VehicleType::Sedan => Rate {
            base: 3.5,
            per_km: 1.0,
        },
        VehicleType::Suv => Rate {
            base: 5.0,
            per_km: 1.5,
        },
    }
}

/// The outcome of pricing a trip: the great-circle trip distance and the fare
/// it implies under the tariff for `vehicle_type`. Both are rounded to two
/// decimal places, matching how the matching service persists them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub distance_km: f64,
    pub fare: f64,
}

/// Pure function of `(vehicle_type, pickup, destination)` — identical inputs
/// always produce an identical quote.
pub fn quote_trip(vehicle_type: VehicleType, pickup: Point, destination: Point) -> Quote {
    let distance_km = round2(haversine_distance(pickup, destination));
    let rate = rate(vehicle_type);
    let fare = round2(rate.base + rate.per_km * distance_km);
    Quote { distance_km, fare }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_is_pure() {
        let pickup = Point::new(40.7484, -73.9857);
        let destination = Point::new(40.7061, -73.9969);
        let a = quote_trip(VehicleType::Sedan, pickup, destination);
        let b = quote_trip(VehicleType::Sedan, pickup, destination);
        assert_eq!(a, b);
    }

    #[test]
    fn fare_follows_the_tariff_table() {
        let pickup = Point::new(0.0, 0.0);
        let destination = Point::new(0.0, 0.0);
        let quote = quote_trip(VehicleType::Bike, pickup, destination);
        assert_eq!(quote.distance_km, 0.0);
        assert_eq!(quote.fare, 2.0);
    }

    #[test]
    fn more_expensive_vehicle_types_cost_more_for_the_same_trip() {
        let pickup = Point::new(40.7484, -73.9857);
        let destination = Point::new(40.7061, -73.9969);
        let bike = quote_trip(VehicleType::Bike, pickup, destination);
        let sedan = quote_trip(VehicleType::Sedan, pickup, destination);
        let suv = quote_trip(VehicleType::Suv, pickup, destination);
        assert!(bike.fare < sedan.fare);
        assert!(sedan.fare < suv.fare);
    }
}
