pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Great-circle distance between two points, in kilometers.
pub fn haversine_distance(a: Point, b: Point) -> f64 {
    let lat1_rad = to_radians(a.lat);
    let lon1_rad = to_radians(a.lon);
    let lat2_rad = to_radians(b.lat);
    let lon2_rad = to_radians(b.lon);

    let dlat = lat2_rad - lat1_rad;
    let dlon = lon2_rad - lon1_rad;

    let h = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Rounds a distance or fare to two decimal places, the way matching persists them.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_has_zero_distance() {
        let p = Point::new(40.7580, -73.9855);
        assert_eq!(haversine_distance(p, p), 0.0);
    }

    #[test]
    fn manhattan_distance_is_a_few_kilometers() {
        let pickup = Point::new(40.7484, -73.9857);
        let destination = Point::new(40.7061, -73.9969);
        let distance = haversine_distance(pickup, destination);
        assert!((4.0..6.0).contains(&distance), "got {distance}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Point::new(40.7580, -73.9855);
        let b = Point::new(40.6892, -74.0445);
        assert!((haversine_distance(a, b) - haversine_distance(b, a)).abs() < 1e-9);
    }

    #[test]
    fn round2_rounds_half_up() {
        assert_eq!(round2(8.519_9), 8.52);
        assert_eq!(round2(5.024_9), 5.02);
    }
}
