mod support;

use std::sync::Arc;
use std::time::Duration;

use bus::memory::MemoryBus;
use bus::Consumer;
use chrono::Utc;
use matching_service::MatchingService;
use model::events::{RideMatched, RideRequested};
use model::{Driver, Location, Point, Rider, VehicleType};
use store::Store;

async fn seed_rider(store: &Store) -> i64 {
    store
        .riders()
        .insert(&Rider {
            name: "Rider".to_string(),
            phone: "555-0100".to_string(),
            rating: 5.0,
        })
        .await
        .expect("rider inserted")
        .raw()
}

async fn seed_online_driver(store: &Store, lat: f64, lon: f64, vehicle_type: VehicleType) -> i64 {
    let driver_id = store
        .drivers()
        .insert(&Driver {
            name: "Driver".to_string(),
            phone: "555-0200".to_string(),
            vehicle_type,
            vehicle_plate: "XYZ-001".to_string(),
            rating: 4.8,
            is_online: true,
            position: None,
        })
        .await
        .expect("driver inserted");
    store
        .drivers()
        .set_availability(driver_id, true)
        .await
        .expect("availability set");
    store
        .drivers()
        .record_last_position(driver_id, Point::new(lat, lon))
        .await
        .expect("position recorded");
    driver_id.raw()
}

async fn seed_ride(store: &Store, rider_id: i64, vehicle_type: VehicleType) -> i64 {
    let pickup = Location {
        point: Point::new(40.7484, -73.9857),
        address: "Pickup".to_string(),
    };
    let destination = Location {
        point: Point::new(40.7061, -73.9969),
        address: "Destination".to_string(),
    };
    store
        .rides()
        .create(
            model::RiderId::new(rider_id),
            &pickup,
            &destination,
            vehicle_type,
            Utc::now(),
        )
        .await
        .expect("ride created")
        .raw()
}

fn ride_requested_event(ride_id: i64, rider_id: i64, vehicle_type: VehicleType) -> RideRequested {
    RideRequested {
        ride_id: model::RideId::new(ride_id),
        rider_id: model::RiderId::new(rider_id),
        pickup_lat: 40.7484,
        pickup_lon: -73.9857,
        pickup_address: "Pickup".to_string(),
        destination_lat: 40.7061,
        destination_lon: -73.9969,
        destination_address: "Destination".to_string(),
        vehicle_type,
        requested_at: Utc::now(),
    }
}

#[tokio::test]
async fn the_nearest_online_driver_is_matched_and_the_ride_row_is_updated() {
    let store = support::test_store().await;
    let rider_id = seed_rider(&store).await;
    let near_driver = seed_online_driver(&store, 40.7480, -73.9850, VehicleType::Sedan).await;
    let _far_driver = seed_online_driver(&store, 40.8000, -73.9000, VehicleType::Sedan).await;
    let ride_id = seed_ride(&store, rider_id, VehicleType::Sedan).await;

    let bus = MemoryBus::new();
    let mut matches = bus.consumer(&["ride-matches"]);
    let service = MatchingService::new(store.clone(), Arc::new(bus.producer()));

    service
        .match_ride(ride_requested_event(ride_id, rider_id, VehicleType::Sedan))
        .await
        .unwrap();

    let message = tokio::time::timeout(Duration::from_millis(500), matches.recv())
        .await
        .expect("a match event should be published")
        .expect("channel open");
    let event: RideMatched = message.decode().unwrap();
    assert_eq!(event.driver_id.raw(), near_driver);
    assert!(event.estimated_fare > 0.0);

    let ride = store.rides().get(model::RideId::new(ride_id)).await.unwrap();
    assert_eq!(ride.status, model::RideStatus::Matched);
    assert_eq!(ride.driver_id.unwrap().raw(), near_driver);
    assert!(ride.fare.is_some());
}

#[tokio::test]
async fn a_request_with_no_qualifying_driver_is_dropped_silently() {
    let store = support::test_store().await;
    let rider_id = seed_rider(&store).await;
    let ride_id = seed_ride(&store, rider_id, VehicleType::Suv).await;

    let bus = MemoryBus::new();
    let mut matches = bus.consumer(&["ride-matches"]);
    let service = MatchingService::new(store.clone(), Arc::new(bus.producer()));

    service
        .match_ride(ride_requested_event(ride_id, rider_id, VehicleType::Suv))
        .await
        .unwrap();

    let result = tokio::time::timeout(Duration::from_millis(200), matches.recv()).await;
    assert!(result.is_err(), "no ride-matches event should be published");

    let ride = store.rides().get(model::RideId::new(ride_id)).await.unwrap();
    assert_eq!(ride.status, model::RideStatus::Requested);
}

#[tokio::test]
async fn equidistant_drivers_match_deterministically_by_lowest_id() {
    let store = support::test_store().await;
    let rider_id = seed_rider(&store).await;
    let first = seed_online_driver(&store, 40.7400, -73.9900, VehicleType::Bike).await;
    let second = seed_online_driver(&store, 40.7400, -73.9900, VehicleType::Bike).await;
    let ride_id = seed_ride(&store, rider_id, VehicleType::Bike).await;

    let bus = MemoryBus::new();
    let mut matches = bus.consumer(&["ride-matches"]);
    let service = MatchingService::new(store.clone(), Arc::new(bus.producer()));

    service
        .match_ride(ride_requested_event(ride_id, rider_id, VehicleType::Bike))
        .await
        .unwrap();

    let message = tokio::time::timeout(Duration::from_millis(500), matches.recv())
        .await
        .expect("a match event should be published")
        .expect("channel open");
    let event: RideMatched = message.decode().unwrap();
    let expected = first.min(second);
    assert_eq!(event.driver_id.raw(), expected);
}
