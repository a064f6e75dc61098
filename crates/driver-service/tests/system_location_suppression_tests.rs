mod support;

use std::sync::Arc;
use std::time::Duration;

use bus::memory::MemoryBus;
use bus::Consumer;
use driver_service::DriverService;
use model::{Driver, DriverId, Point, VehicleType};

async fn seed_driver(store: &store::Store) -> DriverId {
    store
        .drivers()
        .insert(&Driver {
            name: "D1".to_string(),
            phone: "555-0101".to_string(),
            vehicle_type: VehicleType::Sedan,
            vehicle_plate: "ABC-123".to_string(),
            rating: 5.0,
            is_online: false,
            position: None,
        })
        .await
        .expect("driver inserted")
}

#[tokio::test]
async fn location_pings_from_an_offline_driver_are_not_published() {
    let store = support::test_store().await;
    let driver_id = seed_driver(&store).await;

    let bus = MemoryBus::new();
    let mut consumer = bus.consumer(&["driver-locations"]);
    let service = DriverService::new(store, Arc::new(bus.producer()));

    service
        .update_driver_location(driver_id, Point::new(40.75, -73.98), VehicleType::Sedan)
        .await
        .unwrap();

    let result = tokio::time::timeout(Duration::from_millis(200), consumer.recv()).await;
    assert!(result.is_err(), "no location event should be published for an offline driver");
}

#[tokio::test]
async fn location_pings_from_an_online_driver_are_published() {
    let store = support::test_store().await;
    let driver_id = seed_driver(&store).await;

    let bus = MemoryBus::new();
    let mut consumer = bus.consumer(&["driver-locations"]);
    let service = DriverService::new(store, Arc::new(bus.producer()));

    service
        .update_driver_availability(driver_id, true)
        .await
        .unwrap();
    service
        .update_driver_location(driver_id, Point::new(40.75, -73.98), VehicleType::Sedan)
        .await
        .unwrap();

    let message = tokio::time::timeout(Duration::from_millis(500), consumer.recv())
        .await
        .expect("event should arrive")
        .expect("channel open");
    assert_eq!(message.key, driver_id.to_string());
}
