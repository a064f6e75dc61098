use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use model::{DriverId, Point, RideId, VehicleType};
use serde::Deserialize;

use crate::error::RouteErrorResponse;
use crate::service::DriverService;

pub type RouteResult<T> = Result<T, RouteErrorResponse>;

#[derive(Deserialize)]
pub struct AvailabilityRequest {
    pub is_online: bool,
}

#[derive(Deserialize)]
pub struct LocationRequest {
    pub lat: f64,
    pub lon: f64,
    pub vehicle_type: VehicleType,
}

#[derive(Deserialize)]
pub struct RideActionRequest {
    pub driver_id: i64,
}

#[derive(Deserialize)]
pub struct CompleteRideRequest {
    pub driver_id: i64,
    pub fare: f64,
}

/// The thin trigger surface the driver app / out-of-scope façade calls into.
pub fn router(service: DriverService) -> Router {
    Router::new()
        .route("/drivers/:id/availability", post(set_availability))
        .route("/drivers/:id/location", post(set_location))
        .route("/rides/:id/accept", post(accept_ride))
        .route("/rides/:id/start", post(start_ride))
        .route("/rides/:id/complete", post(complete_ride))
        .with_state(service)
}

async fn set_availability(
    State(service): State<DriverService>,
    Path(id): Path<i64>,
    Json(request): Json<AvailabilityRequest>,
) -> RouteResult<()> {
    service
        .update_driver_availability(DriverId::new(id), request.is_online)
        .await?;
    Ok(())
}

async fn set_location(
    State(service): State<DriverService>,
    Path(id): Path<i64>,
    Json(request): Json<LocationRequest>,
) -> RouteResult<()> {
    service
        .update_driver_location(
            DriverId::new(id),
            Point::new(request.lat, request.lon),
            request.vehicle_type,
        )
        .await?;
    Ok(())
}

async fn accept_ride(
    State(service): State<DriverService>,
    Path(id): Path<i64>,
    Json(request): Json<RideActionRequest>,
) -> RouteResult<()> {
    service
        .accept_ride(RideId::new(id), DriverId::new(request.driver_id))
        .await?;
    Ok(())
}

async fn start_ride(
    State(service): State<DriverService>,
    Path(id): Path<i64>,
    Json(request): Json<RideActionRequest>,
) -> RouteResult<()> {
    service
        .start_ride(RideId::new(id), DriverId::new(request.driver_id))
        .await?;
    Ok(())
}

async fn complete_ride(
    State(service): State<DriverService>,
    Path(id): Path<i64>,
    Json(request): Json<CompleteRideRequest>,
) -> RouteResult<()> {
    service
        .complete_ride(RideId::new(id), DriverId::new(request.driver_id), request.fare)
        .await?;
    Ok(())
}
