use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::error::RouteErrorResponse;
use crate::service::{CreateRideRequest, RideService};

pub type RouteResult<T> = Result<T, RouteErrorResponse>;

#[derive(Serialize)]
struct RideCreated {
    ride_id: i64,
}

/// The thin trigger surface the out-of-scope CRUD façade calls into: enough
/// to create a ride and read its current state, nothing more.
pub fn router(service: RideService) -> Router {
    Router::new()
        .route("/rides", post(create_ride))
        .route("/rides/:id", get(get_ride))
        .route("/healthz", get(healthz))
        .with_state(service)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn create_ride(
    State(service): State<RideService>,
    Json(request): Json<CreateRideRequest>,
) -> RouteResult<Json<RideCreated>> {
    let ride_id = service.create_ride_request(request).await?;
    Ok(Json(RideCreated {
        ride_id: ride_id.raw(),
    }))
}

async fn get_ride(
    State(service): State<RideService>,
    Path(id): Path<i64>,
) -> RouteResult<Json<model::Ride>> {
    let ride = service.get(model::RideId::new(id)).await?;
    Ok(Json(ride))
}
