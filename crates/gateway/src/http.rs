use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use model::Point;
use serde::Deserialize;

use crate::frames::{DriverLocation, DEFAULT_NEARBY_RADIUS_KM};
use crate::state::GatewayState;

#[derive(Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lon: f64,
    pub radius: Option<f64>,
}

/// The one REST convenience endpoint: the same payload the `get_nearby`
/// session request returns, for callers that don't want to hold a socket
/// open.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/drivers/nearby", get(nearby_drivers))
        .with_state(state)
}

async fn nearby_drivers(
    State(state): State<GatewayState>,
    Query(query): Query<NearbyQuery>,
) -> Json<Vec<DriverLocation>> {
    let radius = query.radius.unwrap_or(DEFAULT_NEARBY_RADIUS_KM);
    let drivers = state
        .live_index()
        .read()
        .unwrap()
        .within_radius(Point::new(query.lat, query.lon), radius)
        .into_iter()
        .map(DriverLocation::from)
        .collect();
    Json(drivers)
}
