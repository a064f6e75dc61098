use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures::{SinkExt, StreamExt};
use model::Point;

use crate::frames::{ClientFrame, DriverLocation, ServerFrame, DEFAULT_NEARBY_RADIUS_KM};
use crate::session::SessionId;
use crate::state::GatewayState;

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/ws/rider/:id", get(rider_stream))
        .route("/ws/driver/:id", get(driver_stream))
        .route("/ws/ride/:id", get(ride_stream))
        .route("/ws/nearby-drivers", get(nearby_drivers_stream))
        .with_state(state)
}

async fn rider_stream(
    ws: WebSocketUpgrade,
    State(state): State<GatewayState>,
    Path(rider_id): Path<i64>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        let (id, rx) = state.registry().register();
        state.riders().add(rider_id, id);
        run_session(socket, state.clone(), id, rx).await;
        state.riders().remove(&rider_id, id);
    })
}

async fn driver_stream(
    ws: WebSocketUpgrade,
    State(state): State<GatewayState>,
    Path(driver_id): Path<i64>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        let (id, rx) = state.registry().register();
        state.drivers().add(driver_id, id);
        run_session(socket, state.clone(), id, rx).await;
        state.drivers().remove(&driver_id, id);
    })
}

async fn ride_stream(
    ws: WebSocketUpgrade,
    State(state): State<GatewayState>,
    Path(ride_id): Path<i64>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        let (id, rx) = state.registry().register();
        state.rides().add(ride_id, id);
        run_session(socket, state.clone(), id, rx).await;
        state.rides().remove(&ride_id, id);
    })
}

async fn nearby_drivers_stream(
    ws: WebSocketUpgrade,
    State(state): State<GatewayState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        let (id, rx) = state.registry().register();
        state.browse().add(id);
        let snapshot: Vec<DriverLocation> = state
            .live_index()
            .read()
            .unwrap()
            .snapshot()
            .into_iter()
            .map(DriverLocation::from)
            .collect();
        state
            .registry()
            .send(id, ServerFrame::AllDriverLocations { drivers: snapshot });
        run_session(socket, state.clone(), id, rx).await;
        state.browse().remove(id);
    })
}

/// Drives one socket for its whole lifetime: a task forwarding pushed
/// frames from the session's channel, and a loop reading client frames.
/// Either side ending (socket close, channel drop) tears down the other.
async fn run_session(
    socket: WebSocket,
    state: GatewayState,
    id: SessionId,
    mut rx: tokio::sync::mpsc::UnboundedReceiver<ServerFrame>,
) {
    let (mut sender, mut receiver) = socket.split();

    let forward_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let Ok(json) = serde_json::to_string(&frame) else {
                continue;
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => handle_client_frame(&state, id, &text),
            Ok(Message::Close(_)) => break,
            Err(_) => break,
            _ => {}
        }
    }

    forward_task.abort();
    state.registry().remove(id);
}

fn handle_client_frame(state: &GatewayState, id: SessionId, text: &str) {
    let Ok(frame) = serde_json::from_str::<ClientFrame>(text) else {
        return;
    };

    match frame {
        ClientFrame::Heartbeat => {
            state.registry().send(id, ServerFrame::Heartbeat { status: "connected" });
        }
        ClientFrame::GetAll => {
            let drivers = state
                .live_index()
                .read()
                .unwrap()
                .snapshot()
                .into_iter()
                .map(DriverLocation::from)
                .collect();
            state.registry().send(id, ServerFrame::AllDriverLocations { drivers });
        }
        ClientFrame::GetNearby { lat, lon, radius } => {
            let radius = radius.unwrap_or(DEFAULT_NEARBY_RADIUS_KM);
            let drivers = state
                .live_index()
                .read()
                .unwrap()
                .within_radius(Point::new(lat, lon), radius)
                .into_iter()
                .map(DriverLocation::from)
                .collect();
            state.registry().send(id, ServerFrame::NearbyDrivers { drivers });
        }
    }
}
