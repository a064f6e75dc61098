use std::env;

use bus::kafka::KafkaConsumer;
use bus::topics;
use gateway::handlers::{DriverAvailabilityHandler, DriverLocationsHandler, RideUpdatesHandler};
use gateway::{http, ws, GatewayState};
use store::Store;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

const SERVICE_NAME: &str = "gateway";

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let bootstrap_servers = env_or("BUS_BOOTSTRAP_SERVERS", "127.0.0.1:9093");
    let bind_addr = env_or("GATEWAY_BIND_ADDR", "0.0.0.0:8001");
    let metrics_addr = env_or("METRICS_BIND_ADDR", "0.0.0.0:8002");

    let store = Store::connect_from_env().await?;
    let state = GatewayState::new(store);

    let locations_consumer =
        KafkaConsumer::subscribe(&bootstrap_servers, SERVICE_NAME, &[topics::DRIVER_LOCATIONS])?;
    let availability_consumer = KafkaConsumer::subscribe(
        &bootstrap_servers,
        SERVICE_NAME,
        &[topics::DRIVER_AVAILABILITY],
    )?;
    let ride_updates_consumer =
        KafkaConsumer::subscribe(&bootstrap_servers, SERVICE_NAME, &[topics::RIDE_UPDATES])?;

    tokio::spawn(bus::worker::run(
        locations_consumer,
        DriverLocationsHandler { state: state.clone() },
    ));
    tokio::spawn(bus::worker::run(
        availability_consumer,
        DriverAvailabilityHandler { state: state.clone() },
    ));
    tokio::spawn(bus::worker::run(
        ride_updates_consumer,
        RideUpdatesHandler { state: state.clone() },
    ));

    let app = ws::router(state.clone())
        .merge(http::router(state))
        .layer(TraceLayer::new_for_http());
    let healthz = axum::Router::new().route("/healthz", axum::routing::get(|| async { "ok" }));

    let app_listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr).await?;

    tracing::info!(bind_addr, metrics_addr, "gateway starting");

    tokio::select! {
        result = axum::serve(app_listener, app) => {
            if let Err(err) = result {
                tracing::error!(error = %err, "http server failed");
            }
        }
        result = axum::serve(metrics_listener, healthz) => {
            if let Err(err) = result {
                tracing::error!(error = %err, "healthz server failed");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received, draining");
        }
    }

    Ok(())
}
