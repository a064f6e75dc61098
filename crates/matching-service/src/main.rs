use std::env;
use std::sync::Arc;

use bus::kafka::{KafkaConsumer, KafkaProducer};
use bus::{topics, Producer};
use matching_service::handlers::RideRequestsHandler;
use matching_service::MatchingService;
use store::Store;
use tracing_subscriber::EnvFilter;

const SERVICE_NAME: &str = "matching-service";

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let bootstrap_servers = env_or("BUS_BOOTSTRAP_SERVERS", "127.0.0.1:9093");
    let metrics_addr = env_or("METRICS_BIND_ADDR", "0.0.0.0:8002");

    let store = Store::connect_from_env().await?;
    let producer: Arc<dyn Producer> = Arc::new(KafkaProducer::new(&bootstrap_servers)?);
    let service = MatchingService::new(store, producer);

    let requests_consumer = KafkaConsumer::subscribe(
        &bootstrap_servers,
        SERVICE_NAME,
        &[topics::RIDE_REQUESTS],
    )?;

    let worker = tokio::spawn(bus::worker::run(
        requests_consumer,
        RideRequestsHandler { service },
    ));

    let healthz = axum::Router::new().route("/healthz", axum::routing::get(|| async { "ok" }));
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr).await?;

    tracing::info!(metrics_addr, "matching-service starting");

    tokio::select! {
        result = axum::serve(metrics_listener, healthz) => {
            if let Err(err) = result {
                tracing::error!(error = %err, "healthz server failed");
            }
        }
        _ = worker => {
            tracing::error!("ride-requests worker exited");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received, draining");
        }
    }

    Ok(())
}
