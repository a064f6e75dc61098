use std::env;
use std::sync::Arc;

use bus::kafka::KafkaProducer;
use bus::Producer;
use driver_service::{http, DriverService};
use store::Store;
use tracing_subscriber::EnvFilter;

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let bootstrap_servers = env_or("BUS_BOOTSTRAP_SERVERS", "127.0.0.1:9093");
    let bind_addr = env_or("DRIVER_SERVICE_BIND_ADDR", "0.0.0.0:8012");
    let metrics_addr = env_or("METRICS_BIND_ADDR", "0.0.0.0:8002");

    let store = Store::connect_from_env().await?;
    let producer: Arc<dyn Producer> = Arc::new(KafkaProducer::new(&bootstrap_servers)?);
    let service = DriverService::new(store, producer);

    let app = http::router(service);
    let healthz = axum::Router::new().route("/healthz", axum::routing::get(|| async { "ok" }));

    let app_listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr).await?;

    tracing::info!(bind_addr, metrics_addr, "driver-service starting");

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
