use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] store::StoreError),
    #[error(transparent)]
    Bus(#[from] bus::BusError),
    #[error("no ride with id {0}")]
    UnknownRide(i64),
    #[error("ride-updates event for ride {0} targets completed with no fare")]
    MissingFare(i64),
}

#[derive(Debug, Serialize)]
pub struct RouteErrorResponse {
    #[serde(skip)]
    pub status_code: StatusCode,
    pub message: String,
}

impl RouteErrorResponse {
    pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }
}

impl IntoResponse for RouteErrorResponse {
    fn into_response(self) -> axum::response::Response {
        (self.status_code, Json(self)).into_response()
    }
}

impl From<ServiceError> for RouteErrorResponse {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::UnknownRide(id) => Self::new(
                StatusCode::NOT_FOUND,
                format!("no ride with id {id}"),
            ),
            ServiceError::MissingFare(id) => Self::new(
                StatusCode::BAD_REQUEST,
                format!("ride {id} completion event has no fare"),
            ),
            ServiceError::Store(store::StoreError::NotFound) => {
                Self::new(StatusCode::NOT_FOUND, "not found")
            }
            ServiceError::Store(other) => {
                tracing::error!(error = %other, "store error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
            ServiceError::Bus(other) => {
                tracing::error!(error = %other, "bus error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        RouteErrorResponse::from(self).into_response()
    }
}
