//! Cross-cutting HTTP errors
//!
//! Feature modules own their error enums; this type covers failures raised
//! outside any feature, such as identity extraction and health checks.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::response::ErrorResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized(msg) => {
                ErrorResponse::new("UNAUTHORIZED", msg).into_response_with(StatusCode::UNAUTHORIZED)
            },
            AppError::Unavailable(msg) => {
                tracing::error!("Service unavailable: {}", msg);
                ErrorResponse::new("SERVICE_UNAVAILABLE", "A required dependency is unavailable")
                    .into_response_with(StatusCode::SERVICE_UNAVAILABLE)
            },
        }
    }
}
