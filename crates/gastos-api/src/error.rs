//! Error types for gastos-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gastos_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) => {
                StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Core(e) => serde_json::json!({
                "error": e.to_details(),
                "message": e.user_message(),
            }),
        };
        (status, Json(body)).into_response()
    }
}
