use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Handler-boundary error: everything a request can fail with, mapped onto
/// an HTTP response. Store and session failures are logged in full here and
/// leave as a generic 500 — detail never reaches the client.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] api::Error),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Api(api::Error::NotFound(what)) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("{what} not found") })),
            )
                .into_response(),
            AppError::Api(api::Error::StoreUnavailable(source)) => {
                error!("identity store unavailable: {source}");
                internal_error()
            }
            AppError::Api(api::Error::AuthFailed(detail)) => {
                // The login callback turns AuthFailed into a redirect before
                // it can reach this mapping; anything left is a server fault.
                error!("unhandled provider failure: {detail}");
                internal_error()
            }
            AppError::Session(source) => {
                error!("session store failure: {source}");
                internal_error()
            }
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal server error" })),
    )
        .into_response()
}
