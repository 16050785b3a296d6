//! The access guard: a claim-resolving extractor applied to every notes
//! handler. Handlers that take a [`CurrentUser`] never run for anonymous
//! requests.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::json;
use tower_sessions::Session;

use api::auth::SESSION_CLAIM_KEY;
use api::UserInfo;

use crate::error::AppError;

/// Where interactive (browser-navigated) requests are sent to sign in.
const LOGIN_PAGE: &str = "/login";

/// The resolved identity claim for the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserInfo);

/// Outcome of a request that carried no resolvable claim.
///
/// Not authenticated is an expected steady state, so it is never logged as
/// an error. The discriminator between the two anonymous shapes is the
/// calling context: a browser navigation gets bounced to the login page,
/// while an API/XHR caller gets a structured body it can react to without
/// following a redirect.
pub enum AuthRejection {
    Interactive,
    Programmatic,
    Failure(Response),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Interactive => Redirect::to(LOGIN_PAGE).into_response(),
            AuthRejection::Programmatic => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "authenticated": false })),
            )
                .into_response(),
            AuthRejection::Failure(response) => response,
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = match Session::from_request_parts(parts, state).await {
            Ok(session) => session,
            Err(rejection) => return Err(AuthRejection::Failure(rejection.into_response())),
        };

        match session.get::<UserInfo>(SESSION_CLAIM_KEY).await {
            Ok(Some(claim)) => Ok(CurrentUser(claim)),
            Ok(None) if prefers_html(parts) => Err(AuthRejection::Interactive),
            Ok(None) => Err(AuthRejection::Programmatic),
            Err(e) => Err(AuthRejection::Failure(AppError::from(e).into_response())),
        }
    }
}

fn prefers_html(parts: &Parts) -> bool {
    parts
        .headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .map(|accept| accept.contains("text/html"))
        .unwrap_or(false)
}
