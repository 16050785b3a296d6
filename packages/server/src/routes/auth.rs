//! Login handshake, logout, and session status.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_sessions::Session;
use tracing::{info, warn};

use api::auth::{OAuthProvider, PendingLogin, SESSION_CLAIM_KEY, SESSION_PENDING_KEY};
use api::store::IdentityStore;
use api::UserInfo;

use crate::error::AppError;
use crate::state::AppState;

/// Query string the provider sends back to the callback.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Send the browser to the provider's consent screen, parking the CSRF
/// state and PKCE verifier in the (still anonymous) session.
pub async fn login<S, P>(
    State(state): State<AppState<S, P>>,
    session: Session,
) -> Result<Redirect, AppError>
where
    S: IdentityStore,
    P: OAuthProvider,
{
    let (url, pending) = state.oauth.authorize_url();
    session.insert(SESSION_PENDING_KEY, &pending).await?;
    Ok(Redirect::to(&url))
}

/// Complete the handshake: validate the CSRF state, exchange the code,
/// resolve the identity to a local user, and establish the session.
///
/// Every provider-side failure ends in a redirect to the login-failure page
/// and returns the client to anonymous; only a store failure is a 5xx.
pub async fn callback<S, P>(
    State(state): State<AppState<S, P>>,
    session: Session,
    Query(params): Query<CallbackParams>,
) -> Result<Response, AppError>
where
    S: IdentityStore,
    P: OAuthProvider,
{
    let failure = Redirect::to(&state.config.login_failure_redirect).into_response();

    if let Some(error) = params.error {
        warn!("provider callback returned an error: {error}");
        return Ok(failure);
    }
    let (Some(code), Some(returned_state)) = (params.code, params.state) else {
        warn!("provider callback missing code or state");
        return Ok(failure);
    };

    let pending: Option<PendingLogin> = session.remove(SESSION_PENDING_KEY).await?;
    let Some(pending) = pending else {
        warn!("provider callback with no login in flight");
        return Ok(failure);
    };
    if pending.state != returned_state {
        warn!("provider callback state mismatch");
        return Ok(failure);
    }

    let identity = match state.oauth.exchange_code(code, pending.pkce_verifier).await {
        Ok(identity) => identity,
        Err(e) => {
            warn!("provider exchange failed: {e}");
            return Ok(failure);
        }
    };

    // A store failure here is a 5xx and no session is established.
    let user = state.store.find_or_create_user(identity).await?;

    session.insert(SESSION_CLAIM_KEY, user.to_info()).await?;
    session.save().await?;

    info!(user = %user.id, "login complete");
    Ok(Redirect::to(&state.config.post_login_redirect).into_response())
}

/// Destroy the session record and clear the cookie. Idempotent.
pub async fn logout(session: Session) -> Result<Json<Value>, AppError> {
    session.flush().await?;
    Ok(Json(json!({ "message": "logged out" })))
}

/// Report whether the caller holds a live claim. Never an error: anonymous
/// is an expected answer.
pub async fn session_status(session: Session) -> Result<Json<Value>, AppError> {
    let claim: Option<UserInfo> = session.get(SESSION_CLAIM_KEY).await?;
    Ok(Json(match claim {
        Some(user) => json!({ "authenticated": true, "user": user }),
        None => json!({ "authenticated": false }),
    }))
}
