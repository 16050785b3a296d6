pub mod auth;
pub mod notes;

use axum::{
    routing::{get, post},
    Router,
};

use api::auth::OAuthProvider;
use api::store::IdentityStore;

use crate::state::AppState;

pub fn router<S, P>(state: AppState<S, P>) -> Router
where
    S: IdentityStore + Clone + Send + Sync + 'static,
    P: OAuthProvider + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", get(auth::login))
        .route("/auth/login/callback", get(auth::callback))
        .route("/auth/logout", post(auth::logout))
        .route("/session/status", get(auth::session_status))
        .route("/notes", get(notes::list).post(notes::create))
        .route(
            "/notes/{id}",
            get(notes::get_one).put(notes::update).delete(notes::remove),
        )
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}
