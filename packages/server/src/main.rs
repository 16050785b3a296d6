use std::time::Duration;

use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use api::auth::{GoogleOAuth, OAuthConfig};
use api::store::PgIdentityStore;

use server::config::Config;
use server::router;
use server::state::AppState;

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    dotenvy::dotenv().ok();
    let config = Config::load();

    info!("Connecting to database...");
    let pool = api::db::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("../api/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Session store lives in the same database; sessions hold only the
    // minimal identity claim, never user data.
    let session_store = PostgresStore::new(pool.clone());
    session_store
        .migrate()
        .await
        .expect("Failed to prepare session table");

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false) // enable when serving HTTPS directly
        .with_same_site(SameSite::Lax)
        .with_signed(Key::derive_from(config.session_secret.as_bytes()))
        .with_expiry(Expiry::OnInactivity(
            Duration::from_secs(60 * 60 * 24 * 7).try_into().unwrap(),
        ));

    let oauth = GoogleOAuth::new(
        OAuthConfig::google(
            config.google_client_id.clone(),
            config.google_client_secret.clone(),
            config.auth_redirect_uri.clone(),
        )
        .expect("Invalid OAuth configuration"),
    );

    // Exact-origin allow list with credentials; never a wildcard.
    let cors = CorsLayer::new()
        .allow_origin(
            config
                .frontend_origin
                .parse::<HeaderValue>()
                .expect("Invalid FRONTEND_ORIGIN"),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    let port = config.port;
    let state = AppState::new(PgIdentityStore::new(pool), oauth, config);

    let app = router(state).layer(session_layer).layer(cors);

    let address = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    info!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
