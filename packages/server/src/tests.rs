use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use api::auth::{OAuthProvider, PendingLogin, ProviderIdentity};
use api::store::{IdentityStore, MemoryIdentityStore};
use api::Error;

use crate::config::Config;
use crate::routes::router;
use crate::state::AppState;

const STUB_STATE: &str = "stub-state";
const STUB_VERIFIER: &str = "stub-verifier";

/// Provider double. The authorization code doubles as the subject seed, so
/// logging in with different codes produces different provider identities.
#[derive(Clone)]
struct StubProvider {
    fail_exchange: bool,
}

impl StubProvider {
    fn new() -> Self {
        Self {
            fail_exchange: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail_exchange: true,
        }
    }
}

impl OAuthProvider for StubProvider {
    fn authorize_url(&self) -> (String, PendingLogin) {
        (
            format!("https://provider.example/consent?state={STUB_STATE}"),
            PendingLogin {
                state: STUB_STATE.to_string(),
                pkce_verifier: STUB_VERIFIER.to_string(),
            },
        )
    }

    async fn exchange_code(
        &self,
        code: String,
        pkce_verifier: String,
    ) -> Result<ProviderIdentity, Error> {
        if self.fail_exchange {
            return Err(Error::AuthFailed("exchange refused".to_string()));
        }
        assert_eq!(pkce_verifier, STUB_VERIFIER);
        Ok(ProviderIdentity {
            provider: "google".to_string(),
            subject: format!("subject-{code}"),
            name: Some("Stub User".to_string()),
            avatar_url: None,
        })
    }
}

fn test_config() -> Config {
    Config {
        port: 0,
        database_url: String::new(),
        session_secret: "0123456789abcdef0123456789abcdef".to_string(),
        google_client_id: "client".to_string(),
        google_client_secret: "secret".to_string(),
        auth_redirect_uri: "http://localhost:3000/auth/login/callback".to_string(),
        frontend_origin: "http://localhost:5173".to_string(),
        post_login_redirect: "/".to_string(),
        login_failure_redirect: "/login".to_string(),
    }
}

fn app_with(store: MemoryIdentityStore, provider: StubProvider) -> Router {
    let state = AppState::new(store, provider, test_config());
    router(state).layer(SessionManagerLayer::new(MemoryStore::default()))
}

fn app() -> Router {
    app_with(MemoryIdentityStore::new(), StubProvider::new())
}

fn request(method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn session_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("expected a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Walk the full handshake against the stub provider and return the session
/// cookie of the now-authenticated browser.
async fn log_in(app: &Router, code: &str) -> String {
    let login = app
        .clone()
        .oneshot(request(Method::GET, "/auth/login", None, None))
        .await
        .unwrap();
    assert!(login.status().is_redirection());
    let cookie = session_cookie(&login);

    let callback_uri = format!("/auth/login/callback?code={code}&state={STUB_STATE}");
    let callback = app
        .clone()
        .oneshot(request(Method::GET, &callback_uri, Some(&cookie), None))
        .await
        .unwrap();
    assert!(callback.status().is_redirection());
    assert_eq!(callback.headers().get(header::LOCATION).unwrap(), "/");

    cookie
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(request(Method::GET, "/health", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_session_status_anonymous() {
    let response = app()
        .oneshot(request(Method::GET, "/session/status", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "authenticated": false }));
}

#[tokio::test]
async fn test_login_redirects_to_consent_screen() {
    let response = app()
        .oneshot(request(Method::GET, "/auth/login", None, None))
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap(),
        format!("https://provider.example/consent?state={STUB_STATE}")
    );
    // The pending handshake state went into a fresh session.
    session_cookie(&response);
}

#[tokio::test]
async fn test_unauthenticated_create_appends_nothing() {
    let store = MemoryIdentityStore::new();
    let app = app_with(store.clone(), StubProvider::new());

    // A user exists, but the request carries no session.
    let user = store
        .find_or_create_user(ProviderIdentity {
            provider: "google".to_string(),
            subject: "subject-alice".to_string(),
            name: None,
            avatar_url: None,
        })
        .await
        .unwrap();

    let response = app
        .oneshot(request(
            Method::POST,
            "/notes",
            None,
            Some(json!({ "title": "sneaky", "content": "write" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await, json!({ "authenticated": false }));
    assert!(store.get_user(user.id).await.unwrap().notes.is_empty());
}

#[tokio::test]
async fn test_guard_redirects_browser_navigation() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/notes")
                .header(header::ACCEPT, "text/html,application/xhtml+xml")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
}

#[tokio::test]
async fn test_callback_state_mismatch_returns_to_anonymous() {
    let app = app();

    let login = app
        .clone()
        .oneshot(request(Method::GET, "/auth/login", None, None))
        .await
        .unwrap();
    let cookie = session_cookie(&login);

    let callback = app
        .clone()
        .oneshot(request(
            Method::GET,
            "/auth/login/callback?code=x&state=forged",
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    assert!(callback.status().is_redirection());
    assert_eq!(callback.headers().get(header::LOCATION).unwrap(), "/login");

    let status = app
        .oneshot(request(Method::GET, "/session/status", Some(&cookie), None))
        .await
        .unwrap();
    assert_eq!(body_json(status).await, json!({ "authenticated": false }));
}

#[tokio::test]
async fn test_callback_denied_consent_redirects_to_failure_page() {
    let app = app();

    let login = app
        .clone()
        .oneshot(request(Method::GET, "/auth/login", None, None))
        .await
        .unwrap();
    let cookie = session_cookie(&login);

    let callback = app
        .clone()
        .oneshot(request(
            Method::GET,
            "/auth/login/callback?error=access_denied",
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    assert!(callback.status().is_redirection());
    assert_eq!(callback.headers().get(header::LOCATION).unwrap(), "/login");
}

#[tokio::test]
async fn test_callback_without_login_in_flight_fails() {
    let response = app()
        .oneshot(request(
            Method::GET,
            &format!("/auth/login/callback?code=x&state={STUB_STATE}"),
            None,
            None,
        ))
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
}

#[tokio::test]
async fn test_failed_exchange_never_reaches_authenticated_area() {
    let app = app_with(MemoryIdentityStore::new(), StubProvider::failing());

    let login = app
        .clone()
        .oneshot(request(Method::GET, "/auth/login", None, None))
        .await
        .unwrap();
    let cookie = session_cookie(&login);

    let callback = app
        .clone()
        .oneshot(request(
            Method::GET,
            &format!("/auth/login/callback?code=x&state={STUB_STATE}"),
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    assert!(callback.status().is_redirection());
    assert_eq!(callback.headers().get(header::LOCATION).unwrap(), "/login");

    let status = app
        .oneshot(request(Method::GET, "/session/status", Some(&cookie), None))
        .await
        .unwrap();
    assert_eq!(body_json(status).await, json!({ "authenticated": false }));
}

#[tokio::test]
async fn test_repeat_logins_converge_on_one_user() {
    let app = app();

    let first = log_in(&app, "alice").await;
    let second = log_in(&app, "alice").await;

    let first_user = body_json(
        app.clone()
            .oneshot(request(Method::GET, "/session/status", Some(&first), None))
            .await
            .unwrap(),
    )
    .await;
    let second_user = body_json(
        app.oneshot(request(Method::GET, "/session/status", Some(&second), None))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(first_user["authenticated"], json!(true));
    assert_eq!(first_user["user"]["id"], second_user["user"]["id"]);
}

#[tokio::test]
async fn test_session_round_trip_and_logout() {
    let app = app();
    let cookie = log_in(&app, "alice").await;

    let status = body_json(
        app.clone()
            .oneshot(request(Method::GET, "/session/status", Some(&cookie), None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status["authenticated"], json!(true));
    assert_eq!(status["user"]["name"], json!("Stub User"));

    let logout = app
        .clone()
        .oneshot(request(Method::POST, "/auth/logout", Some(&cookie), None))
        .await
        .unwrap();
    assert_eq!(logout.status(), StatusCode::OK);
    assert_eq!(
        body_json(logout).await,
        json!({ "message": "logged out" })
    );

    // The old token no longer resolves to a claim.
    let after = body_json(
        app.clone()
            .oneshot(request(Method::GET, "/session/status", Some(&cookie), None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(after, json!({ "authenticated": false }));

    let create = app
        .oneshot(request(
            Method::POST,
            "/notes",
            Some(&cookie),
            Some(json!({ "title": "late", "content": "" })),
        ))
        .await
        .unwrap();
    assert_eq!(create.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_full_note_lifecycle() {
    let app = app();
    let cookie = log_in(&app, "alice").await;

    // Create.
    let created = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/notes",
            Some(&cookie),
            Some(json!({ "title": "a", "content": "b" })),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let note = body_json(created).await;
    assert_eq!(note["title"], json!("a"));
    assert_eq!(note["content"], json!("b"));
    let id = note["id"].as_str().unwrap().to_string();

    // List.
    let listed = body_json(
        app.clone()
            .oneshot(request(Method::GET, "/notes", Some(&cookie), None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(listed, json!([{ "id": id, "title": "a", "content": "b" }]));

    // Get single.
    let fetched = app
        .clone()
        .oneshot(request(
            Method::GET,
            &format!("/notes/{id}"),
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);

    // Update in place.
    let updated = app
        .clone()
        .oneshot(request(
            Method::PUT,
            &format!("/notes/{id}"),
            Some(&cookie),
            Some(json!({ "title": "a2", "content": "b2" })),
        ))
        .await
        .unwrap();
    assert_eq!(updated.status(), StatusCode::OK);
    assert_eq!(
        body_json(updated).await,
        json!({ "id": id, "title": "a2", "content": "b2" })
    );

    // Delete converges: removed once, then already gone — both succeed.
    let deleted = app
        .clone()
        .oneshot(request(
            Method::DELETE,
            &format!("/notes/{id}"),
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(body_json(deleted).await, json!({ "deleted": true }));

    let deleted_again = app
        .clone()
        .oneshot(request(
            Method::DELETE,
            &format!("/notes/{id}"),
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(deleted_again.status(), StatusCode::OK);
    assert_eq!(body_json(deleted_again).await, json!({ "deleted": false }));

    let empty = body_json(
        app.oneshot(request(Method::GET, "/notes", Some(&cookie), None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(empty, json!([]));
}

#[tokio::test]
async fn test_create_accepts_missing_fields() {
    let app = app();
    let cookie = log_in(&app, "alice").await;

    let created = app
        .oneshot(request(Method::POST, "/notes", Some(&cookie), Some(json!({}))))
        .await
        .unwrap();

    assert_eq!(created.status(), StatusCode::CREATED);
    let note = body_json(created).await;
    assert_eq!(note["title"], json!(""));
    assert_eq!(note["content"], json!(""));
}

#[tokio::test]
async fn test_list_preserves_insertion_order() {
    let app = app();
    let cookie = log_in(&app, "alice").await;

    for title in ["one", "two", "three"] {
        let created = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/notes",
                Some(&cookie),
                Some(json!({ "title": title })),
            ))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
    }

    let listed = body_json(
        app.oneshot(request(Method::GET, "/notes", Some(&cookie), None))
            .await
            .unwrap(),
    )
    .await;
    let titles: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|note| note["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn test_notes_are_scoped_to_their_owner() {
    let app = app();
    let alice = log_in(&app, "alice").await;
    let bob = log_in(&app, "bob").await;

    let created = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/notes",
            Some(&alice),
            Some(json!({ "title": "alice's", "content": "private" })),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);

    let bobs = body_json(
        app.clone()
            .oneshot(request(Method::GET, "/notes", Some(&bob), None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(bobs, json!([]));

    let alices = body_json(
        app.oneshot(request(Method::GET, "/notes", Some(&alice), None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(alices.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_note_id_is_404() {
    let app = app();
    let cookie = log_in(&app, "alice").await;
    let ghost = uuid::Uuid::new_v4();

    let fetched = app
        .clone()
        .oneshot(request(
            Method::GET,
            &format!("/notes/{ghost}"),
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::NOT_FOUND);

    let updated = app
        .oneshot(request(
            Method::PUT,
            &format!("/notes/{ghost}"),
            Some(&cookie),
            Some(json!({ "title": "x" })),
        ))
        .await
        .unwrap();
    assert_eq!(updated.status(), StatusCode::NOT_FOUND);
}
