//! # API crate — authentication, sessions, and note storage
//!
//! The core of the note-taking backend: everything between "an anonymous
//! HTTP client shows up" and "a verified user's notes are read or mutated"
//! lives here. The `server` crate wraps this in an axum router.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | Federated login with Google (authorization-code + PKCE), session payload types |
//! | [`db`] | PostgreSQL connection pool |
//! | [`error`] | The failure taxonomy shared by every operation |
//! | [`models`] | `User` with its embedded `Note` list, and the `UserInfo` session claim |
//! | [`store`] | The `IdentityStore` trait plus its PostgreSQL and in-memory implementations |
//!
//! ## Shape of a login
//!
//! `auth::OAuthProvider::authorize_url` sends the browser to the provider's
//! consent screen; the callback presents the returned code to
//! `exchange_code`, which yields a verified [`auth::ProviderIdentity`];
//! [`store::IdentityStore::find_or_create_user`] resolves that identity to a
//! local [`models::User`] (creating one with an empty note list on first
//! sight); and the caller stores [`models::UserInfo`] — never the full user
//! — in the session.

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod store;

pub use error::Error;
pub use models::{Note, User, UserInfo};
