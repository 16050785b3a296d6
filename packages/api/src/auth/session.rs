//! Session payload types and keys.

use serde::{Deserialize, Serialize};

/// Key under which the identity claim ([`crate::models::UserInfo`]) is
/// stored for the lifetime of a login.
pub const SESSION_CLAIM_KEY: &str = "claim";

/// Key under which [`PendingLogin`] waits between the initiate and callback
/// steps of the handshake.
pub const SESSION_PENDING_KEY: &str = "pending_login";

/// CSRF state and PKCE verifier for a login handshake in flight.
///
/// Written to the anonymous session when the consent redirect is issued and
/// consumed (removed) by the callback, so an abandoned handshake simply
/// expires with the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingLogin {
    pub state: String,
    pub pkce_verifier: String,
}
