//! Authentication module for the federated login flow.

mod config;
mod google;
mod session;

pub use config::OAuthConfig;
pub use google::GoogleOAuth;
pub use session::{PendingLogin, SESSION_CLAIM_KEY, SESSION_PENDING_KEY};

use std::future::Future;

use crate::error::Error;

/// A verified identity returned by a provider exchange.
///
/// `subject` is the provider's stable identifier for the account and the
/// only field with authorization weight; the display fields are optional
/// profile decorations.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderIdentity {
    pub provider: String,
    pub subject: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

/// The redirect handshake with an external identity provider.
///
/// Implementations are explicitly constructed values, not process-global
/// registrations, so multiple configurations (including test doubles) can
/// coexist.
pub trait OAuthProvider {
    /// Build the consent-screen URL plus the [`PendingLogin`] state that the
    /// callback must present to complete the handshake.
    fn authorize_url(&self) -> (String, PendingLogin);

    /// Exchange the short-lived authorization code (plus the PKCE verifier
    /// issued at initiate time) for a verified identity. Every failure mode
    /// — denied consent, expired code, unreachable provider — surfaces as
    /// [`Error::AuthFailed`].
    fn exchange_code(
        &self,
        code: String,
        pkce_verifier: String,
    ) -> impl Future<Output = Result<ProviderIdentity, Error>> + Send;
}
