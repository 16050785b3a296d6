//! # Google OAuth 2.0 implementation
//!
//! Implements the Google Authorization Code flow with PKCE.
//!
//! ## Flow
//!
//! 1. **[`authorize_url`](OAuthProvider::authorize_url)** — builds an
//!    authorization URL requesting the `openid` and `profile` scopes (a
//!    stable subject identifier plus display fields; no email), generates a
//!    random PKCE challenge, and hands back the CSRF state + verifier as a
//!    [`PendingLogin`] for the caller to stash in the session.
//!
//! 2. **[`exchange_code`](OAuthProvider::exchange_code)** — called by the
//!    `/auth/login/callback` route. Exchanges the authorization code + PKCE
//!    verifier for an access token, then fetches the user's profile from the
//!    Google userinfo endpoint (`googleapis.com/oauth2/v2/userinfo`) and
//!    returns it as a [`ProviderIdentity`]. Resolving that identity to a
//!    local user is the caller's job.

use oauth2::basic::BasicClient;
use oauth2::{
    AuthorizationCode, CsrfToken, EndpointNotSet, EndpointSet, PkceCodeChallenge,
    PkceCodeVerifier, Scope, TokenResponse,
};
use reqwest::Client;
use serde::Deserialize;

use crate::error::Error;

use super::{OAuthConfig, OAuthProvider, PendingLogin, ProviderIdentity};

/// Google user info from API.
#[derive(Debug, Deserialize)]
struct GoogleUser {
    id: String,
    name: Option<String>,
    picture: Option<String>,
}

/// OAuth client type with auth URL and token URL set.
type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Google OAuth handler.
#[derive(Debug, Clone)]
pub struct GoogleOAuth {
    config: OAuthConfig,
}

impl GoogleOAuth {
    /// Create a new Google OAuth handler from an explicit configuration.
    pub fn new(config: OAuthConfig) -> Self {
        Self { config }
    }

    fn create_client(&self) -> ConfiguredClient {
        BasicClient::new(self.config.client_id.clone())
            .set_client_secret(self.config.client_secret.clone())
            .set_auth_uri(self.config.auth_url.clone())
            .set_token_uri(self.config.token_url.clone())
            .set_redirect_uri(self.config.redirect_url.clone())
    }
}

impl OAuthProvider for GoogleOAuth {
    fn authorize_url(&self) -> (String, PendingLogin) {
        let client = self.create_client();
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_state) = client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();

        let pending = PendingLogin {
            state: csrf_state.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        };

        (auth_url.to_string(), pending)
    }

    async fn exchange_code(
        &self,
        code: String,
        pkce_verifier: String,
    ) -> Result<ProviderIdentity, Error> {
        // Create HTTP client for token exchange
        let http_client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::AuthFailed(e.to_string()))?;

        let client = self.create_client();

        // Exchange code for token
        let token_result = client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
            .request_async(&http_client)
            .await
            .map_err(|e| Error::AuthFailed(format!("token exchange failed: {}", e)))?;

        let access_token = token_result.access_token().secret();

        // Fetch user info from Google API
        let api_client = Client::new();

        let google_user: GoogleUser = api_client
            .get("https://www.googleapis.com/oauth2/v2/userinfo")
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| Error::AuthFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| Error::AuthFailed(e.to_string()))?;

        Ok(ProviderIdentity {
            provider: "google".to_string(),
            subject: google_user.id,
            name: google_user.name,
            avatar_url: google_user.picture,
        })
    }
}
