//! OAuth provider configuration.

use oauth2::{AuthUrl, ClientId, ClientSecret, RedirectUrl, TokenUrl};

use crate::error::Error;

/// OAuth provider configuration.
///
/// An explicitly constructed value that is passed into the provider handler
/// — there is no process-wide client registration.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
    pub auth_url: AuthUrl,
    pub token_url: TokenUrl,
    pub redirect_url: RedirectUrl,
}

impl OAuthConfig {
    /// Google OAuth config from a client id/secret pair and the callback URL
    /// registered for it.
    pub fn google(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    ) -> Result<Self, Error> {
        Ok(Self {
            client_id: ClientId::new(client_id),
            client_secret: ClientSecret::new(client_secret),
            auth_url: AuthUrl::new("https://accounts.google.com/o/oauth2/v2/auth".to_string())
                .map_err(|e| Error::AuthFailed(e.to_string()))?,
            token_url: TokenUrl::new("https://oauth2.googleapis.com/token".to_string())
                .map_err(|e| Error::AuthFailed(e.to_string()))?,
            redirect_url: RedirectUrl::new(redirect_uri)
                .map_err(|e| Error::AuthFailed(e.to_string()))?,
        })
    }
}
