use std::sync::Arc;

use api::auth::OAuthProvider;
use api::store::IdentityStore;

use crate::config::Config;

/// Shared state handed to every handler: the identity store, the provider
/// handler, and the startup configuration.
#[derive(Clone)]
pub struct AppState<S, P> {
    pub store: S,
    pub oauth: P,
    pub config: Arc<Config>,
}

impl<S, P> AppState<S, P>
where
    S: IdentityStore,
    P: OAuthProvider,
{
    pub fn new(store: S, oauth: P, config: Config) -> Self {
        Self {
            store,
            oauth,
            config: Arc::new(config),
        }
    }
}
