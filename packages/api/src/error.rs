use thiserror::Error;

/// Failures the authentication and storage core can surface.
///
/// "Not authenticated" is deliberately absent: an anonymous request is an
/// expected steady state handled by the server's access guard, not an error.
#[derive(Error, Debug)]
pub enum Error {
    /// The identity-provider exchange was denied or invalid. The detail is
    /// for server-side logs only and must never reach the client.
    #[error("identity provider exchange failed: {0}")]
    AuthFailed(String),

    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The backing persistence layer could not be reached.
    #[error("identity store unavailable")]
    StoreUnavailable(#[source] sqlx::Error),
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => Error::NotFound("row"),
            other => Error::StoreUnavailable(other),
        }
    }
}
