use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Open the database connection pool for the given connection string.
///
/// The pool is built here and passed to whoever needs it — the identity
/// store, the session store, and migrations all share one pool.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}
