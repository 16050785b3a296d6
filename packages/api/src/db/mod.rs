//! PostgreSQL connection pool management.

mod pool;

pub use pool::connect;
