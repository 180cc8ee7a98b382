//! Shared server state.
//!
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! dashboard API is stateless apart from the database, so it only holds the
//! pool.

use sqlx::PgPool;

/// Clone is required by Axum; `PgPool` is internally reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub mod test_helpers;
