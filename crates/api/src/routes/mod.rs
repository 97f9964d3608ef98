//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod audit;
pub mod health;
pub mod refunds;
pub mod transactions;

#[cfg(test)]
pub(crate) mod test_support;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(refunds::routes())
        .merge(transactions::routes())
        .merge(audit::routes())
}
