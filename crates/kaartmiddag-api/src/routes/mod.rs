//! Route modules and the assembled application router.

use axum::Router;

use crate::state::AppState;

pub mod events;
pub mod health;

/// Builds the full application router: health check at the root and the
/// event context under `/api/v1/events`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/events", events::router())
        .with_state(state)
}
