//! Mock-interview practice backend.
//!
//! Serves multiple-choice questions, judges coding submissions through the
//! [`judge`] crate, records proctoring events and aggregates feedback. All
//! state is in memory behind [`store::KeyValueStore`].

pub mod bank;
pub mod config;
pub mod dispatch;
pub mod hr;
pub mod matching;
pub mod proctor;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/v1", routes::api_router())
        .layer(cors)
        .with_state(state)
}
