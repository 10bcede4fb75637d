//! HTTP/JSON front end for a loghouse commit log.
//!
//! Three routes over any [`CommitLog`]:
//!
//! | Route | Request | Response |
//! |---|---|---|
//! | `POST /produce` | `{"record": {"value": [..]}}` | `{"offset": n}` |
//! | `GET /consume?offset=n` | query string | `{"record": {...}}` |
//! | `GET /offsets` | — | `{"lowest": n, "highest": n}` |

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use loghouse_core::CommitLog;

pub mod handlers;
pub mod models;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub log: Arc<dyn CommitLog>,
}

/// Build the router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/produce", post(handlers::produce))
        .route("/consume", get(handlers::consume))
        .route("/offsets", get(handlers::offsets))
        .with_state(state)
}
