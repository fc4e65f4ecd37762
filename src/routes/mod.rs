pub mod webhook;

use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

pub fn webhook_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(webhook::liveness))
        .route("/webhook", post(webhook::receive))
}
