pub mod registration_handlers;

pub use registration_handlers::{activate_handler, health_handler, register_handler};

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/register", post(register_handler))
        .route("/activate", get(activate_handler))
        .with_state(state)
}
