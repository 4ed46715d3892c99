use axum::{routing::get, Router};

pub mod catalog;
pub mod common;
pub mod stock;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .merge(catalog::router())
        .nest("/stock", stock::router())
}
