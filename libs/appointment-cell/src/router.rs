// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::get,
    middleware,
};

use directory_cell::Directory;
use shared_config::AppConfig;
use shared_utils::extractor::admin_middleware;

use crate::handlers;
use crate::services::AppointmentStore;

#[derive(Clone)]
pub struct AppointmentState {
    pub config: Arc<AppConfig>,
    pub directory: Arc<dyn Directory>,
    pub store: Arc<dyn AppointmentStore>,
}

pub fn appointment_routes(state: AppointmentState) -> Router {
    // Customer-facing availability is unauthenticated
    let public_routes = Router::new()
        .route("/availability", get(handlers::get_availability));

    let admin_routes = Router::new()
        .route("/admin", get(handlers::query_appointments))
        .layer(middleware::from_fn_with_state(state.config.clone(), admin_middleware));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .with_state(state)
}
