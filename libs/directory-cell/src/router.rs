use std::sync::Arc;

use axum::{
    Router,
    routing::get,
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::admin_middleware;

use crate::handlers;
use crate::services::Directory;

#[derive(Clone)]
pub struct DirectoryState {
    pub config: Arc<AppConfig>,
    pub directory: Arc<dyn Directory>,
}

pub fn directory_routes(state: DirectoryState) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/agencies", get(handlers::list_agencies))
        .route("/agencies/{agency_id}", get(handlers::get_agency))
        .route("/specializations", get(handlers::list_specializations))
        .route("/advisers", get(handlers::list_advisers));

    // Admin routes (bearer token + agency permissions)
    let admin_routes = Router::new()
        .route("/admin/advisers", get(handlers::list_advisers_for_admin).post(handlers::register_adviser))
        .route("/admin/agencies/{agency_id}/working-hours", get(handlers::get_working_hour_options))
        .layer(middleware::from_fn_with_state(state.config.clone(), admin_middleware));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .with_state(state)
}
