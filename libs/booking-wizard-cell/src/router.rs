use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::services::WizardService;

#[derive(Clone)]
pub struct WizardState {
    pub wizard: Arc<WizardService>,
}

/// Customer-facing wizard routes; no authentication.
pub fn booking_wizard_routes(state: WizardState) -> Router {
    Router::new()
        .route("/sessions", post(handlers::start_session))
        .route("/sessions/{session_id}", get(handlers::get_session).delete(handlers::cancel_session))
        .route("/sessions/{session_id}/submit", post(handlers::submit_step))
        .route("/sessions/{session_id}/back", post(handlers::go_back))
        .route("/sessions/{session_id}/slots", get(handlers::preview_slots))
        .with_state(state)
}
