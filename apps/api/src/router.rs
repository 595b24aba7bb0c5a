use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::get,
};

use appointment_cell::{appointment_routes, AppointmentState};
use booking_wizard_cell::{booking_wizard_routes, WizardService, WizardState};
use directory_cell::{directory_routes, DirectoryState};
use shared_config::AppConfig;

use crate::services::Services;

pub fn create_router(config: Arc<AppConfig>, services: Services) -> anyhow::Result<Router> {
    let wizard = WizardService::new(
        services.directory.clone(),
        services.store.clone(),
        services.notifier.clone(),
        services.sessions.clone(),
    ).context("Failed to build booking wizard")?;

    let directory_state = DirectoryState {
        config: config.clone(),
        directory: services.directory.clone(),
    };
    let appointment_state = AppointmentState {
        config,
        directory: services.directory,
        store: services.store,
    };
    let wizard_state = WizardState { wizard: Arc::new(wizard) };

    Ok(Router::new()
        .route("/", get(|| async { "Agency Booking API is running!" }))
        .nest("/directory", directory_routes(directory_state))
        .nest("/appointments", appointment_routes(appointment_state))
        .nest("/booking", booking_wizard_routes(wizard_state)))
}
