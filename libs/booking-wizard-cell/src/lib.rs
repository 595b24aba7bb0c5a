pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::{SessionStoreError, WizardError};
pub use models::*;
pub use services::*;

pub use router::{booking_wizard_routes, WizardState};
