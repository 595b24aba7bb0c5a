use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::DatabaseError;
use shared_models::AppError;

// ==============================================================================
// DIRECTORY ENTITIES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agency {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    /// `HH:MM`, used to derive the working-hour options of the agency's advisers.
    pub operating_hours_start: Option<String>,
    pub operating_hours_end: Option<String>,
    /// Lowercase English weekday names ("monday"). Empty means never bookable.
    #[serde(default)]
    pub operating_days: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adviser {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub agency_id: Uuid,
    #[serde(default)]
    pub specialization_ids: Vec<Uuid>,
    /// Slot start times as stored; either `HH:MM` or `HHMM`.
    #[serde(default)]
    pub working_hours: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Adviser {
    pub fn offers(&self, specialization_id: Uuid) -> bool {
        self.specialization_ids.contains(&specialization_id)
    }

    pub fn matches(&self, filter: &AdviserFilter) -> bool {
        if filter.active_only && !self.is_active {
            return false;
        }
        if let Some(agency_id) = filter.agency_id {
            if self.agency_id != agency_id {
                return false;
            }
        }
        if let Some(specialization_id) = filter.specialization_id {
            if !self.offers(specialization_id) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialization {
    pub id: Uuid,
    pub label: String,
}

// ==============================================================================
// QUERY & REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdviserFilter {
    pub agency_id: Option<Uuid>,
    pub specialization_id: Option<Uuid>,
    #[serde(default)]
    pub active_only: bool,
}

impl AdviserFilter {
    /// The filter the booking flow uses: active advisers of one agency offering one specialization.
    pub fn bookable(agency_id: Uuid, specialization_id: Uuid) -> Self {
        Self {
            agency_id: Some(agency_id),
            specialization_id: Some(specialization_id),
            active_only: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAdviser {
    pub display_name: String,
    pub email: String,
    pub agency_id: Uuid,
    #[serde(default)]
    pub specialization_ids: Vec<Uuid>,
    #[serde(default)]
    pub working_hours: Vec<String>,
}

/// One row of the admin adviser table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviserListing {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub agency_name: String,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Directory backend error: {0}")]
    Backend(String),
}

impl From<DatabaseError> for DirectoryError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => DirectoryError::NotFound(msg),
            other => DirectoryError::Backend(other.to_string()),
        }
    }
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound(what) => AppError::NotFound(format!("{} not found", what)),
            DirectoryError::Validation(msg) => AppError::ValidationError(msg),
            DirectoryError::Backend(msg) => AppError::Database(msg),
        }
    }
}
