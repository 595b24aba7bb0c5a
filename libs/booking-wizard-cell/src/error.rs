use chrono::NaiveDate;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use appointment_cell::{AvailabilityError, StoreError, WriteError};
use directory_cell::DirectoryError;
use shared_models::AppError;

use crate::models::WizardStep;

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("{0}")]
    Validation(String),

    #[error("{date} is a {weekday}, which is not an operating day. Please choose another date.")]
    NonOperatingDay { date: NaiveDate, weekday: String },

    #[error("No appointments are available on {0}. Please choose another date.")]
    NoAvailableSlots(NaiveDate),

    #[error("That time slot has already been booked. Please choose another time.")]
    SlotConflict,

    #[error("No appointments were found for this phone number")]
    NoAppointmentsFound,

    #[error("Invalid appointment date/time: {0}")]
    InvalidDateTime(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Booking session {0} not found or expired")]
    SessionNotFound(Uuid),

    #[error("Booking session is already committed")]
    SessionCommitted,

    #[error("Expected input for step {expected}, got {got}")]
    WrongStep { expected: WizardStep, got: WizardStep },

    #[error("Session store error: {0}")]
    SessionStore(#[from] SessionStoreError),

    #[error("Backend error: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum SessionStoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Redis pool error: {0}")]
    Pool(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<DirectoryError> for WizardError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound(what) => WizardError::NotFound(what),
            DirectoryError::Validation(msg) => WizardError::Validation(msg),
            DirectoryError::Backend(msg) => WizardError::Backend(msg),
        }
    }
}

impl From<StoreError> for WizardError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SlotConflict(_) => WizardError::SlotConflict,
            StoreError::NotFound(id) => WizardError::NotFound(format!("Appointment {}", id)),
            StoreError::Backend(msg) => WizardError::Backend(msg),
        }
    }
}

impl From<AvailabilityError> for WizardError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::NonOperatingDay { date, weekday } => {
                WizardError::NonOperatingDay { date, weekday }
            }
            AvailabilityError::Store(store) => store.into(),
        }
    }
}

impl From<WriteError> for WizardError {
    fn from(err: WriteError) -> Self {
        match err {
            WriteError::Validation(msg) => WizardError::Validation(msg),
            WriteError::InvalidDateTime(detail) => WizardError::InvalidDateTime(detail),
            WriteError::NotFound(what) => WizardError::NotFound(what),
            WriteError::SlotConflict => WizardError::SlotConflict,
            WriteError::Backend(msg) => WizardError::Backend(msg),
        }
    }
}

impl From<WizardError> for AppError {
    fn from(err: WizardError) -> Self {
        match err {
            WizardError::Validation(msg) => AppError::ValidationError(msg),
            WizardError::WrongStep { .. } => AppError::ValidationError(err.to_string()),
            WizardError::NonOperatingDay { .. } | WizardError::NoAvailableSlots(_) => {
                AppError::Unprocessable(err.to_string())
            }
            WizardError::SlotConflict | WizardError::SessionCommitted => AppError::Conflict(err.to_string()),
            WizardError::NoAppointmentsFound
            | WizardError::NotFound(_)
            | WizardError::SessionNotFound(_) => AppError::NotFound(err.to_string()),
            WizardError::InvalidDateTime(detail) => {
                error!("Booking commit failed on date/time: {}", detail);
                AppError::BadRequest("Your appointment could not be saved. Please try again.".to_string())
            }
            WizardError::SessionStore(e) => AppError::Internal(e.to_string()),
            WizardError::Backend(msg) => AppError::Database(msg),
        }
    }
}
