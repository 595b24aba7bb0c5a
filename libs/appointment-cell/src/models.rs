// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use directory_cell::DirectoryError;
use shared_database::DatabaseError;
use shared_models::AppError;

use crate::services::slots::SlotKey;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub agency_id: Uuid,
    pub specialization_id: Uuid,
    pub adviser_id: Uuid,
    /// Stored as entered; no timezone conversion.
    pub appointment_date_time: NaiveDateTime,
    pub time_slot_key: SlotKey,
    pub title: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
}

impl Appointment {
    pub fn date(&self) -> NaiveDate {
        self.appointment_date_time.date()
    }

    pub fn conflict_key(&self) -> ConflictKey {
        ConflictKey {
            adviser_id: self.adviser_id,
            date: self.date(),
            time_slot_key: self.time_slot_key,
        }
    }

    /// Label shown in the modification flow's appointment picker.
    pub fn selection_label(&self) -> String {
        format!("{} ({})", self.title, self.date().format("%Y-%m-%d"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Confirmed,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
        }
    }
}

/// `(adviser, date, slot)`: at most one appointment may hold a given key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConflictKey {
    pub adviser_id: Uuid,
    pub date: NaiveDate,
    pub time_slot_key: SlotKey,
}

impl fmt::Display for ConflictKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "adviser {} on {} at {}", self.adviser_id, self.date, self.time_slot_key)
    }
}

/// Everything an appointment row holds apart from its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentFields {
    pub agency_id: Uuid,
    pub specialization_id: Uuid,
    pub adviser_id: Uuid,
    pub appointment_date_time: NaiveDateTime,
    pub time_slot_key: SlotKey,
    pub title: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
}

impl AppointmentFields {
    pub fn conflict_key(&self) -> ConflictKey {
        ConflictKey {
            adviser_id: self.adviser_id,
            date: self.appointment_date_time.date(),
            time_slot_key: self.time_slot_key,
        }
    }

    pub fn into_appointment(self, id: Uuid) -> Appointment {
        Appointment {
            id,
            agency_id: self.agency_id,
            specialization_id: self.specialization_id,
            adviser_id: self.adviser_id,
            appointment_date_time: self.appointment_date_time,
            time_slot_key: self.time_slot_key,
            title: self.title,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            customer_phone: self.customer_phone,
            notes: self.notes,
            status: self.status,
        }
    }
}

pub fn appointment_title(customer_name: &str) -> String {
    format!("Appointment for {}", customer_name)
}

// ==============================================================================
// QUERY MODELS
// ==============================================================================

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn single_day(date: NaiveDate) -> Self {
        Self { from: date, to: date }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentFilter {
    pub adviser_id: Option<Uuid>,
    pub customer_phone: Option<String>,
    pub date_range: Option<DateRange>,
}

impl AppointmentFilter {
    pub fn for_adviser_on(adviser_id: Uuid, date: NaiveDate) -> Self {
        Self {
            adviser_id: Some(adviser_id),
            customer_phone: None,
            date_range: Some(DateRange::single_day(date)),
        }
    }

    pub fn for_phone(phone: impl Into<String>) -> Self {
        Self {
            customer_phone: Some(phone.into()),
            ..Default::default()
        }
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        if let Some(adviser_id) = self.adviser_id {
            if appointment.adviser_id != adviser_id {
                return false;
            }
        }
        if let Some(phone) = &self.customer_phone {
            if appointment.customer_phone != *phone {
                return false;
            }
        }
        if let Some(range) = &self.date_range {
            if !range.contains(appointment.date()) {
                return false;
            }
        }
        true
    }
}

// ==============================================================================
// AVAILABILITY & COMMIT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookableSlot {
    pub key: SlotKey,
    /// Canonical `HH:MM`.
    pub time: String,
    /// 12-hour display form, e.g. `9:00 AM`.
    pub label: String,
}

impl From<SlotKey> for BookableSlot {
    fn from(key: SlotKey) -> Self {
        Self {
            key,
            time: key.display_time(),
            label: key.label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DraftTarget {
    New,
    /// Modification of a stored appointment found through `lookup_phone`.
    Existing { appointment_id: Uuid, lookup_phone: String },
}

/// Booking parameters as collected by the wizard, before normalisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDraft {
    pub target: DraftTarget,
    pub agency_id: Uuid,
    pub specialization_id: Uuid,
    pub adviser_id: Uuid,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM` or `HHMM`.
    pub time: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub notes: Option<String>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("Malformed time value: {0:?}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Slot already booked for {0}")]
    SlotConflict(ConflictKey),

    #[error("Appointment {0} not found")]
    NotFound(Uuid),

    #[error("Appointment store error: {0}")]
    Backend(String),
}

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum AvailabilityError {
    #[error("{date} is a {weekday}, which is not an operating day for this agency")]
    NonOperatingDay { date: NaiveDate, weekday: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification rejected: {0}")]
    Rejected(String),

    #[error("Notification transport error: {0}")]
    Transport(String),
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid appointment date/time: {0}")]
    InvalidDateTime(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("The selected slot has already been booked")]
    SlotConflict,

    #[error("Appointment backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for WriteError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SlotConflict(_) => WriteError::SlotConflict,
            StoreError::NotFound(id) => WriteError::NotFound(format!("Appointment {}", id)),
            StoreError::Backend(msg) => WriteError::Backend(msg),
        }
    }
}

impl From<DirectoryError> for WriteError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound(what) => WriteError::NotFound(what),
            DirectoryError::Validation(msg) => WriteError::Validation(msg),
            DirectoryError::Backend(msg) => WriteError::Backend(msg),
        }
    }
}

// ==============================================================================
// HTTP MAPPING
// ==============================================================================

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SlotConflict(_) => AppError::Conflict(err.to_string()),
            StoreError::NotFound(_) => AppError::NotFound(err.to_string()),
            StoreError::Backend(msg) => AppError::Database(msg),
        }
    }
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::NonOperatingDay { .. } => AppError::Unprocessable(err.to_string()),
            AvailabilityError::Store(store) => store.into(),
        }
    }
}

impl From<WriteError> for AppError {
    fn from(err: WriteError) -> Self {
        match err {
            WriteError::Validation(msg) => AppError::ValidationError(msg),
            WriteError::InvalidDateTime(detail) => {
                error!("Rejected appointment with invalid date/time: {}", detail);
                AppError::BadRequest("The appointment could not be saved. Please try again.".to_string())
            }
            WriteError::NotFound(what) => AppError::NotFound(format!("{} not found", what)),
            WriteError::SlotConflict => AppError::Conflict(
                "The selected time slot has just been booked. Please choose another time.".to_string(),
            ),
            WriteError::Backend(msg) => AppError::Database(msg),
        }
    }
}
