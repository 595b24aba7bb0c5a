use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use directory_cell::{Adviser, Agency};

use crate::models::{AvailabilityError, BookableSlot};
use crate::services::conflict::ConflictChecker;
use crate::services::operating_days::{is_operating_day, weekday_name};
use crate::services::slots::resolve_template;
use crate::services::store::AppointmentStore;

/// Bookable slots for an adviser on a date: the adviser's working-hour template
/// minus the slots already booked. Always computed from the store, never cached.
#[derive(Clone)]
pub struct AvailabilityEngine {
    checker: ConflictChecker,
}

impl AvailabilityEngine {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self {
            checker: ConflictChecker::new(store),
        }
    }

    pub fn checker(&self) -> &ConflictChecker {
        &self.checker
    }

    pub async fn compute_available_slots(
        &self,
        agency: &Agency,
        adviser: &Adviser,
        date: NaiveDate,
    ) -> Result<Vec<BookableSlot>, AvailabilityError> {
        self.compute_available_slots_excluding(agency, adviser, date, None).await
    }

    /// As [`compute_available_slots`](Self::compute_available_slots), but the slot
    /// held by `exclude` counts as free. Used when modifying that appointment.
    pub async fn compute_available_slots_excluding(
        &self,
        agency: &Agency,
        adviser: &Adviser,
        date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<Vec<BookableSlot>, AvailabilityError> {
        if !is_operating_day(agency, date) {
            let weekday = weekday_name(date).to_string();
            warn!("{} ({}) is not an operating day for agency {}", date, weekday, agency.id);
            return Err(AvailabilityError::NonOperatingDay { date, weekday });
        }

        let template = resolve_template(&adviser.working_hours);
        if template.is_empty() {
            debug!("Adviser {} has no working hours", adviser.id);
            return Ok(vec![]);
        }

        let booked = self.checker
            .booked_keys_excluding(adviser.id, date, exclude)
            .await?;

        let available: Vec<BookableSlot> = template
            .into_iter()
            .filter(|key| !booked.contains(key))
            .map(BookableSlot::from)
            .collect();

        debug!(
            "Adviser {} on {}: {} slots available, {} booked",
            adviser.id, date, available.len(), booked.len()
        );
        Ok(available)
    }
}
