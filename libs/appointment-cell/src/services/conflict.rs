use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::models::{AppointmentFilter, StoreError};
use crate::services::slots::SlotKey;
use crate::services::store::AppointmentStore;

/// Point-in-time view of which slots an adviser already has booked on a date.
#[derive(Clone)]
pub struct ConflictChecker {
    store: Arc<dyn AppointmentStore>,
}

impl ConflictChecker {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    pub async fn booked_keys(
        &self,
        adviser_id: Uuid,
        date: NaiveDate,
    ) -> Result<BTreeSet<SlotKey>, StoreError> {
        self.booked_keys_excluding(adviser_id, date, None).await
    }

    /// Booked keys, ignoring `exclude` (the appointment being modified).
    pub async fn booked_keys_excluding(
        &self,
        adviser_id: Uuid,
        date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<BTreeSet<SlotKey>, StoreError> {
        let appointments = self.store
            .query(&AppointmentFilter::for_adviser_on(adviser_id, date))
            .await?;

        let booked: BTreeSet<SlotKey> = appointments
            .iter()
            .filter(|a| a.adviser_id == adviser_id && a.date() == date)
            .filter(|a| Some(a.id) != exclude)
            .map(|a| a.time_slot_key)
            .collect();

        debug!("Adviser {} has {} booked slots on {}", adviser_id, booked.len(), date);
        Ok(booked)
    }

    pub async fn is_slot_taken(
        &self,
        adviser_id: Uuid,
        date: NaiveDate,
        key: SlotKey,
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        Ok(self.booked_keys_excluding(adviser_id, date, exclude).await?.contains(&key))
    }
}
