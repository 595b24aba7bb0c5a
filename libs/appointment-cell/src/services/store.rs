use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Appointment, AppointmentFields, AppointmentFilter, ConflictKey, StoreError};

/// Persistence for appointments. Implementations must reject a `create` or
/// `update` that would give two appointments the same [`ConflictKey`] with
/// [`StoreError::SlotConflict`]; the application-level re-check alone cannot
/// prevent double bookings under concurrency.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Matching appointments, ordered by date-time.
    async fn query(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, StoreError>;

    async fn create(&self, fields: AppointmentFields) -> Result<Appointment, StoreError>;

    async fn update(&self, id: Uuid, fields: AppointmentFields) -> Result<Appointment, StoreError>;

    async fn load(&self, id: Uuid) -> Result<Option<Appointment>, StoreError>;
}

#[derive(Default)]
struct StoreState {
    records: HashMap<Uuid, Appointment>,
    slots: HashMap<ConflictKey, Uuid>,
}

/// Appointment store held in process memory. One write lock covers both the
/// records and the unique slot index, so check and insert are a single step.
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    state: RwLock<StoreState>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn query(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, StoreError> {
        let state = self.state.read().await;

        let mut appointments: Vec<Appointment> = state.records
            .values()
            .filter(|appointment| filter.matches(appointment))
            .cloned()
            .collect();
        appointments.sort_by_key(|a| (a.appointment_date_time, a.id));

        debug!("Appointment query matched {} records", appointments.len());
        Ok(appointments)
    }

    async fn create(&self, fields: AppointmentFields) -> Result<Appointment, StoreError> {
        let mut state = self.state.write().await;

        let key = fields.conflict_key();
        if state.slots.contains_key(&key) {
            warn!("Rejected create: slot taken for {}", key);
            return Err(StoreError::SlotConflict(key));
        }

        let appointment = fields.into_appointment(Uuid::new_v4());
        state.slots.insert(key, appointment.id);
        state.records.insert(appointment.id, appointment.clone());

        Ok(appointment)
    }

    async fn update(&self, id: Uuid, fields: AppointmentFields) -> Result<Appointment, StoreError> {
        let mut state = self.state.write().await;

        let previous_key = state.records
            .get(&id)
            .map(Appointment::conflict_key)
            .ok_or(StoreError::NotFound(id))?;

        let key = fields.conflict_key();
        if let Some(holder) = state.slots.get(&key) {
            if *holder != id {
                warn!("Rejected update of {}: slot taken for {}", id, key);
                return Err(StoreError::SlotConflict(key));
            }
        }

        let appointment = fields.into_appointment(id);
        state.slots.remove(&previous_key);
        state.slots.insert(key, id);
        state.records.insert(id, appointment.clone());

        Ok(appointment)
    }

    async fn load(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        Ok(self.state.read().await.records.get(&id).cloned())
    }
}
