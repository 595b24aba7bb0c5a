use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{DatabaseError, SupabaseClient};

use crate::models::{Appointment, AppointmentFields, AppointmentFilter, StoreError};
use crate::services::store::AppointmentStore;

const APPOINTMENTS_PATH: &str = "/rest/v1/appointments";

/// Appointment store over the PostgREST `appointments` table. Uniqueness of
/// `(adviser_id, appointment_day, time_slot_key)` is enforced by the database;
/// a violation comes back as HTTP 409.
pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn query_path(filter: &AppointmentFilter) -> String {
        let mut params = vec!["select=*".to_string()];

        if let Some(adviser_id) = filter.adviser_id {
            params.push(format!("adviser_id=eq.{}", adviser_id));
        }
        if let Some(phone) = &filter.customer_phone {
            params.push(format!("customer_phone=eq.{}", urlencoding::encode(phone)));
        }
        if let Some(range) = &filter.date_range {
            // Open-ended admin ranges use the NaiveDate extremes; those bounds are left off.
            if range.from != NaiveDate::MIN {
                params.push(format!("appointment_date_time=gte.{}T00:00:00", range.from.format("%Y-%m-%d")));
            }
            if let Some(end) = range.to.checked_add_signed(Duration::days(1)) {
                params.push(format!("appointment_date_time=lt.{}T00:00:00", end.format("%Y-%m-%d")));
            }
        }
        params.push("order=appointment_date_time.asc".to_string());

        format!("{}?{}", APPOINTMENTS_PATH, params.join("&"))
    }

    fn body(fields: &AppointmentFields) -> Result<Value, StoreError> {
        serde_json::to_value(fields)
            .map_err(|e| StoreError::Backend(format!("Failed to encode appointment: {}", e)))
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn query(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, StoreError> {
        let path = Self::query_path(filter);
        debug!("Querying appointments: {}", path);

        let appointments: Vec<Appointment> = self.supabase.request(Method::GET, &path, None).await?;

        // The date filter above works on the timestamp; re-check the date portion here.
        Ok(appointments.into_iter().filter(|a| filter.matches(a)).collect())
    }

    async fn create(&self, fields: AppointmentFields) -> Result<Appointment, StoreError> {
        let body = Self::body(&fields)?;

        match self.supabase.insert_returning::<Appointment>(APPOINTMENTS_PATH, body).await {
            Ok(appointment) => Ok(appointment),
            Err(DatabaseError::Conflict(detail)) => {
                warn!("Unique slot constraint rejected insert: {}", detail);
                Err(StoreError::SlotConflict(fields.conflict_key()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, id: Uuid, fields: AppointmentFields) -> Result<Appointment, StoreError> {
        let body = Self::body(&fields)?;
        let path = format!("{}?id=eq.{}", APPOINTMENTS_PATH, id);

        match self.supabase.update_returning::<Appointment>(&path, body).await {
            Ok(Some(appointment)) => Ok(appointment),
            Ok(None) => Err(StoreError::NotFound(id)),
            Err(DatabaseError::Conflict(detail)) => {
                warn!("Unique slot constraint rejected update of {}: {}", id, detail);
                Err(StoreError::SlotConflict(fields.conflict_key()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn load(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        let path = format!("{}?id=eq.{}", APPOINTMENTS_PATH, id);
        let appointments: Vec<Appointment> = self.supabase.request(Method::GET, &path, None).await?;

        Ok(appointments.into_iter().next())
    }
}
