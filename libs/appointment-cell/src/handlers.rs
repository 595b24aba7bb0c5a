// libs/appointment-cell/src/handlers.rs
use axum::{
    extract::{Extension, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::{AppError, Permission, Principal};

use crate::models::{AppointmentFilter, DateRange};
use crate::router::AppointmentState;
use crate::services::{weekday_name, AvailabilityEngine};

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub agency_id: Uuid,
    pub adviser_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct AdminAppointmentQuery {
    pub adviser_id: Option<Uuid>,
    pub customer_phone: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl AdminAppointmentQuery {
    fn into_filter(self) -> Result<AppointmentFilter, AppError> {
        let date_range = match (self.from, self.to) {
            (None, None) => None,
            (Some(from), None) => Some(DateRange { from, to: NaiveDate::MAX }),
            (None, Some(to)) => Some(DateRange { from: NaiveDate::MIN, to }),
            (Some(from), Some(to)) if from > to => {
                return Err(AppError::BadRequest("'from' must not be after 'to'".to_string()));
            }
            (Some(from), Some(to)) => Some(DateRange { from, to }),
        };

        Ok(AppointmentFilter {
            adviser_id: self.adviser_id,
            customer_phone: self.customer_phone.filter(|p| !p.trim().is_empty()),
            date_range,
        })
    }
}

// ==============================================================================
// PUBLIC HANDLERS
// ==============================================================================

/// Bookable slots for an adviser on a date, recomputed on every request.
pub async fn get_availability(
    State(state): State<AppointmentState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let agency = state.directory.require_agency(query.agency_id).await?;
    let adviser = state.directory.require_adviser(query.adviser_id).await?;

    if adviser.agency_id != agency.id {
        return Err(AppError::ValidationError(format!(
            "Adviser {} does not work at agency {}",
            adviser.id, agency.id
        )));
    }

    let engine = AvailabilityEngine::new(state.store.clone());
    let slots = engine.compute_available_slots(&agency, &adviser, query.date).await?;

    Ok(Json(json!({
        "date": query.date,
        "weekday": weekday_name(query.date),
        "adviser_id": adviser.id,
        "slots": slots,
        "total": slots.len()
    })))
}

// ==============================================================================
// ADMIN HANDLERS
// ==============================================================================

pub async fn query_appointments(
    State(state): State<AppointmentState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<AdminAppointmentQuery>,
) -> Result<Json<Value>, AppError> {
    principal.require(Permission::ViewAgency)?;

    let filter = query.into_filter()?;
    let appointments = state.store.query(&filter).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}
