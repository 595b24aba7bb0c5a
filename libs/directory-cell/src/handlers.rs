use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::{AppError, Permission, Principal};

use crate::models::{AdviserFilter, NewAdviser};
use crate::router::DirectoryState;
use crate::services::{working_hour_options, AdviserAdminService};

#[derive(Debug, Deserialize)]
pub struct AdviserQuery {
    pub agency_id: Option<Uuid>,
    pub specialization_id: Option<Uuid>,
}

// ==============================================================================
// PUBLIC HANDLERS
// ==============================================================================

pub async fn list_agencies(
    State(state): State<DirectoryState>,
) -> Result<Json<Value>, AppError> {
    let agencies = state.directory.list_agencies().await?;

    Ok(Json(json!({
        "agencies": agencies,
        "total": agencies.len()
    })))
}

pub async fn get_agency(
    State(state): State<DirectoryState>,
    Path(agency_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let agency = state.directory.require_agency(agency_id).await?;

    Ok(Json(json!(agency)))
}

pub async fn list_specializations(
    State(state): State<DirectoryState>,
) -> Result<Json<Value>, AppError> {
    let specializations = state.directory.list_specializations().await?;

    Ok(Json(json!({
        "specializations": specializations,
        "total": specializations.len()
    })))
}

/// Active advisers; with both ids present this is exactly the booking flow's adviser list.
pub async fn list_advisers(
    State(state): State<DirectoryState>,
    Query(query): Query<AdviserQuery>,
) -> Result<Json<Value>, AppError> {
    let advisers = match (query.agency_id, query.specialization_id) {
        (Some(agency_id), Some(specialization_id)) => {
            state.directory.bookable_advisers(agency_id, specialization_id).await?
        }
        (agency_id, specialization_id) => {
            let filter = AdviserFilter { agency_id, specialization_id, active_only: true };
            state.directory.list_advisers(&filter).await?
        }
    };

    Ok(Json(json!({
        "advisers": advisers,
        "total": advisers.len()
    })))
}

// ==============================================================================
// ADMIN HANDLERS
// ==============================================================================

pub async fn list_advisers_for_admin(
    State(state): State<DirectoryState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, AppError> {
    principal.require(Permission::ViewAgency)?;

    let service = AdviserAdminService::new(state.directory.clone());
    let advisers = service.list_advisers_for_admin().await?;

    Ok(Json(json!({
        "advisers": advisers,
        "total": advisers.len()
    })))
}

pub async fn register_adviser(
    State(state): State<DirectoryState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<NewAdviser>,
) -> Result<Json<Value>, AppError> {
    principal.require(Permission::EditAgency)?;

    let service = AdviserAdminService::new(state.directory.clone());
    let adviser = service.register(request).await?;

    Ok(Json(json!({
        "success": true,
        "adviser": adviser
    })))
}

pub async fn get_working_hour_options(
    State(state): State<DirectoryState>,
    Extension(principal): Extension<Principal>,
    Path(agency_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    principal.require(Permission::ViewAgency)?;

    let agency = state.directory.require_agency(agency_id).await?;
    let options = working_hour_options(&agency);

    Ok(Json(json!({
        "agency_id": agency.id,
        "working_hours": options
    })))
}
