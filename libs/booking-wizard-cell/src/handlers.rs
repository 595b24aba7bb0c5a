use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::AppError;

use crate::models::{StepInput, StepView, WizardFlow, WizardStep};
use crate::router::WizardState;

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub flow: WizardFlow,
}

#[derive(Debug, Default, Deserialize)]
pub struct BackRequest {
    #[serde(default)]
    pub target: Option<WizardStep>,
}

#[derive(Debug, Deserialize)]
pub struct SlotPreviewQuery {
    pub adviser_id: Uuid,
    pub date: NaiveDate,
}

pub async fn start_session(
    State(state): State<WizardState>,
    Json(request): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<StepView>), AppError> {
    let view = state.wizard.start(request.flow).await?;

    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_session(
    State(state): State<WizardState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<StepView>, AppError> {
    let view = state.wizard.render(session_id).await?;

    Ok(Json(view))
}

pub async fn cancel_session(
    State(state): State<WizardState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.wizard.cancel(session_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn submit_step(
    State(state): State<WizardState>,
    Path(session_id): Path<Uuid>,
    Json(input): Json<StepInput>,
) -> Result<Json<StepView>, AppError> {
    let view = state.wizard.submit(session_id, input).await?;

    Ok(Json(view))
}

pub async fn go_back(
    State(state): State<WizardState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<BackRequest>,
) -> Result<Json<StepView>, AppError> {
    let view = state.wizard.back(session_id, request.target).await?;

    Ok(Json(view))
}

pub async fn preview_slots(
    State(state): State<WizardState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<SlotPreviewQuery>,
) -> Result<Json<Value>, AppError> {
    let slots = state.wizard
        .preview_slots(session_id, query.adviser_id, query.date)
        .await?;

    Ok(Json(json!({
        "date": query.date,
        "adviser_id": query.adviser_id,
        "slots": slots,
        "total": slots.len()
    })))
}
