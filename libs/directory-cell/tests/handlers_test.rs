// libs/directory-cell/tests/handlers_test.rs

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Extension, Path, State},
    http::{Request, StatusCode},
    Json,
};
use assert_matches::assert_matches;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use directory_cell::handlers::*;
use directory_cell::{directory_routes, Adviser, Agency, DirectoryState, InMemoryDirectory, Specialization};
use shared_models::{AppError, Permission, Principal};
use shared_utils::test_utils::{response_json, TestConfig};

struct Fixture {
    state: DirectoryState,
    agency: Agency,
    tax: Specialization,
    pensions: Specialization,
}

async fn fixture() -> Fixture {
    let directory = Arc::new(InMemoryDirectory::new());

    let agency = Agency {
        id: Uuid::new_v4(),
        name: "Harbour Street".to_string(),
        address: Some("1 Harbour Street".to_string()),
        phone: None,
        operating_hours_start: Some("09:00".to_string()),
        operating_hours_end: Some("13:00".to_string()),
        operating_days: vec!["monday".to_string(), "wednesday".to_string()],
    };
    let tax = Specialization { id: Uuid::new_v4(), label: "Tax".to_string() };
    let pensions = Specialization { id: Uuid::new_v4(), label: "Pensions".to_string() };

    directory.insert_agency(agency.clone()).await;
    directory.insert_specialization(tax.clone()).await;
    directory.insert_specialization(pensions.clone()).await;

    for (name, specs, active) in [
        ("Brook", vec![tax.id], true),
        ("Adams", vec![tax.id, pensions.id], true),
        ("Carver", vec![tax.id], false),
        ("Dale", vec![pensions.id], true),
    ] {
        directory.insert_adviser(Adviser {
            id: Uuid::new_v4(),
            display_name: name.to_string(),
            email: format!("{}@agency.test", name.to_lowercase()),
            agency_id: agency.id,
            specialization_ids: specs,
            working_hours: vec!["09:00".to_string(), "10:00".to_string()],
            is_active: active,
        }).await;
    }

    Fixture {
        state: DirectoryState {
            config: TestConfig::default().to_arc(),
            directory,
        },
        agency,
        tax,
        pensions,
    }
}

fn admin() -> Extension<Principal> {
    Extension(Principal::new("admin", Permission::ALL))
}

#[tokio::test]
async fn test_list_agencies_returns_total() {
    let fixture = fixture().await;

    let Json(body) = list_agencies(State(fixture.state.clone())).await.unwrap();

    assert_eq!(body["total"], 1);
    assert_eq!(body["agencies"][0]["name"], "Harbour Street");
}

#[tokio::test]
async fn test_get_unknown_agency_is_not_found() {
    let fixture = fixture().await;

    let result = get_agency(State(fixture.state.clone()), Path(Uuid::new_v4())).await;

    assert_matches!(result, Err(AppError::NotFound(_)));
}

#[tokio::test]
async fn test_bookable_advisers_are_active_and_sorted() {
    let fixture = fixture().await;

    let app = directory_routes(fixture.state.clone());
    let uri = format!(
        "/advisers?agency_id={}&specialization_id={}",
        fixture.agency.id, fixture.tax.id
    );
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let names: Vec<&str> = body["advisers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["display_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Adams", "Brook"]);
}

#[tokio::test]
async fn test_specializations_sorted_by_label() {
    let fixture = fixture().await;

    let Json(body) = list_specializations(State(fixture.state.clone())).await.unwrap();

    assert_eq!(body["specializations"][0]["label"], "Pensions");
    assert_eq!(body["specializations"][1]["label"], "Tax");
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let fixture = fixture().await;

    let response = directory_routes(fixture.state.clone())
        .oneshot(Request::builder().uri("/admin/advisers").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_listing_includes_agency_name() {
    let fixture = fixture().await;
    let test_config = TestConfig::default();

    let response = directory_routes(fixture.state.clone())
        .oneshot(
            Request::builder()
                .uri("/admin/advisers")
                .header("Authorization", test_config.admin_bearer())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["advisers"][0]["agency_name"], "Harbour Street");
}

#[tokio::test]
async fn test_register_adviser_within_working_hours() {
    let fixture = fixture().await;

    let request = serde_json::from_value(json!({
        "display_name": "Ellis",
        "email": "ellis@agency.test",
        "agency_id": fixture.agency.id,
        "specialization_ids": [fixture.pensions.id],
        "working_hours": ["11:00", "12:00"]
    })).unwrap();

    let Json(body) = register_adviser(State(fixture.state.clone()), admin(), Json(request))
        .await
        .unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["adviser"]["display_name"], "Ellis");
    assert_eq!(body["adviser"]["is_active"], true);
}

#[tokio::test]
async fn test_register_adviser_accepts_four_digit_hours_and_stores_them_normalized() {
    let fixture = fixture().await;

    let request = serde_json::from_value(json!({
        "display_name": "Ellis",
        "email": "ellis@agency.test",
        "agency_id": fixture.agency.id,
        "specialization_ids": [fixture.tax.id],
        "working_hours": ["1100", " 09:00 ", "11:00"]
    })).unwrap();

    let Json(body) = register_adviser(State(fixture.state.clone()), admin(), Json(request))
        .await
        .unwrap();

    assert_eq!(body["adviser"]["working_hours"], json!(["11:00", "09:00"]));
}

#[tokio::test]
async fn test_register_adviser_rejects_malformed_hour() {
    let fixture = fixture().await;

    let request = serde_json::from_value(json!({
        "display_name": "Ellis",
        "email": "ellis@agency.test",
        "agency_id": fixture.agency.id,
        "specialization_ids": [fixture.tax.id],
        "working_hours": ["eleven"]
    })).unwrap();

    let result = register_adviser(State(fixture.state.clone()), admin(), Json(request)).await;

    assert_matches!(result, Err(AppError::ValidationError(_)));
}

#[tokio::test]
async fn test_register_adviser_rejects_hour_after_closing() {
    let fixture = fixture().await;

    let request = serde_json::from_value(json!({
        "display_name": "Ellis",
        "email": "ellis@agency.test",
        "agency_id": fixture.agency.id,
        "specialization_ids": [fixture.tax.id],
        "working_hours": ["13:00"]
    })).unwrap();

    let result = register_adviser(State(fixture.state.clone()), admin(), Json(request)).await;

    assert_matches!(result, Err(AppError::ValidationError(_)));
}

#[tokio::test]
async fn test_register_adviser_requires_edit_permission() {
    let fixture = fixture().await;

    let request = serde_json::from_value(json!({
        "display_name": "Ellis",
        "email": "ellis@agency.test",
        "agency_id": fixture.agency.id,
        "specialization_ids": [fixture.tax.id]
    })).unwrap();
    let viewer = Extension(Principal::new("viewer", [Permission::ViewAgency]));

    let result = register_adviser(State(fixture.state.clone()), viewer, Json(request)).await;

    assert_matches!(result, Err(AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_working_hour_options_endpoint() {
    let fixture = fixture().await;

    let Json(body) = get_working_hour_options(
        State(fixture.state.clone()),
        admin(),
        Path(fixture.agency.id),
    ).await.unwrap();

    assert_eq!(body["working_hours"], json!(["09:00", "10:00", "11:00", "12:00"]));
}
