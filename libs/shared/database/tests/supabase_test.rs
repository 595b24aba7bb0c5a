use assert_matches::assert_matches;
use reqwest::Method;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::AppConfig;
use shared_database::{DatabaseError, SupabaseClient};

fn config_for(server: &MockServer) -> AppConfig {
    AppConfig {
        supabase_url: server.uri(),
        supabase_service_key: "service-key".to_string(),
        redis_url: None,
        notifier_url: None,
        admin_api_token: String::new(),
        admin_permissions: vec![],
        session_ttl_seconds: 3600,
        port: 3000,
        seed_demo_data: false,
    }
}

#[tokio::test]
async fn test_request_sends_service_key_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/agencies"))
        .and(query_param("id", "eq.1"))
        .and(header("apikey", "service-key"))
        .and(header("authorization", "Bearer service-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
        .mount(&server)
        .await;

    let client = SupabaseClient::new(&config_for(&server));
    let rows: Vec<Value> = client
        .request(Method::GET, "/rest/v1/agencies?id=eq.1", None)
        .await
        .expect("request should succeed");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], 1);
}

#[tokio::test]
async fn test_unique_violation_maps_to_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(header("prefer", "return=representation"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint"
        })))
        .mount(&server)
        .await;

    let client = SupabaseClient::new(&config_for(&server));
    let result: Result<Value, DatabaseError> = client
        .insert_returning("/rest/v1/appointments", json!({ "adviser_id": "x" }))
        .await;

    assert_matches!(result, Err(DatabaseError::Conflict(_)));
}

#[tokio::test]
async fn test_status_codes_map_to_error_variants() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/forbidden"))
        .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = SupabaseClient::new(&config_for(&server));

    let forbidden: Result<Vec<Value>, _> = client.request(Method::GET, "/rest/v1/forbidden", None).await;
    assert_matches!(forbidden, Err(DatabaseError::Auth(_)));

    let broken: Result<Vec<Value>, _> = client.request(Method::GET, "/rest/v1/broken", None).await;
    assert_matches!(broken, Err(DatabaseError::Api { status: 500, .. }));
}

#[tokio::test]
async fn test_update_returning_none_when_nothing_matched() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = SupabaseClient::new(&config_for(&server));
    let updated: Option<Value> = client
        .update_returning("/rest/v1/appointments?id=eq.missing", json!({ "notes": "x" }))
        .await
        .expect("patch should succeed");

    assert!(updated.is_none());
}
