use std::sync::Arc;

use shared_config::{AppConfig, ALL_ADMIN_PERMISSIONS};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub admin_api_token: String,
    pub admin_permissions: Vec<String>,
    pub notifier_url: Option<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
            admin_api_token: "test-admin-token".to_string(),
            admin_permissions: ALL_ADMIN_PERMISSIONS.iter().map(|p| p.to_string()).collect(),
            notifier_url: None,
        }
    }
}

impl TestConfig {
    /// Points the Supabase client at a mock server (e.g. `MockServer::uri()`).
    pub fn with_supabase_url(url: impl Into<String>) -> Self {
        Self {
            supabase_url: url.into(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            redis_url: None,
            notifier_url: self.notifier_url.clone(),
            admin_api_token: self.admin_api_token.clone(),
            admin_permissions: self.admin_permissions.clone(),
            session_ttl_seconds: 3600,
            port: 3000,
            seed_demo_data: false,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }

    pub fn admin_bearer(&self) -> String {
        format!("Bearer {}", self.admin_api_token)
    }
}

/// Reads an axum response body as JSON.
pub async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}
