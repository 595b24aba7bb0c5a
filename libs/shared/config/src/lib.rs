use std::env;
use tracing::warn;

/// Agency permissions an admin token may carry. Kept as plain strings here so
/// the config crate does not depend on the access layer.
pub const ALL_ADMIN_PERMISSIONS: [&str; 4] = [
    "view agency",
    "edit agency",
    "delete agency",
    "create agency",
];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub redis_url: Option<String>,
    pub notifier_url: Option<String>,
    pub admin_api_token: String,
    pub admin_permissions: Vec<String>,
    pub session_ttl_seconds: u64,
    pub port: u16,
    pub seed_demo_data: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let supabase_url = env::var("SUPABASE_URL")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_URL not set, using in-memory storage");
                String::new()
            });

        let supabase_service_key = env::var("SUPABASE_SERVICE_KEY")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_SERVICE_KEY not set, using empty value");
                String::new()
            });

        let redis_url = env::var("REDIS_URL").ok().filter(|url| !url.is_empty());
        if redis_url.is_none() {
            warn!("REDIS_URL not set, booking sessions are kept in memory");
        }

        let notifier_url = env::var("NOTIFIER_URL").ok().filter(|url| !url.is_empty());
        if notifier_url.is_none() {
            warn!("NOTIFIER_URL not set, notifications are only logged");
        }

        let admin_api_token = env::var("ADMIN_API_TOKEN")
            .unwrap_or_else(|_| {
                warn!("ADMIN_API_TOKEN not set, admin routes will reject every request");
                String::new()
            });

        let admin_permissions = env::var("ADMIN_PERMISSIONS")
            .map(|raw| parse_permission_list(&raw))
            .unwrap_or_else(|_| ALL_ADMIN_PERMISSIONS.iter().map(|p| p.to_string()).collect());

        let session_ttl_seconds = env::var("SESSION_TTL_SECONDS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(3600);

        let port = env::var("PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_else(|| {
                warn!("PORT not set or invalid, using default 3000");
                3000
            });

        let supabase_configured = !supabase_url.is_empty() && !supabase_service_key.is_empty();
        let seed_demo_data = env::var("SEED_DEMO_DATA")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(!supabase_configured);

        let config = Self {
            supabase_url,
            supabase_service_key,
            redis_url,
            notifier_url,
            admin_api_token,
            admin_permissions,
            session_ttl_seconds,
            port,
            seed_demo_data,
        };

        if !config.is_configured() {
            warn!("Supabase not configured - directory and appointments live in memory");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }

    pub fn is_redis_configured(&self) -> bool {
        self.redis_url.is_some()
    }

    pub fn is_admin_configured(&self) -> bool {
        !self.admin_api_token.is_empty()
    }
}

/// Splits a comma separated permission list ("view agency, edit agency").
fn parse_permission_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_permission_list() {
        let parsed = parse_permission_list(" View Agency,edit agency ,, ");
        assert_eq!(parsed, vec!["view agency".to_string(), "edit agency".to_string()]);
    }

    #[test]
    fn test_is_configured_requires_url_and_key() {
        let mut config = AppConfig {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: String::new(),
            redis_url: None,
            notifier_url: None,
            admin_api_token: String::new(),
            admin_permissions: vec![],
            session_ttl_seconds: 3600,
            port: 3000,
            seed_demo_data: false,
        };
        assert!(!config.is_configured());

        config.supabase_service_key = "service-key".to_string();
        assert!(config.is_configured());
        assert!(!config.is_redis_configured());
        assert!(!config.is_admin_configured());
    }
}
