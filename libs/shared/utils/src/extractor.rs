use std::sync::Arc;

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
    body::Body,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_models::{AppError, Permission, Principal};

/// Admin gate: the bearer token must match `ADMIN_API_TOKEN`. The resulting
/// `Principal` carries the configured permissions; handlers check the specific
/// one they need.
pub async fn admin_middleware(
    State(config): State<Arc<AppConfig>>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    if !config.is_admin_configured() || bearer.token() != config.admin_api_token {
        warn!("Rejected admin request with invalid token");
        return Err(AppError::Auth("Invalid admin token".to_string()));
    }

    let principal = principal_from_config(&config);
    debug!("Admin request authorised with {} permissions", principal.permissions.len());

    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

fn principal_from_config(config: &AppConfig) -> Principal {
    let permissions = config.admin_permissions.iter().filter_map(|raw| {
        let parsed = Permission::parse(raw);
        if parsed.is_none() {
            warn!("Ignoring unknown admin permission: {}", raw);
        }
        parsed
    });

    Principal::new("admin", permissions)
}
