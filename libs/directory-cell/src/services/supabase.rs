use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{DatabaseError, SupabaseClient};

use crate::models::{Adviser, AdviserFilter, Agency, DirectoryError, NewAdviser, Specialization};
use crate::services::directory::Directory;

/// Directory backed by the `agencies`, `advisers` and `specializations` tables
/// exposed through PostgREST.
pub struct SupabaseDirectory {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseDirectory {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn adviser_query(filter: &AdviserFilter) -> String {
        let mut params = Vec::new();

        if let Some(agency_id) = filter.agency_id {
            params.push(format!("agency_id=eq.{}", agency_id));
        }
        if let Some(specialization_id) = filter.specialization_id {
            // PostgREST array containment: specialization_ids @> {id}
            let contains = format!("cs.{{{}}}", specialization_id);
            params.push(format!("specialization_ids={}", urlencoding::encode(&contains)));
        }
        if filter.active_only {
            params.push("is_active=eq.true".to_string());
        }
        params.push("order=display_name.asc".to_string());

        format!("/rest/v1/advisers?{}", params.join("&"))
    }
}

#[async_trait]
impl Directory for SupabaseDirectory {
    async fn list_agencies(&self) -> Result<Vec<Agency>, DirectoryError> {
        let agencies: Vec<Agency> = self.supabase.request(
            Method::GET,
            "/rest/v1/agencies?order=name.asc",
            None,
        ).await?;

        Ok(agencies)
    }

    async fn get_agency(&self, id: Uuid) -> Result<Option<Agency>, DirectoryError> {
        let path = format!("/rest/v1/agencies?id=eq.{}", id);
        let agencies: Vec<Agency> = self.supabase.request(Method::GET, &path, None).await?;

        Ok(agencies.into_iter().next())
    }

    async fn list_advisers(&self, filter: &AdviserFilter) -> Result<Vec<Adviser>, DirectoryError> {
        let path = Self::adviser_query(filter);
        debug!("Fetching advisers: {}", path);

        let advisers: Vec<Adviser> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(advisers)
    }

    async fn get_adviser(&self, id: Uuid) -> Result<Option<Adviser>, DirectoryError> {
        let path = format!("/rest/v1/advisers?id=eq.{}", id);
        let advisers: Vec<Adviser> = self.supabase.request(Method::GET, &path, None).await?;

        Ok(advisers.into_iter().next())
    }

    async fn list_specializations(&self) -> Result<Vec<Specialization>, DirectoryError> {
        let specializations: Vec<Specialization> = self.supabase.request(
            Method::GET,
            "/rest/v1/specializations?order=label.asc",
            None,
        ).await?;

        Ok(specializations)
    }

    async fn create_adviser(&self, adviser: NewAdviser) -> Result<Adviser, DirectoryError> {
        let body = json!({
            "display_name": adviser.display_name,
            "email": adviser.email,
            "agency_id": adviser.agency_id,
            "specialization_ids": adviser.specialization_ids,
            "working_hours": adviser.working_hours,
            "is_active": true,
        });

        match self.supabase.insert_returning::<Adviser>("/rest/v1/advisers", body).await {
            Ok(created) => Ok(created),
            Err(DatabaseError::Conflict(detail)) => {
                warn!("Adviser email already registered: {}", detail);
                Err(DirectoryError::Validation("Email address already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
