use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Adviser, AdviserFilter, Agency, DirectoryError, NewAdviser, Specialization};

/// Read access to agencies, advisers and specializations, plus the one admin write
/// the booking system needs (adviser registration).
#[async_trait]
pub trait Directory: Send + Sync {
    async fn list_agencies(&self) -> Result<Vec<Agency>, DirectoryError>;

    async fn get_agency(&self, id: Uuid) -> Result<Option<Agency>, DirectoryError>;

    async fn list_advisers(&self, filter: &AdviserFilter) -> Result<Vec<Adviser>, DirectoryError>;

    async fn get_adviser(&self, id: Uuid) -> Result<Option<Adviser>, DirectoryError>;

    async fn list_specializations(&self) -> Result<Vec<Specialization>, DirectoryError>;

    async fn create_adviser(&self, adviser: NewAdviser) -> Result<Adviser, DirectoryError>;

    /// Advisers a customer may pick after choosing an agency and a specialization.
    /// The backend filter is re-applied locally so an adviser outside the agency
    /// or without the specialization is never offered.
    async fn bookable_advisers(
        &self,
        agency_id: Uuid,
        specialization_id: Uuid,
    ) -> Result<Vec<Adviser>, DirectoryError> {
        let filter = AdviserFilter::bookable(agency_id, specialization_id);
        let mut advisers = self.list_advisers(&filter).await?;
        advisers.retain(|adviser| adviser.matches(&filter));
        Ok(advisers)
    }

    async fn require_agency(&self, id: Uuid) -> Result<Agency, DirectoryError> {
        self.get_agency(id)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(format!("Agency {}", id)))
    }

    async fn require_adviser(&self, id: Uuid) -> Result<Adviser, DirectoryError> {
        self.get_adviser(id)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(format!("Adviser {}", id)))
    }
}

/// Directory kept in process memory; used when no Supabase project is configured
/// and throughout the tests.
#[derive(Default)]
pub struct InMemoryDirectory {
    agencies: RwLock<Vec<Agency>>,
    advisers: RwLock<Vec<Adviser>>,
    specializations: RwLock<Vec<Specialization>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_agency(&self, agency: Agency) {
        let mut agencies = self.agencies.write().await;
        agencies.retain(|a| a.id != agency.id);
        agencies.push(agency);
    }

    pub async fn insert_adviser(&self, adviser: Adviser) {
        let mut advisers = self.advisers.write().await;
        advisers.retain(|a| a.id != adviser.id);
        advisers.push(adviser);
    }

    pub async fn insert_specialization(&self, specialization: Specialization) {
        let mut specializations = self.specializations.write().await;
        specializations.retain(|s| s.id != specialization.id);
        specializations.push(specialization);
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn list_agencies(&self) -> Result<Vec<Agency>, DirectoryError> {
        let mut agencies = self.agencies.read().await.clone();
        agencies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(agencies)
    }

    async fn get_agency(&self, id: Uuid) -> Result<Option<Agency>, DirectoryError> {
        Ok(self.agencies.read().await.iter().find(|a| a.id == id).cloned())
    }

    async fn list_advisers(&self, filter: &AdviserFilter) -> Result<Vec<Adviser>, DirectoryError> {
        debug!("Listing advisers with filter {:?}", filter);

        let mut advisers: Vec<Adviser> = self.advisers.read().await
            .iter()
            .filter(|adviser| adviser.matches(filter))
            .cloned()
            .collect();
        advisers.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(advisers)
    }

    async fn get_adviser(&self, id: Uuid) -> Result<Option<Adviser>, DirectoryError> {
        Ok(self.advisers.read().await.iter().find(|a| a.id == id).cloned())
    }

    async fn list_specializations(&self) -> Result<Vec<Specialization>, DirectoryError> {
        let mut specializations = self.specializations.read().await.clone();
        specializations.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(specializations)
    }

    async fn create_adviser(&self, adviser: NewAdviser) -> Result<Adviser, DirectoryError> {
        let mut advisers = self.advisers.write().await;

        if advisers.iter().any(|a| a.email.eq_ignore_ascii_case(&adviser.email)) {
            return Err(DirectoryError::Validation("Email address already exists".to_string()));
        }

        let created = Adviser {
            id: Uuid::new_v4(),
            display_name: adviser.display_name,
            email: adviser.email,
            agency_id: adviser.agency_id,
            specialization_ids: adviser.specialization_ids,
            working_hours: adviser.working_hours,
            is_active: true,
        };
        advisers.push(created.clone());

        Ok(created)
    }
}
