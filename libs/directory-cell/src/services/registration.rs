use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{Adviser, AdviserFilter, AdviserListing, DirectoryError, NewAdviser};
use crate::services::clock::normalize_clock_time;
use crate::services::directory::Directory;
use crate::services::working_hours::working_hour_options;

/// Administrative operations on advisers: registration and the admin listing.
pub struct AdviserAdminService {
    directory: Arc<dyn Directory>,
}

impl AdviserAdminService {
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    pub async fn register(&self, mut request: NewAdviser) -> Result<Adviser, DirectoryError> {
        request.display_name = request.display_name.trim().to_string();
        request.email = request.email.trim().to_string();

        if request.display_name.is_empty() {
            return Err(DirectoryError::Validation("Adviser name is required".to_string()));
        }
        if request.email.is_empty() {
            return Err(DirectoryError::Validation("Adviser email is required".to_string()));
        }
        if request.specialization_ids.is_empty() {
            return Err(DirectoryError::Validation(
                "At least one specialization must be selected".to_string(),
            ));
        }

        let agency = self.directory.require_agency(request.agency_id).await?;

        let known: Vec<Uuid> = self.directory.list_specializations().await?
            .into_iter()
            .map(|s| s.id)
            .collect();
        if let Some(unknown) = request.specialization_ids.iter().find(|id| !known.contains(id)) {
            return Err(DirectoryError::Validation(format!("Unknown specialization {}", unknown)));
        }

        let options = working_hour_options(&agency);
        let mut working_hours = Vec::with_capacity(request.working_hours.len());
        for hour in &request.working_hours {
            let normalized = normalize_clock_time(hour).ok_or_else(|| {
                DirectoryError::Validation(format!("Working hour {} is not a valid time", hour.trim()))
            })?;
            if !options.contains(&normalized) {
                warn!("Rejected working hour {} for agency {}", hour, agency.id);
                return Err(DirectoryError::Validation(format!(
                    "Working hour {} is outside the operating hours of {}",
                    hour.trim(), agency.name
                )));
            }
            if !working_hours.contains(&normalized) {
                working_hours.push(normalized);
            }
        }
        request.working_hours = working_hours;

        let created = self.directory.create_adviser(request).await?;
        info!("Registered adviser {} at agency {}", created.id, created.agency_id);

        Ok(created)
    }

    /// Active advisers with the name of their agency, or "N/A" when the agency is unknown.
    pub async fn list_advisers_for_admin(&self) -> Result<Vec<AdviserListing>, DirectoryError> {
        let agency_names: HashMap<Uuid, String> = self.directory.list_agencies().await?
            .into_iter()
            .map(|agency| (agency.id, agency.name))
            .collect();

        let filter = AdviserFilter { active_only: true, ..Default::default() };
        let advisers = self.directory.list_advisers(&filter).await?;
        debug!("Admin listing covers {} advisers", advisers.len());

        Ok(advisers.into_iter()
            .map(|adviser| AdviserListing {
                agency_name: agency_names
                    .get(&adviser.agency_id)
                    .cloned()
                    .unwrap_or_else(|| "N/A".to_string()),
                id: adviser.id,
                display_name: adviser.display_name,
                email: adviser.email,
            })
            .collect())
    }
}
