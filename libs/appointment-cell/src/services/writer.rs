use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{error, info, warn};
use uuid::Uuid;

use directory_cell::{Adviser, Directory};

use crate::models::{
    appointment_title, Appointment, AppointmentDraft, AppointmentFields, AppointmentStatus,
    DraftTarget, WriteError,
};
use crate::services::conflict::ConflictChecker;
use crate::services::notifier::{NotificationParams, NotificationTemplate, Notifier};
use crate::services::slots::{normalize_time, SlotKey};
use crate::services::store::AppointmentStore;

/// Combines a `YYYY-MM-DD` date with an `HH:MM`/`HHMM` time.
pub fn combine_date_time(date: &str, time: &str) -> Result<NaiveDateTime, WriteError> {
    let normalized = normalize_time(time)
        .map_err(|e| WriteError::InvalidDateTime(format!("time {:?}: {}", time, e)))?;
    let time = NaiveTime::parse_from_str(&normalized, "%H:%M")
        .map_err(|e| WriteError::InvalidDateTime(format!("time {:?}: {}", normalized, e)))?;
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|e| WriteError::InvalidDateTime(format!("date {:?}: {}", date, e)))?;

    Ok(NaiveDateTime::new(date, time))
}

/// Final commit of a booking or modification: re-validates the slot against the
/// store, persists, and notifies on new bookings.
pub struct AppointmentWriter {
    directory: Arc<dyn Directory>,
    store: Arc<dyn AppointmentStore>,
    notifier: Arc<dyn Notifier>,
    checker: ConflictChecker,
}

impl AppointmentWriter {
    pub fn new(
        directory: Arc<dyn Directory>,
        store: Arc<dyn AppointmentStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            checker: ConflictChecker::new(store.clone()),
            directory,
            store,
            notifier,
        }
    }

    pub async fn commit(&self, draft: AppointmentDraft) -> Result<Uuid, WriteError> {
        let customer_name = required(&draft.customer_name, "Customer name")?;
        let customer_email = required(&draft.customer_email, "Customer email")?;
        let customer_phone = required(&draft.customer_phone, "Customer phone")?;

        let appointment_date_time = combine_date_time(&draft.date, &draft.time)?;
        let time_slot_key = SlotKey::from_time(appointment_date_time.time());

        let adviser = self.directory.require_adviser(draft.adviser_id).await?;
        if !adviser.is_active {
            warn!("Rejected booking for inactive adviser {}", adviser.id);
            return Err(WriteError::Validation(format!(
                "{} is not taking appointments",
                adviser.display_name
            )));
        }
        let agency = self.directory.require_agency(draft.agency_id).await?;
        if adviser.agency_id != agency.id {
            return Err(WriteError::Validation(format!(
                "Adviser {} does not work at agency {}",
                adviser.id, agency.id
            )));
        }

        let specialization_known = self.directory.list_specializations().await?
            .iter()
            .any(|s| s.id == draft.specialization_id);
        if !specialization_known {
            return Err(WriteError::NotFound(format!("Specialization {}", draft.specialization_id)));
        }
        if !adviser.offers(draft.specialization_id) {
            return Err(WriteError::Validation(
                "The selected adviser does not offer this specialization".to_string(),
            ));
        }

        let existing_id = match &draft.target {
            DraftTarget::New => None,
            DraftTarget::Existing { appointment_id, lookup_phone } => {
                let existing = self.store
                    .load(*appointment_id)
                    .await?
                    .ok_or_else(|| WriteError::NotFound(format!("Appointment {}", appointment_id)))?;

                if existing.customer_phone.trim() != lookup_phone.trim() {
                    warn!("Phone mismatch when modifying appointment {}", appointment_id);
                    return Err(WriteError::Validation(
                        "The phone number does not match this appointment".to_string(),
                    ));
                }
                Some(existing.id)
            }
        };

        let date = appointment_date_time.date();
        if self.checker.is_slot_taken(adviser.id, date, time_slot_key, existing_id).await? {
            warn!(
                "Slot {} on {} for adviser {} was booked since availability was shown",
                time_slot_key, date, adviser.id
            );
            return Err(WriteError::SlotConflict);
        }

        let fields = AppointmentFields {
            agency_id: agency.id,
            specialization_id: draft.specialization_id,
            adviser_id: adviser.id,
            appointment_date_time,
            time_slot_key,
            title: appointment_title(&customer_name),
            customer_name,
            customer_email,
            customer_phone,
            notes: draft.notes.filter(|n| !n.trim().is_empty()),
            status: AppointmentStatus::Confirmed,
        };

        match existing_id {
            None => {
                let appointment = self.store.create(fields).await?;
                info!(
                    "Booked appointment {} with adviser {} at {}",
                    appointment.id, appointment.adviser_id, appointment.appointment_date_time
                );
                self.notify_new_booking(&appointment, &adviser).await;
                Ok(appointment.id)
            }
            Some(id) => {
                let appointment = self.store.update(id, fields).await?;
                info!(
                    "Modified appointment {}, now at {}",
                    appointment.id, appointment.appointment_date_time
                );
                Ok(appointment.id)
            }
        }
    }

    /// Notification failures never undo the booking; they are logged for an operator.
    async fn notify_new_booking(&self, appointment: &Appointment, adviser: &Adviser) {
        let to_adviser = self.notifier.send(
            NotificationTemplate::AdviserNewAppointment,
            adviser.email.clone(),
            NotificationParams::for_appointment(appointment, NotificationTemplate::AdviserNewAppointment),
        );
        let to_customer = self.notifier.send(
            NotificationTemplate::CustomerNewAppointment,
            appointment.customer_email.clone(),
            NotificationParams::for_appointment(appointment, NotificationTemplate::CustomerNewAppointment),
        );

        let (adviser_result, customer_result) = futures::join!(to_adviser, to_customer);

        if let Err(e) = adviser_result {
            error!("Failed to notify adviser {} about appointment {}: {}", adviser.id, appointment.id, e);
        }
        if let Err(e) = customer_result {
            error!("Failed to notify customer about appointment {}: {}", appointment.id, e);
        }
    }
}

fn required(value: &str, field: &str) -> Result<String, WriteError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WriteError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use mockall::mock;

    use directory_cell::{Agency, InMemoryDirectory, Specialization};

    use crate::models::NotifyError;
    use crate::services::store::InMemoryAppointmentStore;

    mock! {
        pub TestNotifier {}

        #[async_trait]
        impl Notifier for TestNotifier {
            async fn send(
                &self,
                template: NotificationTemplate,
                recipient: String,
                params: NotificationParams,
            ) -> Result<(), NotifyError>;
        }
    }

    struct Setup {
        directory: Arc<InMemoryDirectory>,
        store: Arc<InMemoryAppointmentStore>,
        agency: Agency,
        adviser: Adviser,
        specialization: Specialization,
    }

    async fn setup() -> Setup {
        let directory = Arc::new(InMemoryDirectory::new());
        let specialization = Specialization { id: Uuid::new_v4(), label: "Mortgages".to_string() };
        let agency = Agency {
            id: Uuid::new_v4(),
            name: "North".to_string(),
            address: None,
            phone: None,
            operating_hours_start: Some("09:00".to_string()),
            operating_hours_end: Some("17:00".to_string()),
            operating_days: vec!["monday".to_string()],
        };
        let adviser = Adviser {
            id: Uuid::new_v4(),
            display_name: "Morgan".to_string(),
            email: "morgan@north.test".to_string(),
            agency_id: agency.id,
            specialization_ids: vec![specialization.id],
            working_hours: vec!["0900".to_string(), "1000".to_string()],
            is_active: true,
        };
        directory.insert_agency(agency.clone()).await;
        directory.insert_adviser(adviser.clone()).await;
        directory.insert_specialization(specialization.clone()).await;

        Setup {
            directory,
            store: Arc::new(InMemoryAppointmentStore::new()),
            agency,
            adviser,
            specialization,
        }
    }

    fn draft(setup: &Setup, time: &str) -> AppointmentDraft {
        AppointmentDraft {
            target: DraftTarget::New,
            agency_id: setup.agency.id,
            specialization_id: setup.specialization.id,
            adviser_id: setup.adviser.id,
            date: "2024-05-06".to_string(),
            time: time.to_string(),
            customer_name: "Sam Lee".to_string(),
            customer_email: "sam@example.com".to_string(),
            customer_phone: "5551234".to_string(),
            notes: None,
        }
    }

    fn writer(setup: &Setup, notifier: MockTestNotifier) -> AppointmentWriter {
        AppointmentWriter::new(setup.directory.clone(), setup.store.clone(), Arc::new(notifier))
    }

    #[test]
    fn test_combine_date_time_normalizes_time() {
        let combined = combine_date_time("2024-05-06", "0930").unwrap();
        assert_eq!(combined.to_string(), "2024-05-06 09:30:00");
    }

    #[test]
    fn test_combine_date_time_rejects_garbage() {
        assert_matches!(combine_date_time("2024-13-01", "09:00"), Err(WriteError::InvalidDateTime(_)));
        assert_matches!(combine_date_time("2024-05-06", "9am"), Err(WriteError::InvalidDateTime(_)));
    }

    #[tokio::test]
    async fn test_new_booking_notifies_adviser_and_customer() {
        let setup = setup().await;
        let adviser_email = setup.adviser.email.clone();

        let mut notifier = MockTestNotifier::new();
        notifier
            .expect_send()
            .withf(move |template, recipient, params| {
                *template == NotificationTemplate::AdviserNewAppointment
                    && *recipient == adviser_email
                    && params.subject == "New Appointment Booked"
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        notifier
            .expect_send()
            .withf(|template, recipient, params| {
                *template == NotificationTemplate::CustomerNewAppointment
                    && recipient == "sam@example.com"
                    && params.time_slot_key == "0900"
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let id = writer(&setup, notifier).commit(draft(&setup, "09:00")).await.unwrap();

        let stored = setup.store.load(id).await.unwrap().unwrap();
        assert_eq!(stored.status, AppointmentStatus::Confirmed);
        assert_eq!(stored.time_slot_key.as_key(), "0900");
        assert_eq!(stored.title, "Appointment for Sam Lee");
    }

    #[tokio::test]
    async fn test_notification_failure_keeps_booking() {
        let setup = setup().await;

        let mut notifier = MockTestNotifier::new();
        notifier
            .expect_send()
            .times(2)
            .returning(|_, _, _| Err(NotifyError::Transport("connection refused".to_string())));

        let id = writer(&setup, notifier).commit(draft(&setup, "1000")).await.unwrap();

        assert!(setup.store.load(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_second_commit_of_same_slot_conflicts() {
        let setup = setup().await;

        let mut notifier = MockTestNotifier::new();
        notifier.expect_send().times(2).returning(|_, _, _| Ok(()));
        let writer = writer(&setup, notifier);

        writer.commit(draft(&setup, "09:00")).await.unwrap();
        let second = writer.commit(draft(&setup, "0900")).await;

        assert_matches!(second, Err(WriteError::SlotConflict));
    }

    #[tokio::test]
    async fn test_modification_updates_in_place_without_notifying() {
        let setup = setup().await;

        let mut booking_notifier = MockTestNotifier::new();
        booking_notifier.expect_send().times(2).returning(|_, _, _| Ok(()));
        let id = writer(&setup, booking_notifier).commit(draft(&setup, "09:00")).await.unwrap();

        let mut notifier = MockTestNotifier::new();
        notifier.expect_send().times(0);

        let mut change = draft(&setup, "10:00");
        change.target = DraftTarget::Existing { appointment_id: id, lookup_phone: "5551234".to_string() };
        let updated_id = writer(&setup, notifier).commit(change).await.unwrap();

        assert_eq!(updated_id, id);
        let stored = setup.store.load(id).await.unwrap().unwrap();
        assert_eq!(stored.time_slot_key.as_key(), "1000");
    }

    #[tokio::test]
    async fn test_modification_may_keep_its_own_slot() {
        let setup = setup().await;

        let mut booking_notifier = MockTestNotifier::new();
        booking_notifier.expect_send().times(2).returning(|_, _, _| Ok(()));
        let id = writer(&setup, booking_notifier).commit(draft(&setup, "09:00")).await.unwrap();

        let mut change = draft(&setup, "09:00");
        change.notes = Some("Bring payslips".to_string());
        change.target = DraftTarget::Existing { appointment_id: id, lookup_phone: "5551234".to_string() };

        let result = writer(&setup, MockTestNotifier::new()).commit(change).await;

        assert_matches!(result, Ok(updated) if updated == id);
    }

    #[tokio::test]
    async fn test_modification_rejects_mismatched_phone() {
        let setup = setup().await;

        let mut booking_notifier = MockTestNotifier::new();
        booking_notifier.expect_send().times(2).returning(|_, _, _| Ok(()));
        let id = writer(&setup, booking_notifier).commit(draft(&setup, "09:00")).await.unwrap();

        let mut change = draft(&setup, "10:00");
        change.target = DraftTarget::Existing { appointment_id: id, lookup_phone: "5559999".to_string() };

        let result = writer(&setup, MockTestNotifier::new()).commit(change).await;

        assert_matches!(result, Err(WriteError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_adviser_is_not_found() {
        let setup = setup().await;

        let mut missing = draft(&setup, "09:00");
        missing.adviser_id = Uuid::new_v4();

        let result = writer(&setup, MockTestNotifier::new()).commit(missing).await;

        assert_matches!(result, Err(WriteError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_inactive_adviser_is_rejected() {
        let setup = setup().await;
        let mut retired = setup.adviser.clone();
        retired.is_active = false;
        setup.directory.insert_adviser(retired).await;

        let result = writer(&setup, MockTestNotifier::new()).commit(draft(&setup, "09:00")).await;

        assert_matches!(result, Err(WriteError::Validation(_)));
        assert!(setup.store.query(&Default::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_time_fails_before_any_write() {
        let setup = setup().await;

        let result = writer(&setup, MockTestNotifier::new())
            .commit(draft(&setup, "quarter past nine"))
            .await;

        assert_matches!(result, Err(WriteError::InvalidDateTime(_)));
        let all = setup.store.query(&Default::default()).await.unwrap();
        assert!(all.is_empty());
    }
}
