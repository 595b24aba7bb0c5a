use std::sync::Arc;

use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use appointment_cell::{
    resolve_template, AppointmentDraft, AppointmentFilter, AppointmentStore, AppointmentWriter,
    AvailabilityEngine, AvailabilityError, BookableSlot, DraftTarget, Notifier, SlotKey, WriteError,
};
use directory_cell::{Adviser, Directory};

use crate::error::WizardError;
use crate::models::{
    AppointmentChoice, BookingSession, StepInput, StepOptions, StepView, WizardFlow, WizardStep,
};
use crate::services::machine;
use crate::services::session_store::SessionStore;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";
const PHONE_PATTERN: &str = r"^\+?[1-9]\d{1,14}$|^\+?\d{1,4}[\s\-\.\(\)]*\d{1,14}$";

struct ContactValidator {
    email: Regex,
    phone: Regex,
}

impl ContactValidator {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            email: Regex::new(EMAIL_PATTERN)?,
            phone: Regex::new(PHONE_PATTERN)?,
        })
    }

    fn valid_email(&self, email: &str) -> bool {
        email.len() <= 254 && self.email.is_match(email)
    }

    fn valid_phone(&self, phone: &str) -> bool {
        self.phone.is_match(phone)
    }
}

/// Drives booking and modification sessions through their steps. Each call
/// loads the session from the session store and writes it back before
/// returning; nothing is kept between calls.
pub struct WizardService {
    directory: Arc<dyn Directory>,
    store: Arc<dyn AppointmentStore>,
    sessions: Arc<dyn SessionStore>,
    engine: AvailabilityEngine,
    writer: AppointmentWriter,
    contact: ContactValidator,
}

impl WizardService {
    pub fn new(
        directory: Arc<dyn Directory>,
        store: Arc<dyn AppointmentStore>,
        notifier: Arc<dyn Notifier>,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self, WizardError> {
        let contact = ContactValidator::new()
            .map_err(|e| WizardError::Backend(format!("Invalid contact pattern: {}", e)))?;

        Ok(Self {
            engine: AvailabilityEngine::new(store.clone()),
            writer: AppointmentWriter::new(directory.clone(), store.clone(), notifier),
            directory,
            store,
            sessions,
            contact,
        })
    }

    pub async fn start(&self, flow: WizardFlow) -> Result<StepView, WizardError> {
        let session = BookingSession::new(flow, machine::first_step(flow));
        self.sessions.save(&session).await?;

        info!("Started {:?} session {} at {}", flow, session.id, session.step);
        self.view(session).await
    }

    /// Current step with its options. Read-only.
    pub async fn render(&self, id: Uuid) -> Result<StepView, WizardError> {
        let session = self.load(id).await?;
        self.view(session).await
    }

    pub async fn submit(&self, id: Uuid, input: StepInput) -> Result<StepView, WizardError> {
        let mut session = self.load(id).await?;

        if session.is_committed() {
            return Err(WizardError::SessionCommitted);
        }
        if input.step() != session.step {
            return Err(WizardError::WrongStep { expected: session.step, got: input.step() });
        }

        match input {
            StepInput::Phone { phone } => self.submit_phone(&mut session, &phone).await?,
            StepInput::SelectAppointment { appointment_id } => {
                self.submit_selection(&mut session, appointment_id).await?
            }
            StepInput::Agency { agency_id } => self.submit_agency(&mut session, agency_id).await?,
            StepInput::Specialization { specialization_id } => {
                self.submit_specialization(&mut session, specialization_id).await?
            }
            StepInput::AdviserDateTime { adviser_id, date, time } => {
                self.submit_adviser_date_time(&mut session, adviser_id, &date, &time).await?
            }
            StepInput::ContactInfo { name, email, phone, notes } => {
                return self.submit_contact(session, &name, &email, &phone, notes).await;
            }
        }

        self.advance(&mut session)?;
        self.sessions.save(&session).await?;
        self.view(session).await
    }

    /// Moves back one step, or to `target` when given. Collected values are kept.
    pub async fn back(&self, id: Uuid, target: Option<WizardStep>) -> Result<StepView, WizardError> {
        let mut session = self.load(id).await?;

        if session.is_committed() {
            return Err(WizardError::SessionCommitted);
        }

        let target = match target {
            Some(step) => step,
            None => machine::previous_step(session.flow, session.step)
                .ok_or_else(|| WizardError::Validation("Already at the first step".to_string()))?,
        };
        if !machine::can_go_back_to(session.flow, session.step, target) {
            return Err(WizardError::Validation(format!(
                "Cannot go back from {} to {}",
                session.step, target
            )));
        }

        debug!("Session {} going back from {} to {}", session.id, session.step, target);
        session.step = target;
        session.touch();
        self.sessions.save(&session).await?;

        self.view(session).await
    }

    /// Abandons a session. Any appointment it already committed stays booked.
    pub async fn cancel(&self, id: Uuid) -> Result<(), WizardError> {
        let session = self.load(id).await?;
        self.sessions.delete(session.id).await?;

        info!("Session {} discarded at {}", session.id, session.step);
        Ok(())
    }

    /// Slots for an adviser/date while the session is on the adviser/date/time
    /// step. Recomputed on every call.
    pub async fn preview_slots(
        &self,
        id: Uuid,
        adviser_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<BookableSlot>, WizardError> {
        let session = self.load(id).await?;

        if session.step != WizardStep::CollectAdviserDateTime {
            return Err(WizardError::Validation(
                "Slots are only available while choosing an adviser, date and time".to_string(),
            ));
        }

        let adviser = self.bookable_adviser(&session, adviser_id).await?;
        let agency_id = required(session.collected.agency_id, "agency")?;
        let agency = self.directory.require_agency(agency_id).await?;

        let slots = self.engine
            .compute_available_slots_excluding(&agency, &adviser, date, session.collected.appointment_id)
            .await?;
        Ok(slots)
    }

    // ==========================================================================
    // STEP SUBMISSIONS
    // ==========================================================================

    async fn submit_phone(&self, session: &mut BookingSession, phone: &str) -> Result<(), WizardError> {
        let phone = phone.trim();
        if phone.is_empty() {
            return Err(WizardError::Validation(
                "Please enter the phone number used for the booking".to_string(),
            ));
        }

        let matches = self.store.query(&AppointmentFilter::for_phone(phone)).await?;
        if matches.is_empty() {
            info!("No appointments found for phone lookup in session {}", session.id);
            return Err(WizardError::NoAppointmentsFound);
        }

        session.collected.lookup_phone = Some(phone.to_string());
        session.collected.matched_appointment_ids = matches.iter().map(|a| a.id).collect();
        Ok(())
    }

    async fn submit_selection(
        &self,
        session: &mut BookingSession,
        appointment_id: Uuid,
    ) -> Result<(), WizardError> {
        if !session.collected.matched_appointment_ids.contains(&appointment_id) {
            return Err(WizardError::Validation(
                "Please select one of the listed appointments".to_string(),
            ));
        }

        let appointment = self.store
            .load(appointment_id)
            .await?
            .ok_or_else(|| WizardError::NotFound(format!("Appointment {}", appointment_id)))?;

        let collected = &mut session.collected;
        collected.appointment_id = Some(appointment.id);
        collected.agency_id = Some(appointment.agency_id);
        collected.specialization_id = Some(appointment.specialization_id);
        collected.adviser_id = Some(appointment.adviser_id);
        collected.date = Some(appointment.date());
        collected.time = Some(appointment.time_slot_key.display_time());
        collected.customer_name = Some(appointment.customer_name);
        collected.customer_email = Some(appointment.customer_email);
        collected.customer_phone = Some(appointment.customer_phone);
        collected.notes = appointment.notes;

        Ok(())
    }

    async fn submit_agency(&self, session: &mut BookingSession, agency_id: Uuid) -> Result<(), WizardError> {
        if self.directory.get_agency(agency_id).await?.is_none() {
            return Err(WizardError::Validation("Please select a valid agency".to_string()));
        }

        session.collected.agency_id = Some(agency_id);
        Ok(())
    }

    async fn submit_specialization(
        &self,
        session: &mut BookingSession,
        specialization_id: Uuid,
    ) -> Result<(), WizardError> {
        let known = self.directory.list_specializations().await?
            .iter()
            .any(|s| s.id == specialization_id);
        if !known {
            return Err(WizardError::Validation("Please select a valid specialization".to_string()));
        }

        session.collected.specialization_id = Some(specialization_id);
        Ok(())
    }

    async fn submit_adviser_date_time(
        &self,
        session: &mut BookingSession,
        adviser_id: Uuid,
        date: &str,
        time: &str,
    ) -> Result<(), WizardError> {
        let adviser = self.bookable_adviser(session, adviser_id).await?;

        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| WizardError::Validation("Please choose a valid date".to_string()))?;
        let key = SlotKey::parse(time)
            .map_err(|_| WizardError::Validation("Please choose a valid time".to_string()))?;

        let agency_id = required(session.collected.agency_id, "agency")?;
        let agency = self.directory.require_agency(agency_id).await?;

        let slots = self.engine
            .compute_available_slots_excluding(&agency, &adviser, date, session.collected.appointment_id)
            .await?;

        if slots.is_empty() {
            warn!("No slots for adviser {} on {}", adviser.id, date);
            return Err(WizardError::NoAvailableSlots(date));
        }
        if !slots.iter().any(|slot| slot.key == key) {
            if resolve_template(&adviser.working_hours).contains(&key) {
                warn!("Slot {} on {} already booked for adviser {}", key, date, adviser.id);
                return Err(WizardError::SlotConflict);
            }
            return Err(WizardError::Validation(format!(
                "{} is not one of {}'s appointment times",
                key.label(),
                adviser.display_name
            )));
        }

        let collected = &mut session.collected;
        collected.adviser_id = Some(adviser.id);
        collected.date = Some(date);
        collected.time = Some(key.display_time());
        Ok(())
    }

    async fn submit_contact(
        &self,
        mut session: BookingSession,
        name: &str,
        email: &str,
        phone: &str,
        notes: Option<String>,
    ) -> Result<StepView, WizardError> {
        let name = name.trim();
        let email = email.trim();
        let phone = phone.trim();

        if name.is_empty() {
            return Err(WizardError::Validation("Please enter your name".to_string()));
        }
        if !self.contact.valid_email(email) {
            return Err(WizardError::Validation("Please enter a valid email address".to_string()));
        }
        if !self.contact.valid_phone(phone) {
            return Err(WizardError::Validation("Please enter a valid phone number".to_string()));
        }

        session.collected.customer_name = Some(name.to_string());
        session.collected.customer_email = Some(email.to_string());
        session.collected.customer_phone = Some(phone.to_string());
        session.collected.notes = notes.filter(|n| !n.trim().is_empty());

        let draft = draft_from(&session)?;

        match self.writer.commit(draft).await {
            Ok(appointment_id) => {
                session.collected.committed_appointment_id = Some(appointment_id);
                session.step = WizardStep::Committed;
                session.touch();
                self.sessions.save(&session).await?;

                info!("Session {} committed appointment {}", session.id, appointment_id);
                self.view(session).await
            }
            Err(WriteError::SlotConflict) => {
                warn!("Session {} lost its slot at commit; returning to date/time step", session.id);
                session.collected.time = None;
                session.step = WizardStep::CollectAdviserDateTime;
                session.touch();
                self.sessions.save(&session).await?;

                Err(WizardError::SlotConflict)
            }
            Err(e) => {
                session.touch();
                self.sessions.save(&session).await?;
                Err(e.into())
            }
        }
    }

    // ==========================================================================
    // HELPERS
    // ==========================================================================

    async fn load(&self, id: Uuid) -> Result<BookingSession, WizardError> {
        self.sessions
            .load(id)
            .await?
            .ok_or(WizardError::SessionNotFound(id))
    }

    fn advance(&self, session: &mut BookingSession) -> Result<(), WizardError> {
        let next = machine::next_step(session.flow, session.step).ok_or_else(|| {
            WizardError::Backend(format!("No step follows {} in {:?} flow", session.step, session.flow))
        })?;

        info!("Session {} advanced from {} to {}", session.id, session.step, next);
        session.step = next;
        session.touch();
        Ok(())
    }

    /// The adviser, provided they work at the selected agency and offer the
    /// selected specialization.
    async fn bookable_adviser(
        &self,
        session: &BookingSession,
        adviser_id: Uuid,
    ) -> Result<Adviser, WizardError> {
        let agency_id = required(session.collected.agency_id, "agency")?;
        let specialization_id = required(session.collected.specialization_id, "specialization")?;

        self.directory
            .bookable_advisers(agency_id, specialization_id)
            .await?
            .into_iter()
            .find(|adviser| adviser.id == adviser_id)
            .ok_or_else(|| {
                WizardError::Validation(
                    "The selected adviser is not available for this agency and specialization".to_string(),
                )
            })
    }

    async fn view(&self, session: BookingSession) -> Result<StepView, WizardError> {
        let options = match session.step {
            WizardStep::CollectPhone => StepOptions::PhoneEntry,
            WizardStep::SelectExistingAppointment => {
                let phone = session.collected.lookup_phone.clone().unwrap_or_default();
                let appointments = self.store
                    .query(&AppointmentFilter::for_phone(phone))
                    .await?
                    .into_iter()
                    .filter(|a| session.collected.matched_appointment_ids.contains(&a.id))
                    .map(|a| AppointmentChoice { id: a.id, label: a.selection_label() })
                    .collect();
                StepOptions::Appointments { appointments }
            }
            WizardStep::CollectAgency => StepOptions::Agencies {
                agencies: self.directory.list_agencies().await?,
            },
            WizardStep::CollectSpecialization => StepOptions::Specializations {
                specializations: self.directory.list_specializations().await?,
            },
            WizardStep::CollectAdviserDateTime => self.adviser_step_options(&session).await?,
            WizardStep::CollectContactInfo => StepOptions::ContactForm,
            WizardStep::Committed => StepOptions::Confirmation {
                appointment_id: session.collected.committed_appointment_id,
            },
        };

        Ok(StepView { session, options })
    }

    async fn adviser_step_options(&self, session: &BookingSession) -> Result<StepOptions, WizardError> {
        let collected = &session.collected;
        let (Some(agency_id), Some(specialization_id)) = (collected.agency_id, collected.specialization_id) else {
            return Ok(StepOptions::AdvisersAndSlots { advisers: vec![], slots: vec![], notice: None });
        };

        let advisers = self.directory.bookable_advisers(agency_id, specialization_id).await?;

        let selected = collected.adviser_id
            .and_then(|id| advisers.iter().find(|a| a.id == id));
        let (slots, notice) = match (selected, collected.date) {
            (Some(adviser), Some(date)) => {
                let agency = self.directory.require_agency(agency_id).await?;
                match self.engine
                    .compute_available_slots_excluding(&agency, adviser, date, collected.appointment_id)
                    .await
                {
                    Ok(slots) if slots.is_empty() => {
                        (slots, Some(WizardError::NoAvailableSlots(date).to_string()))
                    }
                    Ok(slots) => (slots, None),
                    Err(AvailabilityError::NonOperatingDay { date, weekday }) => {
                        (vec![], Some(WizardError::NonOperatingDay { date, weekday }.to_string()))
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            _ => (vec![], None),
        };

        Ok(StepOptions::AdvisersAndSlots { advisers, slots, notice })
    }
}

fn required(value: Option<Uuid>, what: &str) -> Result<Uuid, WizardError> {
    value.ok_or_else(|| WizardError::Validation(format!("Please go back and select the {}", what)))
}

fn draft_from(session: &BookingSession) -> Result<AppointmentDraft, WizardError> {
    let collected = &session.collected;
    let missing = |field: &str| WizardError::Validation(format!("Missing {}; please go back and complete it", field));

    let target = match session.flow {
        WizardFlow::Booking => DraftTarget::New,
        WizardFlow::Modification => DraftTarget::Existing {
            appointment_id: collected.appointment_id.ok_or_else(|| missing("appointment"))?,
            lookup_phone: collected.lookup_phone.clone().ok_or_else(|| missing("phone number"))?,
        },
    };

    Ok(AppointmentDraft {
        target,
        agency_id: collected.agency_id.ok_or_else(|| missing("agency"))?,
        specialization_id: collected.specialization_id.ok_or_else(|| missing("specialization"))?,
        adviser_id: collected.adviser_id.ok_or_else(|| missing("adviser"))?,
        date: collected.date.ok_or_else(|| missing("date"))?.format("%Y-%m-%d").to_string(),
        time: collected.time.clone().ok_or_else(|| missing("time"))?,
        customer_name: collected.customer_name.clone().ok_or_else(|| missing("name"))?,
        customer_email: collected.customer_email.clone().ok_or_else(|| missing("email"))?,
        customer_phone: collected.customer_phone.clone().ok_or_else(|| missing("phone"))?,
        notes: collected.notes.clone(),
    })
}
