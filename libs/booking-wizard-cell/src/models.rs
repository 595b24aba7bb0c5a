use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use appointment_cell::BookableSlot;
use directory_cell::{Adviser, Agency, Specialization};

// ==============================================================================
// STATE MACHINE
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardFlow {
    Booking,
    Modification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    CollectPhone,
    SelectExistingAppointment,
    CollectAgency,
    CollectSpecialization,
    CollectAdviserDateTime,
    CollectContactInfo,
    Committed,
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::CollectPhone => "collect_phone",
            WizardStep::SelectExistingAppointment => "select_existing_appointment",
            WizardStep::CollectAgency => "collect_agency",
            WizardStep::CollectSpecialization => "collect_specialization",
            WizardStep::CollectAdviserDateTime => "collect_adviser_date_time",
            WizardStep::CollectContactInfo => "collect_contact_info",
            WizardStep::Committed => "committed",
        };
        write!(f, "{}", name)
    }
}

// ==============================================================================
// SESSION
// ==============================================================================

/// Values gathered so far. Going back never clears anything here; a later
/// submit of the same step overwrites.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectedFields {
    pub lookup_phone: Option<String>,
    #[serde(default)]
    pub matched_appointment_ids: Vec<Uuid>,
    pub appointment_id: Option<Uuid>,
    pub agency_id: Option<Uuid>,
    pub specialization_id: Option<Uuid>,
    pub adviser_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    /// Canonical `HH:MM`.
    pub time: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
    pub committed_appointment_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSession {
    pub id: Uuid,
    pub flow: WizardFlow,
    pub step: WizardStep,
    pub collected: CollectedFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingSession {
    pub fn new(flow: WizardFlow, first_step: WizardStep) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            flow,
            step: first_step,
            collected: CollectedFields::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_committed(&self) -> bool {
        self.step == WizardStep::Committed
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ==============================================================================
// STEP INPUT & RENDERING
// ==============================================================================

/// Submitted values for one step, tagged with the step they belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepInput {
    Phone { phone: String },
    SelectAppointment { appointment_id: Uuid },
    Agency { agency_id: Uuid },
    Specialization { specialization_id: Uuid },
    AdviserDateTime { adviser_id: Uuid, date: String, time: String },
    ContactInfo {
        name: String,
        email: String,
        phone: String,
        #[serde(default)]
        notes: Option<String>,
    },
}

impl StepInput {
    pub fn step(&self) -> WizardStep {
        match self {
            StepInput::Phone { .. } => WizardStep::CollectPhone,
            StepInput::SelectAppointment { .. } => WizardStep::SelectExistingAppointment,
            StepInput::Agency { .. } => WizardStep::CollectAgency,
            StepInput::Specialization { .. } => WizardStep::CollectSpecialization,
            StepInput::AdviserDateTime { .. } => WizardStep::CollectAdviserDateTime,
            StepInput::ContactInfo { .. } => WizardStep::CollectContactInfo,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentChoice {
    pub id: Uuid,
    pub label: String,
}

/// What the current step offers the customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepOptions {
    PhoneEntry,
    Appointments { appointments: Vec<AppointmentChoice> },
    Agencies { agencies: Vec<Agency> },
    Specializations { specializations: Vec<Specialization> },
    AdvisersAndSlots {
        advisers: Vec<Adviser>,
        /// Slots for the collected adviser/date, when both are known.
        slots: Vec<BookableSlot>,
        notice: Option<String>,
    },
    ContactForm,
    Confirmation { appointment_id: Option<Uuid> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepView {
    pub session: BookingSession,
    pub options: StepOptions,
}
