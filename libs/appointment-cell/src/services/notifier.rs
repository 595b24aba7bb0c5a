use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Appointment, NotifyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationTemplate {
    #[serde(rename = "new_appointment_advisor")]
    AdviserNewAppointment,
    #[serde(rename = "new_appointment_user")]
    CustomerNewAppointment,
}

impl NotificationTemplate {
    pub fn key(&self) -> &'static str {
        match self {
            NotificationTemplate::AdviserNewAppointment => "new_appointment_advisor",
            NotificationTemplate::CustomerNewAppointment => "new_appointment_user",
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            NotificationTemplate::AdviserNewAppointment => "New Appointment Booked",
            NotificationTemplate::CustomerNewAppointment => "Your Appointment is Confirmed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationParams {
    pub appointment_id: Uuid,
    pub agency_id: Uuid,
    pub adviser_id: Uuid,
    pub appointment_date_time: NaiveDateTime,
    pub time_slot_key: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub notes: Option<String>,
    pub subject: String,
}

impl NotificationParams {
    pub fn for_appointment(appointment: &Appointment, template: NotificationTemplate) -> Self {
        Self {
            appointment_id: appointment.id,
            agency_id: appointment.agency_id,
            adviser_id: appointment.adviser_id,
            appointment_date_time: appointment.appointment_date_time,
            time_slot_key: appointment.time_slot_key.as_key(),
            customer_name: appointment.customer_name.clone(),
            customer_email: appointment.customer_email.clone(),
            customer_phone: appointment.customer_phone.clone(),
            notes: appointment.notes.clone(),
            subject: template.subject().to_string(),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        template: NotificationTemplate,
        recipient: String,
        params: NotificationParams,
    ) -> Result<(), NotifyError>;
}

/// Writes notifications to the log instead of delivering them.
#[derive(Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        template: NotificationTemplate,
        recipient: String,
        params: NotificationParams,
    ) -> Result<(), NotifyError> {
        info!(
            "Notification {} to {} for appointment {} ({})",
            template.key(), recipient, params.appointment_id, params.subject
        );
        Ok(())
    }
}

/// Posts notifications to an external delivery service.
pub struct HttpNotifier {
    client: Client,
    url: String,
}

impl HttpNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(
        &self,
        template: NotificationTemplate,
        recipient: String,
        params: NotificationParams,
    ) -> Result<(), NotifyError> {
        debug!("Sending {} notification to {}", template.key(), self.url);

        let response = self.client
            .post(&self.url)
            .json(&json!({
                "template": template.key(),
                "recipient": recipient,
                "params": params,
            }))
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected(format!("{}: {}", status, body)));
        }

        Ok(())
    }
}
