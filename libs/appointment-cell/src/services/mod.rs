pub mod slots;
pub mod operating_days;
pub mod store;
pub mod supabase_store;
pub mod conflict;
pub mod availability;
pub mod notifier;
pub mod writer;

pub use slots::{normalize_time, resolve_template, template_slots, SlotKey};
pub use operating_days::{is_operating_day, weekday_name};
pub use store::{AppointmentStore, InMemoryAppointmentStore};
pub use supabase_store::SupabaseAppointmentStore;
pub use conflict::ConflictChecker;
pub use availability::AvailabilityEngine;
pub use notifier::{HttpNotifier, LogNotifier, NotificationParams, NotificationTemplate, Notifier};
pub use writer::{combine_date_time, AppointmentWriter};
