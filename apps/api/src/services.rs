use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use appointment_cell::{
    AppointmentStore, HttpNotifier, InMemoryAppointmentStore, LogNotifier, Notifier,
    SupabaseAppointmentStore,
};
use booking_wizard_cell::{InMemorySessionStore, RedisSessionStore, SessionStore};
use directory_cell::{Directory, InMemoryDirectory, SupabaseDirectory};
use shared_config::AppConfig;

use crate::seed;

/// The collaborators every cell is built from.
#[derive(Clone)]
pub struct Services {
    pub directory: Arc<dyn Directory>,
    pub store: Arc<dyn AppointmentStore>,
    pub notifier: Arc<dyn Notifier>,
    pub sessions: Arc<dyn SessionStore>,
}

impl Services {
    /// Supabase when configured, in-memory otherwise; Redis sessions when
    /// `REDIS_URL` is set.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let directory: Arc<dyn Directory>;
        let store: Arc<dyn AppointmentStore>;
        if config.is_configured() {
            info!("Using Supabase directory and appointment store at {}", config.supabase_url);
            directory = Arc::new(SupabaseDirectory::new(config));
            store = Arc::new(SupabaseAppointmentStore::new(config));
        } else {
            let in_memory = InMemoryDirectory::new();
            if config.seed_demo_data {
                seed::seed_demo_directory(&in_memory).await;
            }
            directory = Arc::new(in_memory);
            store = Arc::new(InMemoryAppointmentStore::new());
        }

        let notifier: Arc<dyn Notifier> = match &config.notifier_url {
            Some(url) => Arc::new(HttpNotifier::new(url.clone())),
            None => Arc::new(LogNotifier),
        };

        let sessions: Arc<dyn SessionStore> = if config.is_redis_configured() {
            Arc::new(
                RedisSessionStore::new(config)
                    .await
                    .context("Failed to initialize Redis session store")?,
            )
        } else {
            Arc::new(InMemorySessionStore::new(config.session_ttl_seconds))
        };

        Ok(Self { directory, store, notifier, sessions })
    }

    /// Fully in-process wiring over a given directory.
    pub fn in_memory(directory: Arc<dyn Directory>, session_ttl_seconds: u64) -> Self {
        Self {
            directory,
            store: Arc::new(InMemoryAppointmentStore::new()),
            notifier: Arc::new(LogNotifier),
            sessions: Arc::new(InMemorySessionStore::new(session_ttl_seconds)),
        }
    }
}
