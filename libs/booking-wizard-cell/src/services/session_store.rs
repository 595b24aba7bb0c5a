use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use deadpool_redis::{Config, Connection, Pool, Runtime};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::error::SessionStoreError;
use crate::models::BookingSession;

/// Wizard sessions live outside the request that created them; any instance
/// serving the next step loads the session from here.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<Option<BookingSession>, SessionStoreError>;

    /// Stores the session and restarts its expiry.
    async fn save(&self, session: &BookingSession) -> Result<(), SessionStoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), SessionStoreError>;
}

pub fn session_key(id: Uuid) -> String {
    format!("booking_session:{}", id)
}

// ==============================================================================
// IN-MEMORY
// ==============================================================================

pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, (BookingSession, DateTime<Utc>)>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: i64::try_from(ttl_seconds)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or_else(|| Duration::days(365)),
        }
    }
}

/// Drops every session whose deadline has passed, not only the one being read.
fn prune_expired(sessions: &mut HashMap<Uuid, (BookingSession, DateTime<Utc>)>, now: DateTime<Utc>) {
    let before = sessions.len();
    sessions.retain(|_, (_, expires_at)| *expires_at > now);

    let expired = before - sessions.len();
    if expired > 0 {
        debug!("Discarded {} expired booking sessions", expired);
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<BookingSession>, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        prune_expired(&mut sessions, Utc::now());

        Ok(sessions.get(&id).map(|(session, _)| session.clone()))
    }

    async fn save(&self, session: &BookingSession) -> Result<(), SessionStoreError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut sessions = self.sessions.write().await;
        prune_expired(&mut sessions, now);
        sessions.insert(session.id, (session.clone(), expires_at));
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), SessionStoreError> {
        self.sessions.write().await.remove(&id);
        Ok(())
    }
}

// ==============================================================================
// REDIS
// ==============================================================================

/// Sessions as JSON strings under `booking_session:{id}`, written with `SET .. EX`.
pub struct RedisSessionStore {
    pool: Pool,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub async fn new(config: &AppConfig) -> Result<Self, SessionStoreError> {
        let redis_url = config.redis_url.clone()
            .unwrap_or_else(|| "redis://localhost:6379".to_string());

        let cfg = Config::from_url(redis_url);
        let pool = cfg.create_pool(Some(Runtime::Tokio1))
            .map_err(|e| SessionStoreError::Pool(format!("Failed to create Redis pool: {}", e)))?;

        // Test connection
        let mut conn = pool.get().await
            .map_err(|e| SessionStoreError::Pool(format!("Failed to connect to Redis: {}", e)))?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        info!("Redis session store initialized");

        Ok(Self {
            pool,
            ttl_seconds: config.session_ttl_seconds,
        })
    }

    async fn get_connection(&self) -> Result<Connection, SessionStoreError> {
        self.pool.get().await
            .map_err(|e| SessionStoreError::Pool(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<BookingSession>, SessionStoreError> {
        let mut conn = self.get_connection().await?;

        let raw: Option<String> = redis::cmd("GET")
            .arg(session_key(id))
            .query_async(&mut conn)
            .await?;

        match raw {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, session: &BookingSession) -> Result<(), SessionStoreError> {
        let mut conn = self.get_connection().await?;
        let data = serde_json::to_string(session)?;

        let _: () = redis::cmd("SET")
            .arg(session_key(session.id))
            .arg(data)
            .arg("EX")
            .arg(self.ttl_seconds)
            .query_async(&mut conn)
            .await?;

        debug!("Saved booking session {} at step {}", session.id, session.step);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), SessionStoreError> {
        let mut conn = self.get_connection().await?;

        let _: () = redis::cmd("DEL")
            .arg(session_key(id))
            .query_async(&mut conn)
            .await?;

        Ok(())
    }
}
