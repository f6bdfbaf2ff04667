//! Session credential cache.
//!
//! A successful login leaves a short-lived bearer credential keyed by the
//! Telegram user id. The production store is Redis, whose key expiry
//! enforces the TTL; an in-memory store with the same contract backs tests
//! and tokenless local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// A cached bearer credential proving a prior successful login
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub owner_id: u64,
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub ttl_secs: u64,
}

impl Credential {
    pub fn new(owner_id: u64, token: String, ttl_secs: u64) -> Self {
        Self {
            owner_id,
            token,
            issued_at: Utc::now(),
            ttl_secs,
        }
    }
}

/// Errors from the cache backing store
#[derive(Debug, Clone)]
pub enum CacheError {
    /// Could not reach the backing store
    Connection(String),
    /// The store accepted the connection but the command failed
    Command(String),
    /// Stored payload could not be encoded or decoded
    Serialization(String),
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::Connection(msg) => write!(f, "Cache connection error: {msg}"),
            CacheError::Command(msg) => write!(f, "Cache command error: {msg}"),
            CacheError::Serialization(msg) => write!(f, "Cache serialization error: {msg}"),
        }
    }
}

impl std::error::Error for CacheError {}

/// Contract of the session cache: atomic per-key get/put/delete.
///
/// `get` answers absent for a key that was never set and for one past its
/// TTL; callers treat both identically. `put` overwrites any prior entry
/// for the same user (last login wins).
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, user_id: u64) -> Result<Option<Credential>, CacheError>;
    async fn put(&self, credential: &Credential, ttl_secs: u64) -> Result<(), CacheError>;
    async fn invalidate(&self, user_id: u64) -> Result<(), CacheError>;
}

fn session_key(user_id: u64) -> String {
    format!("session:{user_id}")
}

/// Redis-backed session cache. TTL is enforced by `SET ... EX` on the
/// server side, so `get` never re-checks timestamps.
pub struct RedisSessionCache {
    connection_manager: redis::aio::ConnectionManager,
}

impl RedisSessionCache {
    pub async fn new(connection_string: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(connection_string)
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        let connection_manager = client
            .get_connection_manager()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        Ok(Self { connection_manager })
    }
}

#[async_trait]
impl SessionStore for RedisSessionCache {
    async fn get(&self, user_id: u64) -> Result<Option<Credential>, CacheError> {
        let mut conn = self.connection_manager.clone();
        let raw: Option<String> = conn
            .get(session_key(user_id))
            .await
            .map_err(|e| CacheError::Command(e.to_string()))?;

        match raw {
            Some(json) => {
                let credential = serde_json::from_str(&json)
                    .map_err(|e| CacheError::Serialization(e.to_string()))?;
                Ok(Some(credential))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, credential: &Credential, ttl_secs: u64) -> Result<(), CacheError> {
        let json = serde_json::to_string(credential)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        let mut conn = self.connection_manager.clone();
        conn.set_ex(session_key(credential.owner_id), json, ttl_secs)
            .await
            .map_err(|e| CacheError::Command(e.to_string()))
    }

    async fn invalidate(&self, user_id: u64) -> Result<(), CacheError> {
        debug!(user_id, "Invalidating cached session credential");
        let mut conn = self.connection_manager.clone();
        conn.del(session_key(user_id))
            .await
            .map_err(|e| CacheError::Command(e.to_string()))
    }
}

/// In-process session cache with the same observable contract as the Redis
/// store; TTL is checked against the entry's expiry instant on `get`.
#[derive(Debug, Default)]
pub struct InMemorySessionCache {
    entries: Mutex<HashMap<u64, (Credential, Instant)>>,
}

impl InMemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionCache {
    async fn get(&self, user_id: u64) -> Result<Option<Credential>, CacheError> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(&user_id) {
            Some((credential, expires_at)) if *expires_at > Instant::now() => {
                Ok(Some(credential.clone()))
            }
            Some(_) => {
                entries.remove(&user_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, credential: &Credential, ttl_secs: u64) -> Result<(), CacheError> {
        let expires_at = Instant::now() + Duration::from_secs(ttl_secs);
        let mut entries = self.entries.lock().unwrap();
        entries.insert(credential.owner_id, (credential.clone(), expires_at));
        Ok(())
    }

    async fn invalidate(&self, user_id: u64) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(&user_id);
        Ok(())
    }
}
