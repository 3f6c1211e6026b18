//! Remote state store client
//!
//! The store is a plain JSON document tree addressed by path. Reads of an
//! absent document yield `None`; writes replace the whole document.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::{
    error::{Result, TimerError},
    services::room::RoomId,
    state::TimerRecord,
};

/// Read/write access to JSON documents by path
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Fetch the document at `path`, `None` when absent
    async fn get(&self, path: &str) -> Result<Option<Value>>;

    /// Replace the document at `path`
    async fn put(&self, path: &str, value: &Value) -> Result<()>;
}

/// Store path of a room's timer document
pub fn timer_path(room: &RoomId) -> String {
    format!("timers/{}", room)
}

/// Load and decode a room's timer record
pub async fn load_timer(store: &dyn StateStore, room: &RoomId) -> Result<Option<TimerRecord>> {
    match store.get(&timer_path(room)).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Persist a room's timer record, replacing whatever was there
pub async fn save_timer(store: &dyn StateStore, room: &RoomId, record: &TimerRecord) -> Result<()> {
    let value = serde_json::to_value(record)?;
    store.put(&timer_path(room), &value).await
}

/// Store reached over HTTP using the `{base}/{path}.json` REST convention
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Full URL of the document at `path`
    pub fn document_url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path.trim_matches('/'))
    }
}

#[async_trait]
impl StateStore for HttpStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        let url = self.document_url(path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(TimerError::StoreStatus {
                status: response.status().as_u16(),
                path: path.to_string(),
            });
        }

        let value: Value = response.json().await?;
        Ok(if value.is_null() { None } else { Some(value) })
    }

    async fn put(&self, path: &str, value: &Value) -> Result<()> {
        let url = self.document_url(path);
        debug!("PUT {}", url);

        let response = self.client.put(&url).json(value).send().await?;
        if !response.status().is_success() {
            return Err(TimerError::StoreStatus {
                status: response.status().as_u16(),
                path: path.to_string(),
            });
        }
        Ok(())
    }
}

/// Process-local store, also used to simulate an unreachable backend
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Value>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent reads fail as if the network were down
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail as if the network were down
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn unavailable(path: &str) -> TimerError {
        TimerError::StoreStatus {
            status: 503,
            path: path.to_string(),
        }
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::unavailable(path));
        }
        let documents = self
            .documents
            .lock()
            .map_err(|_| TimerError::LockPoisoned("memory store"))?;
        Ok(documents.get(path).filter(|v| !v.is_null()).cloned())
    }

    async fn put(&self, path: &str, value: &Value) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable(path));
        }
        let mut documents = self
            .documents
            .lock()
            .map_err(|_| TimerError::LockPoisoned("memory store"))?;
        documents.insert(path.to_string(), value.clone());
        Ok(())
    }
}
