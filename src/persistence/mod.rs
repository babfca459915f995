use crate::schedule::ScheduleMap;
use std::io;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Key under which the schedule payload is stored.
pub const SCHEDULE_KEY: &str = "class-calendar/schedule";

/// String key-value collaborator the schedule is persisted into.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> PersistenceResult<()>;
}

/// Flat JSON object of `"{year}-{month0}-{day}"` → class type id.
pub fn encode_schedule(schedule: &ScheduleMap) -> PersistenceResult<String> {
    Ok(serde_json::to_string(schedule)?)
}

pub fn decode_schedule(payload: &str) -> PersistenceResult<ScheduleMap> {
    Ok(serde_json::from_str(payload)?)
}

/// Loads and saves the schedule under one fixed key.
#[derive(Clone)]
pub struct PersistenceBridge {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl PersistenceBridge {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, SCHEDULE_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Bridge over [`NullStore`]: nothing is loaded and writes go nowhere.
    pub fn disabled() -> Self {
        Self::new(Arc::new(NullStore))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn try_load(&self) -> PersistenceResult<Option<ScheduleMap>> {
        match self.store.get(&self.key)? {
            Some(payload) => decode_schedule(&payload).map(Some),
            None => Ok(None),
        }
    }

    /// Best effort: a missing or unreadable payload yields an empty map.
    pub fn load(&self) -> ScheduleMap {
        match self.try_load() {
            Ok(Some(schedule)) => {
                debug!(key = %self.key, entries = schedule.len(), "loaded stored schedule");
                schedule
            }
            Ok(None) => {
                debug!(key = %self.key, "no stored schedule, starting empty");
                ScheduleMap::new()
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "stored schedule unreadable, starting empty");
                ScheduleMap::new()
            }
        }
    }

    pub fn save(&self, schedule: &ScheduleMap) -> PersistenceResult<()> {
        let payload = encode_schedule(schedule)?;
        self.store.set(&self.key, &payload)?;
        debug!(key = %self.key, entries = schedule.len(), "saved schedule");
        Ok(())
    }
}

pub mod file;
pub mod memory;
pub mod queue;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{FileStore, load_schedule_from_csv, save_schedule_to_csv};
pub use memory::{MemoryStore, NullStore};
pub use queue::SaveQueue;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
