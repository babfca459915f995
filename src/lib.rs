pub mod access;
pub mod calendar;
pub mod class_type;
pub mod config;
pub mod date_key;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod logging;
pub mod persistence;
pub mod render;
pub mod schedule;
pub mod session;

pub use access::{AccessError, AccessGate, GateOutcome, SessionMode};
pub use calendar::{MonthLayout, ViewCursor, advance_month, days_in_month, first_weekday};
pub use class_type::{CatalogError, ClassCatalog, ClassType};
pub use config::{CalendarConfig, ConfigError, StorageConfig};
pub use date_key::{DateKey, DateKeyError};
#[cfg(feature = "sqlite")]
pub use persistence::SqliteStore;
pub use persistence::{
    FileStore, KeyValueStore, MemoryStore, NullStore, PersistenceBridge, PersistenceError,
    PersistenceResult, SaveQueue, load_schedule_from_csv, save_schedule_to_csv,
};
pub use schedule::{AssignOutcome, FeeRow, FeeSummary, ScheduleMap, ScheduleStore};
pub use session::{CalendarSession, MonthView, SessionError};
