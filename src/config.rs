use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::access::AccessGate;
use crate::calendar::ViewCursor;
use crate::class_type::{CatalogError, ClassCatalog, ClassType};
use crate::persistence::{
    FileStore, KeyValueStore, MemoryStore, NullStore, PersistenceBridge, PersistenceError,
    SCHEDULE_KEY,
};

pub const CONFIG_PATH_ENV: &str = "CLASS_CALENDAR_CONFIG";
pub const PASSWORD_ENV: &str = "CLASS_CALENDAR_PASSWORD";
pub const HTTP_ADDR_ENV: &str = "CLASS_CALENDAR_HTTP_ADDR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {path} could not be read: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config file {path} is invalid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid class types: {0}")]
    Catalog(#[from] CatalogError),
    #[error("storage could not be opened: {0}")]
    Storage(#[from] PersistenceError),
    #[error("sqlite storage requested but this build has no sqlite support")]
    SqliteUnavailable,
    #[error("start month {month} is outside 1..=12")]
    InvalidStartMonth { month: u32 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    #[default]
    Memory,
    /// Nothing is loaded or written.
    Null,
    File { dir: PathBuf },
    Sqlite { path: PathBuf },
}

/// Month shown first; `month` is 1-based in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StartMonth {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Shared editor password. Without one every session may edit.
    pub password: Option<String>,
    pub storage: StorageConfig,
    pub storage_key: String,
    pub start: Option<StartMonth>,
    pub class_types: Option<Vec<ClassType>>,
    pub http_addr: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            password: None,
            storage: StorageConfig::default(),
            storage_key: SCHEDULE_KEY.to_string(),
            start: None,
            class_types: None,
            http_addr: "127.0.0.1:3000".to_string(),
        }
    }
}

impl CalendarConfig {
    /// Reads `path`, or the file named by `CLASS_CALENDAR_CONFIG`, then applies
    /// environment overrides. With neither, defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));
        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(password) = lookup(PASSWORD_ENV) {
            self.password = Some(password);
        }
        if let Some(addr) = lookup(HTTP_ADDR_ENV) {
            self.http_addr = addr;
        }
    }

    /// Blank passwords count as no password.
    pub fn secret(&self) -> Option<&str> {
        self.password
            .as_deref()
            .map(str::trim)
            .filter(|secret| !secret.is_empty())
    }

    pub fn gate(&self) -> AccessGate {
        AccessGate::from_secret(self.secret())
    }

    pub fn catalog(&self) -> Result<ClassCatalog, ConfigError> {
        match &self.class_types {
            Some(entries) => Ok(ClassCatalog::new(entries.clone())?),
            None => Ok(ClassCatalog::standard()),
        }
    }

    pub fn start_cursor(&self) -> Result<ViewCursor, ConfigError> {
        match self.start {
            Some(StartMonth { year, month }) if (1..=12).contains(&month) => {
                Ok(ViewCursor::new(year, month - 1))
            }
            Some(StartMonth { month, .. }) => Err(ConfigError::InvalidStartMonth { month }),
            None => Ok(ViewCursor::default()),
        }
    }

    pub fn open_store(&self) -> Result<Arc<dyn KeyValueStore>, ConfigError> {
        let store: Arc<dyn KeyValueStore> = match &self.storage {
            StorageConfig::Memory => Arc::new(MemoryStore::new()),
            StorageConfig::Null => Arc::new(NullStore),
            StorageConfig::File { dir } => Arc::new(FileStore::new(dir)?),
            #[cfg(feature = "sqlite")]
            StorageConfig::Sqlite { path } => {
                Arc::new(crate::persistence::SqliteStore::new(path)?)
            }
            #[cfg(not(feature = "sqlite"))]
            StorageConfig::Sqlite { .. } => return Err(ConfigError::SqliteUnavailable),
        };
        Ok(store)
    }

    pub fn bridge(&self) -> Result<PersistenceBridge, ConfigError> {
        Ok(PersistenceBridge::with_key(
            self.open_store()?,
            self.storage_key.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_storage_and_start() {
        let config = CalendarConfig::from_toml_str(
            r#"
            password = "letmein"
            [storage]
            backend = "file"
            dir = "/tmp/calendar"
            [start]
            year = 2025
            month = 9
            "#,
        )
        .unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::File {
                dir: PathBuf::from("/tmp/calendar")
            }
        );
        assert_eq!(config.start_cursor().unwrap(), ViewCursor::new(2025, 8));
        assert_eq!(config.secret(), Some("letmein"));
        assert_eq!(config.storage_key, SCHEDULE_KEY);
    }

    #[test]
    fn blank_password_disables_gate() {
        let mut config = CalendarConfig::default();
        config.apply_overrides(|name| (name == PASSWORD_ENV).then(|| "  ".to_string()));
        assert!(config.gate().can_mutate());
    }

    #[test]
    fn rejects_out_of_range_start_month() {
        let config = CalendarConfig::from_toml_str("[start]\nyear = 2025\nmonth = 13\n").unwrap();
        assert!(matches!(
            config.start_cursor(),
            Err(ConfigError::InvalidStartMonth { month: 13 })
        ));
    }
}
