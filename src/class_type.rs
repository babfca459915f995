use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

pub const PLACEHOLDER_ID: &str = "next";

/// A schedulable activity. Fees are whole currency units per occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassType {
    pub id: String,
    pub label: String,
    pub duration_hours: f64,
    pub fee: u64,
    /// Colour token for renderers.
    #[serde(default)]
    pub color: String,
    /// Placeholder entries mark a day without billing it.
    #[serde(default)]
    pub placeholder: bool,
}

impl ClassType {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        duration_hours: f64,
        fee: u64,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            duration_hours,
            fee,
            color: color.into(),
            placeholder: false,
        }
    }

    pub fn placeholder(id: impl Into<String>, label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            placeholder: true,
            ..Self::new(id, label, 0.0, 0, color)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("class type id '{0}' appears more than once")]
    DuplicateId(String),
    #[error("class type '{0}' has an empty id")]
    EmptyId(String),
    #[error("class type '{id}' has invalid duration {hours}")]
    InvalidDuration { id: String, hours: f64 },
    #[error("placeholder class type '{0}' must have zero fee and zero duration")]
    BillablePlaceholder(String),
    #[error("catalog needs exactly one placeholder entry, found {0}")]
    PlaceholderCount(usize),
}

/// Fixed, ordered set of class types.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassCatalog {
    entries: Vec<ClassType>,
}

impl Default for ClassCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl ClassCatalog {
    pub fn standard() -> Self {
        Self {
            entries: vec![
                ClassType::placeholder(PLACEHOLDER_ID, "Next Class", "gray"),
                ClassType::new("pink", "Math Class (1.5 hours)", 1.5, 1000, "pink"),
                ClassType::new("blue", "Math Class (2 hours)", 2.0, 1500, "blue"),
                ClassType::new("purple", "Math Class (1 hour)", 1.0, 1000, "purple"),
            ],
        }
    }

    pub fn new(entries: Vec<ClassType>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(entries.len());
        let mut placeholders = 0;
        for entry in &entries {
            if entry.id.trim().is_empty() {
                return Err(CatalogError::EmptyId(entry.label.clone()));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(CatalogError::DuplicateId(entry.id.clone()));
            }
            if !entry.duration_hours.is_finite() || entry.duration_hours < 0.0 {
                return Err(CatalogError::InvalidDuration {
                    id: entry.id.clone(),
                    hours: entry.duration_hours,
                });
            }
            if entry.placeholder {
                placeholders += 1;
                if entry.fee != 0 || entry.duration_hours != 0.0 {
                    return Err(CatalogError::BillablePlaceholder(entry.id.clone()));
                }
            }
        }
        if placeholders != 1 {
            return Err(CatalogError::PlaceholderCount(placeholders));
        }
        Ok(Self { entries })
    }

    pub fn get(&self, id: &str) -> Option<&ClassType> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn is_billable(&self, id: &str) -> bool {
        self.get(id).is_some_and(|entry| !entry.placeholder)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassType> {
        self.entries.iter()
    }

    /// Catalog order without the placeholder.
    pub fn billable(&self) -> impl Iterator<Item = &ClassType> {
        self.entries.iter().filter(|entry| !entry.placeholder)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
