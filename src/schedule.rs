use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use crate::class_type::ClassCatalog;
use crate::date_key::DateKey;

/// Day → class type id. A missing key means the day is unassigned.
pub type ScheduleMap = BTreeMap<DateKey, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOutcome {
    Assigned { previous: Option<String> },
    /// The id is not in the catalog; nothing was changed.
    UnknownClassType,
}

impl AssignOutcome {
    pub fn is_assigned(&self) -> bool {
        matches!(self, AssignOutcome::Assigned { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeRow {
    pub class_type: String,
    pub label: String,
    pub count: u32,
    pub unit_fee: u64,
    pub fee: u64,
}

/// Fee aggregation for one month. Rows follow catalog order and include
/// billable types with a zero count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeSummary {
    pub year: i32,
    pub month: u32,
    pub rows: Vec<FeeRow>,
    pub total_fee: u64,
    pub total_class_count: u32,
    pub total_hours: f64,
}

impl FeeSummary {
    pub fn row(&self, class_type: &str) -> Option<&FeeRow> {
        self.rows.iter().find(|row| row.class_type == class_type)
    }

    pub fn count(&self, class_type: &str) -> u32 {
        self.row(class_type).map_or(0, |row| row.count)
    }

    pub fn per_type(&self) -> BTreeMap<&str, u32> {
        self.rows
            .iter()
            .map(|row| (row.class_type.as_str(), row.count))
            .collect()
    }

    pub fn fees_per_type(&self) -> BTreeMap<&str, u64> {
        self.rows
            .iter()
            .map(|row| (row.class_type.as_str(), row.fee))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ScheduleStore {
    catalog: ClassCatalog,
    assignments: ScheduleMap,
}

impl Default for ScheduleStore {
    fn default() -> Self {
        Self::new(ClassCatalog::standard())
    }
}

impl ScheduleStore {
    pub fn new(catalog: ClassCatalog) -> Self {
        Self {
            catalog,
            assignments: ScheduleMap::new(),
        }
    }

    /// Seeds the store from a loaded map, dropping entries whose class type
    /// is no longer in the catalog.
    pub fn with_assignments(catalog: ClassCatalog, assignments: ScheduleMap) -> Self {
        let mut store = Self::new(catalog);
        for (key, class_type) in assignments {
            if store.assign(key, &class_type) == AssignOutcome::UnknownClassType {
                warn!(date = %key, class_type = %class_type, "dropping stored assignment with unknown class type");
            }
        }
        store
    }

    pub fn catalog(&self) -> &ClassCatalog {
        &self.catalog
    }

    pub fn assignments(&self) -> &ScheduleMap {
        &self.assignments
    }

    pub fn snapshot(&self) -> ScheduleMap {
        self.assignments.clone()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Inserts or replaces the day's class type. Callers check access first.
    pub fn assign(&mut self, key: DateKey, class_type: &str) -> AssignOutcome {
        if !self.catalog.contains(class_type) {
            return AssignOutcome::UnknownClassType;
        }
        let previous = self.assignments.insert(key, class_type.to_string());
        AssignOutcome::Assigned { previous }
    }

    pub fn unassign(&mut self, key: &DateKey) -> Option<String> {
        self.assignments.remove(key)
    }

    pub fn get(&self, key: &DateKey) -> Option<&str> {
        self.assignments.get(key).map(String::as_str)
    }

    /// Entries of one month in day order.
    pub fn assignments_in_month(
        &self,
        month: u32,
        year: i32,
    ) -> impl Iterator<Item = (&DateKey, &str)> {
        let range = DateKey::month_start(month, year)..=DateKey::month_end(month, year);
        self.assignments
            .range(range)
            .map(|(key, class_type)| (key, class_type.as_str()))
    }

    pub fn aggregate_fees_for_month(&self, month: u32, year: i32) -> FeeSummary {
        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        for (key, class_type) in self.assignments_in_month(month, year) {
            debug_assert!(key.is_in_month(month, year));
            if self.catalog.is_billable(class_type) {
                *counts.entry(class_type).or_default() += 1;
            }
        }

        let mut summary = FeeSummary {
            year,
            month,
            rows: Vec::new(),
            total_fee: 0,
            total_class_count: 0,
            total_hours: 0.0,
        };
        for entry in self.catalog.billable() {
            let count = counts.get(entry.id.as_str()).copied().unwrap_or(0);
            // Saturates instead of panicking on catalogs with huge fees.
            let fee = u64::from(count).saturating_mul(entry.fee);
            summary.total_fee = summary.total_fee.saturating_add(fee);
            summary.total_class_count += count;
            summary.total_hours += f64::from(count) * entry.duration_hours;
            summary.rows.push(FeeRow {
                class_type: entry.id.clone(),
                label: entry.label.clone(),
                count,
                unit_fee: entry.fee,
                fee,
            });
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(year: i32, month: u32, day: u32) -> DateKey {
        DateKey::new(year, month, day).unwrap()
    }

    #[test]
    fn month_range_excludes_neighbouring_months() {
        let mut store = ScheduleStore::default();
        store.assign(key(2025, 8, 30), "pink");
        store.assign(key(2025, 9, 1), "blue");
        store.assign(key(2025, 10, 1), "purple");
        let october: Vec<_> = store.assignments_in_month(9, 2025).collect();
        assert_eq!(october, vec![(&key(2025, 9, 1), "blue")]);
    }

    #[test]
    fn with_assignments_drops_unknown_types() {
        let mut map = ScheduleMap::new();
        map.insert(key(2025, 0, 1), "pink".to_string());
        map.insert(key(2025, 0, 2), "retired".to_string());
        let store = ScheduleStore::with_assignments(ClassCatalog::standard(), map);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&key(2025, 0, 2)), None);
    }
}
