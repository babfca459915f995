use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::access::{AccessError, AccessGate, GateOutcome, SessionMode};
use crate::calendar::{MonthLayout, ViewCursor};
use crate::class_type::{ClassCatalog, ClassType};
use crate::config::{CalendarConfig, ConfigError};
use crate::date_key::{DateKey, DateKeyError};
use crate::persistence::{PersistenceBridge, SaveQueue};
use crate::schedule::{AssignOutcome, FeeSummary, ScheduleMap, ScheduleStore};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("enter the password (or leave it empty to view) before editing")]
    GatePending,
    #[error("this session is read-only")]
    ReadOnly,
    #[error(transparent)]
    InvalidDate(#[from] DateKeyError),
    #[error(transparent)]
    Access(#[from] AccessError),
}

/// Fails unless the gate has resolved to Editor.
pub fn check_access(gate: &AccessGate) -> Result<(), SessionError> {
    match gate.mode() {
        None => Err(SessionError::GatePending),
        Some(SessionMode::Viewer) => Err(SessionError::ReadOnly),
        Some(SessionMode::Editor) => Ok(()),
    }
}

/// Gated assign. A successful assignment queues a save of the whole map.
pub fn gated_assign(
    gate: &AccessGate,
    store: &mut ScheduleStore,
    saves: &SaveQueue,
    key: DateKey,
    class_type: &str,
) -> Result<AssignOutcome, SessionError> {
    check_access(gate)?;
    let outcome = store.assign(key, class_type);
    match &outcome {
        AssignOutcome::Assigned { .. } => {
            saves.request(store.snapshot());
        }
        AssignOutcome::UnknownClassType => {
            debug!(date = %key, class_type, "ignoring unknown class type");
        }
    }
    Ok(outcome)
}

/// Gated unassign. Removing a day that was set queues a save, even when the
/// map becomes empty.
pub fn gated_unassign(
    gate: &AccessGate,
    store: &mut ScheduleStore,
    saves: &SaveQueue,
    key: &DateKey,
) -> Result<Option<String>, SessionError> {
    check_access(gate)?;
    let removed = store.unassign(key);
    if removed.is_some() {
        saves.request(store.snapshot());
    }
    Ok(removed)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub day: u32,
    pub class_type: Option<String>,
    pub color: Option<String>,
}

/// Everything a renderer needs for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthView {
    pub title: String,
    pub layout: MonthLayout,
    pub days: Vec<DayCell>,
    pub fees: FeeSummary,
    pub can_mutate: bool,
}

impl MonthView {
    pub fn build(store: &ScheduleStore, cursor: ViewCursor, can_mutate: bool) -> Self {
        let layout = cursor.layout();
        let days = layout
            .days()
            .map(|key| {
                let class_type = store.get(&key);
                DayCell {
                    day: key.day,
                    class_type: class_type.map(str::to_string),
                    color: class_type
                        .and_then(|id| store.catalog().get(id))
                        .map(|entry| entry.color.clone()),
                }
            })
            .collect();
        Self {
            title: cursor.title(),
            fees: store.aggregate_fees_for_month(cursor.month, cursor.year),
            layout,
            days,
            can_mutate,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub rejected: usize,
}

/// One operator session: cursor, gate, schedule and its saver.
pub struct CalendarSession {
    cursor: ViewCursor,
    gate: AccessGate,
    store: ScheduleStore,
    saves: SaveQueue,
}

impl CalendarSession {
    /// Loads the stored schedule before returning, so no edit can precede it.
    pub async fn open(
        catalog: ClassCatalog,
        gate: AccessGate,
        bridge: PersistenceBridge,
        cursor: ViewCursor,
    ) -> Self {
        let loader = bridge.clone();
        let loaded = match tokio::task::spawn_blocking(move || loader.load()).await {
            Ok(schedule) => schedule,
            Err(err) => {
                warn!(error = %err, "schedule load task failed, starting empty");
                ScheduleMap::new()
            }
        };
        let store = ScheduleStore::with_assignments(catalog, loaded);
        info!(entries = store.len(), "calendar session opened");
        Self {
            cursor,
            gate,
            store,
            saves: SaveQueue::spawn(bridge),
        }
    }

    pub async fn from_config(config: &CalendarConfig) -> Result<Self, ConfigError> {
        let catalog = config.catalog()?;
        let cursor = config.start_cursor()?;
        let bridge = config.bridge()?;
        Ok(Self::open(catalog, config.gate(), bridge, cursor).await)
    }

    pub fn cursor(&self) -> ViewCursor {
        self.cursor
    }

    pub fn previous_month(&mut self) {
        self.cursor.previous();
    }

    pub fn next_month(&mut self) {
        self.cursor.next();
    }

    pub fn jump_to(&mut self, year: i32, month: u32) {
        self.cursor.jump(year, month);
    }

    pub fn mode(&self) -> Option<SessionMode> {
        self.gate.mode()
    }

    pub fn can_mutate(&self) -> bool {
        self.gate.can_mutate()
    }

    pub fn submit_password(&mut self, input: &str) -> Result<GateOutcome, AccessError> {
        self.gate.submit(input)
    }

    pub fn store(&self) -> &ScheduleStore {
        &self.store
    }

    pub fn catalog(&self) -> &ClassCatalog {
        self.store.catalog()
    }

    pub fn saves(&self) -> &SaveQueue {
        &self.saves
    }

    fn key_for_day(&self, day: u32) -> Result<DateKey, SessionError> {
        Ok(DateKey::new(self.cursor.year, self.cursor.month, day)?)
    }

    pub fn assign_day(&mut self, day: u32, class_type: &str) -> Result<AssignOutcome, SessionError> {
        let key = self.key_for_day(day)?;
        self.assign_date(key, class_type)
    }

    pub fn assign_date(
        &mut self,
        key: DateKey,
        class_type: &str,
    ) -> Result<AssignOutcome, SessionError> {
        gated_assign(&self.gate, &mut self.store, &self.saves, key, class_type)
    }

    pub fn unassign_day(&mut self, day: u32) -> Result<Option<String>, SessionError> {
        let key = self.key_for_day(day)?;
        self.unassign_date(&key)
    }

    pub fn unassign_date(&mut self, key: &DateKey) -> Result<Option<String>, SessionError> {
        gated_unassign(&self.gate, &mut self.store, &self.saves, key)
    }

    /// Class type on a day of the visible month.
    pub fn day_class(&self, day: u32) -> Option<&ClassType> {
        let key = DateKey::new(self.cursor.year, self.cursor.month, day).ok()?;
        self.store
            .get(&key)
            .and_then(|id| self.store.catalog().get(id))
    }

    /// Applies every entry of `schedule` as an assignment, with one save at the end.
    pub fn import(&mut self, schedule: ScheduleMap) -> Result<ImportSummary, SessionError> {
        check_access(&self.gate)?;
        let mut summary = ImportSummary::default();
        for (key, class_type) in schedule {
            if self.store.assign(key, &class_type).is_assigned() {
                summary.imported += 1;
            } else {
                summary.rejected += 1;
            }
        }
        if summary.imported > 0 {
            self.saves.request(self.store.snapshot());
        }
        Ok(summary)
    }

    pub fn fee_summary(&self) -> FeeSummary {
        self.store
            .aggregate_fees_for_month(self.cursor.month, self.cursor.year)
    }

    pub fn month_view(&self) -> MonthView {
        MonthView::build(&self.store, self.cursor, self.can_mutate())
    }

    pub async fn flush(&self) {
        self.saves.flush().await;
    }

    /// Waits for pending saves and stops the saver.
    pub async fn close(self) {
        self.saves.shutdown().await;
    }
}
