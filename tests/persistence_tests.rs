use class_calendar::persistence::{SCHEDULE_KEY, decode_schedule, encode_schedule};
use class_calendar::{
    DateKey, FileStore, KeyValueStore, MemoryStore, NullStore, PersistenceBridge,
    PersistenceError, ScheduleMap, load_schedule_from_csv, save_schedule_to_csv,
};
use std::sync::Arc;
use tempfile::{NamedTempFile, tempdir};

fn sample() -> ScheduleMap {
    let mut map = ScheduleMap::new();
    map.insert("2025-9-3".parse().unwrap(), "pink".into());
    map.insert("2025-9-10".parse().unwrap(), "blue".into());
    map
}

#[test]
fn payload_round_trips_exactly() {
    let map = sample();
    let payload = encode_schedule(&map).unwrap();
    assert_eq!(decode_schedule(&payload).unwrap(), map);

    let raw: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(raw["2025-9-3"], "pink");
    assert_eq!(raw["2025-9-10"], "blue");
}

#[test]
fn decode_rejects_unparsable_keys() {
    assert!(matches!(
        decode_schedule(r#"{"2025-9":"pink"}"#),
        Err(PersistenceError::Serialization(_))
    ));
    assert!(decode_schedule(r#"["pink"]"#).is_err());
}

#[test]
fn decode_rejects_zero_padded_duplicate_keys() {
    assert!(matches!(
        decode_schedule(r#"{"2025-8-3":"pink","2025-08-03":"blue"}"#),
        Err(PersistenceError::Serialization(_))
    ));
}

#[test]
fn load_missing_key_is_empty() {
    let bridge = PersistenceBridge::new(Arc::new(MemoryStore::new()));
    assert_eq!(bridge.try_load().unwrap(), None);
    assert!(bridge.load().is_empty());
}

#[test]
fn load_malformed_payload_falls_back_to_empty() {
    let store = MemoryStore::with_entry(SCHEDULE_KEY, "{not json");
    let bridge = PersistenceBridge::new(Arc::new(store));
    assert!(bridge.try_load().is_err());
    assert!(bridge.load().is_empty());
}

#[test]
fn bridge_save_then_load() {
    let store = Arc::new(MemoryStore::new());
    let bridge = PersistenceBridge::new(store.clone());
    bridge.save(&sample()).unwrap();
    assert!(store.get(SCHEDULE_KEY).unwrap().is_some());
    assert_eq!(bridge.load(), sample());
}

#[test]
fn custom_key_is_isolated() {
    let store = Arc::new(MemoryStore::new());
    assert_eq!(PersistenceBridge::new(store.clone()).key(), SCHEDULE_KEY);
    assert_eq!(PersistenceBridge::with_key(store.clone(), "other").key(), "other");
    PersistenceBridge::with_key(store.clone(), "other").save(&sample()).unwrap();
    assert!(PersistenceBridge::new(store.clone()).load().is_empty());
    assert_eq!(PersistenceBridge::with_key(store, "other").load(), sample());
}

#[test]
fn null_store_discards_writes() {
    let bridge = PersistenceBridge::disabled();
    bridge.save(&sample()).unwrap();
    assert!(bridge.load().is_empty());
    assert_eq!(NullStore.get(SCHEDULE_KEY).unwrap(), None);
}

#[test]
fn file_store_persists_across_instances() {
    let dir = tempdir().unwrap();
    {
        let store = FileStore::new(dir.path()).unwrap();
        PersistenceBridge::new(Arc::new(store)).save(&sample()).unwrap();
    }
    let store = FileStore::new(dir.path()).unwrap();
    assert!(store.path_for(SCHEDULE_KEY).exists());
    assert_eq!(PersistenceBridge::new(Arc::new(store)).load(), sample());
}

#[test]
fn file_store_missing_file_is_none() {
    let dir = tempdir().unwrap();
    let store = FileStore::new(dir.path().join("nested")).unwrap();
    assert_eq!(store.get("absent").unwrap(), None);
    store.set("present", "value").unwrap();
    assert_eq!(store.get("present").unwrap().as_deref(), Some("value"));
}

#[cfg(feature = "sqlite")]
#[test]
fn sqlite_store_round_trip_and_overwrite() {
    use class_calendar::SqliteStore;

    let file = NamedTempFile::new().unwrap();
    {
        let store = SqliteStore::new(file.path()).unwrap();
        let bridge = PersistenceBridge::new(Arc::new(store));
        let mut first = sample();
        first.insert("2025-9-20".parse().unwrap(), "purple".into());
        bridge.save(&first).unwrap();
        bridge.save(&sample()).unwrap();
    }
    let store = SqliteStore::new(file.path()).unwrap();
    assert_eq!(PersistenceBridge::new(Arc::new(store)).load(), sample());
}

#[cfg(feature = "sqlite")]
#[test]
fn sqlite_in_memory_store_reads_back_writes() {
    use class_calendar::SqliteStore;

    let store = SqliteStore::in_memory().unwrap();
    assert_eq!(store.get(SCHEDULE_KEY).unwrap(), None);
    store.set(SCHEDULE_KEY, "{}").unwrap();
    store.set(SCHEDULE_KEY, r#"{"2025-8-3":"pink"}"#).unwrap();
    assert_eq!(
        store.get(SCHEDULE_KEY).unwrap().as_deref(),
        Some(r#"{"2025-8-3":"pink"}"#)
    );
}

#[test]
fn csv_export_uses_calendar_dates_and_imports_back() {
    let file = NamedTempFile::new().unwrap();
    save_schedule_to_csv(&sample(), file.path()).unwrap();

    let contents = std::fs::read_to_string(file.path()).unwrap();
    assert!(contents.starts_with("date,class_type"));
    assert!(contents.contains("2025-10-03,pink"));
    assert!(contents.contains("2025-10-10,blue"));

    let loaded = load_schedule_from_csv(file.path()).unwrap();
    assert_eq!(loaded, sample());
    assert!(loaded.contains_key(&DateKey::new(2025, 9, 3).unwrap()));
}

#[test]
fn csv_import_rejects_bad_dates() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "date,class_type\n2025-02-30,pink\n").unwrap();
    assert!(matches!(
        load_schedule_from_csv(file.path()),
        Err(PersistenceError::InvalidData(_))
    ));
}
