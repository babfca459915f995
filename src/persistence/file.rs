use super::{KeyValueStore, PersistenceError, PersistenceResult};
use crate::date_key::DateKey;
use crate::schedule::ScheduleMap;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Directory store: each key is a file holding the raw value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> PersistenceResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> PersistenceResult<()> {
        let path = self.path_for(key);
        // Write beside the target, then rename, so readers never see half a payload.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct AssignmentCsvRecord {
    date: String,
    class_type: String,
}

/// Writes one `date,class_type` row per assignment, dates as `YYYY-MM-DD`.
pub fn save_schedule_to_csv<P: AsRef<Path>>(
    schedule: &ScheduleMap,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for (key, class_type) in schedule {
        let date = key.to_naive_date().ok_or_else(|| {
            PersistenceError::InvalidData(format!("date key {key} is not a calendar day"))
        })?;
        writer.serialize(AssignmentCsvRecord {
            date: date.format("%Y-%m-%d").to_string(),
            class_type: class_type.clone(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_schedule_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<ScheduleMap> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut schedule = ScheduleMap::new();
    for record in reader.deserialize::<AssignmentCsvRecord>() {
        let record = record?;
        let date = NaiveDate::parse_from_str(record.date.trim(), "%Y-%m-%d").map_err(|e| {
            PersistenceError::InvalidData(format!("invalid date '{}': {e}", record.date))
        })?;
        let class_type = record.class_type.trim();
        if class_type.is_empty() {
            return Err(PersistenceError::InvalidData(format!(
                "missing class type for {}",
                record.date
            )));
        }
        schedule.insert(DateKey::from_naive_date(date), class_type.to_string());
    }
    Ok(schedule)
}
