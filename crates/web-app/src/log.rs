use std::{
    collections::VecDeque,
    ops::DerefMut,
    sync::{Arc, Mutex},
};

use chrono::Utc;
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use serde::{Deserialize, Serialize};
use thiserror;

pub static LOG: Mutex<Option<Arc<Mutex<dyn Repository>>>> = Mutex::new(None);

/// Capacity of the in-memory log, the oldest entries are evicted first.
const MAX_ENTRIES: usize = 400;

pub trait Service {
    fn get_log_entries(&self) -> Result<VecDeque<Entry>, Error>;
    fn add_log_entry(&self, entry: Entry) -> Result<(), Error>;
}

#[allow(clippy::missing_errors_doc)]
pub trait Repository: Send + Sync + 'static {
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error>;
    fn write_entry(&self, entry: Entry) -> Result<(), Error>;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    Unknown(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub time: String,
    #[serde(with = "LevelDef")]
    pub level: Level,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "Level")]
pub enum LevelDef {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Bounded in-memory log storage.
#[derive(Default)]
pub struct MemoryRepository {
    entries: Mutex<VecDeque<Entry>>,
}

impl Repository for MemoryRepository {
    fn read_entries(&self) -> Result<VecDeque<Entry>, Error> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .map_err(|err| Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: Entry) -> Result<(), Error> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|err| Error::Unknown(err.to_string()))?;
        if entries.len() >= MAX_ENTRIES {
            entries.pop_front();
        }
        entries.push_back(entry);
        Ok(())
    }
}

static LOGGER: Logger = Logger;

/// # Errors
///
/// Returns an error if the logger has already been initialized.
pub fn init(storage: Arc<Mutex<dyn Repository>>) -> Result<(), SetLoggerError> {
    if let Ok(mut log) = LOG.lock() {
        *log = Some(storage);
    }
    log::set_logger(&LOGGER).map(|()| log::set_max_level(LevelFilter::Trace))
}

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Trace
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            if let Ok(log) = LOG.lock() {
                if let Some(ref log) = *log {
                    if let Ok(mut log) = log.lock() {
                        let _ = log.deref_mut().write_entry(Entry {
                            time: Utc::now().format("%b %d %H:%M:%S").to_string(),
                            level: record.level(),
                            message: record.args().to_string(),
                        });
                    }
                }
            }
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn entry(message: &str) -> Entry {
        Entry {
            time: String::from("Mar 12 18:00:00"),
            level: Level::Info,
            message: String::from(message),
        }
    }

    #[test]
    fn test_memory_repository_keeps_insertion_order() {
        let repository = MemoryRepository::default();

        repository.write_entry(entry("first")).unwrap();
        repository.write_entry(entry("second")).unwrap();

        let entries = repository.read_entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "first");
        assert_eq!(entries[1].message, "second");
    }

    #[test]
    fn test_memory_repository_evicts_oldest_entry() {
        let repository = MemoryRepository::default();

        for i in 0..=MAX_ENTRIES {
            repository.write_entry(entry(&i.to_string())).unwrap();
        }

        let entries = repository.read_entries().unwrap();
        assert_eq!(entries.len(), MAX_ENTRIES);
        assert_eq!(entries[0].message, "1");
        assert_eq!(entries[MAX_ENTRIES - 1].message, MAX_ENTRIES.to_string());
    }

    #[test]
    fn test_entry_serialization() {
        let serialized = serde_json::to_string(&entry("connected")).unwrap();
        let deserialized: Entry = serde_json::from_str(&serialized).unwrap();

        assert_eq!(deserialized, entry("connected"));
    }
}
