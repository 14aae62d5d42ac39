use campus_hr::workflows::approvals::{HrRecords, RecordStore, StoreError};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Keeps the last saved document in memory; used when no data path is configured.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRecordStore {
    document: Arc<Mutex<Option<HrRecords>>>,
}

impl RecordStore for InMemoryRecordStore {
    fn load(&self) -> Result<Option<HrRecords>, StoreError> {
        let guard = self
            .document
            .lock()
            .map_err(|_| StoreError::Unavailable("record mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, records: &HrRecords) -> Result<(), StoreError> {
        let mut guard = self
            .document
            .lock()
            .map_err(|_| StoreError::Unavailable("record mutex poisoned".to_string()))?;
        *guard = Some(records.clone());
        Ok(())
    }
}

/// Single JSON document on disk. Writes go to a sibling temp file that is renamed over
/// the target, so readers never observe a half-written document.
#[derive(Debug, Clone)]
pub(crate) struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "records.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self) -> Result<Option<HrRecords>, StoreError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    fn save(&self, records: &HrRecords) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let body = serde_json::to_vec_pretty(records)?;
        let tmp_path = self.temp_path();
        fs::write(&tmp_path, body)?;
        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err.into());
        }
        Ok(())
    }
}

/// Store chosen at startup from configuration.
#[derive(Clone)]
pub(crate) enum ConfiguredStore {
    Memory(InMemoryRecordStore),
    File(JsonFileStore),
}

impl ConfiguredStore {
    pub(crate) fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => Self::File(JsonFileStore::new(path)),
            None => Self::Memory(InMemoryRecordStore::default()),
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Memory(_) => "memory".to_string(),
            Self::File(store) => store.path().display().to_string(),
        }
    }
}

impl RecordStore for ConfiguredStore {
    fn load(&self) -> Result<Option<HrRecords>, StoreError> {
        match self {
            Self::Memory(store) => store.load(),
            Self::File(store) => store.load(),
        }
    }

    fn save(&self, records: &HrRecords) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.save(records),
            Self::File(store) => store.save(records),
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
