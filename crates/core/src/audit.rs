use std::collections::{BTreeMap, HashMap};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LockResult, Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ApplicationError, DomainError};
use crate::serializer::canonicalize_payload;

pub const LOG_FILE_EXTENSION: &str = "log";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub log_id: String,
    pub recorded_at: DateTime<Utc>,
    pub payload: String,
}

impl AuditEntry {
    pub fn new(log_id: impl Into<String>, payload: &str) -> Self {
        Self {
            log_id: log_id.into(),
            recorded_at: Utc::now().trunc_subsecs(6),
            payload: canonicalize_payload(payload),
        }
    }

    pub fn timestamp(&self) -> String {
        self.recorded_at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// `[<timestamp>] <payload>` terminated by a newline.
    pub fn to_line(&self) -> String {
        format!("[{}] {}\n", self.timestamp(), self.payload)
    }

    pub fn parse_line(log_id: &str, line: &str) -> Result<Self, DomainError> {
        let malformed = || DomainError::InvalidInput(format!("malformed audit line: `{line}`"));

        let rest = line.strip_prefix('[').ok_or_else(malformed)?;
        let (timestamp, payload) = rest.split_once("] ").ok_or_else(malformed)?;
        if !timestamp.ends_with('Z') {
            return Err(malformed());
        }
        let recorded_at = DateTime::parse_from_rfc3339(timestamp)
            .map_err(|_| malformed())?
            .with_timezone(&Utc);

        Ok(Self { log_id: log_id.to_string(), recorded_at, payload: payload.to_string() })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuditReceipt {
    pub entry: AuditEntry,
    pub location: String,
}

#[derive(Serialize)]
struct Confirmation<'a> {
    status: &'static str,
    log_id: &'a str,
    path: &'a str,
    recorded_at: String,
}

impl AuditReceipt {
    /// `{"status":"ok","log_id":..,"path":..,"recorded_at":..}`
    pub fn to_confirmation_json(&self) -> Result<String, ApplicationError> {
        let confirmation = Confirmation {
            status: "ok",
            log_id: &self.entry.log_id,
            path: &self.location,
            recorded_at: self.entry.timestamp(),
        };
        serde_json::to_string(&confirmation)
            .map_err(|error| ApplicationError::Serialization(error.to_string()))
    }
}

pub trait AuditLog: Send + Sync {
    fn append(&self, log_id: &str, payload: &str) -> Result<AuditReceipt, ApplicationError>;

    fn entries(&self, log_id: &str) -> Result<Vec<AuditEntry>, ApplicationError>;
}

/// One append-only file per log id under `base_dir`.
#[derive(Debug)]
pub struct FileAuditLog {
    base_dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FileAuditLog {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into(), locks: Mutex::new(HashMap::new()) }
    }

    pub fn path_for(&self, log_id: &str) -> Result<PathBuf, ApplicationError> {
        validate_log_id(log_id).map_err(|reason| {
            ApplicationError::storage(self.base_dir.join(log_id), reason)
        })?;
        Ok(self.base_dir.join(format!("{log_id}.{LOG_FILE_EXTENSION}")))
    }

    fn lock_for(&self, log_id: &str) -> Arc<Mutex<()>> {
        let mut locks = recover(self.locks.lock());
        locks.entry(log_id.to_string()).or_default().clone()
    }

    /// Drops the per-id lock once no other writer holds or waits on it.
    fn release_lock(&self, log_id: &str) {
        let mut locks = recover(self.locks.lock());
        if locks.get(log_id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(log_id);
        }
    }

    fn write_entry(
        &self,
        log_id: &str,
        path: &Path,
        payload: &str,
    ) -> Result<AuditReceipt, ApplicationError> {
        fs::create_dir_all(&self.base_dir).map_err(|error| {
            ApplicationError::storage(&self.base_dir, format!("could not create directory: {error}"))
        })?;

        let entry = AuditEntry::new(log_id, payload);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|error| ApplicationError::storage(path, format!("could not open: {error}")))?;
        file.write_all(entry.to_line().as_bytes())
            .and_then(|()| file.flush())
            .map_err(|error| ApplicationError::storage(path, format!("could not append: {error}")))?;

        tracing::info!(
            event_name = "audit.entry_appended",
            log_id = %log_id,
            path = %path.display(),
            recorded_at = %entry.timestamp(),
            "audit entry appended"
        );

        Ok(AuditReceipt { entry, location: path.display().to_string() })
    }
}

impl AuditLog for FileAuditLog {
    fn append(&self, log_id: &str, payload: &str) -> Result<AuditReceipt, ApplicationError> {
        let path = self.path_for(log_id)?;
        let lock = self.lock_for(log_id);
        let result = {
            let _guard = recover(lock.lock());
            self.write_entry(log_id, &path, payload)
        };
        drop(lock);
        self.release_lock(log_id);
        result
    }

    fn entries(&self, log_id: &str) -> Result<Vec<AuditEntry>, ApplicationError> {
        let path = self.path_for(log_id)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == IoErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => {
                return Err(ApplicationError::storage(&path, format!("could not read: {error}")))
            }
        };

        raw.lines()
            .filter(|line| !line.is_empty())
            .map(|line| AuditEntry::parse_line(log_id, line).map_err(ApplicationError::from))
            .collect()
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryAuditLog {
    entries: Arc<Mutex<BTreeMap<String, Vec<AuditEntry>>>>,
}

impl AuditLog for InMemoryAuditLog {
    fn append(&self, log_id: &str, payload: &str) -> Result<AuditReceipt, ApplicationError> {
        validate_log_id(log_id)
            .map_err(|reason| ApplicationError::storage(format!("memory://{log_id}"), reason))?;

        let mut entries = recover(self.entries.lock());
        let entry = AuditEntry::new(log_id, payload);
        entries.entry(log_id.to_string()).or_default().push(entry.clone());

        Ok(AuditReceipt { entry, location: format!("memory://{log_id}") })
    }

    fn entries(&self, log_id: &str) -> Result<Vec<AuditEntry>, ApplicationError> {
        Ok(recover(self.entries.lock()).get(log_id).cloned().unwrap_or_default())
    }
}

fn validate_log_id(log_id: &str) -> Result<(), String> {
    if log_id.trim().is_empty() {
        return Err("log id must not be empty".to_string());
    }
    if log_id.contains(['/', '\\']) || log_id.contains("..") {
        return Err(format!("log id `{log_id}` must not contain path separators or `..`"));
    }
    if log_id.chars().any(char::is_control) {
        return Err("log id must not contain control characters".to_string());
    }
    Ok(())
}

fn recover<'a, T>(result: LockResult<MutexGuard<'a, T>>) -> MutexGuard<'a, T> {
    match result {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
