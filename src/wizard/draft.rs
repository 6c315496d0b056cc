//! Persistent draft storage.
//!
//! The draft lives in a client-local key-value store under two well-known
//! keys: the serialized form and the current step. They are written together
//! and cleared together, and only the wizard controller ever writes them.
//! Writes are debounced through [`DraftScheduler`] so a burst of edits
//! produces one trailing write of the latest snapshot.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::debug;

use super::domain::{ApplicationForm, WizardStep};

pub const DRAFT_KEY: &str = "dv_form_draft";
pub const STEP_KEY: &str = "dv_form_step";

#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("draft store unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("draft payload is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("persisted draft is corrupt: {0}")]
    Corrupt(String),
}

/// Client-local key-value storage, string keys to string values.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, DraftError>;
    fn put(&mut self, key: &str, value: &str) -> Result<(), DraftError>;
    fn remove(&mut self, key: &str) -> Result<(), DraftError>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: BTreeMap<String, String>,
}

impl MemoryKvStore {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, DraftError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), DraftError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), DraftError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// File-backed store: one JSON object per file, surviving reloads.
#[derive(Debug)]
pub struct FileKvStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileKvStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DraftError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, entries })
    }

    fn persist(&self) -> Result<(), DraftError> {
        let raw = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, DraftError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), DraftError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), DraftError> {
        self.entries.remove(key);
        self.persist()
    }
}

/// The controller-facing draft API over any key-value store.
#[derive(Debug)]
pub struct DraftStore<K: KeyValueStore> {
    inner: K,
}

impl<K: KeyValueStore> DraftStore<K> {
    pub fn new(inner: K) -> Self {
        Self { inner }
    }

    pub fn save(&mut self, form: &ApplicationForm) -> Result<(), DraftError> {
        let payload = serde_json::to_string(form)?;
        self.inner.put(DRAFT_KEY, &payload)?;
        self.inner
            .put(STEP_KEY, &form.current_step.index().to_string())?;
        Ok(())
    }

    /// Read the persisted draft, if any. The step key wins over the step
    /// recorded inside the form blob, falling back to step 1 when it is
    /// unreadable.
    pub fn load(&self) -> Result<Option<ApplicationForm>, DraftError> {
        let Some(raw) = self.inner.get(DRAFT_KEY)? else {
            return Ok(None);
        };
        let mut form: ApplicationForm = serde_json::from_str(&raw)
            .map_err(|err| DraftError::Corrupt(err.to_string()))?;

        if let Some(raw_step) = self.inner.get(STEP_KEY)? {
            form.current_step = raw_step
                .trim()
                .parse::<u8>()
                .ok()
                .and_then(WizardStep::from_index)
                .unwrap_or(WizardStep::PersonalInfo);
        }
        Ok(Some(form))
    }

    /// Remove both keys together; called only on confirmed submission.
    pub fn clear(&mut self) -> Result<(), DraftError> {
        self.inner.remove(DRAFT_KEY)?;
        self.inner.remove(STEP_KEY)?;
        Ok(())
    }

    pub fn into_inner(self) -> K {
        self.inner
    }
}

/// Trailing-edge debounce for draft writes. Each edit replaces the pending
/// snapshot and restarts the delay; only the most recent snapshot inside the
/// window is ever written (last write wins).
#[derive(Debug)]
pub struct DraftScheduler {
    delay: Duration,
    pending: Option<PendingWrite>,
}

#[derive(Debug)]
struct PendingWrite {
    due: Instant,
    form: ApplicationForm,
}

impl DraftScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Record an edit: supersedes any pending write and restarts the timer.
    pub fn mark_dirty(&mut self, snapshot: ApplicationForm, now: Instant) {
        self.pending = Some(PendingWrite {
            due: now + self.delay,
            form: snapshot,
        });
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Write the pending snapshot if its delay has elapsed. Returns whether a
    /// write happened.
    pub fn flush_due<K: KeyValueStore>(
        &mut self,
        now: Instant,
        store: &mut DraftStore<K>,
    ) -> Result<bool, DraftError> {
        match &self.pending {
            Some(pending) if pending.due <= now => {}
            _ => return Ok(false),
        }
        self.flush_now(store)
    }

    /// Write the pending snapshot immediately, regardless of the timer.
    pub fn flush_now<K: KeyValueStore>(
        &mut self,
        store: &mut DraftStore<K>,
    ) -> Result<bool, DraftError> {
        let Some(pending) = self.pending.take() else {
            return Ok(false);
        };
        store.save(&pending.form)?;
        debug!(form_id = %pending.form.form_id.0, "draft persisted");
        Ok(true)
    }

    /// Drop any pending write without persisting it (used after the draft is
    /// cleared on submission).
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
