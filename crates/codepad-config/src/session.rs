/// Session persistence: the widget's code and view state across page loads.
///
/// Each widget instance owns one record keyed by its id. Record metadata
/// (language, toggles) is stored in a redb table as bincode; the code is
/// stored as raw `&str` in a separate table so large buffers and special
/// characters need no escaping.
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use redb::{Database, ReadableDatabase, TableDefinition};
use serde::{Deserialize, Serialize};

/// Widget metadata table: widget id → bincode(`RecordMeta`).
const WIDGET_META: TableDefinition<&str, &[u8]> = TableDefinition::new("widget_meta");

/// Widget code table: widget id → raw text.
const WIDGET_CODE: TableDefinition<&str, &str> = TableDefinition::new("widget_code");

/// Everything a widget persists between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetRecord {
    pub code: String,
    /// Language tag; validated by the widget on load.
    pub language: String,
    pub dark_mode: bool,
    pub word_wrap: bool,
    pub show_line_numbers: bool,
}

/// The part of a record stored next to the code.
#[derive(Debug, Serialize, Deserialize)]
struct RecordMeta {
    language: String,
    dark_mode: bool,
    word_wrap: bool,
    show_line_numbers: bool,
}

/// An external key/value store holding one widget's record.
///
/// Widgets treat every call as best-effort: errors are logged and the
/// in-memory state stays authoritative.
pub trait SessionBackend {
    /// Opens the underlying store. Other calls fail until this succeeds.
    fn connect(&mut self) -> Result<()>;

    /// Loads the record, or `None` if nothing was saved yet.
    fn get_data(&self) -> Result<Option<WidgetRecord>>;

    /// Saves the record, replacing any previous one.
    fn set_data(&self, record: &WidgetRecord) -> Result<()>;
}

/// Session store backed by a redb database file.
pub struct SessionStore {
    path: PathBuf,
    widget_id: String,
    db: Option<Database>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("path", &self.path)
            .field("widget_id", &self.widget_id)
            .field("connected", &self.db.is_some())
            .finish()
    }
}

impl SessionStore {
    /// Creates an unconnected store for `widget_id` at `path`.
    pub fn new(path: impl Into<PathBuf>, widget_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            widget_id: widget_id.into(),
            db: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn widget_id(&self) -> &str {
        &self.widget_id
    }

    fn db(&self) -> Result<&Database> {
        self.db
            .as_ref()
            .context("Session store is not connected")
    }

    /// Removes this widget's record.
    pub fn delete(&self) -> Result<()> {
        let write_txn = self
            .db()?
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut meta = write_txn
                .open_table(WIDGET_META)
                .context("Failed to open widget_meta table")?;
            meta.remove(self.widget_id.as_str())
                .context("Failed to remove widget metadata")?;
            let mut code = write_txn
                .open_table(WIDGET_CODE)
                .context("Failed to open widget_code table")?;
            code.remove(self.widget_id.as_str())
                .context("Failed to remove widget code")?;
        }
        write_txn
            .commit()
            .context("Failed to commit record deletion")?;
        Ok(())
    }
}

impl SessionBackend for SessionStore {
    fn connect(&mut self) -> Result<()> {
        if self.db.is_some() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let db = Database::create(&self.path).with_context(|| {
            format!("Failed to open session database: {}", self.path.display())
        })?;

        // Ensure tables exist
        let write_txn = db
            .begin_write()
            .context("Failed to begin initial session write transaction")?;
        {
            let _ = write_txn
                .open_table(WIDGET_META)
                .context("Failed to create widget_meta table")?;
            let _ = write_txn
                .open_table(WIDGET_CODE)
                .context("Failed to create widget_code table")?;
        }
        write_txn
            .commit()
            .context("Failed to commit initial session transaction")?;

        self.db = Some(db);
        Ok(())
    }

    fn get_data(&self) -> Result<Option<WidgetRecord>> {
        let read_txn = self
            .db()?
            .begin_read()
            .context("Failed to begin read transaction")?;
        let meta_table = read_txn
            .open_table(WIDGET_META)
            .context("Failed to open widget_meta table")?;
        let Some(guard) = meta_table
            .get(self.widget_id.as_str())
            .context("Failed to read widget metadata")?
        else {
            return Ok(None);
        };
        let meta: RecordMeta =
            bincode::deserialize(guard.value()).context("Failed to deserialize widget metadata")?;

        let code_table = read_txn
            .open_table(WIDGET_CODE)
            .context("Failed to open widget_code table")?;
        let code = code_table
            .get(self.widget_id.as_str())
            .context("Failed to read widget code")?
            .map(|g| g.value().to_string())
            .unwrap_or_default();

        Ok(Some(WidgetRecord {
            code,
            language: meta.language,
            dark_mode: meta.dark_mode,
            word_wrap: meta.word_wrap,
            show_line_numbers: meta.show_line_numbers,
        }))
    }

    fn set_data(&self, record: &WidgetRecord) -> Result<()> {
        let meta = RecordMeta {
            language: record.language.clone(),
            dark_mode: record.dark_mode,
            word_wrap: record.word_wrap,
            show_line_numbers: record.show_line_numbers,
        };
        let bytes = bincode::serialize(&meta).context("Failed to serialize widget metadata")?;

        let write_txn = self
            .db()?
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut meta_table = write_txn
                .open_table(WIDGET_META)
                .context("Failed to open widget_meta table")?;
            meta_table
                .insert(self.widget_id.as_str(), bytes.as_slice())
                .context("Failed to insert widget metadata")?;
            let mut code_table = write_txn
                .open_table(WIDGET_CODE)
                .context("Failed to open widget_code table")?;
            code_table
                .insert(self.widget_id.as_str(), record.code.as_str())
                .context("Failed to insert widget code")?;
        }
        write_txn
            .commit()
            .context("Failed to commit widget record")?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    record: Option<WidgetRecord>,
    connected: bool,
    fail_connect: bool,
    fail_load: bool,
    fail_save: bool,
    saves: usize,
}

/// In-process session store for hosts without disk access.
///
/// Clones share state, so a host can keep a handle to inspect or break the
/// store after handing it to a widget.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `record`.
    pub fn with_record(record: WidgetRecord) -> Self {
        let store = Self::default();
        store.lock().record = Some(record);
        store
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the currently stored record.
    pub fn record(&self) -> Option<WidgetRecord> {
        self.lock().record.clone()
    }

    /// Returns how many saves succeeded.
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    pub fn set_fail_connect(&self, fail: bool) {
        self.lock().fail_connect = fail;
    }

    pub fn set_fail_load(&self, fail: bool) {
        self.lock().fail_load = fail;
    }

    pub fn set_fail_save(&self, fail: bool) {
        self.lock().fail_save = fail;
    }
}

impl SessionBackend for MemorySessionStore {
    fn connect(&mut self) -> Result<()> {
        let mut state = self.lock();
        if state.fail_connect {
            anyhow::bail!("memory store refused connection");
        }
        state.connected = true;
        Ok(())
    }

    fn get_data(&self) -> Result<Option<WidgetRecord>> {
        let state = self.lock();
        if !state.connected {
            anyhow::bail!("Session store is not connected");
        }
        if state.fail_load {
            anyhow::bail!("memory store load failed");
        }
        Ok(state.record.clone())
    }

    fn set_data(&self, record: &WidgetRecord) -> Result<()> {
        let mut state = self.lock();
        if !state.connected {
            anyhow::bail!("Session store is not connected");
        }
        if state.fail_save {
            anyhow::bail!("memory store save failed");
        }
        state.record = Some(record.clone());
        state.saves += 1;
        Ok(())
    }
}
