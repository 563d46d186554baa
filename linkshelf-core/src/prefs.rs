//! Local preference persistence.
//!
//! Three keys are kept: the theme, the last annotated tree snapshot and the
//! time of the last accessibility pass. The file-backed store writes
//! `prefs.bin` in the config directory; if it cannot be opened or written,
//! the store degrades to an in-memory map for the rest of the session.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::warn;

use crate::binfmt::{deserialize_with_header, serialize_with_header};
use crate::config;
use crate::error::{CoreError, CoreResult};
use crate::theme::Theme;
use crate::tree::LinkTree;

pub const THEME_KEY: &str = "theme";
pub const RESOURCES_KEY: &str = "resources";
pub const LAST_CHECK_KEY: &str = "lastAccessibilityCheck";

const PREFS_MAGIC: [u8; 4] = *b"LSPF";
const PREFS_VERSION: u32 = 1;
const PREFS_FILE: &str = "prefs.bin";

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    /// Writes every pair as one commit.
    fn set_all(&mut self, pairs: Vec<(&str, String)>) -> CoreResult<()>;
    fn entries(&self) -> BTreeMap<String, String>;

    fn set(&mut self, key: &str, value: String) -> CoreResult<()> {
        self.set_all(vec![(key, value)])
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn with_entries(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set_all(&mut self, pairs: Vec<(&str, String)>) -> CoreResult<()> {
        for (key, value) in pairs {
            self.entries.insert(key.to_string(), value);
        }
        Ok(())
    }

    fn entries(&self) -> BTreeMap<String, String> {
        self.entries.clone()
    }
}

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens `path`, creating its directory. A missing file is an empty
    /// store; an undecodable one is discarded and rewritten on next save.
    pub fn open(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(CoreError::storage)?;
        }

        let entries = match fs::read(&path) {
            Ok(bytes) => deserialize_with_header(&bytes, PREFS_MAGIC, PREFS_VERSION)
                .unwrap_or_else(|err| {
                    warn!(path = %path.display(), %err, "discarding unreadable preferences");
                    BTreeMap::new()
                }),
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(CoreError::storage(err)),
        };

        Ok(Self { path, entries })
    }

    fn flush(&self) -> CoreResult<()> {
        let bytes = serialize_with_header(PREFS_MAGIC, PREFS_VERSION, &self.entries)?;
        let tmp_path = self.path.with_extension("bin.tmp");
        fs::write(&tmp_path, &bytes).map_err(CoreError::storage)?;
        fs::rename(&tmp_path, &self.path).map_err(CoreError::storage)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set_all(&mut self, pairs: Vec<(&str, String)>) -> CoreResult<()> {
        for (key, value) in pairs {
            self.entries.insert(key.to_string(), value);
        }
        self.flush()
    }

    fn entries(&self) -> BTreeMap<String, String> {
        self.entries.clone()
    }
}

pub struct PreferenceStore {
    backend: Box<dyn KeyValueStore>,
    degraded: bool,
}

impl PreferenceStore {
    pub fn default_path() -> Option<PathBuf> {
        config::config_dir().map(|dir| dir.join(PREFS_FILE))
    }

    /// File-backed store at `path`, or an in-memory one if the file store
    /// cannot be opened.
    pub fn open(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            warn!("no config directory; preferences will not persist");
            return Self {
                backend: Box::new(MemoryStore::default()),
                degraded: true,
            };
        };
        match FileStore::open(&path) {
            Ok(store) => Self::with_backend(Box::new(store)),
            Err(err) => {
                warn!(path = %path.display(), %err, "preferences unavailable; using memory");
                Self {
                    backend: Box::new(MemoryStore::default()),
                    degraded: true,
                }
            }
        }
    }

    pub fn in_memory() -> Self {
        Self::with_backend(Box::new(MemoryStore::default()))
    }

    pub fn with_backend(backend: Box<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            degraded: false,
        }
    }

    /// True once the store has fallen back to memory.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    fn get(&self, key: &str) -> Option<String> {
        self.backend.get(key)
    }

    fn set(&mut self, key: &str, value: String) {
        self.set_all(vec![(key, value)]);
    }

    fn set_all(&mut self, pairs: Vec<(&str, String)>) {
        let Err(err) = self.backend.set_all(pairs.clone()) else {
            return;
        };
        warn!(%err, "preference write failed; continuing in memory");
        let mut memory = MemoryStore::with_entries(self.backend.entries());
        let _ = memory.set_all(pairs);
        self.backend = Box::new(memory);
        self.degraded = true;
    }

    pub fn theme(&self) -> Option<Theme> {
        self.get(THEME_KEY).and_then(|value| Theme::parse(&value))
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.set(THEME_KEY, theme.as_str().to_string());
    }

    /// Last annotated snapshot. A snapshot that no longer parses is ignored.
    pub fn cached_tree(&self) -> Option<LinkTree> {
        let raw = self.get(RESOURCES_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(tree) => Some(tree),
            Err(err) => {
                warn!(%err, "ignoring unreadable cached tree");
                None
            }
        }
    }

    /// Epoch milliseconds of the last completed accessibility pass.
    pub fn last_accessibility_check(&self) -> Option<u64> {
        self.get(LAST_CHECK_KEY)?.trim().parse().ok()
    }

    pub fn store_snapshot(&mut self, tree: &LinkTree, checked_at: u64) -> CoreResult<()> {
        let json = serde_json::to_string(tree)?;
        self.set_all(vec![
            (RESOURCES_KEY, json),
            (LAST_CHECK_KEY, checked_at.to_string()),
        ]);
        Ok(())
    }
}
