//! Editor settings (code, language, font size) with explicit persistence.
//!
//! Settings are loaded once from a [`KeyValueStore`] and every change made
//! through [`StateStore::update`] is written back and broadcast to
//! subscribers.

use crate::error::StateError;
use crate::ir::{FontSize, normalize_tabs};
use crate::language::DEFAULT_LANGUAGE;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const KEY_CODE: &str = "code";
pub const KEY_LANGUAGE: &str = "language";
pub const KEY_FONT_SIZE: &str = "fontSize";

pub const SAMPLE_CODE: &str = "function fibonacci(n) {
  if (n <= 1) return n;
  return fibonacci(n - 1) + fibonacci(n - 2);
}

const result = fibonacci(10);
console.log(result);";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StateError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StateError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Flat JSON object on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonFileStore {
    /// Opens the store; a missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self, StateError> {
        let values = match std::fs::read_to_string(path) {
            Ok(contents) if contents.trim().is_empty() => Map::new(),
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| StateError::Format {
                path: path.to_path_buf(),
                source,
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(source) => {
                return Err(StateError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    fn flush(&self) -> Result<(), StateError> {
        let io_err = |source| StateError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let contents = serde_json::to_string_pretty(&self.values).map_err(|source| StateError::Format {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, contents).map_err(io_err)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StateError> {
        self.values
            .insert(key.to_string(), Value::String(value.to_string()));
        self.flush()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub code: String,
    pub language: String,
    /// Raw user text; clamped by [`Settings::font_size`].
    pub font_size: String,
}

impl Settings {
    pub fn font_size(&self) -> FontSize {
        FontSize::parse_lenient(&self.font_size)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            code: SAMPLE_CODE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            font_size: FontSize::DEFAULT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&Settings) + Send>;

pub struct StateStore<S: KeyValueStore> {
    store: S,
    settings: Settings,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl<S: KeyValueStore> StateStore<S> {
    pub fn load(store: S) -> Self {
        let defaults = Settings::default();
        let settings = Settings {
            code: store
                .get(KEY_CODE)
                .map(|code| normalize_tabs(&code))
                .unwrap_or(defaults.code),
            language: store.get(KEY_LANGUAGE).unwrap_or(defaults.language),
            font_size: store.get(KEY_FONT_SIZE).unwrap_or(defaults.font_size),
        };
        Self {
            store,
            settings,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Applies `f`, persists the keys that changed and notifies subscribers.
    /// Returns whether anything changed. Persistence failures are returned
    /// after the in-memory state and subscribers have been updated.
    pub fn update(&mut self, f: impl FnOnce(&mut Settings)) -> Result<bool, StateError> {
        let before = self.settings.clone();
        f(&mut self.settings);
        self.settings.code = normalize_tabs(&self.settings.code);
        if self.settings == before {
            return Ok(false);
        }

        let mut result = Ok(());
        let changes = [
            (KEY_CODE, before.code != self.settings.code, &self.settings.code),
            (
                KEY_LANGUAGE,
                before.language != self.settings.language,
                &self.settings.language,
            ),
            (
                KEY_FONT_SIZE,
                before.font_size != self.settings.font_size,
                &self.settings.font_size,
            ),
        ];
        for (key, changed, value) in changes {
            if changed {
                if let Err(err) = self.store.set(key, value) {
                    tracing::warn!(%key, %err, "failed to persist setting");
                    result = Err(err);
                }
            }
        }

        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.settings);
        }
        result.map(|()| true)
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&Settings) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn empty_store_loads_defaults() {
        let state = StateStore::load(MemoryStore::new());
        assert_eq!(state.get(), &Settings::default());
        assert_eq!(state.get().font_size().px(), 11);
    }

    #[test]
    fn update_persists_only_changed_keys() {
        let mut state = StateStore::load(MemoryStore::new());
        let changed = state
            .update(|s| s.language = "rust".to_string())
            .unwrap();
        assert!(changed);
        assert_eq!(state.store().get(KEY_LANGUAGE).as_deref(), Some("rust"));
        assert_eq!(state.store().get(KEY_CODE), None);

        let changed = state.update(|s| s.language = "rust".to_string()).unwrap();
        assert!(!changed);
    }

    #[test]
    fn code_updates_normalize_tabs() {
        let mut state = StateStore::load(MemoryStore::new());
        state.update(|s| s.code = "\tx".to_string()).unwrap();
        assert_eq!(state.get().code, "    x");
        assert_eq!(state.store().get(KEY_CODE).as_deref(), Some("    x"));
    }

    #[test]
    fn subscribers_see_each_change_until_unsubscribed() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut state = StateStore::load(MemoryStore::new());
        let sink = Arc::clone(&seen);
        let id = state.subscribe(move |s| sink.lock().unwrap().push(s.font_size.clone()));

        state.update(|s| s.font_size = "14".to_string()).unwrap();
        state.update(|s| s.font_size = "14".to_string()).unwrap();
        assert!(state.unsubscribe(id));
        state.update(|s| s.font_size = "16".to_string()).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["14".to_string()]);
        assert!(!state.unsubscribe(id));
    }

    #[test]
    fn json_file_store_round_trips_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        {
            let mut state = StateStore::load(JsonFileStore::open(&path).unwrap());
            state
                .update(|s| {
                    s.code = "print(1)".to_string();
                    s.language = "python".to_string();
                    s.font_size = "abc".to_string();
                })
                .unwrap();
        }
        let state = StateStore::load(JsonFileStore::open(&path).unwrap());
        assert_eq!(state.get().code, "print(1)");
        assert_eq!(state.get().language, "python");
        assert_eq!(state.get().font_size, "abc");
        assert_eq!(state.get().font_size().px(), 11);
    }

    #[test]
    fn json_file_store_accepts_numeric_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{ "fontSize": 18 }"#).unwrap();
        let state = StateStore::load(JsonFileStore::open(&path).unwrap());
        assert_eq!(state.get().font_size().px(), 18);
    }

    #[test]
    fn corrupt_state_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StateError::Format { .. })
        ));
    }
}
