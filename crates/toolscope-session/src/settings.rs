// crates/toolscope-session/src/settings.rs
// ============================================================================
// Module: Settings Store
// Description: Key-value settings persistence and the chat settings view.
// Purpose: Keep API key and model choice across sessions without globals.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! A tiny string key-value store behind a trait, with an in-memory
//! implementation for tests and a JSON-file implementation for real use.
//! [`ChatSettings`] is the typed view the chat feature needs: an optional API
//! key and a model name that falls back to a default. Chat stays disabled
//! until a key is stored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use serde_json::Value;
use thiserror::Error;

/// Model used when none has been stored.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Store key holding the chat API key.
pub const KEY_API_KEY: &str = "apiKey";

/// Store key holding the chat model name.
pub const KEY_MODEL: &str = "model";

// ============================================================================
// SECTION: Store Trait
// ============================================================================

/// Failure reading or writing the settings backing store.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Underlying file operation failed.
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The stored document could not be rendered.
    #[error("settings serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String key-value persistence.
pub trait SettingsStore: Send + Sync {
    /// Returns the stored value for `key`, when present.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError>;
}

// ============================================================================
// SECTION: Implementations
// ============================================================================

/// Volatile store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySettings {
    /// Current entries.
    entries: Mutex<BTreeMap<String, String>>,
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok().and_then(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

/// Store backed by a flat JSON object file.
///
/// Loading is tolerant: a missing or corrupt file starts empty rather than
/// failing. Every `set` rewrites the file.
#[derive(Debug)]
pub struct FileSettings {
    /// File the entries persist to.
    path: PathBuf,
    /// Current entries, mirrored from the file.
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileSettings {
    /// Loads settings from `path`, starting empty when unreadable.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let entries = std::fs::read_to_string(path)
            .ok()
            .and_then(|text| serde_json::from_str::<Value>(&text).ok())
            .and_then(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .map(|map| {
                map.into_iter()
                    .filter_map(|(key, value)| match value {
                        Value::String(text) => Some((key, text)),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { path: path.to_path_buf(), entries: Mutex::new(entries) }
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok().and_then(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let snapshot = {
            let Ok(mut entries) = self.entries.lock() else {
                return Ok(());
            };
            entries.insert(key.to_string(), value.to_string());
            entries.clone()
        };
        let rendered = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(&self.path, rendered)?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Chat Settings View
// ============================================================================

/// Typed view over the settings the chat feature uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSettings {
    /// Stored API key, when one has been configured.
    pub api_key: Option<String>,
    /// Model name, defaulting to [`DEFAULT_MODEL`].
    pub model: String,
}

impl ChatSettings {
    /// Reads the chat settings out of a store.
    #[must_use]
    pub fn load(store: &dyn SettingsStore) -> Self {
        Self {
            api_key: store.get(KEY_API_KEY).filter(|key| !key.is_empty()),
            model: store.get(KEY_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    /// Stores a new API key.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the store cannot be written.
    pub fn store_api_key(store: &dyn SettingsStore, api_key: &str) -> Result<(), SettingsError> {
        store.set(KEY_API_KEY, api_key)
    }

    /// Stores a new model name.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the store cannot be written.
    pub fn store_model(store: &dyn SettingsStore, model: &str) -> Result<(), SettingsError> {
        store.set(KEY_MODEL, model)
    }

    /// Returns whether chat can run: an API key is present.
    #[must_use]
    pub const fn chat_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}
