//! Theme preference, the only value persisted between sessions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key the theme is stored under.
pub const THEME_KEY: &str = "theme";

/// Persistent string key/value storage.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error("failed to read preferences: {0}")]
    Read(String),

    #[error("failed to write preferences: {0}")]
    Write(String),
}

/// In-memory store, for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: IndexMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Stored theme, or the system preference when nothing valid is stored.
    pub fn load(store: &dyn PreferenceStore, system_prefers_dark: bool) -> Self {
        store
            .get(THEME_KEY)
            .as_deref()
            .and_then(Theme::parse)
            .unwrap_or(if system_prefers_dark {
                Theme::Dark
            } else {
                Theme::Light
            })
    }

    /// Persist this theme.
    pub fn save(self, store: &mut dyn PreferenceStore) -> Result<(), PreferenceError> {
        store.set(THEME_KEY, self.as_str())
    }

    /// Flip the current theme and persist the result.
    pub fn toggle(
        store: &mut dyn PreferenceStore,
        system_prefers_dark: bool,
    ) -> Result<Self, PreferenceError> {
        let next = Theme::load(store, system_prefers_dark).toggled();
        next.save(store)?;
        Ok(next)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falls_back_to_system() {
        let store = MemoryStore::new();
        assert_eq!(Theme::load(&store, true), Theme::Dark);
        assert_eq!(Theme::load(&store, false), Theme::Light);
    }

    #[test]
    fn test_stored_value_wins() {
        let mut store = MemoryStore::new();
        store.set(THEME_KEY, "light").unwrap();
        assert_eq!(Theme::load(&store, true), Theme::Light);
    }

    #[test]
    fn test_garbage_value_ignored() {
        let mut store = MemoryStore::new();
        store.set(THEME_KEY, "solarized").unwrap();
        assert_eq!(Theme::load(&store, true), Theme::Dark);
    }

    #[test]
    fn test_toggle_persists() {
        let mut store = MemoryStore::new();
        assert_eq!(Theme::toggle(&mut store, false).unwrap(), Theme::Dark);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("dark"));
        assert_eq!(Theme::toggle(&mut store, false).unwrap(), Theme::Light);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));
    }
}
