//! Preferences persisted as a small TOML table.

use recast_core::{PreferenceError, PreferenceStore};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// String preferences backed by a TOML file, written through on every set.
#[derive(Debug)]
pub struct TomlPreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl TomlPreferences {
    /// Open the store at `path`; a missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, PreferenceError> {
        let path = path.into();
        let values = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| PreferenceError::Read(format!("{}: {}", path.display(), e)))?;
            toml::from_str(&contents)
                .map_err(|e| PreferenceError::Read(format!("{}: {}", path.display(), e)))?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `~/.config/recast/preferences.toml`
    pub fn default_path() -> Option<PathBuf> {
        crate::config::config_dir().map(|p| p.join("preferences.toml"))
    }

    fn save(&self) -> Result<(), PreferenceError> {
        let write_err = |e: &dyn std::fmt::Display| {
            PreferenceError::Write(format!("{}: {}", self.path.display(), e))
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| write_err(&e))?;
        }
        let contents = toml::to_string(&self.values).map_err(|e| write_err(&e))?;
        std::fs::write(&self.path, contents).map_err(|e| write_err(&e))
    }
}

impl PreferenceStore for TomlPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }
}

/// Best guess at a dark terminal background.
pub fn system_prefers_dark() -> bool {
    colorfgbg_is_dark(std::env::var("COLORFGBG").ok().as_deref())
}

/// `COLORFGBG` is `fg;bg` (sometimes `fg;x;bg`); ANSI backgrounds 0-6 and 8 are dark.
fn colorfgbg_is_dark(value: Option<&str>) -> bool {
    value
        .and_then(|v| v.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok())
        .is_some_and(|bg| bg <= 6 || bg == 8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recast_core::{THEME_KEY, Theme};

    #[test]
    fn test_missing_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = TomlPreferences::load(tmp.path().join("prefs.toml")).unwrap();
        assert_eq!(store.get(THEME_KEY), None);
    }

    #[test]
    fn test_set_writes_through() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sub/prefs.toml");

        let mut store = TomlPreferences::load(&path).unwrap();
        Theme::Dark.save(&mut store).unwrap();

        let reopened = TomlPreferences::load(&path).unwrap();
        assert_eq!(Theme::load(&reopened, false), Theme::Dark);
    }

    #[test]
    fn test_corrupt_file_is_read_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("prefs.toml");
        std::fs::write(&path, "theme = [").unwrap();
        assert!(matches!(
            TomlPreferences::load(&path),
            Err(PreferenceError::Read(_))
        ));
    }

    #[test]
    fn test_colorfgbg() {
        assert!(colorfgbg_is_dark(Some("15;0")));
        assert!(colorfgbg_is_dark(Some("15;default;8")));
        assert!(!colorfgbg_is_dark(Some("0;15")));
        assert!(!colorfgbg_is_dark(Some("garbage")));
        assert!(!colorfgbg_is_dark(None));
    }
}
