//! Configuration file and presets support.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Main configuration structure.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default CLI options.
    pub defaults: Defaults,
    /// User-defined presets.
    #[serde(default)]
    pub presets: HashMap<String, Preset>,
}

/// Default CLI options.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Enable verbose output by default.
    pub verbose: bool,
    /// Enable quiet output by default.
    pub quiet: bool,
    /// Default output format.
    pub format: Option<String>,
    /// Default quality in percent (0-100).
    pub quality: Option<u8>,
    /// Archive batches with more images than this.
    pub archive_threshold: Option<usize>,
    /// Folder inside the archive; empty string for a flat archive.
    pub archive_folder: Option<String>,
}

// ============================================================================
// Preset
// ============================================================================

/// A preset is a bundle of conversion options.
///
/// ```toml
/// [presets.thumbs]
/// format = "webp"
/// mode = "archive"
/// ```
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Preset {
    pub format: Option<String>,
    /// Quality in percent (0-100).
    pub quality: Option<u8>,
    /// "archive" or "individual".
    pub mode: Option<String>,
}

impl Preset {
    /// Merge another preset into this one (other takes precedence).
    pub fn merge(&mut self, other: &Preset) {
        if other.format.is_some() {
            self.format = other.format.clone();
        }
        if other.quality.is_some() {
            self.quality = other.quality;
        }
        if other.mode.is_some() {
            self.mode = other.mode.clone();
        }
    }
}

impl Config {
    /// Load config from the default location (~/.config/recast/config.toml).
    pub fn load() -> Self {
        Self::load_from_path(Self::default_path())
    }

    /// Load config from a specific path.
    pub fn load_from_path(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                eprintln!("Warning: Failed to parse config file: {}", e);
                Self::default()
            }),
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Get the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        config_dir().map(|p| p.join("config.toml"))
    }

    /// Get a preset by name (user-defined or built-in).
    ///
    /// A user preset with a built-in name overrides only the fields it sets.
    pub fn get_preset(&self, name: &str) -> Option<Preset> {
        match (builtin_preset(name), self.presets.get(name)) {
            (Some(mut base), Some(user)) => {
                base.merge(user);
                Some(base)
            }
            (Some(base), None) => Some(base),
            (None, user) => user.cloned(),
        }
    }
}

/// `~/.config/recast`
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("recast"))
}

/// Built-in presets.
fn builtin_preset(name: &str) -> Option<Preset> {
    match name {
        "web" => Some(Preset {
            format: Some("webp".into()),
            ..Default::default()
        }),
        "photo" => Some(Preset {
            format: Some("jpeg".into()),
            quality: Some(85),
            ..Default::default()
        }),
        "lossless" => Some(Preset {
            format: Some("png".into()),
            ..Default::default()
        }),
        "bundle" => Some(Preset {
            mode: Some("archive".into()),
            ..Default::default()
        }),
        _ => None,
    }
}

/// Built-in presets with descriptions.
pub fn list_presets() -> Vec<(&'static str, &'static str)> {
    vec![
        ("web", "WebP output"),
        ("photo", "JPEG at 85% quality"),
        ("lossless", "PNG output"),
        ("bundle", "Always deliver a zip archive"),
    ]
}
