//! Output formats and encoder quality.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Target format for a conversion batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
    Gif,
    Bmp,
    Tiff,
}

impl OutputFormat {
    /// Every format the workflow knows about, in menu order.
    pub const ALL: [OutputFormat; 6] = [
        OutputFormat::Jpeg,
        OutputFormat::Png,
        OutputFormat::WebP,
        OutputFormat::Gif,
        OutputFormat::Bmp,
        OutputFormat::Tiff,
    ];

    /// Parse a format name or common alias (`jpg`, `tif`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "jpeg" | "jpg" | "image/jpeg" => Some(OutputFormat::Jpeg),
            "png" | "image/png" => Some(OutputFormat::Png),
            "webp" | "image/webp" => Some(OutputFormat::WebP),
            "gif" | "image/gif" => Some(OutputFormat::Gif),
            "bmp" | "image/bmp" => Some(OutputFormat::Bmp),
            "tiff" | "tif" | "image/tiff" => Some(OutputFormat::Tiff),
            _ => None,
        }
    }

    /// Short lowercase name, also used as the file extension.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
            OutputFormat::Gif => "gif",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Tiff => "tiff",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
            OutputFormat::Gif => "image/gif",
            OutputFormat::Bmp => "image/bmp",
            OutputFormat::Tiff => "image/tiff",
        }
    }

    /// Whether the quality factor changes the encoder output.
    ///
    /// WebP output from the native backend is lossless, so only JPEG
    /// honours quality.
    pub fn is_lossy(self) -> bool {
        matches!(self, OutputFormat::Jpeg)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Encoder quality factor in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Quality(f32);

impl Quality {
    /// Matches the usual canvas encoder default.
    pub const DEFAULT: Quality = Quality(0.92);

    /// Create a quality factor, clamped to `0.0..=1.0`. NaN maps to the default.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::DEFAULT;
        }
        Quality(value.clamp(0.0, 1.0))
    }

    /// Create from a percentage as shown on a slider (0-100).
    pub fn from_percent(percent: u8) -> Self {
        Self::new(f32::from(percent.min(100)) / 100.0)
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Rounded percentage, 0-100.
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round() as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}
