//! Image codec backend for Recast.
//!
//! Implements intake probing and batch encoding with the `image` crate.
//! Enable formats via feature flags.
//!
//! # Features
//!
//! ## Lossless formats
//! - `png` (default) - Portable Network Graphics
//! - `gif` (default) - Graphics Interchange Format
//! - `bmp` - Windows Bitmap
//! - `tiff` - Tagged Image File Format
//!
//! ## Lossy formats
//! - `jpeg` (default) - JPEG, honours the quality factor
//!
//! ## Other
//! - `webp` (default) - WebP, encoded losslessly
//!
//! ## Feature group
//! - `all` - All image formats

#[cfg(feature = "jpeg")]
use image::codecs::jpeg::JpegEncoder;
#[cfg(feature = "jpeg")]
use image::{Rgb, RgbImage};
use image::{DynamicImage, ImageError, ImageFormat, RgbaImage};
use recast_core::{
    Dimensions, EncodeError, Encoder, ImageEntry, OutputFormat, Probe, ProbeError, Quality,
};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Probe and encoder backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl ImageCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Probe for ImageCodec {
    fn probe(&self, data: &[u8]) -> Result<Dimensions, ProbeError> {
        // Full decode: a readable header alone does not prove the image loads.
        let img = image::load_from_memory(data).map_err(|e| match e {
            ImageError::Unsupported(u) => ProbeError::Unsupported(u.to_string()),
            other => ProbeError::Decode(other.to_string()),
        })?;
        Ok(Dimensions::new(img.width(), img.height()))
    }
}

impl Encoder for ImageCodec {
    fn encode(
        &self,
        entry: &ImageEntry,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, EncodeError> {
        let target = image_format(format).ok_or(EncodeError::Unsupported(format))?;

        let source = image::load_from_memory(entry.bytes())
            .map_err(|e| EncodeError::Decode(e.to_string()))?;
        let surface = draw(&source);

        let output = encode_surface(surface, target, quality)?;
        debug!(
            name = entry.name(),
            %format,
            bytes_in = entry.size(),
            bytes_out = output.len(),
            "encoded"
        );
        Ok(output)
    }
}

/// Draw the image onto a fresh RGBA surface of its natural size.
fn draw(source: &DynamicImage) -> RgbaImage {
    source.to_rgba8()
}

fn encode_surface(
    surface: RgbaImage,
    target: ImageFormat,
    quality: Quality,
) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Cursor::new(Vec::new());

    match target {
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => {
            let rgb = flatten_onto_black(&surface);
            JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality))
                .encode_image(&rgb)
                .map_err(|e| EncodeError::Failed(format!("JPEG: {}", e)))?;
        }
        _ => {
            // Lossless targets ignore quality.
            let _ = quality;
            DynamicImage::ImageRgba8(surface)
                .write_to(&mut buf, target)
                .map_err(|e| EncodeError::Failed(format!("{:?}: {}", target, e)))?;
        }
    }

    Ok(buf.into_inner())
}

/// JPEG has no alpha; transparent pixels come out black.
#[cfg(feature = "jpeg")]
fn flatten_onto_black(surface: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(surface.width(), surface.height(), |x, y| {
        let [r, g, b, a] = surface.get_pixel(x, y).0;
        let scale = |c: u8| ((u16::from(c) * u16::from(a) + 127) / 255) as u8;
        Rgb([scale(r), scale(g), scale(b)])
    })
}

/// Map a 0.0-1.0 quality factor onto the JPEG encoder's 1-100 scale.
pub fn jpeg_quality(quality: Quality) -> u8 {
    (quality.value() * 100.0).round().clamp(1.0, 100.0) as u8
}

/// `image` format for an output format, if its feature is enabled.
pub fn image_format(format: OutputFormat) -> Option<ImageFormat> {
    match format {
        #[cfg(feature = "jpeg")]
        OutputFormat::Jpeg => Some(ImageFormat::Jpeg),
        #[cfg(feature = "png")]
        OutputFormat::Png => Some(ImageFormat::Png),
        #[cfg(feature = "webp")]
        OutputFormat::WebP => Some(ImageFormat::WebP),
        #[cfg(feature = "gif")]
        OutputFormat::Gif => Some(ImageFormat::Gif),
        #[cfg(feature = "bmp")]
        OutputFormat::Bmp => Some(ImageFormat::Bmp),
        #[cfg(feature = "tiff")]
        OutputFormat::Tiff => Some(ImageFormat::Tiff),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

/// Output formats enabled in this build.
pub fn enabled_formats() -> Vec<OutputFormat> {
    OutputFormat::ALL
        .into_iter()
        .filter(|f| image_format(*f).is_some())
        .collect()
}

/// Media type from magic bytes.
pub fn sniff_media_type(data: &[u8]) -> Option<&'static str> {
    image::guess_format(data).ok().map(|f| f.to_mime_type())
}

/// Media type from the file extension.
pub fn media_type_for_path(path: &Path) -> Option<&'static str> {
    ImageFormat::from_path(path).ok().map(|f| f.to_mime_type())
}
