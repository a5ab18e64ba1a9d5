// SPDX-License-Identifier: GPL-3.0-only

//! Async collage encoding
//!
//! Encodes a composed strip to PNG (lossless, the default) or JPEG with a
//! quality preset, then saves it under a timestamped filename. Both stages
//! run on blocking tasks so the UI loop never stalls on CPU or disk work.

use crate::errors::{RenderError, RenderResult};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Supported strip output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollageFormat {
    /// PNG format (lossless)
    #[default]
    Png,
    /// JPEG format (lossy compression)
    Jpeg,
}

impl CollageFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            CollageFormat::Png => "png",
            CollageFormat::Jpeg => "jpg",
        }
    }
}

/// Encoding quality settings (JPEG only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollageQuality {
    /// Low quality (high compression)
    Low,
    /// Medium quality (balanced)
    Medium,
    /// High quality (low compression)
    #[default]
    High,
    /// Maximum quality (minimal compression)
    Maximum,
}

impl CollageQuality {
    /// All preset variants for UI iteration
    pub const ALL: [CollageQuality; 4] = [
        CollageQuality::Low,
        CollageQuality::Medium,
        CollageQuality::High,
        CollageQuality::Maximum,
    ];

    /// JPEG quality value (0-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            CollageQuality::Low => 60,
            CollageQuality::Medium => 80,
            CollageQuality::High => 92,
            CollageQuality::Maximum => 98,
        }
    }
}

/// Encoded strip ready for saving or delivery
#[derive(Debug, Clone)]
pub struct EncodedCollage {
    pub data: Vec<u8>,
    pub format: CollageFormat,
    pub width: u32,
    pub height: u32,
}

/// Strip encoder
#[derive(Debug, Clone)]
pub struct CollageEncoder {
    format: CollageFormat,
    quality: CollageQuality,
}

impl CollageEncoder {
    /// Create an encoder with PNG output
    pub fn new() -> Self {
        Self {
            format: CollageFormat::default(),
            quality: CollageQuality::default(),
        }
    }

    pub fn with_format(format: CollageFormat, quality: CollageQuality) -> Self {
        Self { format, quality }
    }

    pub fn format(&self) -> CollageFormat {
        self.format
    }

    /// Encode a composed strip asynchronously
    pub async fn encode(&self, image: RgbImage) -> RenderResult<EncodedCollage> {
        let format = self.format;
        let quality = self.quality;
        let (width, height) = image.dimensions();

        debug!(width, height, ?format, "Encoding strip");

        // CPU-bound: run off the UI thread
        let data = tokio::task::spawn_blocking(move || match format {
            CollageFormat::Png => encode_png(&image),
            CollageFormat::Jpeg => encode_jpeg(&image, quality),
        })
        .await
        .map_err(|e| RenderError::EncodingFailed(format!("encoding task: {}", e)))??;

        debug!(size = data.len(), "Encoding complete");

        Ok(EncodedCollage {
            data,
            format,
            width,
            height,
        })
    }

    /// Save an encoded strip under a timestamped filename
    pub async fn save(&self, encoded: EncodedCollage, output_dir: PathBuf) -> RenderResult<PathBuf> {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!("STRIP_{}.{}", timestamp, encoded.format.extension());
        let filepath = output_dir.join(&filename);

        info!(path = %filepath.display(), "Saving strip");

        let filepath_clone = filepath.clone();
        tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&output_dir)
                .map_err(|e| RenderError::SaveFailed(e.to_string()))?;
            std::fs::write(&filepath_clone, &encoded.data)
                .map_err(|e| RenderError::SaveFailed(e.to_string()))
        })
        .await
        .map_err(|e| RenderError::SaveFailed(format!("save task: {}", e)))??;

        info!(path = %filepath.display(), "Strip saved");
        Ok(filepath)
    }
}

impl Default for CollageEncoder {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_png(image: &RgbImage) -> RenderResult<Vec<u8>> {
    let mut buffer = Vec::new();
    image
        .write_to(
            &mut std::io::Cursor::new(&mut buffer),
            image::ImageFormat::Png,
        )
        .map_err(|e| RenderError::EncodingFailed(format!("PNG: {}", e)))?;
    Ok(buffer)
}

fn encode_jpeg(image: &RgbImage, quality: CollageQuality) -> RenderResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    let mut encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality.jpeg_quality());

    encoder
        .encode(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| RenderError::EncodingFailed(format!("JPEG: {}", e)))?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_extensions() {
        assert_eq!(CollageFormat::Png.extension(), "png");
        assert_eq!(CollageFormat::Jpeg.extension(), "jpg");
    }

    #[test]
    fn test_jpeg_quality_values_increase() {
        let mut previous = 0u8;
        for preset in CollageQuality::ALL {
            let quality = preset.jpeg_quality();
            assert!(quality > previous, "presets should increase in quality");
            previous = quality;
        }
    }

    #[test]
    fn test_png_encoding_has_signature() {
        let image = RgbImage::from_pixel(8, 8, image::Rgb([128, 0, 255]));
        let data = encode_png(&image).unwrap();
        assert_eq!(&data[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_jpeg_encoding_round_trips_dimensions() {
        let image = RgbImage::from_pixel(16, 12, image::Rgb([10, 120, 200]));
        let data = encode_jpeg(&image, CollageQuality::High).unwrap();
        let decoded = image::load_from_memory(&data).unwrap();
        assert_eq!(decoded.width(), 16);
        assert_eq!(decoded.height(), 12);
    }
}
