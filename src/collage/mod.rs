// SPDX-License-Identifier: GPL-3.0-only

//! Collage pipeline
//!
//! Turns a completed session's frame sequence into a shareable strip:
//!
//! ```text
//! Session frames → Compose (layout) → Encode (PNG/JPEG) → Save
//! ```
//!
//! Composition and encoding are CPU-bound and run on blocking tasks; the
//! pipeline is only invoked after the session reaches `Reviewing`, so it
//! never observes a partial frame sequence.

pub mod encoding;
pub mod layout;

pub use encoding::{CollageEncoder, CollageFormat, CollageQuality, EncodedCollage};
pub use layout::CollageLayout;

use crate::capture::Frame;
use crate::errors::{RenderError, RenderResult};
use image::RgbImage;
use std::path::PathBuf;

/// The rendered strip: composed pixels plus their encoded form
///
/// Produced once per completed session and replaced only after a reset.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Composed strip (for on-screen preview)
    pub image: RgbImage,
    /// Encoded bytes handed to download/delivery
    pub encoded: EncodedCollage,
}

impl Artifact {
    pub fn width(&self) -> u32 {
        self.encoded.width
    }

    pub fn height(&self) -> u32 {
        self.encoded.height
    }
}

/// Complete strip pipeline: compose → encode → save
#[derive(Debug, Clone)]
pub struct CollagePipeline {
    layout: CollageLayout,
    encoder: CollageEncoder,
}

impl CollagePipeline {
    /// Create a pipeline with the default layout and PNG output
    pub fn new() -> Self {
        Self {
            layout: CollageLayout::default(),
            encoder: CollageEncoder::new(),
        }
    }

    pub fn with_config(format: CollageFormat, quality: CollageQuality) -> Self {
        Self {
            layout: CollageLayout::default(),
            encoder: CollageEncoder::with_format(format, quality),
        }
    }

    /// Compose and encode the finished strip
    pub async fn render(&self, frames: &[Frame]) -> RenderResult<Artifact> {
        let layout = self.layout.clone();
        let frames = frames.to_vec();

        // Composition is CPU-bound; keep it off the UI thread
        let image = tokio::task::spawn_blocking(move || layout.compose(&frames))
            .await
            .map_err(|e| RenderError::EncodingFailed(format!("compose task: {}", e)))??;

        let encoded = self.encoder.encode(image.clone()).await?;
        Ok(Artifact { image, encoded })
    }

    /// Save a rendered artifact into `output_dir`
    pub async fn save(&self, artifact: &Artifact, output_dir: PathBuf) -> RenderResult<PathBuf> {
        self.encoder.save(artifact.encoded.clone(), output_dir).await
    }
}

impl Default for CollagePipeline {
    fn default() -> Self {
        Self::new()
    }
}
