// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for the capture source

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

/// Which way the camera points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Facing {
    /// User-facing (selfie) camera
    #[default]
    Front,
    /// World-facing camera
    Back,
}

impl Facing {
    /// The other facing value
    pub fn opposite(&self) -> Self {
        match self {
            Facing::Front => Facing::Back,
            Facing::Back => Facing::Front,
        }
    }
}

impl std::fmt::Display for Facing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Facing::Front => write!(f, "front"),
            Facing::Back => write!(f, "back"),
        }
    }
}

impl FromStr for Facing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "front" | "user" => Ok(Facing::Front),
            "back" | "rear" | "environment" => Ok(Facing::Back),
            other => Err(format!("unknown facing '{}' (expected front or back)", other)),
        }
    }
}

/// One captured still frame
///
/// Pixels are RGBA, tightly packed (`width * height * 4` bytes, no row
/// padding). The data sits behind an `Arc` so frames are immutable once
/// captured and cheap to clone into the session's sequence.
#[derive(Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixels, row-major
    pub data: Arc<[u8]>,
    /// When the frame was captured
    pub captured_at: Instant,
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Frame({}x{}, {} bytes)",
            self.width,
            self.height,
            self.data.len()
        )
    }
}

impl Frame {
    /// Build a frame from tightly packed RGBA bytes
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data.into_boxed_slice()),
            captured_at: Instant::now(),
        }
    }

    /// Check dimensions against the pixel buffer length
    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.data.len() == (self.width as usize) * (self.height as usize) * 4
    }

    /// Sample one pixel as RGB, clamping out-of-range coordinates
    pub fn rgb_at(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        let idx = ((y * self.width + x) * 4) as usize;
        if idx + 2 < self.data.len() {
            (self.data[idx], self.data[idx + 1], self.data[idx + 2])
        } else {
            (0, 0, 0)
        }
    }
}

/// A camera discovered by enumeration
#[derive(Debug, Clone)]
pub struct CameraInfo {
    pub name: String,
    /// PipeWire target (object serial or node ID); empty = auto-select
    pub target: String,
    /// Facing reported by the device, when known
    pub facing: Option<Facing>,
}

/// Frame sender type for preview streams
pub type FrameSender = futures::channel::mpsc::Sender<Frame>;

/// Frame receiver type for preview streams
pub type FrameReceiver = futures::channel::mpsc::Receiver<Frame>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_opposite() {
        assert_eq!(Facing::Front.opposite(), Facing::Back);
        assert_eq!(Facing::Back.opposite(), Facing::Front);
    }

    #[test]
    fn test_facing_parse() {
        assert_eq!("front".parse::<Facing>().unwrap(), Facing::Front);
        assert_eq!("Rear".parse::<Facing>().unwrap(), Facing::Back);
        assert!("sideways".parse::<Facing>().is_err());
    }

    #[test]
    fn test_frame_well_formed() {
        let frame = Frame::from_rgba(2, 2, vec![0u8; 16]);
        assert!(frame.is_well_formed());

        let truncated = Frame::from_rgba(2, 2, vec![0u8; 12]);
        assert!(!truncated.is_well_formed());
    }

    #[test]
    fn test_frame_sampling_clamps() {
        let mut data = vec![0u8; 16];
        // Bottom-right pixel is red
        data[12] = 255;
        let frame = Frame::from_rgba(2, 2, data);
        assert_eq!(frame.rgb_at(1, 1), (255, 0, 0));
        // Out-of-range coordinates clamp to the edge
        assert_eq!(frame.rgb_at(99, 99), (255, 0, 0));
    }
}
