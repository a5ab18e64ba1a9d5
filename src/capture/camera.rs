// SPDX-License-Identifier: GPL-3.0-only

//! Concrete capture source over the PipeWire preview pipeline
//!
//! Owns the camera handle exclusively: `open` tears down any existing
//! pipeline before creating a new one, so a single stream exists per booth
//! at any moment. The preview channel is drained into a latest-frame cache,
//! which is what `capture_frame` samples.

use super::enumeration;
use super::pipeline::PreviewPipeline;
use super::types::{CameraInfo, Facing, Frame, FrameReceiver};
use super::CaptureSource;
use crate::constants::pipeline::CHANNEL_DEPTH;
use crate::errors::{DeviceError, DeviceResult};
use futures::channel::mpsc;
use tracing::{debug, info, warn};

/// PipeWire-backed capture source
#[derive(Default)]
pub struct BoothCamera {
    cameras: Vec<CameraInfo>,
    /// Index into `cameras` of the open device
    current: Option<usize>,
    facing: Facing,
    pipeline: Option<PreviewPipeline>,
    receiver: Option<FrameReceiver>,
    latest: Option<Frame>,
}

impl BoothCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain pending preview frames, keeping only the newest
    ///
    /// Call from the UI loop on every pass; returns the newest frame seen so
    /// far, which doubles as the live preview image.
    pub fn poll_frame(&mut self) -> Option<&Frame> {
        if let Some(receiver) = &mut self.receiver {
            while let Ok(Some(frame)) = receiver.try_next() {
                self.latest = Some(frame);
            }
        }
        self.latest.as_ref()
    }

    /// Name of the open camera
    pub fn current_name(&self) -> Option<&str> {
        self.current
            .and_then(|i| self.cameras.get(i))
            .map(|c| c.name.as_str())
    }

    /// Number of cameras found by the last enumeration
    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    /// Pick a device for the requested facing
    ///
    /// Prefers an exact facing match. Cameras without facing metadata are
    /// cycled past the previously open device, so `switch` still moves to a
    /// different camera on desktop hardware that reports no location.
    fn pick_device(cameras: &[CameraInfo], facing: Facing, previous: Option<usize>) -> usize {
        if let Some(index) = cameras.iter().position(|c| c.facing == Some(facing)) {
            return index;
        }
        match previous {
            Some(p) if cameras.len() > 1 => (p + 1) % cameras.len(),
            _ => 0,
        }
    }
}

impl CaptureSource for BoothCamera {
    fn open(&mut self, facing: Facing) -> DeviceResult<()> {
        // Release any held stream first: one camera handle at a time
        self.close();

        let cameras = enumeration::enumerate_cameras()?;
        if cameras.is_empty() {
            return Err(DeviceError::NoCameraFound);
        }

        let index = Self::pick_device(&cameras, facing, self.current);
        let camera = &cameras[index];
        info!(camera = %camera.name, %facing, "Opening capture source");

        let (sender, receiver) = mpsc::channel(CHANNEL_DEPTH);
        let pipeline = PreviewPipeline::new(camera, sender)?;

        self.cameras = cameras;
        self.current = Some(index);
        self.facing = facing;
        self.pipeline = Some(pipeline);
        self.receiver = Some(receiver);
        Ok(())
    }

    fn capture_frame(&mut self) -> DeviceResult<Frame> {
        if self.pipeline.is_none() {
            return Err(DeviceError::StreamNotOpen);
        }

        self.poll_frame();
        match &self.latest {
            Some(frame) => {
                debug!(
                    width = frame.width,
                    height = frame.height,
                    "Frame captured from stream"
                );
                Ok(frame.clone())
            }
            None => {
                warn!("Capture requested before the stream produced a frame");
                Err(DeviceError::NoFrameAvailable)
            }
        }
    }

    fn switch(&mut self) -> DeviceResult<Facing> {
        let target = self.facing.opposite();
        info!(from = %self.facing, to = %target, "Switching camera");

        // open() releases the current stream before reacquiring
        self.open(target)?;
        Ok(self.facing)
    }

    fn close(&mut self) {
        if let Some(pipeline) = self.pipeline.take() {
            pipeline.stop();
        }
        // Frames from the old stream must not leak into the next one
        self.receiver = None;
        self.latest = None;
    }

    fn is_open(&self) -> bool {
        self.pipeline.is_some()
    }

    fn facing(&self) -> Facing {
        self.facing
    }
}

impl Drop for BoothCamera {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for BoothCamera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoothCamera")
            .field("facing", &self.facing)
            .field("open", &self.pipeline.is_some())
            .field("cameras", &self.cameras.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(name: &str, facing: Option<Facing>) -> CameraInfo {
        CameraInfo {
            name: name.to_string(),
            target: name.to_string(),
            facing,
        }
    }

    #[test]
    fn test_pick_device_prefers_facing_match() {
        let cameras = vec![
            camera("back", Some(Facing::Back)),
            camera("front", Some(Facing::Front)),
        ];
        assert_eq!(BoothCamera::pick_device(&cameras, Facing::Front, None), 1);
        assert_eq!(BoothCamera::pick_device(&cameras, Facing::Back, Some(1)), 0);
    }

    #[test]
    fn test_pick_device_cycles_without_metadata() {
        let cameras = vec![camera("a", None), camera("b", None), camera("c", None)];
        assert_eq!(BoothCamera::pick_device(&cameras, Facing::Back, Some(0)), 1);
        assert_eq!(BoothCamera::pick_device(&cameras, Facing::Front, Some(2)), 0);
    }

    #[test]
    fn test_capture_before_open_is_a_typed_error() {
        let mut camera = BoothCamera::new();
        assert!(matches!(
            camera.capture_frame(),
            Err(DeviceError::StreamNotOpen)
        ));
        assert!(!camera.is_open());
    }
}
