// SPDX-License-Identifier: GPL-3.0-only

//! Capture source abstraction
//!
//! One camera, one still frame at a time. The [`CaptureSource`] trait is the
//! seam between the session state machine and the device stack: the session
//! only ever asks for "one frame now", and tests drive it with a mock source
//! instead of real hardware.
//!
//! The production implementation ([`BoothCamera`]) runs a PipeWire GStreamer
//! preview pipeline and samples the most recent frame on demand.

pub mod camera;
pub mod enumeration;
pub mod pipeline;
pub mod types;

pub use camera::BoothCamera;
pub use types::{CameraInfo, Facing, Frame, FrameReceiver, FrameSender};

use crate::errors::DeviceResult;

/// Camera abstraction used by the session state machine
pub trait CaptureSource {
    /// Acquire a device stream for the given facing
    ///
    /// Any previously held stream is released first; only one open stream may
    /// exist at a time. Fails with a retryable [`crate::errors::DeviceError`]
    /// when the camera stack is unavailable.
    fn open(&mut self, facing: Facing) -> DeviceResult<()>;

    /// Sample the current stream image into a [`Frame`]
    ///
    /// Fails with `StreamNotOpen` before a successful [`CaptureSource::open`]
    /// and with `NoFrameAvailable` while the stream is still warming up.
    fn capture_frame(&mut self) -> DeviceResult<Frame>;

    /// Close the current stream and reopen with the opposite facing
    ///
    /// The current stream is fully released before reacquiring, so two camera
    /// handles are never held at once. Returns the facing now in use.
    fn switch(&mut self) -> DeviceResult<Facing>;

    /// Release the device deterministically
    fn close(&mut self);

    /// Whether a stream is currently open
    fn is_open(&self) -> bool;

    /// The facing last requested via `open` or `switch`
    fn facing(&self) -> Facing;
}
