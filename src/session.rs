// SPDX-License-Identifier: GPL-3.0-only

//! Photo session state machine
//!
//! Owns the accumulated frames, the countdown, and the transition from
//! capturing to reviewing. The UI advances the countdown at a fixed
//! one-second cadence via [`Session::tick`]; when it reaches zero the
//! session pulls one frame directly from the capture source. The contract is
//! an explicit call, so there is no listener-ordering ambiguity and no way to
//! double-register a capture handler.
//!
//! Invariants: the frame sequence never exceeds [`MAX_PHOTOS`]; once full,
//! the phase is `Reviewing` and nothing is appended until [`Session::reset`].

use crate::capture::{CaptureSource, Frame};
use crate::constants::session::{COUNTDOWN_START, MAX_PHOTOS};
use crate::errors::DeviceError;
use tracing::{debug, info, warn};

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Collecting frames; holds the number collected so far
    Capturing(usize),
    /// All frames collected; the strip is ready to render
    Reviewing,
}

/// What one [`Session::tick`] produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Countdown advanced; the value to show the user
    CountdownTick(u32),
    /// A frame was appended; holds the new frame count
    FrameCaptured(usize),
    /// The final frame was appended; render the strip now
    SessionComplete,
    /// The capture source produced no frame; session state is unchanged
    CaptureFailed(DeviceError),
}

/// The photo-booth session
#[derive(Debug, Default)]
pub struct Session {
    frames: Vec<Frame>,
    countdown: Option<u32>,
    reviewing: bool,
}

impl Session {
    /// Create an empty session in `Capturing(0)`
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.reviewing {
            Phase::Reviewing
        } else {
            Phase::Capturing(self.frames.len())
        }
    }

    /// Frames captured so far, in capture order
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Current countdown value, when one is running
    pub fn countdown(&self) -> Option<u32> {
        self.countdown
    }

    pub fn is_reviewing(&self) -> bool {
        self.reviewing
    }

    /// Arm the countdown
    ///
    /// Ignored (returns false) while a countdown is already running, since a
    /// duplicate request must not restart the timer, and once the strip
    /// is full.
    pub fn request_capture(&mut self) -> bool {
        if self.reviewing {
            debug!("Capture requested while reviewing; ignored");
            return false;
        }
        if self.countdown.is_some() {
            debug!("Capture requested while countdown active; ignored");
            return false;
        }

        self.countdown = Some(COUNTDOWN_START);
        debug!(start = COUNTDOWN_START, "Countdown armed");
        true
    }

    /// Advance the countdown by one step
    ///
    /// Call once per countdown interval. Returns `None` when no countdown is
    /// running. On the step that reaches zero, the countdown clears and a
    /// frame is pulled from `source`; a capture failure leaves the sequence
    /// and phase untouched, so the user may simply re-arm.
    pub fn tick(&mut self, source: &mut dyn CaptureSource) -> Option<SessionEvent> {
        let value = self.countdown?;

        if value > 1 {
            self.countdown = Some(value - 1);
            return Some(SessionEvent::CountdownTick(value - 1));
        }

        // Reached zero: clear before capturing so a failure leaves no timer
        self.countdown = None;
        match source.capture_frame() {
            Ok(frame) => Some(self.append(frame)),
            Err(err) => {
                warn!(error = %err, "Countdown expired but capture produced no frame");
                Some(SessionEvent::CaptureFailed(err))
            }
        }
    }

    /// Cancel a running countdown without capturing
    ///
    /// Used when the capture source is being switched: a pending capture tied
    /// to the old stream must not fire against the new one.
    pub fn cancel_countdown(&mut self) {
        if self.countdown.take().is_some() {
            debug!("Countdown cancelled");
        }
    }

    /// Clear everything and return to `Capturing(0)`
    ///
    /// Valid in any state. Cancels an in-flight countdown; no tick after a
    /// reset can append a frame. The caller drops its rendered artifact.
    pub fn reset(&mut self) {
        info!("Session reset");
        self.frames.clear();
        self.countdown = None;
        self.reviewing = false;
    }

    fn append(&mut self, frame: Frame) -> SessionEvent {
        debug_assert!(self.frames.len() < MAX_PHOTOS);
        self.frames.push(frame);
        let count = self.frames.len();
        info!(count, total = MAX_PHOTOS, "Frame appended");

        if count == MAX_PHOTOS {
            self.reviewing = true;
            info!("Session complete");
            SessionEvent::SessionComplete
        } else {
            SessionEvent::FrameCaptured(count)
        }
    }
}
