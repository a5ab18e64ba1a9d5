// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the capture session
//!
//! Drives the session state machine with a scripted capture source through
//! the full booth scenarios: a complete four-photo session, device failure,
//! reset mid-countdown, and the strip render that follows completion.

use photobooth::capture::{CaptureSource, Facing, Frame};
use photobooth::collage::CollageLayout;
use photobooth::constants::session::MAX_PHOTOS;
use photobooth::errors::{DeviceError, DeviceResult};
use photobooth::session::{Phase, Session, SessionEvent};

/// Scripted capture source: a queue of frames or errors
struct ScriptedSource {
    results: std::collections::VecDeque<DeviceResult<Frame>>,
    open: bool,
    facing: Facing,
}

impl ScriptedSource {
    fn with_photos(count: usize) -> Self {
        let results = (1..=count)
            .map(|i| Ok(test_frame(i as u8)))
            .collect();
        Self {
            results,
            open: true,
            facing: Facing::Front,
        }
    }

    fn failing() -> Self {
        Self {
            results: std::collections::VecDeque::new(),
            open: false,
            facing: Facing::Front,
        }
    }
}

impl CaptureSource for ScriptedSource {
    fn open(&mut self, facing: Facing) -> DeviceResult<()> {
        if self.results.is_empty() {
            return Err(DeviceError::Unavailable("permission denied".to_string()));
        }
        self.facing = facing;
        self.open = true;
        Ok(())
    }

    fn capture_frame(&mut self) -> DeviceResult<Frame> {
        if !self.open {
            return Err(DeviceError::StreamNotOpen);
        }
        self.results
            .pop_front()
            .unwrap_or(Err(DeviceError::NoFrameAvailable))
    }

    fn switch(&mut self) -> DeviceResult<Facing> {
        self.facing = self.facing.opposite();
        Ok(self.facing)
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn facing(&self) -> Facing {
        self.facing
    }
}

/// A small solid-color frame tagged in its first byte
fn test_frame(tag: u8) -> Frame {
    let mut data = vec![0u8; 32 * 24 * 4];
    for pixel in data.chunks_exact_mut(4) {
        pixel[0] = tag;
        pixel[3] = 255;
    }
    Frame::from_rgba(32, 24, data)
}

/// Drive one full countdown (three ticks at the nominal cadence)
fn complete_countdown(session: &mut Session, source: &mut ScriptedSource) -> SessionEvent {
    assert!(session.request_capture(), "countdown should arm");
    let mut last = None;
    while session.countdown().is_some() {
        last = session.tick(source);
    }
    last.expect("countdown must end in an event")
}

#[test]
fn test_four_captures_complete_the_session() {
    let mut session = Session::new();
    let mut source = ScriptedSource::with_photos(MAX_PHOTOS);

    for k in 1..MAX_PHOTOS {
        let event = complete_countdown(&mut session, &mut source);
        assert_eq!(event, SessionEvent::FrameCaptured(k));
        assert_eq!(session.phase(), Phase::Capturing(k));
    }

    let event = complete_countdown(&mut session, &mut source);
    assert_eq!(event, SessionEvent::SessionComplete);
    assert_eq!(session.phase(), Phase::Reviewing);

    // Append order is exactly capture order: F1, F2, F3, F4
    let tags: Vec<u8> = session.frames().iter().map(|f| f.data[0]).collect();
    assert_eq!(tags, vec![1, 2, 3, 4]);
}

#[test]
fn test_completed_session_renders_exactly_once() {
    let mut session = Session::new();
    let mut source = ScriptedSource::with_photos(MAX_PHOTOS);

    let mut completions = 0;
    for _ in 0..MAX_PHOTOS {
        if complete_countdown(&mut session, &mut source) == SessionEvent::SessionComplete {
            completions += 1;
        }
    }
    assert_eq!(completions, 1, "completion must be signalled exactly once");

    // The renderer sees the full, final sequence
    let layout = CollageLayout::default();
    let strip = layout.compose(session.frames()).unwrap();
    let (width, height) = layout.strip_size(MAX_PHOTOS);
    assert_eq!(strip.dimensions(), (width, height));

    // No further capture is possible until reset
    assert!(!session.request_capture());
}

#[test]
fn test_unavailable_device_leaves_session_capturing() {
    let mut session = Session::new();
    let mut source = ScriptedSource::failing();

    // Opening fails like a denied permission prompt would
    assert_eq!(
        source.open(Facing::Front),
        Err(DeviceError::Unavailable("permission denied".to_string()))
    );

    // The countdown still runs, but the capture yields nothing
    let event = complete_countdown(&mut session, &mut source);
    assert_eq!(
        event,
        SessionEvent::CaptureFailed(DeviceError::StreamNotOpen)
    );
    assert_eq!(session.phase(), Phase::Capturing(0));
    assert_eq!(session.frame_count(), 0);
}

#[test]
fn test_reset_mid_countdown_discards_the_pending_capture() {
    let mut session = Session::new();
    let mut source = ScriptedSource::with_photos(MAX_PHOTOS);

    session.request_capture();
    session.tick(&mut source); // countdown: 3 -> 2
    assert_eq!(session.countdown(), Some(2));

    session.reset();
    assert_eq!(session.phase(), Phase::Capturing(0));
    assert_eq!(session.countdown(), None);

    // Ticks that would have fired are inert after the reset
    assert_eq!(session.tick(&mut source), None);
    assert_eq!(session.frame_count(), 0);
}

#[test]
fn test_reset_allows_a_fresh_session() {
    let mut session = Session::new();
    let mut source = ScriptedSource::with_photos(MAX_PHOTOS * 2);

    for _ in 0..MAX_PHOTOS {
        complete_countdown(&mut session, &mut source);
    }
    assert!(session.is_reviewing());

    session.reset();
    assert_eq!(session.phase(), Phase::Capturing(0));

    // A second full session works and sees the later frames
    for _ in 0..MAX_PHOTOS {
        complete_countdown(&mut session, &mut source);
    }
    assert!(session.is_reviewing());
    let tags: Vec<u8> = session.frames().iter().map(|f| f.data[0]).collect();
    assert_eq!(tags, vec![5, 6, 7, 8]);
}

#[test]
fn test_switching_facing_mid_countdown_is_safe() {
    let mut session = Session::new();
    let mut source = ScriptedSource::with_photos(MAX_PHOTOS);

    session.request_capture();
    session.tick(&mut source); // countdown running

    // The UI cancels the pending capture before switching streams
    session.cancel_countdown();
    assert_eq!(source.switch(), Ok(Facing::Back));

    assert_eq!(session.countdown(), None);
    assert_eq!(session.frame_count(), 0);

    // The next session step starts cleanly on the new stream
    let event = complete_countdown(&mut session, &mut source);
    assert_eq!(event, SessionEvent::FrameCaptured(1));
}
