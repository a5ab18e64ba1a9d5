// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Session parameters
pub mod session {
    use std::time::Duration;

    /// Number of photos in a finished strip
    pub const MAX_PHOTOS: usize = 4;

    /// Countdown starting value
    pub const COUNTDOWN_START: u32 = 3;

    /// Interval between countdown ticks
    pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);
}

/// Collage strip geometry, in pixels
///
/// The strip is a single photo column: header band, four 4:3 cells separated
/// by gaps, footer band, all inside a white margin.
pub mod layout {
    /// Width of one photo cell
    pub const CELL_WIDTH: u32 = 480;

    /// Height of one photo cell (4:3)
    pub const CELL_HEIGHT: u32 = 360;

    /// Vertical gap between stacked photos
    pub const CELL_GAP: u32 = 12;

    /// Outer margin around the whole strip
    pub const MARGIN: u32 = 24;

    /// Header and footer band height
    pub const BAND_HEIGHT: u32 = 32;

    /// Radius of the decorative corner dots
    pub const DOT_RADIUS: u32 = 8;

    /// Inset of the corner dots from the strip edge
    pub const DOT_INSET: u32 = 12;
}

/// Timing constants
pub mod timing {
    use std::time::Duration;

    /// UI event poll interval (~60 Hz redraw)
    pub const POLL_INTERVAL: Duration = Duration::from_millis(16);

    /// Camera warm-up before trusting frames (exposure settles)
    pub const WARMUP: Duration = Duration::from_millis(500);

    /// Give up waiting for the first frame after this long
    pub const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(5);

    /// Simulated email transfer time
    pub const SIMULATED_SEND: Duration = Duration::from_secs(2);

    /// GStreamer pipeline start timeout (seconds)
    pub const START_TIMEOUT_SECS: u64 = 5;

    /// GStreamer pipeline stop timeout (seconds)
    pub const STOP_TIMEOUT_SECS: u64 = 2;
}

/// Preview pipeline tuning
pub mod pipeline {
    /// Bounded preview frame channel depth
    pub const CHANNEL_DEPTH: usize = 10;

    /// Maximum appsink buffers before dropping
    pub const MAX_BUFFERS: u32 = 2;
}
