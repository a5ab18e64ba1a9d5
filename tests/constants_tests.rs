// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use photobooth::collage::CollageQuality;
use photobooth::constants::{layout, session};

#[test]
fn test_session_shape() {
    // A booth strip is four photos behind a three-second countdown
    assert_eq!(session::MAX_PHOTOS, 4);
    assert_eq!(session::COUNTDOWN_START, 3);
    assert_eq!(session::COUNTDOWN_TICK.as_secs(), 1);
}

#[test]
fn test_cells_are_four_by_three() {
    assert_eq!(layout::CELL_WIDTH * 3, layout::CELL_HEIGHT * 4);
}

#[test]
fn test_quality_presets_have_increasing_jpeg_quality() {
    let mut previous = 0u8;
    for preset in CollageQuality::ALL {
        let quality = preset.jpeg_quality();
        assert!(
            quality > previous,
            "Presets should be ordered from lowest to highest"
        );
        previous = quality;
    }
}
