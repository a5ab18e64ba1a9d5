// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use photobooth::Config;
use photobooth::capture::Facing;
use photobooth::collage::CollageFormat;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert!(
        config.mirror_preview,
        "Mirror preview should be enabled by default"
    );
    assert_eq!(config.preferred_facing, Facing::Front);
    assert_eq!(config.output_format, CollageFormat::Png);
}

#[test]
fn test_config_save_folder_is_set() {
    let config = Config::default();
    assert!(
        !config.save_folder.is_empty(),
        "Save folder should not be empty"
    );
}

#[test]
fn test_unknown_fields_are_tolerated() {
    let json = r#"{"mirror_preview": false, "some_future_option": 3}"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert!(!config.mirror_preview);
}
