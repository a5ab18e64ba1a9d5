// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the collage pipeline

use photobooth::capture::Frame;
use photobooth::collage::{CollageFormat, CollagePipeline, CollageQuality};
use photobooth::constants::session::MAX_PHOTOS;

fn gradient_frame(seed: u8) -> Frame {
    let (width, height) = (64u32, 48u32);
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            data.push(seed.wrapping_add(x as u8));
            data.push(seed.wrapping_add(y as u8));
            data.push(seed);
            data.push(255);
        }
    }
    Frame::from_rgba(width, height, data)
}

fn session_frames() -> Vec<Frame> {
    (0..MAX_PHOTOS as u8).map(|i| gradient_frame(i * 40)).collect()
}

#[test]
fn test_render_is_idempotent_for_a_fixed_sequence() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let pipeline = CollagePipeline::new();
    let frames = session_frames();

    let first = rt.block_on(pipeline.render(&frames)).unwrap();
    let second = rt.block_on(pipeline.render(&frames)).unwrap();

    // Pixel-identical, byte-identical
    assert_eq!(first.image.as_raw(), second.image.as_raw());
    assert_eq!(first.encoded.data, second.encoded.data);
}

#[test]
fn test_render_rejects_an_empty_session() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let pipeline = CollagePipeline::new();

    let result = rt.block_on(pipeline.render(&[]));
    assert!(result.is_err());
}

#[test]
fn test_rendered_artifact_decodes_to_the_strip_size() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let pipeline = CollagePipeline::new();
    let frames = session_frames();

    let artifact = rt.block_on(pipeline.render(&frames)).unwrap();
    let decoded = image::load_from_memory(&artifact.encoded.data).unwrap();
    assert_eq!(decoded.width(), artifact.width());
    assert_eq!(decoded.height(), artifact.height());
}

#[test]
fn test_save_writes_a_png_with_timestamped_name() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let pipeline = CollagePipeline::new();
    let frames = session_frames();
    let dir = tempfile::tempdir().unwrap();

    let artifact = rt.block_on(pipeline.render(&frames)).unwrap();
    let path = rt
        .block_on(pipeline.save(&artifact, dir.path().to_path_buf()))
        .unwrap();

    assert!(path.exists());
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("STRIP_"));
    assert!(name.ends_with(".png"));
    assert_eq!(std::fs::read(&path).unwrap(), artifact.encoded.data);
}

#[test]
fn test_jpeg_pipeline_honors_the_configured_format() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let pipeline = CollagePipeline::with_config(CollageFormat::Jpeg, CollageQuality::Medium);
    let frames = session_frames();
    let dir = tempfile::tempdir().unwrap();

    let artifact = rt.block_on(pipeline.render(&frames)).unwrap();
    assert_eq!(artifact.encoded.format, CollageFormat::Jpeg);

    let path = rt
        .block_on(pipeline.save(&artifact, dir.path().to_path_buf()))
        .unwrap();
    assert_eq!(path.extension().unwrap(), "jpg");

    // JPEG SOI marker
    assert_eq!(&artifact.encoded.data[..2], &[0xFF, 0xD8]);
}
