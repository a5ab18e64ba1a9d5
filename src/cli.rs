// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for headless booth operations
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Running a booth session without the interactive UI
//! - Composing a strip from existing photo files

use photobooth::capture::{BoothCamera, CaptureSource, Facing, Frame, enumeration};
use photobooth::collage::CollagePipeline;
use photobooth::config::Config;
use photobooth::constants::session::{COUNTDOWN_TICK, MAX_PHOTOS};
use photobooth::constants::timing;
use photobooth::session::{Session, SessionEvent};
use photobooth::storage;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Give up on a session after this many capture failures in a row
const MAX_CAPTURE_FAILURES: u32 = 5;

/// List all available cameras
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    gstreamer::init()?;

    let cameras = match enumeration::enumerate_cameras() {
        Ok(cameras) => cameras,
        Err(e) => {
            println!("No cameras found: {}", e);
            return Ok(());
        }
    };

    println!("Available cameras:");
    println!();
    for camera in &cameras {
        match camera.facing {
            Some(facing) => println!("  {} ({})", camera.name, facing),
            None => println!("  {}", camera.name),
        }
    }

    Ok(())
}

/// Run a full booth session headlessly and save the strip
pub fn capture_strip(
    facing: Option<Facing>,
    output: Option<PathBuf>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    gstreamer::init()?;

    let facing = facing.unwrap_or(config.preferred_facing);
    let mut camera = BoothCamera::new();
    camera.open(facing)?;

    if let Some(name) = camera.current_name() {
        println!("Using camera: {}", name);
    }

    wait_for_first_frame(&mut camera)?;

    // Ctrl+C aborts the session cleanly
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();
    ctrlc::set_handler(move || {
        stop_flag_clone.store(true, Ordering::SeqCst);
    })?;

    let mut session = Session::new();
    let mut failures = 0u32;

    println!();
    while !session.is_reviewing() {
        if stop_flag.load(Ordering::SeqCst) {
            println!();
            println!("Aborted.");
            return Ok(());
        }

        if session.countdown().is_none() {
            session.request_capture();
            print!(
                "\rPhoto {} of {}:  {}...",
                session.frame_count() + 1,
                MAX_PHOTOS,
                session.countdown().unwrap_or(0)
            );
            std::io::stdout().flush()?;
        }

        std::thread::sleep(COUNTDOWN_TICK);

        match session.tick(&mut camera) {
            Some(SessionEvent::CountdownTick(value)) => {
                print!(
                    "\rPhoto {} of {}:  {}...",
                    session.frame_count() + 1,
                    MAX_PHOTOS,
                    value
                );
                std::io::stdout().flush()?;
            }
            Some(SessionEvent::FrameCaptured(count)) => {
                failures = 0;
                println!("\rPhoto {} of {}:  done", count, MAX_PHOTOS);
            }
            Some(SessionEvent::SessionComplete) => {
                failures = 0;
                println!("\rPhoto {} of {}:  done", MAX_PHOTOS, MAX_PHOTOS);
            }
            Some(SessionEvent::CaptureFailed(err)) => {
                failures += 1;
                println!();
                eprintln!("Capture failed: {}", err);
                if failures >= MAX_CAPTURE_FAILURES {
                    return Err(format!("giving up after {} failed captures", failures).into());
                }
            }
            None => {}
        }
    }

    camera.close();

    let output_dir = resolve_output_dir(output, config);
    let pipeline = CollagePipeline::with_config(config.output_format, config.quality);

    let rt = tokio::runtime::Runtime::new()?;
    let artifact = rt.block_on(pipeline.render(session.frames()))?;
    let path = rt.block_on(pipeline.save(&artifact, output_dir))?;

    println!();
    println!("Strip saved: {}", path.display());
    Ok(())
}

/// Compose a strip from existing image files
pub fn compose_strip(
    input: Vec<PathBuf>,
    output: Option<PathBuf>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let paths = collect_image_paths(&input)?;
    if paths.is_empty() {
        return Err("No PNG or JPEG images found in input".into());
    }

    let take = paths.len().min(MAX_PHOTOS);
    if take < paths.len() {
        println!("Found {} images; using the first {}", paths.len(), take);
    }

    let mut frames = Vec::with_capacity(take);
    for path in &paths[..take] {
        let frame = load_frame(path)?;
        println!(
            "  Loaded: {} ({}x{})",
            path.file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default(),
            frame.width,
            frame.height
        );
        frames.push(frame);
    }

    let output_dir = resolve_output_dir(output, config);
    let pipeline = CollagePipeline::with_config(config.output_format, config.quality);

    let rt = tokio::runtime::Runtime::new()?;
    let artifact = rt.block_on(pipeline.render(&frames))?;
    let path = rt.block_on(pipeline.save(&artifact, output_dir))?;

    println!();
    println!("Strip saved: {}", path.display());
    Ok(())
}

/// Wait for the camera to warm up and deliver a first frame
fn wait_for_first_frame(camera: &mut BoothCamera) -> Result<(), Box<dyn std::error::Error>> {
    print!("Warming up camera...");
    std::io::stdout().flush()?;

    let start = Instant::now();
    loop {
        if camera.poll_frame().is_some() && start.elapsed() > timing::WARMUP {
            println!(" ready");
            return Ok(());
        }
        if start.elapsed() > timing::FIRST_FRAME_TIMEOUT {
            println!();
            return Err("Camera produced no frames".into());
        }
        std::thread::sleep(timing::POLL_INTERVAL);
    }
}

/// Output directory: the given path, or the configured pictures folder
fn resolve_output_dir(output: Option<PathBuf>, config: &Config) -> PathBuf {
    output.unwrap_or_else(|| storage::strip_directory(&config.save_folder))
}

/// Collect image paths from the inputs (files or directories), sorted by name
fn collect_image_paths(input: &[PathBuf]) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut paths = Vec::new();

    for path in input {
        if path.is_dir() {
            for entry in std::fs::read_dir(path)? {
                let entry = entry?;
                let file_path = entry.path();
                if is_supported_image(&file_path) {
                    paths.push(file_path);
                }
            }
        } else if is_supported_image(path) {
            paths.push(path.clone());
        }
    }

    // Sort by filename for consistent strip ordering
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(paths)
}

/// Check if a path is a supported image file
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            ext == "png" || ext == "jpg" || ext == "jpeg"
        })
        .unwrap_or(false)
}

/// Load an image file as an RGBA frame
fn load_frame(path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
    let img = image::open(path)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Frame::from_rgba(width, height, rgba.into_raw()))
}
