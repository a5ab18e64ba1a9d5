// SPDX-License-Identifier: GPL-3.0-only

//! PipeWire GStreamer preview pipeline
//!
//! A single streaming pipeline per open camera: `pipewiresrc` feeding an
//! RGBA appsink. Frames are copied out of the mapped buffer (tightly packed,
//! stride removed) and pushed into a bounded channel; when the UI falls
//! behind, old frames are dropped rather than queued.

use super::types::{CameraInfo, Frame, FrameSender};
use crate::constants::{pipeline, timing};
use crate::errors::{DeviceError, DeviceResult};
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Streaming camera pipeline
///
/// Holds the camera handle for its whole lifetime; dropping the pipeline
/// releases the device.
pub struct PreviewPipeline {
    pipeline: gstreamer::Pipeline,
    appsink: AppSink,
}

impl PreviewPipeline {
    /// Create and start a preview pipeline for the given camera
    pub fn new(camera: &CameraInfo, frame_sender: FrameSender) -> DeviceResult<Self> {
        info!(camera = %camera.name, "Creating preview pipeline");

        gstreamer::init()
            .map_err(|e| DeviceError::Unavailable(format!("GStreamer init failed: {}", e)))?;

        let description = build_pipeline_string(&camera.target);
        debug!(pipeline = %description, "Launching pipeline");

        let pipeline = gstreamer::parse::launch(&description)
            .map_err(|e| DeviceError::InitializationFailed(e.to_string()))?
            .dynamic_cast::<gstreamer::Pipeline>()
            .map_err(|_| {
                DeviceError::InitializationFailed("failed to cast to pipeline".to_string())
            })?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| {
                DeviceError::InitializationFailed("failed to get appsink".to_string())
            })?
            .dynamic_cast::<AppSink>()
            .map_err(|_| {
                DeviceError::InitializationFailed("failed to cast appsink".to_string())
            })?;

        appsink.set_property("emit-signals", true);
        appsink.set_property("sync", false);
        appsink.set_property("max-buffers", pipeline::MAX_BUFFERS);
        appsink.set_property("drop", true);
        appsink.set_property("enable-last-sample", false);

        appsink.set_callbacks(
            gstreamer_app::AppSinkCallbacks::builder()
                .new_sample(move |appsink| {
                    let sample = appsink.pull_sample().map_err(|_| gstreamer::FlowError::Eos)?;
                    let buffer = sample.buffer().ok_or(gstreamer::FlowError::Error)?;
                    let caps = sample.caps().ok_or(gstreamer::FlowError::Error)?;
                    let video_info =
                        VideoInfo::from_caps(caps).map_err(|_| gstreamer::FlowError::Error)?;
                    let map = buffer
                        .map_readable()
                        .map_err(|_| gstreamer::FlowError::Error)?;

                    let frame = frame_from_mapped(&video_info, map.as_slice());

                    // Non-blocking send: when the channel is full the UI is
                    // behind and this frame is stale anyway.
                    let mut sender = frame_sender.clone();
                    if let Err(e) = sender.try_send(frame) {
                        debug!(error = %e, "Frame dropped (channel full)");
                    }

                    Ok(gstreamer::FlowSuccess::Ok)
                })
                .build(),
        );

        pipeline.set_state(gstreamer::State::Playing).map_err(|e| {
            DeviceError::InitializationFailed(format!("failed to start pipeline: {}", e))
        })?;

        // Wait for the state change to complete; asynchronous transitions are
        // accepted so a slow device does not stall startup.
        let (result, state, pending) = pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::START_TIMEOUT_SECS,
        ));
        debug!(?result, ?state, ?pending, "Pipeline state");
        if result.is_err() {
            let _ = pipeline.set_state(gstreamer::State::Null);
            return Err(DeviceError::InitializationFailed(format!(
                "pipeline failed to reach PLAYING (state: {:?})",
                state
            )));
        }
        if state != gstreamer::State::Playing {
            warn!(?state, ?pending, "Pipeline not yet in PLAYING state");
        }

        info!(camera = %camera.name, "Preview pipeline running");

        Ok(Self { pipeline, appsink })
    }

    /// Stop the pipeline and release the camera
    pub fn stop(self) {
        info!("Stopping preview pipeline");

        // Clear appsink callbacks to release all references
        self.appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());

        if self.pipeline.set_state(gstreamer::State::Null).is_ok() {
            // Wait so GStreamer releases the device before a reopen
            let (_, state, _) = self.pipeline.state(gstreamer::ClockTime::from_seconds(
                timing::STOP_TIMEOUT_SECS,
            ));
            debug!(?state, "Preview pipeline stopped");
        }
    }
}

impl Drop for PreviewPipeline {
    fn drop(&mut self) {
        self.appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
        let _ = self.pipeline.set_state(gstreamer::State::Null);
    }
}

/// Build the launch string for a camera target
///
/// An empty target lets PipeWire auto-select the default camera. Conversion
/// to RGBA happens in the pipeline so every consumer downstream sees one
/// canonical pixel format.
fn build_pipeline_string(target: &str) -> String {
    let target_prop = if target.is_empty() {
        String::new()
    } else {
        format!("target-object={} ", target)
    };

    format!(
        "pipewiresrc {}do-timestamp=true ! \
         queue max-size-buffers={} leaky=downstream ! \
         videoconvert ! video/x-raw,format=RGBA ! \
         appsink name=sink",
        target_prop,
        pipeline::MAX_BUFFERS,
    )
}

/// Copy a mapped RGBA buffer into a tightly packed [`Frame`]
///
/// GStreamer rows may carry padding; the stride is honored when copying so
/// the resulting frame is exactly `width * height * 4` bytes.
fn frame_from_mapped(video_info: &VideoInfo, data: &[u8]) -> Frame {
    let width = video_info.width();
    let height = video_info.height();
    let stride = video_info.stride()[0] as usize;
    let row_bytes = (width as usize) * 4;
    let expected = row_bytes * height as usize;

    let pixels: Arc<[u8]> = if stride == row_bytes && data.len() >= expected {
        Arc::from(&data[..expected])
    } else {
        let mut packed = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let start = row * stride;
            let end = start + row_bytes;
            if end <= data.len() {
                packed.extend_from_slice(&data[start..end]);
            }
        }
        Arc::from(packed.into_boxed_slice())
    };

    Frame {
        width,
        height,
        data: pixels,
        captured_at: Instant::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_string_auto_select() {
        let desc = build_pipeline_string("");
        assert!(desc.starts_with("pipewiresrc do-timestamp=true"));
        assert!(desc.contains("format=RGBA"));
        assert!(desc.ends_with("appsink name=sink"));
    }

    #[test]
    fn test_pipeline_string_with_target() {
        let desc = build_pipeline_string("2146");
        assert!(desc.contains("target-object=2146 "));
    }
}
