// SPDX-License-Identifier: GPL-3.0-only

//! PipeWire camera enumeration
//!
//! Discovers cameras through `pw-cli` node listings. PipeWire handles device
//! access and format negotiation internally, so the only things needed here
//! are a target identifier per camera and, when the node reports one, the
//! sensor facing.

use super::types::{CameraInfo, Facing};
use crate::errors::{DeviceError, DeviceResult};
use tracing::{debug, info, warn};

/// Enumerate cameras available through PipeWire
///
/// Fails with `Unavailable` when the GStreamer/PipeWire stack itself is
/// missing. When PipeWire is present but node discovery finds nothing, a
/// single auto-select entry is returned and PipeWire picks the default
/// camera at stream time.
pub fn enumerate_cameras() -> DeviceResult<Vec<CameraInfo>> {
    gstreamer::init()
        .map_err(|e| DeviceError::Unavailable(format!("GStreamer init failed: {}", e)))?;

    // pipewiresrc must exist before any target is worth reporting
    if gstreamer::ElementFactory::find("pipewiresrc").is_none() {
        debug!("pipewiresrc not available");
        return Err(DeviceError::Unavailable(
            "pipewiresrc element not available".to_string(),
        ));
    }

    if let Some(cameras) = try_enumerate_with_pw_cli()
        && !cameras.is_empty()
    {
        debug!(count = cameras.len(), "Found PipeWire cameras");
        return Ok(cameras);
    }

    // Fallback: let PipeWire pick its default camera
    info!("Using PipeWire auto-selection (default camera)");
    Ok(vec![CameraInfo {
        name: "Default Camera (PipeWire)".to_string(),
        target: String::new(),
        facing: None,
    }])
}

/// Try to enumerate cameras using the pw-cli command
fn try_enumerate_with_pw_cli() -> Option<Vec<CameraInfo>> {
    debug!("Trying pw-cli for camera enumeration");

    let output = std::process::Command::new("pw-cli")
        .args(["ls", "Node"])
        .output()
        .ok()?;

    if !output.status.success() {
        debug!("pw-cli command failed");
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut cameras = Vec::new();
    let mut node = NodeProps::default();

    for line in stdout.lines() {
        let trimmed = line.trim();

        // A new node block starts (format: "id 76, type PipeWire:Interface:Node/3")
        if trimmed.starts_with("id ") && trimmed.contains("type PipeWire:Interface:Node") {
            if let Some(camera) = node.into_camera() {
                cameras.push(camera);
            }
            node = NodeProps::default();

            if let Some(id_str) = trimmed.strip_prefix("id ")
                && let Some(id_num) = id_str.split(',').next()
            {
                node.id = Some(id_num.trim().to_string());
            }
            continue;
        }

        if trimmed.contains("media.class") && trimmed.contains("\"Video/Source\"") {
            node.is_video_source = true;
        } else if trimmed.contains("object.serial") {
            node.serial = extract_quoted_value(trimmed).map(str::to_string);
        } else if trimmed.contains("node.description") {
            node.description = extract_quoted_value(trimmed).map(str::to_string);
        } else if trimmed.contains("node.nick") {
            node.nick = extract_quoted_value(trimmed).map(str::to_string);
        } else if trimmed.contains("api.libcamera.location") || trimmed.contains("device.form-factor")
        {
            node.location = extract_quoted_value(trimmed).map(str::to_string);
        }
    }

    // Flush the final node block
    if let Some(camera) = node.into_camera() {
        cameras.push(camera);
    }

    if cameras.is_empty() {
        warn!("pw-cli reported no video sources");
        None
    } else {
        Some(cameras)
    }
}

/// Properties collected while scanning one pw-cli node block
#[derive(Debug, Default)]
struct NodeProps {
    id: Option<String>,
    serial: Option<String>,
    description: Option<String>,
    nick: Option<String>,
    location: Option<String>,
    is_video_source: bool,
}

impl NodeProps {
    /// Convert a completed node block into a camera entry, if it is one
    fn into_camera(self) -> Option<CameraInfo> {
        if !self.is_video_source {
            return None;
        }

        let id = self.id?;
        let name = self
            .description
            .or(self.nick)
            .unwrap_or_else(|| format!("Camera {}", id));

        // Prefer object.serial for target-object, fall back to the node ID
        let target = self.serial.unwrap_or(id);
        let facing = self.location.as_deref().and_then(classify_facing);

        debug!(name = %name, target = %target, ?facing, "Found video camera");
        Some(CameraInfo {
            name,
            target,
            facing,
        })
    }
}

/// Map a PipeWire location/form-factor property to a facing value
fn classify_facing(location: &str) -> Option<Facing> {
    match location.to_ascii_lowercase().as_str() {
        "front" | "user" => Some(Facing::Front),
        "back" | "rear" | "world" => Some(Facing::Back),
        _ => None,
    }
}

/// Extract the value between the first pair of double quotes
fn extract_quoted_value(line: &str) -> Option<&str> {
    let start = line.find('"')? + 1;
    let end = line[start..].find('"')? + start;
    Some(&line[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_quoted_value() {
        assert_eq!(
            extract_quoted_value("object.serial = \"2146\""),
            Some("2146")
        );
        assert_eq!(extract_quoted_value("no quotes here"), None);
        assert_eq!(extract_quoted_value("empty = \"\""), Some(""));
    }

    #[test]
    fn test_classify_facing() {
        assert_eq!(classify_facing("front"), Some(Facing::Front));
        assert_eq!(classify_facing("Rear"), Some(Facing::Back));
        assert_eq!(classify_facing("external"), None);
    }

    #[test]
    fn test_node_props_requires_video_source() {
        let node = NodeProps {
            id: Some("42".to_string()),
            ..Default::default()
        };
        assert!(node.into_camera().is_none());

        let node = NodeProps {
            id: Some("42".to_string()),
            nick: Some("Webcam".to_string()),
            is_video_source: true,
            ..Default::default()
        };
        let camera = node.into_camera().unwrap();
        assert_eq!(camera.name, "Webcam");
        assert_eq!(camera.target, "42");
    }
}
