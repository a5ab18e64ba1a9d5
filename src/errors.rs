// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the photo booth

use std::fmt;

/// Result type alias using BoothError
pub type BoothResult<T> = Result<T, BoothError>;

/// Result type for capture source operations
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Result type for collage rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum BoothError {
    /// Capture source errors
    Device(DeviceError),
    /// Collage rendering errors
    Render(RenderError),
    /// Delivery errors
    Delivery(DeliveryError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Capture-source errors
///
/// All variants are retryable: the session stays in its current phase and the
/// user may re-open the source or re-arm the countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// No camera devices found
    NoCameraFound,
    /// Camera stack unavailable (permission denied, PipeWire missing, hardware absent)
    Unavailable(String),
    /// `capture_frame` called before a successful `open`
    StreamNotOpen,
    /// The stream is open but has not delivered a frame yet
    NoFrameAvailable,
    /// Pipeline creation failed
    InitializationFailed(String),
    /// Camera disconnected during operation
    Disconnected,
}

/// Collage rendering errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// No frames to compose
    EmptySequence,
    /// A frame has zero dimensions or truncated pixel data
    BadFrame(String),
    /// Encoding failed
    EncodingFailed(String),
    /// Save failed
    SaveFailed(String),
}

/// Delivery errors, surfaced inline in the email form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// Submitted address is empty
    EmptyAddress,
    /// No artifact exists and a fresh one could not be produced
    NothingToSend(String),
    /// Simulated transfer failed
    SendFailed(String),
}

impl fmt::Display for BoothError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoothError::Device(e) => write!(f, "Camera error: {}", e),
            BoothError::Render(e) => write!(f, "Collage error: {}", e),
            BoothError::Delivery(e) => write!(f, "Delivery error: {}", e),
            BoothError::Config(msg) => write!(f, "Configuration error: {}", msg),
            BoothError::Storage(msg) => write!(f, "Storage error: {}", msg),
            BoothError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::NoCameraFound => write!(f, "No camera devices found"),
            DeviceError::Unavailable(msg) => write!(f, "Camera unavailable: {}", msg),
            DeviceError::StreamNotOpen => write!(f, "Camera stream is not open"),
            DeviceError::NoFrameAvailable => write!(f, "No frame available yet"),
            DeviceError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            DeviceError::Disconnected => write!(f, "Camera disconnected"),
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::EmptySequence => write!(f, "No photos to compose"),
            RenderError::BadFrame(msg) => write!(f, "Bad frame: {}", msg),
            RenderError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            RenderError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
        }
    }
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::EmptyAddress => write!(f, "Please enter an email address"),
            DeliveryError::NothingToSend(msg) => write!(f, "Could not produce a collage: {}", msg),
            DeliveryError::SendFailed(msg) => write!(f, "Failed to send: {}", msg),
        }
    }
}

impl std::error::Error for BoothError {}
impl std::error::Error for DeviceError {}
impl std::error::Error for RenderError {}
impl std::error::Error for DeliveryError {}

// Conversions from sub-errors to BoothError
impl From<DeviceError> for BoothError {
    fn from(err: DeviceError) -> Self {
        BoothError::Device(err)
    }
}

impl From<RenderError> for BoothError {
    fn from(err: RenderError) -> Self {
        BoothError::Render(err)
    }
}

impl From<DeliveryError> for BoothError {
    fn from(err: DeliveryError) -> Self {
        BoothError::Delivery(err)
    }
}

impl From<String> for BoothError {
    fn from(msg: String) -> Self {
        BoothError::Other(msg)
    }
}

impl From<&str> for BoothError {
    fn from(msg: &str) -> Self {
        BoothError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for BoothError {
    fn from(err: std::io::Error) -> Self {
        BoothError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::SaveFailed(err.to_string())
    }
}
