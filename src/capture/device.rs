//! Camera backend trait and shared types.
//!
//! A [`CameraDevice`] grants [`MediaStream`]s for a set of
//! [`StreamConstraints`]. The session never talks to hardware directly, so
//! the rest of the crate is backend-agnostic. The production backend for the
//! CLI is [`StillCamera`](super::still::StillCamera); tests use a scripted
//! mock.
//!
//! Streams are held through a [`StreamHandle`], which releases the stream
//! when dropped. Whatever path a session leaves by (stop, capture, error,
//! teardown), the handle's drop is the one place the release happens.

use crate::imaging::Dimensions;
use async_trait::async_trait;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no camera found on this device")]
    DeviceNotFound,
    #[error("camera took too long to start")]
    Timeout,
    #[error("camera is not ready")]
    SinkNotReady,
    #[error("capture failed: {0}")]
    CaptureFailed(String),
    #[error("camera error: {0}")]
    Unknown(String),
}

impl CameraError {
    /// Categorize a failure reported as an error name plus message, the way
    /// browser media APIs report them.
    pub fn categorize(name: &str, message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        if name == "NotAllowedError" || lower.contains("permission denied") {
            CameraError::PermissionDenied
        } else if name == "NotFoundError" || lower.contains("not found") {
            CameraError::DeviceNotFound
        } else if lower.contains("timeout") {
            CameraError::Timeout
        } else if message.is_empty() {
            CameraError::Unknown(name.to_string())
        } else {
            CameraError::Unknown(message.to_string())
        }
    }
}

/// Which way the camera faces.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// User-facing ("selfie") camera.
    #[default]
    Front,
    /// Environment-facing camera.
    Rear,
}

impl FacingMode {
    pub fn opposite(self) -> Self {
        match self {
            FacingMode::Front => FacingMode::Rear,
            FacingMode::Rear => FacingMode::Front,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FacingMode::Front => "Front",
            FacingMode::Rear => "Rear",
        }
    }
}

/// What a session asks the device for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub facing: FacingMode,
    /// Preferred resolution; devices pick the closest mode they have.
    pub ideal: Dimensions,
    /// Hard upper bound on the granted resolution.
    pub max: Dimensions,
}

impl StreamConstraints {
    pub const DEFAULT_IDEAL: Dimensions = Dimensions::new(640, 480);
    pub const DEFAULT_MAX: Dimensions = Dimensions::new(1280, 720);

    pub fn new(facing: FacingMode) -> Self {
        Self {
            facing,
            ideal: Self::DEFAULT_IDEAL,
            max: Self::DEFAULT_MAX,
        }
    }
}

/// Resolves once the preview sink has decoded its first frame.
///
/// Owned and detached from the stream, so the stream itself can be released
/// while something is still waiting on it.
pub type FrameWait = Pin<Box<dyn Future<Output = Result<(), CameraError>> + Send>>;

/// A live video stream granted by a device.
pub trait MediaStream: Send {
    /// Resolution the stream reports for its frames. May be empty until the
    /// first frame is decoded.
    fn dimensions(&self) -> Dimensions;

    /// Wait for the first decoded frame. The wait fails if the stream errors
    /// first and may never resolve.
    fn first_frame(&mut self) -> FrameWait;

    /// Copy out the current frame.
    fn grab_frame(&mut self) -> Result<RgbImage, CameraError>;

    /// Stop all tracks. Must be safe to call more than once.
    fn release(&mut self);
}

/// A source of media streams.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    async fn open(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn MediaStream>, CameraError>;
}

/// Exclusive owner of a granted stream. Releases it on drop.
pub struct StreamHandle(Box<dyn MediaStream>);

impl StreamHandle {
    pub fn new(stream: Box<dyn MediaStream>) -> Self {
        Self(stream)
    }

    pub fn stream(&mut self) -> &mut dyn MediaStream {
        self.0.as_mut()
    }

    pub fn dimensions(&self) -> Dimensions {
        self.0.dimensions()
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.0.release();
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StreamHandle")
            .field(&self.0.dimensions())
            .finish()
    }
}
