//! Shared test utilities.
//!
//! Provides synthetic frames and photos plus a scriptable in-memory
//! [`ArtTransformService`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let service = FakeService::new()
//!     .delay("slow style", Duration::from_millis(800))
//!     .fail("broken style", "quota exceeded");
//! let photo = sample_artifact();
//! ```

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::artifact::{PhotoArtifact, SourceKind};
use crate::codec::{DataUri, ImageEncoding, validate_and_encode};
use crate::imaging::{Quality, encode_jpeg};
use crate::transform::service::{ArtTransformService, ServiceFailure};

// =========================================================================
// Frames and photos
// =========================================================================

/// A frame whose left half is pure red and right half pure blue.
///
/// Makes horizontal flips easy to assert on. Zero-sized frames are allowed.
pub fn split_frame(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgb([255, 0, 0])
        } else {
            Rgb([0, 0, 255])
        }
    })
}

/// A small real JPEG.
pub fn sample_jpeg() -> Vec<u8> {
    encode_jpeg(&split_frame(32, 24), Quality::default()).unwrap()
}

/// An uploaded JPEG artifact.
pub fn sample_artifact() -> PhotoArtifact {
    validate_and_encode(&sample_jpeg(), "image/jpeg").unwrap()
}

// =========================================================================
// FakeService
// =========================================================================

/// In-memory transform service.
///
/// By default every call succeeds immediately and answers with
/// [`FakeService::rendered`] for the requested prompt, so tests can tell
/// which request a displayed result belongs to. Per-prompt delays and
/// failures are configured with the builder methods. Calls are recorded.
#[derive(Default)]
pub struct FakeService {
    delays: HashMap<String, Duration>,
    failures: HashMap<String, String>,
    fixed_reply: Option<String>,
    preview_calls: Mutex<Vec<String>>,
    final_calls: Mutex<Vec<String>>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests for `prompt` only after `delay`.
    pub fn delay(mut self, prompt: &str, delay: Duration) -> Self {
        self.delays.insert(prompt.to_string(), delay);
        self
    }

    /// Fail requests for `prompt` with `message`.
    pub fn fail(mut self, prompt: &str, message: &str) -> Self {
        self.failures.insert(prompt.to_string(), message.to_string());
        self
    }

    /// Answer every request with `text`, whatever the prompt.
    pub fn reply_with(mut self, text: &str) -> Self {
        self.fixed_reply = Some(text.to_string());
        self
    }

    /// The artifact a successful call for `prompt` decodes to.
    pub fn rendered(prompt: &str, kind: SourceKind) -> PhotoArtifact {
        PhotoArtifact::new(Self::render(prompt), kind)
    }

    fn render(prompt: &str) -> DataUri {
        DataUri::encode(ImageEncoding::Png, prompt.as_bytes())
    }

    pub fn preview_calls(&self) -> Vec<String> {
        self.preview_calls.lock().unwrap().clone()
    }

    pub fn final_calls(&self) -> Vec<String> {
        self.final_calls.lock().unwrap().clone()
    }

    async fn answer(&self, prompt: &str) -> Result<String, ServiceFailure> {
        if let Some(delay) = self.delays.get(prompt) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(message) = self.failures.get(prompt) {
            return Err(ServiceFailure::new(message.clone()));
        }
        Ok(match &self.fixed_reply {
            Some(text) => text.clone(),
            None => Self::render(prompt).as_str().to_string(),
        })
    }
}

#[async_trait]
impl ArtTransformService for FakeService {
    async fn preview_transform(
        &self,
        _photo: &DataUri,
        style_description: &str,
    ) -> Result<String, ServiceFailure> {
        self.preview_calls
            .lock()
            .unwrap()
            .push(style_description.to_string());
        self.answer(style_description).await
    }

    async fn final_transform(
        &self,
        _photo: &DataUri,
        style_description: &str,
    ) -> Result<String, ServiceFailure> {
        self.final_calls
            .lock()
            .unwrap()
            .push(style_description.to_string());
        self.answer(style_description).await
    }
}
