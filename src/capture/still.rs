//! Virtual camera whose feed is a still image.
//!
//! Used by the CLI `capture` command and by integration tests: the "sensor"
//! is a decoded image file (or a generated test pattern), scaled to the
//! negotiated stream resolution. Each facing mode can be present or absent,
//! so a single-camera device answers requests for the other side with
//! [`CameraError::DeviceNotFound`].

use super::device::{
    CameraDevice, CameraError, FacingMode, FrameWait, MediaStream, StreamConstraints,
};
use crate::imaging::{Dimensions, ImagingError, load_frame, negotiate_resolution};
use async_trait::async_trait;
use image::RgbImage;
use image::imageops::FilterType;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// A camera that streams one fixed frame.
#[derive(Debug, Clone)]
pub struct StillCamera {
    frame: Arc<RgbImage>,
    facings: Vec<FacingMode>,
}

impl StillCamera {
    /// Stream `frame` from both facing modes.
    pub fn from_frame(frame: RgbImage) -> Self {
        Self {
            frame: Arc::new(frame),
            facings: vec![FacingMode::Front, FacingMode::Rear],
        }
    }

    /// Decode an image file to use as the feed.
    pub fn from_file(path: &Path) -> Result<Self, ImagingError> {
        Ok(Self::from_frame(load_frame(path)?))
    }

    /// Colour-bar test pattern at the given native resolution.
    pub fn test_pattern(native: Dimensions) -> Self {
        const BARS: [[u8; 3]; 6] = [
            [255, 255, 255],
            [255, 255, 0],
            [0, 255, 255],
            [0, 255, 0],
            [255, 0, 255],
            [0, 0, 255],
        ];
        let bar_width = (native.width / BARS.len() as u32).max(1);
        let frame = RgbImage::from_fn(native.width, native.height, |x, _| {
            let bar = ((x / bar_width) as usize).min(BARS.len() - 1);
            image::Rgb(BARS[bar])
        });
        Self::from_frame(frame)
    }

    /// Restrict the device to a single facing mode.
    pub fn only(mut self, facing: FacingMode) -> Self {
        self.facings = vec![facing];
        self
    }

    pub fn native_dimensions(&self) -> Dimensions {
        Dimensions::of(&self.frame)
    }
}

#[async_trait]
impl CameraDevice for StillCamera {
    async fn open(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn MediaStream>, CameraError> {
        if !self.facings.contains(&constraints.facing) {
            return Err(CameraError::DeviceNotFound);
        }
        let dimensions =
            negotiate_resolution(self.native_dimensions(), constraints.ideal, constraints.max);
        debug!(
            native = %self.native_dimensions(),
            granted = %dimensions,
            "still camera stream granted"
        );
        Ok(Box::new(StillStream {
            frame: Some(Arc::clone(&self.frame)),
            dimensions,
        }))
    }
}

struct StillStream {
    frame: Option<Arc<RgbImage>>,
    dimensions: Dimensions,
}

impl MediaStream for StillStream {
    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn first_frame(&mut self) -> FrameWait {
        let ready = self.frame.is_some();
        Box::pin(async move {
            if ready {
                Ok(())
            } else {
                Err(CameraError::Unknown("stream released".into()))
            }
        })
    }

    fn grab_frame(&mut self) -> Result<RgbImage, CameraError> {
        let frame = self
            .frame
            .as_ref()
            .ok_or_else(|| CameraError::Unknown("stream released".into()))?;
        if Dimensions::of(frame) == self.dimensions {
            return Ok(frame.as_ref().clone());
        }
        Ok(image::imageops::resize(
            frame.as_ref(),
            self.dimensions.width,
            self.dimensions.height,
            FilterType::Triangle,
        ))
    }

    fn release(&mut self) {
        self.frame = None;
    }
}
