//! Frame imaging in pure Rust via the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Mirror** | `image::imageops::flip_horizontal` |
//! | **Fit to stream size** | `image::imageops::resize` (Triangle) |
//! | **Encode still** | `image::codecs::jpeg::JpegEncoder` |
//! | **Decode feed** | `image::load_from_memory` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Encoding quality
//! - **Frame**: Capture conversion (fit, mirror, encode)

mod calculations;
pub mod frame;
mod params;

use image::RgbImage;
use thiserror::Error;

pub use calculations::{fit_within, negotiate_resolution};
pub use frame::{decode_frame, encode_jpeg, load_frame, mirror, still_from_frame};
pub use params::Quality;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of a frame or stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn of(frame: &RgbImage) -> Self {
        Self::new(frame.width(), frame.height())
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<[u32; 2]> for Dimensions {
    fn from([width, height]: [u32; 2]) -> Self {
        Self::new(width, height)
    }
}
