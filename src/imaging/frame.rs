//! Frame-to-still conversion for camera captures.
//!
//! A capture takes the current stream frame, fits it to the stream's reported
//! dimensions, flips it horizontally and encodes a lossy JPEG. The flip
//! undoes the mirroring applied to the live selfie preview so the still
//! matches real-world orientation.

use super::{Dimensions, ImagingError, Quality};
use image::imageops::FilterType;
use image::{ImageEncoder, RgbImage};
use std::path::Path;

/// Resize `frame` to exactly `target` unless it already matches.
pub fn fit_to_stream(frame: RgbImage, target: Dimensions) -> RgbImage {
    if Dimensions::of(&frame) == target || target.is_empty() {
        return frame;
    }
    image::imageops::resize(&frame, target.width, target.height, FilterType::Triangle)
}

/// Flip a frame horizontally.
pub fn mirror(frame: &RgbImage) -> RgbImage {
    image::imageops::flip_horizontal(frame)
}

/// Encode a frame as JPEG at the given quality.
pub fn encode_jpeg(frame: &RgbImage, quality: Quality) -> Result<Vec<u8>, ImagingError> {
    if frame.width() == 0 || frame.height() == 0 {
        return Err(ImagingError::ProcessingFailed(
            "cannot encode an empty frame".into(),
        ));
    }
    let mut buffer = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.value())
        .write_image(
            frame.as_raw(),
            frame.width(),
            frame.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| ImagingError::ProcessingFailed(format!("JPEG encode failed: {e}")))?;
    Ok(buffer)
}

/// Full capture conversion: fit, mirror, encode.
pub fn still_from_frame(
    frame: RgbImage,
    stream: Dimensions,
    quality: Quality,
) -> Result<Vec<u8>, ImagingError> {
    let fitted = fit_to_stream(frame, stream);
    encode_jpeg(&mirror(&fitted), quality)
}

/// Load and decode an image from disk into an RGB frame.
pub fn load_frame(path: &Path) -> Result<RgbImage, ImagingError> {
    let bytes = std::fs::read(path)?;
    decode_frame(&bytes).map_err(|e| match e {
        ImagingError::ProcessingFailed(msg) => {
            ImagingError::ProcessingFailed(format!("{}: {msg}", path.display()))
        }
        other => other,
    })
}

/// Decode an encoded image held in memory.
pub fn decode_frame(bytes: &[u8]) -> Result<RgbImage, ImagingError> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgb8())
        .map_err(|e| ImagingError::ProcessingFailed(format!("Failed to decode: {e}")))
}
