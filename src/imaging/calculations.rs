//! Pure calculation functions for frame dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::Dimensions;

/// Scale `source` down to fit inside `bound`, preserving aspect ratio.
///
/// Never upscales. Each edge of the result is at least 1 pixel when the
/// source is non-empty.
///
/// # Examples
/// ```
/// # use artify::imaging::{Dimensions, fit_within};
/// let fitted = fit_within(Dimensions::new(4000, 3000), Dimensions::new(1280, 720));
/// assert_eq!(fitted, Dimensions::new(960, 720));
/// ```
pub fn fit_within(source: Dimensions, bound: Dimensions) -> Dimensions {
    if source.is_empty() || (source.width <= bound.width && source.height <= bound.height) {
        return source;
    }
    let scale = f64::min(
        bound.width as f64 / source.width as f64,
        bound.height as f64 / source.height as f64,
    );
    Dimensions {
        width: ((source.width as f64 * scale).round() as u32).clamp(1, bound.width.max(1)),
        height: ((source.height as f64 * scale).round() as u32).clamp(1, bound.height.max(1)),
    }
}

/// Pick the stream resolution for a device whose native frames are `native`.
///
/// The ideal size is a hint, so frames larger than it are scaled down toward
/// it. The max size is a hard cap and always holds.
pub fn negotiate_resolution(native: Dimensions, ideal: Dimensions, max: Dimensions) -> Dimensions {
    fit_within(fit_within(native, ideal), max)
}
