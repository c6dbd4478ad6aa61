//! User-facing notices.
//!
//! Failures never end the session; each one becomes a short titled message
//! instead. Successes that the user should know about get one too.

use crate::capture::{CameraError, FacingMode};
use crate::codec::ValidationError;
use crate::collage::CollageError;
use crate::transform::TransformError;
use serde::Serialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub description: String,
}

impl Notice {
    fn info(title: &str, description: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            title: title.to_string(),
            description: description.into(),
        }
    }

    fn destructive(title: &str, description: impl Into<String>) -> Self {
        Self {
            severity: Severity::Destructive,
            title: title.to_string(),
            description: description.into(),
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.severity == Severity::Destructive
    }

    pub fn upload_rejected(err: &ValidationError) -> Self {
        match err {
            ValidationError::FileTooLarge { .. } => Self::destructive(
                "File Too Large",
                "Please upload an image smaller than 4MB.",
            ),
            ValidationError::UnsupportedType(mime) => Self::destructive(
                "Unsupported File Type",
                format!("{mime} is not supported. Please upload a JPEG, PNG or WebP image."),
            ),
            ValidationError::Malformed(_) => Self::destructive(
                "Unreadable Image",
                "The selected file could not be read as an image.",
            ),
        }
    }

    pub fn camera(err: &CameraError) -> Self {
        match err {
            CameraError::SinkNotReady => Self::destructive(
                "Camera Not Ready",
                "Please wait for the camera to fully load and try again.",
            ),
            CameraError::CaptureFailed(_) => Self::destructive(
                "Capture Failed",
                "There was an error capturing the photo. Please try again.",
            ),
            CameraError::PermissionDenied => Self::destructive(
                "Camera Access Failed",
                "Camera permission denied. Please allow camera access and try again.",
            ),
            CameraError::DeviceNotFound => {
                Self::destructive("Camera Access Failed", "No camera found on this device.")
            }
            CameraError::Timeout => Self::destructive(
                "Camera Access Failed",
                "Camera took too long to start. Please try again.",
            ),
            CameraError::Unknown(_) => Self::destructive(
                "Camera Access Failed",
                "Please allow camera access to use this feature.",
            ),
        }
    }

    pub fn preview_failed(err: &TransformError) -> Self {
        Self::destructive("Preview Failed", err.to_string())
    }

    pub fn transform_failed(err: &TransformError) -> Self {
        Self::destructive("Transform Failed", err.to_string())
    }

    pub fn collage_failed(err: &CollageError) -> Self {
        Self::destructive("Save Failed", err.to_string())
    }

    pub fn nothing_to_download() -> Self {
        Self::destructive(
            "No Image to Download",
            "Please select a photo and art style first.",
        )
    }

    pub fn upload_first() -> Self {
        Self::destructive(
            "Upload a Photo First",
            "You need to provide a photo before selecting a style.",
        )
    }

    pub fn no_style_selected() -> Self {
        Self::destructive("No Style Selected", "Please select an art style first.")
    }

    pub fn camera_started(facing: FacingMode) -> Self {
        Self::info(
            "Camera Started",
            format!(
                "Camera is now active ({}). Position yourself and click capture.",
                facing.label()
            ),
        )
    }

    pub fn photo_captured() -> Self {
        Self::info("Photo Captured!", "Your photo has been captured successfully.")
    }

    pub fn download_started(path: &Path) -> Self {
        Self::info(
            "Download Started",
            format!("Your image is being saved to {}.", path.display()),
        )
    }

    pub fn saved_to_collage(style_name: &str) -> Self {
        Self::info(
            "Saved to Collage",
            format!("Your {style_name} artwork was added to the collage."),
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::MAX_PHOTO_BYTES;

    #[test]
    fn size_rejection_mentions_limit() {
        let notice = Notice::upload_rejected(&ValidationError::FileTooLarge {
            size: MAX_PHOTO_BYTES + 1,
            limit: MAX_PHOTO_BYTES,
        });
        assert_eq!(notice.title, "File Too Large");
        assert!(notice.description.contains("4MB"));
        assert!(notice.is_destructive());
    }

    #[test]
    fn camera_errors_map_to_distinct_notices() {
        assert_eq!(
            Notice::camera(&CameraError::SinkNotReady).title,
            "Camera Not Ready"
        );
        assert_eq!(
            Notice::camera(&CameraError::CaptureFailed("x".into())).title,
            "Capture Failed"
        );
        let denied = Notice::camera(&CameraError::PermissionDenied);
        assert_eq!(denied.title, "Camera Access Failed");
        assert!(denied.description.contains("permission denied"));
        assert_eq!(
            Notice::camera(&CameraError::DeviceNotFound).description,
            "No camera found on this device."
        );
    }

    #[test]
    fn preview_failure_is_verbatim() {
        let notice = Notice::preview_failed(&TransformError::Service("quota exceeded".into()));
        assert_eq!(notice.title, "Preview Failed");
        assert_eq!(notice.description, "quota exceeded");
    }

    #[test]
    fn camera_started_names_facing() {
        let notice = Notice::camera_started(FacingMode::Rear);
        assert_eq!(notice.severity, Severity::Info);
        assert!(notice.description.contains("(Rear)"));
    }

    #[test]
    fn display_joins_title_and_description() {
        assert_eq!(
            Notice::photo_captured().to_string(),
            "Photo Captured!: Your photo has been captured successfully."
        );
    }
}
