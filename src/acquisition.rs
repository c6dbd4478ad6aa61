//! Photo acquisition: upload or camera, one at a time.
//!
//! The controller holds the current photo. Both upload paths (picking a
//! file, dropping files) funnel into the same validation, and the camera
//! path delegates to the [`CaptureSession`]. A rejected upload or failed
//! capture never disturbs the photo already held. An accepted upload
//! switches to upload mode, which stops a live camera.
//!
//! Every change to the held photo is announced on a broadcast channel so
//! dependent state (the displayed preview, for one) can follow along.

use crate::artifact::PhotoArtifact;
use crate::capture::device::CameraDevice;
use crate::capture::{CameraError, CaptureSession, FacingMode, SessionState};
use crate::codec::{ImageEncoding, ValidationError, validate_and_encode};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Which acquisition path is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AcquisitionMode {
    #[default]
    Upload,
    Camera,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionEvent {
    Acquired(PhotoArtifact),
    Cleared,
}

/// A file offered for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    /// Declared media type.
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a file, declaring its type from the extension.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, mime_for_path(path), bytes))
    }
}

/// Media type a file picker would report for `path`.
pub fn mime_for_path(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if let Some(encoding) = ImageEncoding::from_extension(&ext) {
        return encoding.mime_type().to_string();
    }
    match ext.as_str() {
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
    .to_string()
}

pub struct AcquisitionController<D> {
    session: CaptureSession<D>,
    mode: Mutex<AcquisitionMode>,
    artifact: Mutex<Option<PhotoArtifact>>,
    events: broadcast::Sender<AcquisitionEvent>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<D: CameraDevice> AcquisitionController<D> {
    pub fn new(session: CaptureSession<D>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            session,
            mode: Mutex::new(AcquisitionMode::default()),
            artifact: Mutex::new(None),
            events,
        }
    }

    pub fn session(&self) -> &CaptureSession<D> {
        &self.session
    }

    pub fn mode(&self) -> AcquisitionMode {
        *lock(&self.mode)
    }

    /// The photo currently held, if any.
    pub fn artifact(&self) -> Option<PhotoArtifact> {
        lock(&self.artifact).clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AcquisitionEvent> {
        self.events.subscribe()
    }

    /// Switch paths. Leaving camera mode releases the camera.
    pub fn set_mode(&self, mode: AcquisitionMode) {
        let previous = std::mem::replace(&mut *lock(&self.mode), mode);
        if previous == AcquisitionMode::Camera && mode != AcquisitionMode::Camera {
            self.session.stop();
        }
        debug!(?previous, ?mode, "acquisition mode");
    }

    /// A file picked from a dialog. `None` means the dialog was cancelled.
    pub fn select_file(
        &self,
        upload: Option<Upload>,
    ) -> Result<Option<PhotoArtifact>, ValidationError> {
        match upload {
            Some(upload) => self.accept(upload).map(Some),
            None => Ok(None),
        }
    }

    /// Files dropped onto the drop zone. Only the first is used.
    pub fn drop_files(
        &self,
        uploads: Vec<Upload>,
    ) -> Result<Option<PhotoArtifact>, ValidationError> {
        self.select_file(uploads.into_iter().next())
    }

    fn accept(&self, upload: Upload) -> Result<PhotoArtifact, ValidationError> {
        let artifact = validate_and_encode(&upload.bytes, &upload.mime).inspect_err(|e| {
            warn!(name = %upload.name, mime = %upload.mime, error = %e, "Upload rejected");
        })?;
        info!(name = %upload.name, bytes = upload.bytes.len(), "Photo uploaded");
        self.set_mode(AcquisitionMode::Upload);
        self.replace(artifact.clone());
        Ok(artifact)
    }

    /// Enter camera mode and start the camera.
    pub async fn start_camera(&self, facing: FacingMode) -> Result<SessionState, CameraError> {
        self.set_mode(AcquisitionMode::Camera);
        self.session.start(facing).await
    }

    /// Capture from the live camera, replacing the held photo.
    pub async fn capture(&self) -> Result<PhotoArtifact, CameraError> {
        let artifact = self.session.capture().await?;
        self.replace(artifact.clone());
        Ok(artifact)
    }

    fn replace(&self, artifact: PhotoArtifact) {
        *lock(&self.artifact) = Some(artifact.clone());
        let _ = self.events.send(AcquisitionEvent::Acquired(artifact));
    }

    /// Discard the held photo.
    pub fn clear(&self) {
        if lock(&self.artifact).take().is_some() {
            let _ = self.events.send(AcquisitionEvent::Cleared);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::SourceKind;
    use crate::capture::device::tests::MockCamera;
    use crate::codec::MAX_PHOTO_BYTES;
    use crate::test_helpers::sample_jpeg;

    fn controller() -> AcquisitionController<MockCamera> {
        AcquisitionController::new(CaptureSession::new(MockCamera::new()))
    }

    fn jpeg_upload() -> Upload {
        Upload::new("me.jpg", "image/jpeg", sample_jpeg())
    }

    #[test]
    fn select_file_acquires_and_notifies() {
        let c = controller();
        let mut events = c.subscribe();
        let artifact = c.select_file(Some(jpeg_upload())).unwrap().unwrap();
        assert_eq!(artifact.source_kind(), SourceKind::Uploaded);
        assert_eq!(c.artifact(), Some(artifact.clone()));
        assert_eq!(
            events.try_recv().unwrap(),
            AcquisitionEvent::Acquired(artifact)
        );
    }

    #[test]
    fn cancelled_dialog_is_noop() {
        let c = controller();
        let mut events = c.subscribe();
        assert_eq!(c.select_file(None), Ok(None));
        assert_eq!(c.artifact(), None);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn rejected_upload_keeps_existing_photo() {
        let c = controller();
        let held = c.select_file(Some(jpeg_upload())).unwrap();

        let gif = Upload::new("anim.gif", "image/gif", vec![0; 10]);
        assert!(matches!(
            c.select_file(Some(gif)),
            Err(ValidationError::UnsupportedType(_))
        ));
        let huge = Upload::new("big.png", "image/png", vec![0; MAX_PHOTO_BYTES + 1]);
        assert!(matches!(
            c.select_file(Some(huge)),
            Err(ValidationError::FileTooLarge { .. })
        ));
        assert_eq!(c.artifact(), held);
    }

    #[test]
    fn drop_uses_first_file() {
        let c = controller();
        let gif = Upload::new("anim.gif", "image/gif", vec![0; 10]);
        let result = c.drop_files(vec![jpeg_upload(), gif]).unwrap();
        assert!(result.is_some());
        assert_eq!(c.drop_files(Vec::new()), Ok(None));
        assert!(c.artifact().is_some());
    }

    #[tokio::test]
    async fn capture_then_cancelled_upload_keeps_capture() {
        let c = controller();
        c.start_camera(FacingMode::Front).await.unwrap();
        let captured = c.capture().await.unwrap();
        assert_eq!(captured.source_kind(), SourceKind::Captured);

        c.set_mode(AcquisitionMode::Upload);
        assert_eq!(c.select_file(None), Ok(None));
        assert_eq!(c.artifact(), Some(captured));
    }

    #[tokio::test]
    async fn upload_while_camera_live_switches_to_upload() {
        let c = controller();
        c.start_camera(FacingMode::Front).await.unwrap();
        assert!(c.session().has_stream());

        let artifact = c.select_file(Some(jpeg_upload())).unwrap().unwrap();
        assert_eq!(artifact.source_kind(), SourceKind::Uploaded);
        assert_eq!(c.mode(), AcquisitionMode::Upload);
        assert_eq!(c.session().state(), SessionState::Idle);
        assert!(!c.session().has_stream());
        assert_eq!(c.session().device().release_count(), 1);
    }

    #[tokio::test]
    async fn rejected_upload_leaves_camera_running() {
        let c = controller();
        c.start_camera(FacingMode::Front).await.unwrap();
        let gif = Upload::new("anim.gif", "image/gif", vec![0; 10]);
        assert!(c.drop_files(vec![gif]).is_err());
        assert_eq!(c.mode(), AcquisitionMode::Camera);
        assert!(c.session().has_stream());
    }

    #[tokio::test]
    async fn failed_capture_keeps_photo() {
        let c = controller();
        let held = c.select_file(Some(jpeg_upload())).unwrap();
        assert_eq!(c.capture().await, Err(CameraError::SinkNotReady));
        assert_eq!(c.artifact(), held);
    }

    #[tokio::test]
    async fn leaving_camera_mode_stops_camera() {
        let c = controller();
        c.start_camera(FacingMode::Front).await.unwrap();
        assert_eq!(c.mode(), AcquisitionMode::Camera);
        assert!(c.session().has_stream());

        c.set_mode(AcquisitionMode::Upload);
        assert_eq!(c.session().state(), SessionState::Idle);
        assert_eq!(c.session().device().release_count(), 1);
    }

    #[test]
    fn clear_notifies_once() {
        let c = controller();
        c.select_file(Some(jpeg_upload())).unwrap();
        let mut events = c.subscribe();
        c.clear();
        c.clear();
        assert_eq!(c.artifact(), None);
        assert_eq!(events.try_recv().unwrap(), AcquisitionEvent::Cleared);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn from_path_declares_type_from_extension() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("Photo.JPG");
        std::fs::write(&path, sample_jpeg()).unwrap();
        let upload = Upload::from_path(&path).await.unwrap();
        assert_eq!(upload.mime, "image/jpeg");
        assert_eq!(upload.name, "Photo.JPG");
    }

    #[test]
    fn mime_for_unknown_extension() {
        assert_eq!(mime_for_path(Path::new("a.gif")), "image/gif");
        assert_eq!(mime_for_path(Path::new("notes")), "application/octet-stream");
        assert_eq!(mime_for_path(Path::new("x.webp")), "image/webp");
    }
}
