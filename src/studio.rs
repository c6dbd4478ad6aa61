//! The studio: one photo, one style, one preview.
//!
//! Ties acquisition, transforms and the collage together and turns every
//! outcome into a [`Notice`]. Errors are still returned to the caller, but
//! nothing here is fatal: after any failure the studio is in a usable state
//! with whatever it held before.
//!
//! State rules:
//!
//! - A newly acquired photo drops the displayed preview. The style
//!   selection is kept.
//! - Selecting a style without a photo only records the selection.
//! - [`Studio::clear`] forgets the photo, the style and the preview.

use crate::acquisition::{AcquisitionController, Upload};
use crate::artifact::PhotoArtifact;
use crate::capture::device::CameraDevice;
use crate::capture::{CameraError, FacingMode, SessionState};
use crate::codec::ValidationError;
use crate::collage::{CollageEntry, CollageError, CollageStore};
use crate::notice::Notice;
use crate::presets::{self, StylePreset};
use crate::transform::service::ArtTransformService;
use crate::transform::{PreviewOutcome, TransformError, TransformOrchestrator};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum StudioError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Collage(#[from] CollageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown art style: {0}")]
    UnknownStyle(String),
    #[error("no image to download")]
    NothingToDownload,
    #[error("no photo has been provided")]
    NoPhoto,
    #[error("no art style selected")]
    NoStyleSelected,
}

pub struct Studio<D, S> {
    acquisition: AcquisitionController<D>,
    transforms: TransformOrchestrator<S>,
    collage: CollageStore,
    selected: Mutex<Option<&'static StylePreset>>,
    notices: broadcast::Sender<Notice>,
}

impl<D: CameraDevice, S: ArtTransformService> Studio<D, S> {
    pub fn new(
        acquisition: AcquisitionController<D>,
        transforms: TransformOrchestrator<S>,
        collage: CollageStore,
    ) -> Self {
        let (notices, _) = broadcast::channel(32);
        Self {
            acquisition,
            transforms,
            collage,
            selected: Mutex::new(None),
            notices,
        }
    }

    pub fn acquisition(&self) -> &AcquisitionController<D> {
        &self.acquisition
    }

    pub fn transforms(&self) -> &TransformOrchestrator<S> {
        &self.transforms
    }

    pub fn collage(&self) -> &CollageStore {
        &self.collage
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    fn selected(&self) -> MutexGuard<'_, Option<&'static StylePreset>> {
        self.selected.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn selected_style(&self) -> Option<&'static StylePreset> {
        *self.selected()
    }

    pub fn photo(&self) -> Option<PhotoArtifact> {
        self.acquisition.artifact()
    }

    /// What the user is looking at: the preview if there is one, else the
    /// photo.
    pub fn displayed(&self) -> Option<PhotoArtifact> {
        self.transforms
            .displayed_preview()
            .or_else(|| self.acquisition.artifact())
    }

    fn notify(&self, notice: Notice) {
        if notice.is_destructive() {
            warn!(title = %notice.title, "{}", notice.description);
        } else {
            info!(title = %notice.title, "{}", notice.description);
        }
        let _ = self.notices.send(notice);
    }

    /// A file picked from a dialog; `None` when the dialog was cancelled.
    pub fn upload(&self, upload: Option<Upload>) -> Result<Option<PhotoArtifact>, StudioError> {
        let result = self.acquisition.select_file(upload);
        self.after_upload(result)
    }

    /// Files dropped onto the drop zone.
    pub fn drop_files(&self, uploads: Vec<Upload>) -> Result<Option<PhotoArtifact>, StudioError> {
        let result = self.acquisition.drop_files(uploads);
        self.after_upload(result)
    }

    fn after_upload(
        &self,
        result: Result<Option<PhotoArtifact>, ValidationError>,
    ) -> Result<Option<PhotoArtifact>, StudioError> {
        match result {
            Ok(Some(artifact)) => {
                self.transforms.reset();
                Ok(Some(artifact))
            }
            Ok(None) => Ok(None),
            Err(err) => {
                self.notify(Notice::upload_rejected(&err));
                Err(err.into())
            }
        }
    }

    pub async fn start_camera(&self, facing: FacingMode) -> Result<SessionState, StudioError> {
        match self.acquisition.start_camera(facing).await {
            Ok(state) => {
                if state == SessionState::Active {
                    self.notify(Notice::camera_started(self.acquisition.session().facing()));
                }
                Ok(state)
            }
            Err(err) => {
                self.notify(Notice::camera(&err));
                Err(err.into())
            }
        }
    }

    pub async fn capture(&self) -> Result<PhotoArtifact, StudioError> {
        match self.acquisition.capture().await {
            Ok(artifact) => {
                self.transforms.reset();
                self.notify(Notice::photo_captured());
                Ok(artifact)
            }
            Err(err) => {
                self.notify(Notice::camera(&err));
                Err(err.into())
            }
        }
    }

    /// Record the style selection without asking for a preview.
    pub fn set_style(&self, id: &str) -> Result<&'static StylePreset, StudioError> {
        let style = presets::find(id).ok_or_else(|| StudioError::UnknownStyle(id.to_string()))?;
        *self.selected() = Some(style);
        Ok(style)
    }

    /// Select a style and, if there is a photo, preview it.
    pub async fn select_style(&self, id: &str) -> Result<PreviewOutcome, StudioError> {
        let style = self.set_style(id)?;

        let Some(photo) = self.acquisition.artifact() else {
            self.notify(Notice::upload_first());
            return Err(StudioError::NoPhoto);
        };
        let outcome = self.transforms.request_preview(&photo, style).await;
        if let PreviewOutcome::Failed(err) = &outcome {
            self.notify(Notice::preview_failed(err));
        }
        Ok(outcome)
    }

    fn photo_and_style(&self) -> Result<(PhotoArtifact, &'static StylePreset), StudioError> {
        let Some(photo) = self.acquisition.artifact() else {
            self.notify(Notice::upload_first());
            return Err(StudioError::NoPhoto);
        };
        let Some(style) = self.selected_style() else {
            self.notify(Notice::no_style_selected());
            return Err(StudioError::NoStyleSelected);
        };
        Ok((photo, style))
    }

    /// Full-resolution transform of the current photo in the selected style.
    pub async fn finalize(&self) -> Result<PhotoArtifact, StudioError> {
        let (photo, style) = self.photo_and_style()?;
        self.transforms
            .request_final(&photo, style)
            .await
            .map_err(|err| {
                self.notify(Notice::transform_failed(&err));
                err.into()
            })
    }

    /// Save the displayed image into `dir` as `artify_<millis>.<ext>`.
    pub async fn download(&self, dir: &Path) -> Result<PathBuf, StudioError> {
        let Some(image) = self.displayed() else {
            self.notify(Notice::nothing_to_download());
            return Err(StudioError::NothingToDownload);
        };
        let stamp = chrono::Utc::now().timestamp_millis();
        let path = image.write_into(dir, stamp).await?;
        self.notify(Notice::download_started(&path));
        Ok(path)
    }

    /// Store `artifact` in the collage under the selected style.
    pub async fn save_to_collage(
        &self,
        artifact: &PhotoArtifact,
    ) -> Result<CollageEntry, StudioError> {
        let Some(style) = self.selected_style() else {
            self.notify(Notice::no_style_selected());
            return Err(StudioError::NoStyleSelected);
        };
        match self.collage.save_artifact(artifact, style.id).await {
            Ok(entry) => {
                self.notify(Notice::saved_to_collage(&entry.style_name));
                Ok(entry)
            }
            Err(err) => {
                self.notify(Notice::collage_failed(&err));
                Err(err.into())
            }
        }
    }

    /// Start over: no photo, no style, no preview.
    pub fn clear(&self) {
        self.acquisition.clear();
        *self.selected() = None;
        self.transforms.reset();
        info!("Studio cleared");
    }
}
