//! Preview and final transform requests.
//!
//! The [`TransformOrchestrator`] sends the current photo and a style's prompt
//! to an [`ArtTransformService`] and keeps track of which preview is on
//! display.
//!
//! ## Supersession
//!
//! Every preview request takes the next number from a monotonically
//! increasing sequence. When a reply arrives it is shown only if its request
//! is still the latest; anything older is dropped as
//! [`PreviewOutcome::Superseded`]. The network call itself is never
//! cancelled. Picking styles quickly therefore always ends with the last
//! pick on screen, whatever order the replies come back in.
//!
//! Final transforms bypass all of this: each call is independent and its
//! result goes straight back to the caller.

pub mod service;

use crate::artifact::{PhotoArtifact, SourceKind};
use crate::codec::ValidationError;
use crate::presets::StylePreset;
use service::ArtTransformService;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use service::{HttpTransformService, ServiceFailure};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// Message from the service, shown verbatim.
    #[error("{0}")]
    Service(String),
    #[error("service returned an unusable image: {0}")]
    MalformedResponse(#[from] ValidationError),
}

impl From<ServiceFailure> for TransformError {
    fn from(failure: ServiceFailure) -> Self {
        TransformError::Service(failure.message)
    }
}

/// What became of one preview request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewOutcome {
    /// The result is now the displayed preview.
    Displayed(PhotoArtifact),
    /// The request failed; the previous display is untouched.
    Failed(TransformError),
    /// A newer request (or a reset) arrived first; the result was dropped.
    Superseded,
}

#[derive(Debug, Default)]
struct PreviewState {
    displayed: Option<PhotoArtifact>,
    /// Sequence number of the latest request still waiting on the service.
    pending: Option<u64>,
}

pub struct TransformOrchestrator<S> {
    service: S,
    sequence: AtomicU64,
    state: Mutex<PreviewState>,
}

impl<S: ArtTransformService> TransformOrchestrator<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            sequence: AtomicU64::new(0),
            state: Mutex::new(PreviewState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, PreviewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// The preview currently on display, if any.
    pub fn displayed_preview(&self) -> Option<PhotoArtifact> {
        self.state().displayed.clone()
    }

    /// Whether the latest preview request is still outstanding.
    pub fn is_preview_loading(&self) -> bool {
        self.state().pending.is_some()
    }

    /// Ask for a low-resolution preview of `photo` in `style`.
    pub async fn request_preview(
        &self,
        photo: &PhotoArtifact,
        style: &StylePreset,
    ) -> PreviewOutcome {
        // Numbering and `pending` change together, under the state lock.
        let seq = {
            let mut state = self.state();
            let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            state.pending = Some(seq);
            seq
        };
        debug!(seq, style = style.id, "requesting preview");

        let reply = self
            .service
            .preview_transform(photo.payload(), style.prompt_text)
            .await;

        let mut state = self.state();
        if self.sequence.load(Ordering::SeqCst) != seq {
            debug!(seq, style = style.id, "preview superseded, dropping result");
            return PreviewOutcome::Superseded;
        }
        state.pending = None;

        let artifact = reply
            .map_err(TransformError::from)
            .and_then(|text| Ok(PhotoArtifact::from_inline(&text, SourceKind::Preview)?));
        match artifact {
            Ok(artifact) => {
                info!(style = style.id, bytes = artifact.payload().byte_len(), "Preview ready");
                state.displayed = Some(artifact.clone());
                PreviewOutcome::Displayed(artifact)
            }
            Err(err) => {
                warn!(style = style.id, error = %err, "Preview failed");
                PreviewOutcome::Failed(err)
            }
        }
    }

    /// Run the full-resolution transform of `photo` in `style`.
    pub async fn request_final(
        &self,
        photo: &PhotoArtifact,
        style: &StylePreset,
    ) -> Result<PhotoArtifact, TransformError> {
        info!(style = style.id, "Requesting full-resolution transform");
        let text = self
            .service
            .final_transform(photo.payload(), style.prompt_text)
            .await
            .inspect_err(|e| warn!(style = style.id, error = %e, "Transform failed"))?;
        let artifact = PhotoArtifact::from_inline(&text, SourceKind::Final)?;
        info!(style = style.id, bytes = artifact.payload().byte_len(), "Transform complete");
        Ok(artifact)
    }

    /// Drop the displayed preview and ignore any reply still in flight.
    pub fn reset(&self) {
        let mut state = self.state();
        self.sequence.fetch_add(1, Ordering::SeqCst);
        state.displayed = None;
        state.pending = None;
    }
}
