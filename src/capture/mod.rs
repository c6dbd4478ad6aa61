//! Camera capture session.
//!
//! A [`CaptureSession`] owns at most one live stream and walks it through a
//! small state machine:
//!
//! ```text
//!            start()                first frame / timeout
//!   Idle ─────────────▶ Requesting ─────────────────────▶ Active
//!    ▲                      │                               │
//!    │                      │ denied / device error         │ capture() ok
//!    │                      ▼                               │
//!    └────── stop() ───── Error                             │
//!    └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Frame timeout
//!
//! After a stream is granted the session waits for the preview sink's first
//! decoded frame. If none arrives within the frame timeout (3 s by default)
//! the session goes `Active` anyway and logs a warning. The preview may be
//! blank in that case; a capture from a stream that never produced a frame
//! fails with [`CameraError::CaptureFailed`] instead of blocking the user.
//!
//! ## Concurrency
//!
//! All methods take `&self`. Session state sits behind a short-lived
//! `std::sync::Mutex` that is never held across an `.await`, so a second
//! `start()` issued while the first is still waiting on the device sees the
//! `Requesting` state and returns without opening anything. `stop()` bumps
//! an epoch counter; an in-flight `start()` that finds the epoch changed when
//! its stream arrives drops the stream instead of installing it.
//!
//! While the first frame is awaited the granted stream is parked in the
//! session, not in the `start()` future. `stop()` releases it on the spot
//! and wakes the waiting `start()`, so a stopped session never holds a
//! stream and a restart never overlaps an old one.

pub mod device;
pub mod still;

use crate::artifact::{PhotoArtifact, SourceKind};
use crate::codec::validate_and_encode_as;
use crate::config::CameraConfig;
use crate::imaging::{Dimensions, Quality, still_from_frame};
use device::{CameraDevice, StreamConstraints, StreamHandle};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

pub use device::{CameraError, FacingMode, MediaStream};

/// Lifecycle of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Requesting,
    Active,
    Error,
}

/// Timing, resolution and encoding knobs for a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    pub frame_timeout: Duration,
    pub settle_delay: Duration,
    pub ideal: Dimensions,
    pub max: Dimensions,
    pub quality: Quality,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            frame_timeout: Duration::from_secs(3),
            settle_delay: Duration::from_millis(300),
            ideal: StreamConstraints::DEFAULT_IDEAL,
            max: StreamConstraints::DEFAULT_MAX,
            quality: Quality::default(),
        }
    }
}

impl CameraSettings {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            frame_timeout: Duration::from_millis(config.frame_timeout_ms),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            ideal: config.ideal_resolution.into(),
            max: config.max_resolution.into(),
            quality: Quality::new(config.quality),
        }
    }

    fn constraints(&self, facing: FacingMode) -> StreamConstraints {
        StreamConstraints {
            facing,
            ideal: self.ideal,
            max: self.max,
        }
    }
}

#[derive(Debug)]
struct SessionInner {
    state: SessionState,
    facing: FacingMode,
    stream: Option<StreamHandle>,
    /// Granted stream still waiting for its first frame.
    pending: Option<StreamHandle>,
    epoch: u64,
    last_error: Option<CameraError>,
}

/// Owns one camera stream at a time. Dropping the session releases it.
pub struct CaptureSession<D> {
    device: D,
    settings: CameraSettings,
    inner: Mutex<SessionInner>,
    stopped: Notify,
}

impl<D: CameraDevice> CaptureSession<D> {
    pub fn new(device: D) -> Self {
        Self::with_settings(device, CameraSettings::default())
    }

    pub fn with_settings(device: D, settings: CameraSettings) -> Self {
        Self {
            device,
            settings,
            inner: Mutex::new(SessionInner {
                state: SessionState::Idle,
                facing: FacingMode::default(),
                stream: None,
                pending: None,
                epoch: 0,
                last_error: None,
            }),
            stopped: Notify::new(),
        }
    }

    fn inner(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn state(&self) -> SessionState {
        self.inner().state
    }

    pub fn facing(&self) -> FacingMode {
        self.inner().facing
    }

    /// Reason for the most recent transition into [`SessionState::Error`].
    pub fn last_error(&self) -> Option<CameraError> {
        self.inner().last_error.clone()
    }

    pub fn has_stream(&self) -> bool {
        self.inner().stream.is_some()
    }

    /// Resolution of the live stream, if any.
    pub fn stream_dimensions(&self) -> Option<Dimensions> {
        self.inner().stream.as_ref().map(StreamHandle::dimensions)
    }

    /// Request a stream facing `facing` and wait for it to go live.
    ///
    /// Returns the state the session is in afterwards. A call made while a
    /// stream is already held or another request is in flight does nothing
    /// and reports the current state.
    pub async fn start(&self, facing: FacingMode) -> Result<SessionState, CameraError> {
        let (epoch, constraints) = {
            let mut inner = self.inner();
            if inner.stream.is_some()
                || inner.pending.is_some()
                || inner.state == SessionState::Requesting
            {
                debug!(state = ?inner.state, "camera start ignored, session busy");
                return Ok(inner.state);
            }
            inner.epoch += 1;
            inner.state = SessionState::Requesting;
            inner.facing = facing;
            (inner.epoch, self.settings.constraints(facing))
        };

        info!(
            facing = facing.label(),
            ideal = %constraints.ideal,
            max = %constraints.max,
            "Requesting camera stream"
        );
        let mut handle = match self.device.open(&constraints).await {
            Ok(stream) => StreamHandle::new(stream),
            Err(err) => {
                warn!(error = %err, "Camera access failed");
                self.fail(epoch, err.clone());
                return Err(err);
            }
        };

        // Created before the handle is parked so a stop() from here on wakes it.
        let stopped = self.stopped.notified();
        let first_frame = handle.stream().first_frame();
        {
            let mut inner = self.inner();
            if inner.epoch != epoch {
                debug!("stream granted after stop, releasing");
                return Ok(inner.state);
            }
            inner.pending = Some(handle);
        }

        let frame_wait = tokio::select! {
            waited = tokio::time::timeout(self.settings.frame_timeout, first_frame) => Some(waited),
            _ = stopped => None,
        };
        let Some(frame_wait) = frame_wait else {
            debug!("session stopped while waiting for first frame");
            return Ok(self.state());
        };

        let mut inner = self.inner();
        if inner.epoch != epoch {
            debug!("session stopped while waiting for first frame");
            return Ok(inner.state);
        }
        let Some(handle) = inner.pending.take() else {
            return Ok(inner.state);
        };
        match frame_wait {
            Ok(Ok(())) => debug!(dimensions = %handle.dimensions(), "first frame decoded"),
            Ok(Err(err)) => {
                warn!(error = %err, "camera feed failed before first frame");
                drop(handle);
                inner.state = SessionState::Error;
                inner.last_error = Some(err.clone());
                return Err(err);
            }
            Err(_) => warn!(
                timeout_ms = self.settings.frame_timeout.as_millis() as u64,
                "no frame before timeout, forcing camera active"
            ),
        }
        inner.stream = Some(handle);
        inner.state = SessionState::Active;
        inner.last_error = None;
        info!(facing = facing.label(), "Camera started");
        Ok(SessionState::Active)
    }

    fn fail(&self, epoch: u64, err: CameraError) {
        let mut inner = self.inner();
        if inner.epoch == epoch {
            inner.state = SessionState::Error;
            inner.last_error = Some(err);
        }
    }

    /// Snapshot the live stream into a captured photo and end the session.
    ///
    /// Only valid while `Active`; anything else fails with
    /// [`CameraError::SinkNotReady`] and leaves the session untouched.
    pub async fn capture(&self) -> Result<PhotoArtifact, CameraError> {
        let (epoch, frame, dimensions) = {
            let mut inner = self.inner();
            if inner.state != SessionState::Active {
                return Err(CameraError::SinkNotReady);
            }
            let epoch = inner.epoch;
            let handle = inner.stream.as_mut().ok_or(CameraError::SinkNotReady)?;
            let dimensions = handle.dimensions();
            (epoch, handle.stream().grab_frame()?, dimensions)
        };

        let quality = self.settings.quality;
        let artifact = tokio::task::spawn_blocking(move || {
            let bytes = still_from_frame(frame, dimensions, quality)
                .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;
            validate_and_encode_as(&bytes, "image/jpeg", SourceKind::Captured)
                .map_err(|e| CameraError::CaptureFailed(e.to_string()))
        })
        .await
        .map_err(|e| CameraError::CaptureFailed(format!("encoding task error: {e}")))?;

        let artifact = match artifact {
            Ok(artifact) => artifact,
            Err(err) => {
                warn!(error = %err, "capture failed, camera stays active");
                return Err(err);
            }
        };

        // Only tear down the stream the frame came from.
        if self.inner().epoch == epoch {
            self.stop();
        }
        info!(
            dimensions = %dimensions,
            bytes = artifact.payload().byte_len(),
            "Photo captured"
        );
        Ok(artifact)
    }

    /// Restart with the opposite facing mode after the settle delay.
    pub async fn switch_facing(&self) -> Result<SessionState, CameraError> {
        let next = self.facing().opposite();
        self.stop();
        self.inner().facing = next;
        debug!(facing = next.label(), "switching camera");
        tokio::time::sleep(self.settings.settle_delay).await;
        self.start(next).await
    }

    /// Release the stream, if any, and return to `Idle`. Safe from any
    /// state and safe to repeat.
    pub fn stop(&self) {
        let (live, pending) = {
            let mut inner = self.inner();
            inner.epoch += 1;
            inner.state = SessionState::Idle;
            (inner.stream.take(), inner.pending.take())
        };
        if live.is_some() || pending.is_some() {
            info!("Camera stream released");
        }
        drop((live, pending));
        self.stopped.notify_waiters();
    }
}
