//! The photo value that flows through the pipeline.

use crate::codec::{DataUri, ImageEncoding, ValidationError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where an artifact came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Uploaded,
    Captured,
    /// Low-resolution result of a preview transform.
    Preview,
    /// Full-resolution result of a final transform.
    Final,
}

impl SourceKind {
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Uploaded => "uploaded",
            SourceKind::Captured => "captured",
            SourceKind::Preview => "preview",
            SourceKind::Final => "final",
        }
    }
}

/// One acquired or generated photo.
///
/// Immutable once built. New acquisitions replace the artifact held by the
/// controller rather than mutating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoArtifact {
    payload: DataUri,
    source_kind: SourceKind,
}

impl PhotoArtifact {
    pub(crate) fn new(payload: DataUri, source_kind: SourceKind) -> Self {
        Self {
            payload,
            source_kind,
        }
    }

    /// Wrap an inline image returned by the transform service.
    pub fn from_inline(text: &str, source_kind: SourceKind) -> Result<Self, ValidationError> {
        Ok(Self::new(DataUri::parse(text)?, source_kind))
    }

    pub fn encoding(&self) -> ImageEncoding {
        self.payload.encoding()
    }

    pub fn payload(&self) -> &DataUri {
        &self.payload
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    /// File name for a download taken at `stamp_millis`.
    pub fn download_name(&self, stamp_millis: i64) -> String {
        format!("artify_{}.{}", stamp_millis, self.encoding().extension())
    }

    /// Decode and write the image into `dir`, returning the written path.
    pub async fn write_into(&self, dir: &Path, stamp_millis: i64) -> std::io::Result<PathBuf> {
        let bytes = self
            .payload
            .decode()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(self.download_name(stamp_millis));
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }
}
