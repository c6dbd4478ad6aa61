//! Recent-results store ("collage").
//!
//! A JSON file holding the most recent saved transforms, newest first,
//! capped at [`COLLAGE_CAPACITY`] entries:
//!
//! ```json
//! [
//!   {
//!     "id": 1718000000000,
//!     "imageDataUri": "data:image/png;base64,...",
//!     "styleName": "Pixel Art"
//!   }
//! ]
//! ```
//!
//! A missing file reads as an empty collection. So does a file that cannot
//! be read or parsed, after a warning. Appends are read-modify-write:
//! writers inside one process take a lock, and the new file replaces the old
//! one by rename so readers never see a half-written list. Two processes
//! appending at once can still lose one of the entries.

use crate::artifact::PhotoArtifact;
use crate::presets;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Entries kept in the store.
pub const COLLAGE_CAPACITY: usize = 50;

#[derive(Error, Debug)]
pub enum CollageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid art style.")]
    UnknownStyle(String),
}

/// One saved result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollageEntry {
    /// Creation time in milliseconds since the Unix epoch.
    pub id: i64,
    pub image_data_uri: String,
    pub style_name: String,
}

/// Put `entry` first and drop whatever falls past the capacity.
pub fn push_recent(entries: &mut Vec<CollageEntry>, entry: CollageEntry) {
    entries.insert(0, entry);
    entries.truncate(COLLAGE_CAPACITY);
}

pub struct CollageStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl CollageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved entries, newest first.
    pub async fn list_recent(&self) -> Vec<CollageEntry> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Error reading collage data");
                return Vec::new();
            }
        };
        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Error parsing collage data");
                Vec::new()
            }
        }
    }

    /// Add `entry` as the newest item.
    pub async fn append(&self, entry: CollageEntry) -> Result<(), CollageError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.list_recent().await;
        push_recent(&mut entries, entry);
        self.write_all(&entries).await?;
        debug!(path = %self.path.display(), count = entries.len(), "collage written");
        Ok(())
    }

    /// Store an image under the style `style_id`, stamped with the current
    /// time. Returns the stored entry.
    pub async fn save_result(
        &self,
        image_data_uri: &str,
        style_id: &str,
    ) -> Result<CollageEntry, CollageError> {
        let style =
            presets::find(style_id).ok_or_else(|| CollageError::UnknownStyle(style_id.to_string()))?;
        let entry = CollageEntry {
            id: chrono::Utc::now().timestamp_millis(),
            image_data_uri: image_data_uri.to_string(),
            style_name: style.name.to_string(),
        };
        self.append(entry.clone()).await?;
        info!(style = style.id, "Saved to collage");
        Ok(entry)
    }

    /// [`save_result`](Self::save_result) for an artifact.
    pub async fn save_artifact(
        &self,
        artifact: &PhotoArtifact,
        style_id: &str,
    ) -> Result<CollageEntry, CollageError> {
        self.save_result(artifact.payload().as_str(), style_id)
            .await
    }

    async fn write_all(&self, entries: &[CollageEntry]) -> Result<(), CollageError> {
        let json = serde_json::to_string_pretty(entries)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn entry(id: i64) -> CollageEntry {
        CollageEntry {
            id,
            image_data_uri: format!("data:image/png;base64,{id}"),
            style_name: "Pixel Art".into(),
        }
    }

    fn store(tmp: &TempDir) -> CollageStore {
        CollageStore::new(tmp.path().join("collage-data.json"))
    }

    #[test]
    fn push_recent_caps_at_capacity() {
        let mut entries = Vec::new();
        for id in 0..60 {
            push_recent(&mut entries, entry(id));
        }
        assert_eq!(entries.len(), COLLAGE_CAPACITY);
        assert_eq!(entries[0].id, 59);
        assert_eq!(entries[49].id, 10);
    }

    #[test]
    fn entry_serializes_camel_case() {
        let json = serde_json::to_value(entry(7)).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["imageDataUri"], "data:image/png;base64,7");
        assert_eq!(json["styleName"], "Pixel Art");
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(store(&tmp).list_recent().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        std::fs::write(store.path(), "{ not json").unwrap();
        assert!(store.list_recent().await.is_empty());
    }

    #[tokio::test]
    async fn fifty_one_appends_keep_fifty_newest_first() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        for id in 1..=51 {
            store.append(entry(id)).await.unwrap();
        }
        let entries = store.list_recent().await;
        assert_eq!(entries.len(), 50);
        assert_eq!(entries.first().unwrap().id, 51);
        assert_eq!(entries.last().unwrap().id, 2);
        assert!(!tmp.path().join("collage-data.json.tmp").exists());
    }

    #[tokio::test]
    async fn concurrent_appends_are_not_lost() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(store(&tmp));
        let tasks: Vec<_> = (0..10)
            .map(|id| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.append(entry(id)).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(store.list_recent().await.len(), 10);
    }

    #[tokio::test]
    async fn save_result_resolves_style_name() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let saved = store
            .save_result("data:image/png;base64,aGk=", "film-noir")
            .await
            .unwrap();
        assert_eq!(saved.style_name, "Film Noir");
        assert!(saved.id > 0);
        assert_eq!(store.list_recent().await, vec![saved]);
    }

    #[tokio::test]
    async fn save_result_rejects_unknown_style() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let err = store
            .save_result("data:image/png;base64,aGk=", "watercolour")
            .await
            .unwrap_err();
        assert!(matches!(err, CollageError::UnknownStyle(_)));
        assert_eq!(err.to_string(), "Invalid art style.");
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn creates_parent_directory() {
        let tmp = TempDir::new().unwrap();
        let store = CollageStore::new(tmp.path().join("nested/dir/collage.json"));
        store.append(entry(1)).await.unwrap();
        assert_eq!(store.list_recent().await.len(), 1);
    }
}
