//! Application configuration.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialized to a TOML table and the user file is merged on top, so a config
//! file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [service]
//! base_url = "http://localhost:9002/api"  # Art transform service
//! preview_path = "preview"                 # Fast low-res preview endpoint
//! transform_path = "transform"             # Full-resolution endpoint
//! timeout_secs = 120                       # Per-request timeout
//!
//! [camera]
//! facing = "front"               # "front" or "rear"
//! frame_timeout_ms = 3000        # Go active anyway after this long without a frame
//! settle_delay_ms = 300          # Pause between stop and restart when switching
//! ideal_resolution = [640, 480]  # Preferred stream resolution
//! max_resolution = [1280, 720]   # Upper bound on stream resolution
//! quality = 90                   # JPEG quality for captured stills (1-100)
//!
//! [collage]
//! path = "collage-data.json"     # Recent-results file
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::capture::FacingMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifyConfig {
    /// Where the art transform service lives.
    pub service: ServiceConfig,
    /// Capture session tuning.
    pub camera: CameraConfig,
    /// Recent-results store.
    pub collage: CollageConfig,
}

impl ArtifyConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.service.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "service.base_url must be an http(s) URL".into(),
            ));
        }
        if self.service.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "service.timeout_secs must be non-zero".into(),
            ));
        }
        if self.camera.quality == 0 || self.camera.quality > 100 {
            return Err(ConfigError::Validation(
                "camera.quality must be 1-100".into(),
            ));
        }
        for (key, [w, h]) in [
            ("ideal_resolution", self.camera.ideal_resolution),
            ("max_resolution", self.camera.max_resolution),
        ] {
            if w == 0 || h == 0 {
                return Err(ConfigError::Validation(format!(
                    "camera.{key} values must be non-zero"
                )));
            }
        }
        let [iw, ih] = self.camera.ideal_resolution;
        let [mw, mh] = self.camera.max_resolution;
        if iw > mw || ih > mh {
            return Err(ConfigError::Validation(
                "camera.ideal_resolution must fit within camera.max_resolution".into(),
            ));
        }
        if self.collage.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "collage.path must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Art transform service endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Path of the low-res preview endpoint, relative to `base_url`.
    pub preview_path: String,
    /// Path of the full-resolution endpoint, relative to `base_url`.
    pub transform_path: String,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9002/api".to_string(),
            preview_path: "preview".to_string(),
            transform_path: "transform".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Capture session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    /// Facing mode the camera starts with.
    pub facing: FacingMode,
    /// How long to wait for the first frame before going active regardless.
    pub frame_timeout_ms: u64,
    /// Pause between releasing one stream and requesting the next.
    pub settle_delay_ms: u64,
    /// Preferred stream resolution as `[width, height]`.
    pub ideal_resolution: [u32; 2],
    /// Upper bound on the stream resolution as `[width, height]`.
    pub max_resolution: [u32; 2],
    /// JPEG quality for captured stills (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing: FacingMode::Front,
            frame_timeout_ms: 3000,
            settle_delay_ms: 300,
            ideal_resolution: [640, 480],
            max_resolution: [1280, 720],
            quality: 90,
        }
    }
}

/// Recent-results store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollageConfig {
    pub path: PathBuf,
}

impl Default for CollageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("collage-data.json"),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(ArtifyConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ArtifyConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ArtifyConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load configuration.
///
/// With an explicit `path` the file must exist. Without one, `config.toml`
/// in the current directory is used when present and stock defaults
/// otherwise.
pub fn load_config(path: Option<&Path>) -> Result<ArtifyConfig, ConfigError> {
    let overlay = match path {
        Some(path) => Some(read_overlay(path)?),
        None => {
            let default_path = Path::new("config.toml");
            if default_path.exists() {
                Some(read_overlay(default_path)?)
            } else {
                None
            }
        }
    };
    resolve_config(overlay)
}

fn read_overlay(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Artify Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Art transform service
# ---------------------------------------------------------------------------
[service]
# Base URL of the service. Endpoint paths below are joined onto it.
base_url = "http://localhost:9002/api"

# Fast, low-resolution preview endpoint.
preview_path = "preview"

# Full-resolution transform endpoint.
transform_path = "transform"

# Per-request timeout in seconds.
timeout_secs = 120

# ---------------------------------------------------------------------------
# Camera
# ---------------------------------------------------------------------------
[camera]
# Facing mode to start with: "front" or "rear".
facing = "front"

# If no frame arrives within this many milliseconds the camera is treated
# as active anyway.
frame_timeout_ms = 3000

# Pause between stopping one stream and starting the next when switching
# cameras.
settle_delay_ms = 300

# Preferred and maximum stream resolution as [width, height].
ideal_resolution = [640, 480]
max_resolution = [1280, 720]

# JPEG quality for captured stills (1 = worst, 100 = best).
quality = 90

# ---------------------------------------------------------------------------
# Collage
# ---------------------------------------------------------------------------
[collage]
# JSON file holding the 50 most recent saved results.
path = "collage-data.json"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = ArtifyConfig::default();
        assert_eq!(config.service.base_url, "http://localhost:9002/api");
        assert_eq!(config.service.timeout_secs, 120);
        assert_eq!(config.camera.facing, FacingMode::Front);
        assert_eq!(config.camera.frame_timeout_ms, 3000);
        assert_eq!(config.camera.settle_delay_ms, 300);
        assert_eq!(config.camera.ideal_resolution, [640, 480]);
        assert_eq!(config.camera.max_resolution, [1280, 720]);
        assert_eq!(config.collage.path, PathBuf::from("collage-data.json"));
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[camera]
facing = "rear"
"#;
        let config: ArtifyConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.camera.facing, FacingMode::Rear);
        assert_eq!(config.camera.frame_timeout_ms, 3000);
        assert_eq!(config.service, ServiceConfig::default());
    }

    #[test]
    fn load_config_reads_explicit_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("artify.toml");
        fs::write(
            &path,
            r#"
[service]
base_url = "https://art.example.com/api"

[collage]
path = "/var/lib/artify/collage.json"
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.service.base_url, "https://art.example.com/api");
        assert_eq!(config.service.preview_path, "preview");
        assert_eq!(
            config.collage.path,
            PathBuf::from("/var/lib/artify/collage.json")
        );
    }

    #[test]
    fn load_config_missing_explicit_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(Some(&tmp.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[camera]\nquality = 200\n").unwrap();
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Validation(_))
        ));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[camera]
frame_timeout_ms = 3000
settle_delay_ms = 300
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str("[camera]\nsettle_delay_ms = 500\n").unwrap();
        let merged = merge_toml(base, overlay);
        let camera = merged.get("camera").unwrap();
        assert_eq!(camera.get("settle_delay_ms").unwrap().as_integer(), Some(500));
        assert_eq!(
            camera.get("frame_timeout_ms").unwrap().as_integer(),
            Some(3000)
        );
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str("res = [640, 480]").unwrap();
        let overlay: toml::Value = toml::from_str("res = [320, 240]").unwrap();
        let merged = merge_toml(base, overlay);
        let res = merged.get("res").unwrap().as_array().unwrap();
        assert_eq!(res[0].as_integer(), Some(320));
        assert_eq!(res.len(), 2);
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<ArtifyConfig, _> = toml::from_str("[camera]\nfacng = \"rear\"\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<ArtifyConfig, _> = toml::from_str("[cameras]\nquality = 90\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_facing_rejected() {
        let result: Result<ArtifyConfig, _> = toml::from_str("[camera]\nfacing = \"side\"\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(ArtifyConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_quality_bounds() {
        let mut config = ArtifyConfig::default();
        config.camera.quality = 100;
        assert!(config.validate().is_ok());
        config.camera.quality = 0;
        assert!(config.validate().is_err());
        config.camera.quality = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("quality"));
    }

    #[test]
    fn validate_resolution() {
        let mut config = ArtifyConfig::default();
        config.camera.ideal_resolution = [0, 480];
        assert!(config.validate().is_err());

        let mut config = ArtifyConfig::default();
        config.camera.ideal_resolution = [1920, 1080];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_resolution"));
    }

    #[test]
    fn validate_service() {
        let mut config = ArtifyConfig::default();
        config.service.base_url = "localhost:9002".into();
        assert!(config.validate().is_err());

        let mut config = ArtifyConfig::default();
        config.service.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn resolve_config_with_overlay() {
        let overlay: toml::Value = toml::from_str("[service]\ntimeout_secs = 30\n").unwrap();
        let config = resolve_config(Some(overlay)).unwrap();
        assert_eq!(config.service.timeout_secs, 30);
        assert_eq!(config.camera, CameraConfig::default());
    }

    // =========================================================================
    // stock config tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: ArtifyConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, ArtifyConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[service]"));
        assert!(content.contains("[camera]"));
        assert!(content.contains("[collage]"));
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        assert!(val.is_table());
        assert!(val.get("service").is_some());
        assert!(val.get("camera").is_some());
        assert!(val.get("collage").is_some());
    }
}
