//! The art transform service seam and its HTTP implementation.
//!
//! The service takes an inline photo plus a style description and answers
//! with an inline image. Two endpoints exist: a fast low-resolution preview
//! and a full-resolution transform. Failures come back as a human-readable
//! message that is shown to the user as-is.
//!
//! ## Wire format
//!
//! ```text
//! POST {base_url}/{preview_path}
//! {"photoDataUri": "data:image/jpeg;base64,...", "artStyleDescription": "..."}
//!
//! 200 {"previewDataUri": "data:image/png;base64,..."}
//! any {"error": "message"}
//! ```
//!
//! The transform endpoint is identical except the success field is
//! `transformedPhotoDataUri`.

use crate::codec::DataUri;
use crate::config::ServiceConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const PREVIEW_FALLBACK: &str = "An unexpected error occurred during preview generation.";
const TRANSFORM_FALLBACK: &str = "An unexpected error occurred during art transformation.";

/// A failed service call, carrying the message to show.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ServiceFailure {
    pub message: String,
}

impl ServiceFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Remote image-to-image styling.
///
/// Both calls return the result image as inline text; callers validate it.
#[async_trait]
pub trait ArtTransformService: Send + Sync {
    async fn preview_transform(
        &self,
        photo: &DataUri,
        style_description: &str,
    ) -> Result<String, ServiceFailure>;

    async fn final_transform(
        &self,
        photo: &DataUri,
        style_description: &str,
    ) -> Result<String, ServiceFailure>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransformRequest<'a> {
    photo_data_uri: &'a str,
    art_style_description: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransformReply {
    #[serde(default)]
    preview_data_uri: Option<String>,
    #[serde(default)]
    transformed_photo_data_uri: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Endpoint {
    Preview,
    Transform,
}

impl Endpoint {
    fn fallback(self) -> &'static str {
        match self {
            Endpoint::Preview => PREVIEW_FALLBACK,
            Endpoint::Transform => TRANSFORM_FALLBACK,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Endpoint::Preview => "preview",
            Endpoint::Transform => "transform",
        }
    }
}

/// Turn a decoded reply into the inline image or a displayable failure.
fn interpret(reply: TransformReply, endpoint: Endpoint) -> Result<String, ServiceFailure> {
    if let Some(message) = reply.error.filter(|m| !m.trim().is_empty()) {
        return Err(ServiceFailure::new(message));
    }
    let image = match endpoint {
        Endpoint::Preview => reply.preview_data_uri,
        Endpoint::Transform => reply.transformed_photo_data_uri,
    };
    image
        .filter(|uri| !uri.is_empty())
        .ok_or_else(|| ServiceFailure::new(endpoint.fallback()))
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// [`ArtTransformService`] over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpTransformService {
    http: reqwest::Client,
    preview_url: String,
    transform_url: String,
}

impl HttpTransformService {
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceFailure> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ServiceFailure::new(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            preview_url: join_url(&config.base_url, &config.preview_path),
            transform_url: join_url(&config.base_url, &config.transform_path),
        })
    }

    async fn call(
        &self,
        endpoint: Endpoint,
        photo: &DataUri,
        style_description: &str,
    ) -> Result<String, ServiceFailure> {
        let url = match endpoint {
            Endpoint::Preview => &self.preview_url,
            Endpoint::Transform => &self.transform_url,
        };
        debug!(
            endpoint = endpoint.label(),
            url = %url,
            photo_bytes = photo.byte_len(),
            "calling transform service"
        );
        let body = TransformRequest {
            photo_data_uri: photo.as_str(),
            art_style_description: style_description,
        };
        let response = self
            .http
            .post(url.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = endpoint.label(), error = %e, "transform request failed");
                ServiceFailure::new(e.to_string())
            })?;

        let status = response.status();
        let reply = match response.json::<TransformReply>().await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(endpoint = endpoint.label(), %status, error = %e, "unreadable service reply");
                if status.is_success() {
                    return Err(ServiceFailure::new(endpoint.fallback()));
                }
                TransformReply::default()
            }
        };
        if !status.is_success() && reply.error.is_none() {
            return Err(ServiceFailure::new(format!(
                "{} request failed with status {status}",
                endpoint.label()
            )));
        }
        interpret(reply, endpoint)
    }
}

#[async_trait]
impl ArtTransformService for HttpTransformService {
    async fn preview_transform(
        &self,
        photo: &DataUri,
        style_description: &str,
    ) -> Result<String, ServiceFailure> {
        self.call(Endpoint::Preview, photo, style_description).await
    }

    async fn final_transform(
        &self,
        photo: &DataUri,
        style_description: &str,
    ) -> Result<String, ServiceFailure> {
        self.call(Endpoint::Transform, photo, style_description)
            .await
    }
}
