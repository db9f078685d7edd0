// storefront/src/services/image_host.rs

//! Client for the external image host: unsigned multipart uploads and
//! transformation URLs for delivery.

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::ImageHostConfig;
use crate::errors::AppError;

const UPLOAD_SEGMENT: &str = "/upload/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transform {
  pub width: Option<u32>,
  pub height: Option<u32>,
  /// 1-100; `None` lets the host pick.
  pub quality: Option<u8>,
}

impl Transform {
  pub const THUMBNAIL: Transform = Transform {
    width: Some(300),
    height: Some(300),
    quality: None,
  };

  /// Comma-separated transformation segment, e.g. `w_300,h_300,c_fill,q_auto`.
  pub fn segment(&self) -> String {
    let mut parts = Vec::new();
    if let Some(w) = self.width {
      parts.push(format!("w_{}", w));
    }
    if let Some(h) = self.height {
      parts.push(format!("h_{}", h));
    }
    if self.width.is_some() && self.height.is_some() {
      parts.push("c_fill".to_string());
    }
    match self.quality {
      Some(q) => parts.push(format!("q_{}", q.clamp(1, 100))),
      None => parts.push("q_auto".to_string()),
    }
    parts.join(",")
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
  pub secure_url: String,
  pub public_id: Option<String>,
}

#[derive(Deserialize)]
struct UploadResponse {
  secure_url: String,
  #[serde(default)]
  public_id: Option<String>,
}

#[derive(Clone)]
pub struct ImageHost {
  client: reqwest::Client,
  config: ImageHostConfig,
}

impl ImageHost {
  pub fn new(config: ImageHostConfig) -> Result<Self, AppError> {
    let client = reqwest::Client::builder()
      .user_agent(concat!("bikeshop-storefront/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| AppError::Config(format!("Failed to build image host client: {}", e)))?;
    Ok(Self { client, config })
  }

  pub fn upload_endpoint(&self) -> String {
    format!(
      "{}/{}/image/upload",
      self.config.api_base.trim_end_matches('/'),
      self.config.cloud_name
    )
  }

  /// Uploads one image with the configured unsigned preset.
  #[instrument(name = "ImageHost::upload", skip(self, bytes), fields(size = bytes.len()))]
  pub async fn upload(
    &self,
    filename: &str,
    bytes: Vec<u8>,
    content_type: Option<&str>,
  ) -> Result<UploadedImage, AppError> {
    if filename.trim().is_empty() {
      return Err(AppError::Validation("An image filename is required.".to_string()));
    }
    if bytes.is_empty() {
      return Err(AppError::Validation("The image body is empty.".to_string()));
    }

    let mut part = Part::bytes(bytes).file_name(filename.to_string());
    if let Some(ct) = content_type {
      part = part
        .mime_str(ct)
        .map_err(|e| AppError::Validation(format!("Unsupported content type '{}': {}", ct, e)))?;
    }
    let form = Form::new()
      .text("upload_preset", self.config.upload_preset.clone())
      .part("file", part);

    let response = self
      .client
      .post(self.upload_endpoint())
      .multipart(form)
      .send()
      .await
      .map_err(|e| {
        error!(error = %e, "Image upload request failed.");
        AppError::ImageHost(e.to_string())
      })?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      error!(%status, %body, "Image host rejected the upload.");
      return Err(AppError::ImageHost(format!("upload returned {}", status)));
    }

    let parsed: UploadResponse = response
      .json()
      .await
      .map_err(|e| AppError::ImageHost(format!("unreadable upload response: {}", e)))?;
    info!(url = %parsed.secure_url, "Image uploaded.");
    Ok(UploadedImage {
      secure_url: parsed.secure_url,
      public_id: parsed.public_id,
    })
  }

  /// Delivery URL for an uploaded image id.
  pub fn delivery_url(&self, public_id: &str, transform: Transform) -> String {
    format!(
      "{}/{}/image/upload/{}/{}",
      self.config.delivery_base.trim_end_matches('/'),
      self.config.cloud_name,
      transform.segment(),
      public_id.trim_start_matches('/')
    )
  }

  /// Rewrites a hosted image URL to carry `transform`. URLs not served by the
  /// host are returned unchanged.
  pub fn transformed_url(&self, url: &str, transform: Transform) -> String {
    transform_url(url, transform)
  }
}

/// Transformation parameter keys the host understands.
const TRANSFORM_KEYS: &[&str] = &[
  "a", "ar", "b", "bo", "c", "co", "dpr", "e", "f", "fl", "g", "h", "l", "o", "q", "r", "t", "u", "w", "x", "y", "z",
];

/// Puts `transform` right after `/upload/`, replacing any transformation
/// segments already there so repeated calls do not stack.
pub fn transform_url(url: &str, transform: Transform) -> String {
  let Some(idx) = url.find(UPLOAD_SEGMENT) else {
    return url.to_string();
  };
  let split = idx + UPLOAD_SEGMENT.len();
  let mut rest = &url[split..];
  while let Some((head, tail)) = rest.split_once('/') {
    if !is_transformation(head) {
      break;
    }
    rest = tail;
  }
  format!("{}{}/{}", &url[..split], transform.segment(), rest)
}

/// `w_300,h_300,c_fill` style segment. Version segments such as `v1712` and
/// folder names are not.
fn is_transformation(segment: &str) -> bool {
  !segment.is_empty()
    && segment.split(',').all(|part| match part.split_once('_') {
      Some((key, value)) => TRANSFORM_KEYS.contains(&key) && !value.is_empty(),
      None => false,
    })
}
