// storefront/src/web/handlers/image_handlers.rs

use actix_web::{http::header, web, HttpRequest, HttpResponse};
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::errors::AppError;
use crate::services::image_host::Transform;
use crate::state::AppState;
use crate::web::SessionUser;

#[derive(Deserialize, Debug)]
pub struct UploadQuery {
  pub filename: String,
}

/// Reads the request body up to `limit` bytes. Anything longer is refused as
/// soon as the limit is crossed.
async fn read_limited(mut payload: web::Payload, limit: usize) -> Result<web::Bytes, AppError> {
  let mut body = web::BytesMut::new();
  while let Some(chunk) = payload.next().await {
    let chunk = chunk.map_err(|e| AppError::Validation(format!("Could not read upload body: {}", e)))?;
    if body.len() + chunk.len() > limit {
      return Err(AppError::PayloadTooLarge(format!(
        "Images are limited to {} bytes.",
        limit
      )));
    }
    body.extend_from_slice(&chunk);
  }
  Ok(body.freeze())
}

/// Forwards the raw request body to the image host.
#[instrument(
  name = "handler::upload_image",
  skip(app_state, req, payload, user),
  fields(user_id = %user.user_id, filename = %query.filename)
)]
pub async fn upload_image_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  query: web::Query<UploadQuery>,
  payload: web::Payload,
  user: SessionUser,
) -> Result<HttpResponse, AppError> {
  user.session.require_page("inventory")?;
  let content_type = req
    .headers()
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .filter(|ct| ct.starts_with("image/"));

  let body = read_limited(payload, app_state.config.image_host.max_upload_bytes).await?;
  debug!(size = body.len(), "Upload body received.");

  let uploaded = app_state
    .images
    .upload(&query.filename, body.to_vec(), content_type)
    .await?;
  let thumbnail_url = app_state
    .images
    .transformed_url(&uploaded.secure_url, Transform::THUMBNAIL);
  Ok(HttpResponse::Created().json(json!({
    "secureUrl": uploaded.secure_url,
    "publicId": uploaded.public_id,
    "thumbnailUrl": thumbnail_url,
  })))
}
