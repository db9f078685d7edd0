// storefront/src/web/identity.rs

use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use std::sync::Arc;
use tracing::warn;

use crate::errors::AppError;
use crate::services::SessionContext;
use crate::state::AppState;
use crate::store::paths;

pub const USER_ID_HEADER: &str = "X-User-ID";

/// The caller, identified by the `X-User-ID` header set by the identity
/// provider in front of this service, with their resolved session context.
#[derive(Debug, Clone)]
pub struct SessionUser {
  pub user_id: String,
  pub session: Arc<SessionContext>,
}

fn user_id_from(req: &HttpRequest) -> Result<String, AppError> {
  let raw = req
    .headers()
    .get(USER_ID_HEADER)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .unwrap_or_default();
  if raw.is_empty() || paths::validate_segment(raw).is_err() {
    warn!("SessionUser extractor: missing or invalid {} header.", USER_ID_HEADER);
    return Err(AppError::Auth(format!(
      "User authentication required. Missing or invalid {} header.",
      USER_ID_HEADER
    )));
  }
  Ok(raw.to_string())
}

impl FromRequest for SessionUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let user_id = user_id_from(req);
    let state = req.app_data::<web::Data<AppState>>().cloned();
    Box::pin(async move {
      let user_id = user_id?;
      let state = state.ok_or_else(|| AppError::Internal("application state is not configured".to_string()))?;
      let session = state.sessions.resolve(&user_id).await?;
      Ok(SessionUser { user_id, session })
    })
  }
}
