// storefront/src/web/handlers/session_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::SessionUser;

#[instrument(name = "handler::get_session", skip(user), fields(user_id = %user.user_id))]
pub async fn get_session_handler(user: SessionUser) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(json!({
    "session": user.session.as_ref(),
    "menu": user.session.menu(),
  })))
}

#[instrument(name = "handler::sign_out", skip(app_state, user), fields(user_id = %user.user_id))]
pub async fn sign_out_handler(app_state: web::Data<AppState>, user: SessionUser) -> Result<HttpResponse, AppError> {
  app_state.sessions.invalidate(&user.user_id);
  info!("User {} signed out.", user.user_id);
  Ok(HttpResponse::NoContent().finish())
}
