// storefront/src/web/handlers/wishlist_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;
use wheelwork::FlowContext;

use crate::errors::AppError;
use crate::models::WishlistEntry;
use crate::pipelines::contexts::WishlistToggleCtx;
use crate::state::AppState;
use crate::store::paths;
use crate::web::SessionUser;

#[instrument(name = "handler::get_wishlist", skip(app_state, user), fields(user_id = %user.user_id))]
pub async fn get_wishlist_handler(
  app_state: web::Data<AppState>,
  user: SessionUser,
) -> Result<HttpResponse, AppError> {
  let mut entries: Vec<WishlistEntry> = app_state
    .store
    .list_as::<WishlistEntry>(&paths::wishlist(&user.user_id))
    .await?
    .into_iter()
    .map(|(_, e)| e)
    .collect();
  entries.sort_by(|a, b| b.added_at.cmp(&a.added_at));
  Ok(HttpResponse::Ok().json(json!({ "items": entries })))
}

/// Adds the product when it is not saved yet, removes it otherwise. Both
/// outcomes succeed; a removal shows up as a stopped flow.
#[instrument(
  name = "handler::toggle_wishlist",
  skip(app_state, path, user),
  fields(user_id = %user.user_id, product_id = %path.as_ref())
)]
pub async fn toggle_wishlist_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  user: SessionUser,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let ctx = FlowContext::new(WishlistToggleCtx::new(
    app_state.get_ref().clone(),
    &user.user_id,
    &product_id,
  ));
  app_state.flows.run(ctx.clone()).await?;

  let (added, entry) = ctx.with(|c| (c.added, c.entry.clone()));
  let added = added.ok_or_else(|| AppError::Internal("Wishlist toggle finished without a result.".to_string()))?;
  let message = if added {
    "Added to wishlist."
  } else {
    "Removed from wishlist."
  };
  Ok(HttpResponse::Ok().json(json!({
    "message": message,
    "saved": added,
    "item": entry,
  })))
}
