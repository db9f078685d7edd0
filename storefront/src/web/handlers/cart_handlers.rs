// storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use wheelwork::{FlowContext, FlowOutcome};

use crate::errors::AppError;
use crate::models::CartItem;
use crate::pipelines::contexts::{AddToCartCtx, RemoveFromCartCtx};
use crate::services::pricing::{format_amount, round_cents};
use crate::state::AppState;
use crate::store::paths;
use crate::web::SessionUser;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequestPayload {
  pub product_id: String,
  #[serde(default = "one")]
  pub quantity: i64,
}

fn one() -> i64 {
  1
}

#[derive(Deserialize, Debug, Default)]
pub struct RemoveFromCartQuery {
  pub quantity: Option<i64>,
}

#[instrument(name = "handler::get_cart", skip(app_state, user), fields(user_id = %user.user_id))]
pub async fn get_cart_handler(app_state: web::Data<AppState>, user: SessionUser) -> Result<HttpResponse, AppError> {
  let items: Vec<CartItem> = app_state
    .store
    .list_as::<CartItem>(&paths::cart(&user.user_id))
    .await?
    .into_iter()
    .map(|(_, line)| line)
    .collect();
  let total = round_cents(items.iter().map(CartItem::line_total).sum());
  Ok(HttpResponse::Ok().json(json!({
    "items": items,
    "itemCount": items.iter().map(|l| u64::from(l.quantity)).sum::<u64>(),
    "total": total,
    "totalDisplay": format_amount(total),
  })))
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, req_payload, user),
  fields(user_id = %user.user_id, product_id = %req_payload.product_id, quantity = %req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddToCartRequestPayload>,
  user: SessionUser,
) -> Result<HttpResponse, AppError> {
  let ctx = FlowContext::new(AddToCartCtx::new(
    app_state.get_ref().clone(),
    &user.user_id,
    &req_payload.product_id,
    req_payload.quantity,
  ));

  match app_state.flows.run(ctx.clone()).await? {
    FlowOutcome::Completed => {
      let (item, remaining, notice) = ctx.with(|c| (c.cart_item.clone(), c.remaining_stock, c.notice.clone()));
      let item = item.ok_or_else(|| AppError::Internal("Cart update completed, but item details are unavailable.".to_string()))?;
      info!("Add to cart successful for user {}.", user.user_id);
      Ok(HttpResponse::Ok().json(json!({
        "message": notice.unwrap_or_else(|| "Item added to cart.".to_string()),
        "cartItem": item,
        "remainingStock": remaining,
      })))
    }
    FlowOutcome::Stopped => {
      warn!("Add to Cart flow for user {} was stopped by a handler.", user.user_id);
      Err(AppError::Internal("Process to add item to cart was halted.".to_string()))
    }
  }
}

#[instrument(
  name = "handler::remove_from_cart",
  skip(app_state, path, query, user),
  fields(user_id = %user.user_id, product_id = %path.as_ref())
)]
pub async fn remove_from_cart_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  query: web::Query<RemoveFromCartQuery>,
  user: SessionUser,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let ctx = FlowContext::new(RemoveFromCartCtx::new(
    app_state.get_ref().clone(),
    &user.user_id,
    &product_id,
    query.quantity,
  ));

  match app_state.flows.run(ctx.clone()).await? {
    FlowOutcome::Completed => {
      let (removed, remaining_line, restocked_to, notice) =
        ctx.with(|c| (c.removed, c.remaining_line.clone(), c.restocked_to, c.notice.clone()));
      Ok(HttpResponse::Ok().json(json!({
        "message": notice,
        "removed": removed,
        "cartItem": remaining_line,
        "stock": restocked_to,
      })))
    }
    FlowOutcome::Stopped => Err(AppError::Internal("Process to remove item from cart was halted.".to_string())),
  }
}
