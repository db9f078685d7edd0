// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map};
use tracing::{info, instrument, warn};
use wheelwork::{FlowContext, FlowOutcome};

use crate::errors::AppError;
use crate::models::{Order, OrderStatus, PaymentMethod};
use crate::pipelines::common_steps::{fetch_order, require_id};
use crate::pipelines::contexts::{CancelOrderCtx, CheckoutCtx};
use crate::state::AppState;
use crate::store::paths;
use crate::web::SessionUser;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequestPayload {
  pub payment_method: PaymentMethod,
}

#[derive(Deserialize, Debug)]
pub struct UpdateStatusPayload {
  pub status: String,
}

#[instrument(
  name = "handler::checkout",
  skip(app_state, req_payload, user),
  fields(user_id = %user.user_id, payment_method = ?req_payload.payment_method)
)]
pub async fn checkout_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CheckoutRequestPayload>,
  user: SessionUser,
) -> Result<HttpResponse, AppError> {
  let ctx = FlowContext::new(CheckoutCtx::new(
    app_state.get_ref().clone(),
    &user.user_id,
    req_payload.payment_method,
  ));

  match app_state.flows.run(ctx.clone()).await? {
    FlowOutcome::Completed => {
      let order = ctx
        .with(|c| c.order.clone())
        .ok_or_else(|| AppError::Internal("Checkout completed without an order.".to_string()))?;
      info!("Order {} placed by user {}.", order.id, user.user_id);
      Ok(HttpResponse::Created().json(json!({ "order": order })))
    }
    FlowOutcome::Stopped => {
      warn!("Checkout flow for user {} was stopped by a handler.", user.user_id);
      Err(AppError::Internal("Checkout was halted.".to_string()))
    }
  }
}

async fn orders_of(app_state: &AppState, user_id: &str) -> Result<Vec<Order>, AppError> {
  let mut orders: Vec<Order> = app_state
    .store
    .list_as::<Order>(&paths::orders(user_id))
    .await?
    .into_iter()
    .map(|(_, o)| o)
    .collect();
  orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
  Ok(orders)
}

#[instrument(name = "handler::list_orders", skip(app_state, user), fields(user_id = %user.user_id))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  user: SessionUser,
) -> Result<HttpResponse, AppError> {
  let orders = orders_of(&app_state, &user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

#[instrument(name = "handler::get_order", skip(app_state, path, user), fields(user_id = %user.user_id, order_id = %path.as_ref()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  user: SessionUser,
) -> Result<HttpResponse, AppError> {
  let order = fetch_order(&app_state, &user.user_id, &path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "order": order })))
}

async fn run_cancel(app_state: &AppState, user_id: &str, order_id: &str) -> Result<HttpResponse, AppError> {
  let ctx = FlowContext::new(CancelOrderCtx::new(app_state.clone(), user_id, order_id));
  match app_state.flows.run(ctx.clone()).await? {
    FlowOutcome::Completed => {
      let (order, restocked) = ctx.with(|c| (c.order.clone(), c.restocked.clone()));
      let restocked: Map<String, serde_json::Value> = restocked
        .into_iter()
        .map(|(product_id, count)| (product_id, json!(count)))
        .collect();
      Ok(HttpResponse::Ok().json(json!({
        "message": "Order cancelled.",
        "order": order,
        "restocked": restocked,
      })))
    }
    FlowOutcome::Stopped => Err(AppError::Internal("Order cancellation was halted.".to_string())),
  }
}

#[instrument(name = "handler::cancel_order", skip(app_state, path, user), fields(user_id = %user.user_id, order_id = %path.as_ref()))]
pub async fn cancel_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  user: SessionUser,
) -> Result<HttpResponse, AppError> {
  run_cancel(&app_state, &user.user_id, &path.into_inner()).await
}

/// Moves an order to a new status. Cancelling goes through the cancel flow so
/// the items are restocked.
#[instrument(
  name = "handler::update_order_status",
  skip(app_state, path, req_payload, user),
  fields(user_id = %user.user_id, status = %req_payload.status)
)]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(String, String)>,
  req_payload: web::Json<UpdateStatusPayload>,
  user: SessionUser,
) -> Result<HttpResponse, AppError> {
  user.session.require_page("orders")?;
  let (customer_id, order_id) = path.into_inner();
  require_id(&customer_id, "user")?;
  let next: OrderStatus = req_payload.status.parse()?;

  if next == OrderStatus::Cancelled {
    return run_cancel(&app_state, &customer_id, &order_id).await;
  }

  let mut order = fetch_order(&app_state, &customer_id, &order_id).await?;
  if !order.status.can_become(next) {
    return Err(AppError::Validation(format!(
      "An order that is {} cannot become {}.",
      order.status.as_str(),
      next.as_str()
    )));
  }
  let now = Utc::now();
  let mut fields = Map::new();
  fields.insert("status".to_string(), json!(next));
  fields.insert("updatedAt".to_string(), json!(now));
  app_state
    .store
    .patch(&paths::order(&customer_id, &order_id), fields)
    .await?;
  info!("Order {} of user {} is now {}.", order_id, customer_id, next.as_str());

  order.status = next;
  order.updated_at = now;
  Ok(HttpResponse::Ok().json(json!({ "order": order })))
}
