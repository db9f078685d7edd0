// storefront/src/pipelines/order_pipeline.rs

//! Order cancellation: a pending order is marked cancelled, then every line is
//! put back into stock through the ledger.

use chrono::Utc;
use serde_json::{json, Map};
use tracing::{info, instrument, warn};
use wheelwork::{Flow, FlowContext, FlowRegistry, StepControl};

use crate::errors::{AppError, Result};
use crate::models::OrderStatus;
use crate::pipelines::common_steps::fetch_order;
use crate::pipelines::contexts::CancelOrderCtx;
use crate::store::paths;

pub fn register_cancel_order_flow(registry: &FlowRegistry<AppError>) {
  let mut flow = Flow::<CancelOrderCtx, AppError>::with_steps(
    "order.cancel",
    &["load_order", "check_cancellable", "mark_cancelled", "restock_items"],
  );
  flow.on("load_order", |ctx: FlowContext<CancelOrderCtx>| async move {
    let (app_state, user_id, order_id) = ctx.with(|c| (c.app_state.clone(), c.user_id.clone(), c.order_id.clone()));
    let order = fetch_order(&app_state, &user_id, &order_id).await?;
    ctx.update(|c| c.order = Some(order));
    Ok::<_, AppError>(StepControl::Continue)
  });
  flow.on("check_cancellable", check_cancellable);
  flow.on("mark_cancelled", mark_cancelled);
  flow.on("restock_items", restock_items);

  registry.register(flow);
  info!("Cancel order flow registered.");
}

async fn check_cancellable(ctx: FlowContext<CancelOrderCtx>) -> Result<StepControl> {
  let status = ctx.with(|c| c.order.as_ref().map(|o| o.status));
  match status {
    Some(status) if status.can_become(OrderStatus::Cancelled) => Ok(StepControl::Continue),
    Some(status) => Err(AppError::Validation(format!(
      "Only pending orders can be cancelled; this order is {}.",
      status.as_str()
    ))),
    None => Err(AppError::Internal("order was not loaded".to_string())),
  }
}

#[instrument(name = "order.cancel::mark_cancelled", skip(ctx))]
async fn mark_cancelled(ctx: FlowContext<CancelOrderCtx>) -> Result<StepControl> {
  let (app_state, user_id, order_id) = ctx.with(|c| (c.app_state.clone(), c.user_id.clone(), c.order_id.clone()));
  let now = Utc::now();
  let mut fields = Map::new();
  fields.insert("status".to_string(), json!(OrderStatus::Cancelled));
  fields.insert("updatedAt".to_string(), json!(now));
  app_state.store.patch(&paths::order(&user_id, &order_id), fields).await?;
  ctx.update(|c| {
    if let Some(order) = c.order.as_mut() {
      order.status = OrderStatus::Cancelled;
      order.updated_at = now;
    }
  });
  Ok(StepControl::Continue)
}

/// Each line is restocked on its own; failures are collected and reported
/// together once the rest went through.
#[instrument(name = "order.cancel::restock_items", skip(ctx))]
async fn restock_items(ctx: FlowContext<CancelOrderCtx>) -> Result<StepControl> {
  let (app_state, order_id, items) = ctx.with(|c| {
    (
      c.app_state.clone(),
      c.order_id.clone(),
      c.order.as_ref().map(|o| o.items.clone()).unwrap_or_default(),
    )
  });

  let mut restocked = Vec::new();
  let mut failed = Vec::new();
  for item in &items {
    match app_state.stock.restock(&item.product_id, item.quantity).await {
      Ok(Some(count)) => restocked.push((item.product_id.clone(), count)),
      Ok(None) => warn!(
        "Cancel order {}: product {} no longer exists; not restocked.",
        order_id, item.product_id
      ),
      Err(e) => {
        warn!("Cancel order {}: restocking {} failed: {}", order_id, item.product_id, e);
        failed.push(item.product_id.clone());
      }
    }
  }
  ctx.update(|c| c.restocked = restocked);

  if failed.is_empty() {
    info!("Order {} cancelled and restocked.", order_id);
    Ok(StepControl::Continue)
  } else {
    Err(AppError::partial(
      format!("cancelling order {}", order_id),
      format!("restocking {}", failed.join(", ")),
    ))
  }
}
