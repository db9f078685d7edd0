// storefront/src/pipelines/checkout_pipeline.rs

//! Checkout turns the cart into a pending order. Stock was already reserved
//! when the items went into the cart, so it is not touched here.

use chrono::Utc;
use tracing::{info, instrument, warn};
use wheelwork::{Flow, FlowContext, FlowRegistry, StepControl};

use crate::errors::{AppError, Result};
use crate::models::{CartItem, Order, OrderItem, OrderStatus};
use crate::pipelines::contexts::CheckoutCtx;
use crate::services::pricing::round_cents;
use crate::store::{new_key, paths};

pub fn register_checkout_flow(registry: &FlowRegistry<AppError>) {
  let mut flow = Flow::<CheckoutCtx, AppError>::with_steps(
    "checkout",
    &["load_cart", "build_order", "persist_order", "clear_cart"],
  );
  flow.on("load_cart", load_cart);
  flow.on("build_order", build_order);
  flow.on("persist_order", persist_order);
  flow.on("clear_cart", clear_cart);

  registry.register(flow);
  info!("Checkout flow registered.");
}

async fn load_cart(ctx: FlowContext<CheckoutCtx>) -> Result<StepControl> {
  let (app_state, user_id) = ctx.with(|c| (c.app_state.clone(), c.user_id.clone()));
  let cart: Vec<CartItem> = app_state
    .store
    .list_as::<CartItem>(&paths::cart(&user_id))
    .await?
    .into_iter()
    .map(|(_, line)| line)
    .filter(|line| line.quantity > 0)
    .collect();
  if cart.is_empty() {
    warn!("Checkout: cart of user {} is empty.", user_id);
    return Err(AppError::Validation("The cart is empty.".to_string()));
  }
  ctx.update(|c| c.cart = cart);
  Ok(StepControl::Continue)
}

async fn build_order(ctx: FlowContext<CheckoutCtx>) -> Result<StepControl> {
  ctx.update(|c| {
    let now = Utc::now();
    let items: Vec<OrderItem> = c.cart.iter().map(OrderItem::from).collect();
    let total = round_cents(c.cart.iter().map(CartItem::line_total).sum());
    c.order = Some(Order {
      id: new_key(),
      user_id: c.user_id.clone(),
      items,
      total,
      payment_method: c.payment_method,
      status: OrderStatus::Pending,
      rated: false,
      created_at: now,
      updated_at: now,
    });
  });
  Ok(StepControl::Continue)
}

#[instrument(name = "checkout::persist_order", skip(ctx))]
async fn persist_order(ctx: FlowContext<CheckoutCtx>) -> Result<StepControl> {
  let (app_state, order) = ctx.with(|c| (c.app_state.clone(), c.order.clone()));
  let order = order.ok_or_else(|| AppError::Internal("order was not built".to_string()))?;
  app_state
    .store
    .put_as(&paths::order(&order.user_id, &order.id), &order)
    .await?;
  info!(
    "Checkout: order {} placed for user {}. Total: {:.2}",
    order.id, order.user_id, order.total
  );
  Ok(StepControl::Continue)
}

async fn clear_cart(ctx: FlowContext<CheckoutCtx>) -> Result<StepControl> {
  let (app_state, user_id, order_id) = ctx.with(|c| {
    (
      c.app_state.clone(),
      c.user_id.clone(),
      c.order.as_ref().map(|o| o.id.clone()).unwrap_or_default(),
    )
  });
  app_state
    .store
    .delete(&paths::cart(&user_id))
    .await
    .map_err(|e| AppError::partial(format!("placing order {}", order_id), format!("clearing the cart ({})", e)))?;
  Ok(StepControl::Continue)
}
