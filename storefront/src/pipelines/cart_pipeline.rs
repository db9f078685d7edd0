// storefront/src/pipelines/cart_pipeline.rs

//! Cart add and remove. Both move stock through the ledger first and touch the
//! cart line second; when the second write fails the stock change stays and
//! the caller gets a `PartialWrite`.

use chrono::Utc;
use tracing::{info, instrument, warn};
use wheelwork::{Flow, FlowContext, FlowRegistry, StepControl};

use crate::errors::{AppError, Result};
use crate::models::CartItem;
use crate::pipelines::common_steps::{fetch_product, require_id};
use crate::pipelines::contexts::{AddToCartCtx, RemoveFromCartCtx};
use crate::services::stock::decremented;
use crate::store::{paths, StoreError};

pub fn register_add_to_cart_flow(registry: &FlowRegistry<AppError>) {
  let mut flow = Flow::<AddToCartCtx, AppError>::with_steps(
    "cart.add",
    &[
      "validate_cart_input",
      "load_product",
      "check_stock",
      "reserve_stock",
      "upsert_cart_line",
    ],
  );
  flow.on("validate_cart_input", validate_cart_input);
  flow.on("load_product", load_product);
  flow.on("check_stock", check_stock);
  flow.on("reserve_stock", reserve_stock);
  flow.on("upsert_cart_line", upsert_cart_line);
  flow.after("upsert_cart_line", |ctx: FlowContext<AddToCartCtx>| async move {
    ctx.update(|c| {
      if let Some(item) = &c.cart_item {
        c.notice = Some(format!("{} added to cart ({} in cart).", item.name, item.quantity));
      }
    });
    Ok(StepControl::Continue)
  });

  registry.register(flow);
  info!("Add to Cart flow registered.");
}

pub fn register_remove_from_cart_flow(registry: &FlowRegistry<AppError>) {
  let mut flow = Flow::<RemoveFromCartCtx, AppError>::with_steps(
    "cart.remove",
    &["load_cart_line", "release_stock", "update_cart_line"],
  );
  flow.on("load_cart_line", load_cart_line);
  flow.on("release_stock", release_stock);
  flow.on("update_cart_line", update_cart_line);
  flow.after("update_cart_line", |ctx: FlowContext<RemoveFromCartCtx>| async move {
    ctx.update(|c| {
      let name = c.line.as_ref().map(|l| l.name.clone()).unwrap_or_default();
      c.notice = Some(format!("Removed {} x {} from cart.", c.removed, name));
    });
    Ok(StepControl::Continue)
  });

  registry.register(flow);
  info!("Remove from Cart flow registered.");
}

// --- cart.add ---

async fn validate_cart_input(ctx: FlowContext<AddToCartCtx>) -> Result<StepControl> {
  let (product_id, quantity) = ctx.with(|c| (c.product_id.clone(), c.quantity));
  require_id(&product_id, "product")?;
  if quantity <= 0 {
    warn!("Add to Cart: invalid quantity ({}) provided.", quantity);
    return Err(AppError::Validation("Quantity must be a positive number.".to_string()));
  }
  if u32::try_from(quantity).is_err() {
    return Err(AppError::Validation(format!("Quantity {} is too large.", quantity)));
  }
  Ok(StepControl::Continue)
}

async fn load_product(ctx: FlowContext<AddToCartCtx>) -> Result<StepControl> {
  let (app_state, product_id) = ctx.with(|c| (c.app_state.clone(), c.product_id.clone()));
  let product = fetch_product(&app_state, &product_id).await?;
  ctx.update(|c| c.product = Some(product));
  Ok(StepControl::Continue)
}

/// Rejects the request when stock cannot cover it. Nothing is written here.
async fn check_stock(ctx: FlowContext<AddToCartCtx>) -> Result<StepControl> {
  let (app_state, product_id, quantity, document_stock) = ctx.with(|c| {
    (
      c.app_state.clone(),
      c.product_id.clone(),
      c.quantity as u32,
      c.product.as_ref().map(|p| p.stock).unwrap_or(0),
    )
  });
  let available = app_state.stock.current(&product_id).await?.unwrap_or(document_stock);

  match decremented(available, quantity) {
    Some(remaining) => {
      info!(
        "Add to Cart: stock sufficient for product {}. Available: {}, Requested: {}.",
        product_id, available, quantity
      );
      ctx.update(|c| {
        c.available = Some(available);
        c.remaining_stock = Some(remaining);
      });
      Ok(StepControl::Continue)
    }
    None => {
      warn!(
        "Add to Cart: insufficient stock for product {}. Available: {}, Requested: {}.",
        product_id, available, quantity
      );
      Err(AppError::OutOfStock { product_id, available })
    }
  }
}

#[instrument(name = "cart.add::reserve_stock", skip(ctx))]
async fn reserve_stock(ctx: FlowContext<AddToCartCtx>) -> Result<StepControl> {
  let (app_state, product_id, remaining) = ctx.with(|c| (c.app_state.clone(), c.product_id.clone(), c.remaining_stock));
  let remaining = remaining.ok_or_else(|| AppError::Internal("stock check did not run".to_string()))?;
  app_state.stock.set_stock(&product_id, remaining).await?;
  Ok(StepControl::Continue)
}

#[instrument(name = "cart.add::upsert_cart_line", skip(ctx))]
async fn upsert_cart_line(ctx: FlowContext<AddToCartCtx>) -> Result<StepControl> {
  let (app_state, user_id, product_id, quantity, product) = ctx.with(|c| {
    (
      c.app_state.clone(),
      c.user_id.clone(),
      c.product_id.clone(),
      c.quantity as u32,
      c.product.clone(),
    )
  });
  let product = product.ok_or_else(|| AppError::Internal("product was not loaded".to_string()))?;
  let path = paths::cart_item(&user_id, &product_id);
  let reserved = format!("stock reservation for product {}", product_id);

  let existing = app_state
    .store
    .get_as::<CartItem>(&path)
    .await
    .map_err(|e| AppError::partial(&reserved, format!("reading the cart line ({})", e)))?;
  let line = match existing {
    Some(mut line) => {
      line.quantity = line.quantity.saturating_add(quantity);
      line
    }
    None => CartItem::snapshot(&product, quantity, Utc::now()),
  };

  app_state
    .store
    .put_as(&path, &line)
    .await
    .map_err(|e| AppError::partial(&reserved, format!("saving the cart line ({})", e)))?;
  info!(
    "Add to Cart: user {} now has {} x product {}.",
    user_id, line.quantity, product_id
  );
  ctx.update(|c| c.cart_item = Some(line));
  Ok(StepControl::Continue)
}

// --- cart.remove ---

async fn load_cart_line(ctx: FlowContext<RemoveFromCartCtx>) -> Result<StepControl> {
  let (app_state, user_id, product_id, requested) =
    ctx.with(|c| (c.app_state.clone(), c.user_id.clone(), c.product_id.clone(), c.quantity));
  require_id(&product_id, "product")?;

  let line = app_state
    .store
    .get_as::<CartItem>(&paths::cart_item(&user_id, &product_id))
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product {} is not in the cart.", product_id)))?;

  let removed = match requested {
    None => line.quantity,
    Some(q) if q <= 0 => {
      return Err(AppError::Validation("Quantity must be a positive number.".to_string()));
    }
    Some(q) => match u32::try_from(q) {
      Ok(q) if q <= line.quantity => q,
      _ => {
        return Err(AppError::Validation(format!(
          "Cannot remove {} items; the cart holds {}.",
          q, line.quantity
        )))
      }
    },
  };

  ctx.update(|c| {
    c.line = Some(line);
    c.removed = removed;
  });
  Ok(StepControl::Continue)
}

#[instrument(name = "cart.remove::release_stock", skip(ctx))]
async fn release_stock(ctx: FlowContext<RemoveFromCartCtx>) -> Result<StepControl> {
  let (app_state, product_id, removed) = ctx.with(|c| (c.app_state.clone(), c.product_id.clone(), c.removed));
  match app_state.stock.restock(&product_id, removed).await? {
    Some(restored) => ctx.update(|c| c.restocked_to = Some(restored)),
    None => warn!(
      "Remove from Cart: product {} no longer exists; {} unit(s) not restocked.",
      product_id, removed
    ),
  }
  Ok(StepControl::Continue)
}

#[instrument(name = "cart.remove::update_cart_line", skip(ctx))]
async fn update_cart_line(ctx: FlowContext<RemoveFromCartCtx>) -> Result<StepControl> {
  let (app_state, user_id, product_id, removed, line, restocked) = ctx.with(|c| {
    (
      c.app_state.clone(),
      c.user_id.clone(),
      c.product_id.clone(),
      c.removed,
      c.line.clone(),
      c.restocked_to.is_some(),
    )
  });
  let mut line = line.ok_or_else(|| AppError::Internal("cart line was not loaded".to_string()))?;
  let path = paths::cart_item(&user_id, &product_id);
  let on_failure = |e: StoreError| {
    if restocked {
      AppError::partial(
        format!("restocking product {}", product_id),
        format!("updating the cart line ({})", e),
      )
    } else {
      AppError::Store(e)
    }
  };

  let remaining_line = if removed >= line.quantity {
    app_state.store.delete(&path).await.map_err(on_failure)?;
    None
  } else {
    line.quantity -= removed;
    app_state.store.put_as(&path, &line).await.map_err(on_failure)?;
    Some(line)
  };
  ctx.update(|c| c.remaining_line = remaining_line);
  Ok(StepControl::Continue)
}
