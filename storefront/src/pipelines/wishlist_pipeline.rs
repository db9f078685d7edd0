// storefront/src/pipelines/wishlist_pipeline.rs

//! Wishlist toggle: removes the product if it is saved, otherwise saves it.
//! Wishlist entries never touch stock.

use chrono::Utc;
use tracing::info;
use wheelwork::{Flow, FlowContext, FlowRegistry, StepControl};

use crate::errors::{AppError, Result};
use crate::models::WishlistEntry;
use crate::pipelines::common_steps::{fetch_product, require_id};
use crate::pipelines::contexts::WishlistToggleCtx;
use crate::store::paths;

pub fn register_wishlist_toggle_flow(registry: &FlowRegistry<AppError>) {
  let mut flow = Flow::<WishlistToggleCtx, AppError>::with_steps(
    "wishlist.toggle",
    &["remove_if_saved", "load_product", "save_entry"],
  );
  flow.on("remove_if_saved", remove_if_saved);
  flow.on("load_product", |ctx: FlowContext<WishlistToggleCtx>| async move {
    let (app_state, product_id) = ctx.with(|c| (c.app_state.clone(), c.product_id.clone()));
    let product = fetch_product(&app_state, &product_id).await?;
    ctx.update(|c| c.entry = Some(WishlistEntry::snapshot(&product, Utc::now())));
    Ok::<_, AppError>(StepControl::Continue)
  });
  flow.on("save_entry", save_entry);

  registry.register(flow);
  info!("Wishlist toggle flow registered.");
}

/// Stops the flow after removing an existing entry.
async fn remove_if_saved(ctx: FlowContext<WishlistToggleCtx>) -> Result<StepControl> {
  let (app_state, user_id, product_id) = ctx.with(|c| (c.app_state.clone(), c.user_id.clone(), c.product_id.clone()));
  require_id(&product_id, "product")?;
  let path = paths::wishlist_item(&user_id, &product_id);

  match app_state.store.get_as::<WishlistEntry>(&path).await? {
    Some(existing) => {
      app_state.store.delete(&path).await?;
      info!("Wishlist: product {} removed for user {}.", product_id, user_id);
      ctx.update(|c| {
        c.added = Some(false);
        c.entry = Some(existing);
      });
      Ok(StepControl::Stop)
    }
    None => Ok(StepControl::Continue),
  }
}

async fn save_entry(ctx: FlowContext<WishlistToggleCtx>) -> Result<StepControl> {
  let (app_state, user_id, product_id, entry) =
    ctx.with(|c| (c.app_state.clone(), c.user_id.clone(), c.product_id.clone(), c.entry.clone()));
  let entry = entry.ok_or_else(|| AppError::Internal("product was not loaded".to_string()))?;
  app_state
    .store
    .put_as(&paths::wishlist_item(&user_id, &product_id), &entry)
    .await?;
  info!("Wishlist: product {} saved for user {}.", product_id, user_id);
  ctx.update(|c| c.added = Some(true));
  Ok(StepControl::Continue)
}
