// storefront/src/pipelines/common_steps.rs

//! Lookups shared by several flows.

use tracing::{instrument, warn};

use crate::errors::{AppError, Result};
use crate::models::{Order, Product};
use crate::state::AppState;
use crate::store::paths;

/// Rejects ids that cannot be used as a path segment.
pub fn require_id(id: &str, what: &str) -> Result<()> {
  paths::validate_segment(id).map_err(|_| AppError::Validation(format!("Invalid {} id '{}'.", what, id)))
}

#[instrument(name = "common_step::fetch_product", skip(app_state))]
pub async fn fetch_product(app_state: &AppState, product_id: &str) -> Result<Product> {
  require_id(product_id, "product")?;
  match app_state.store.get_as::<Product>(&paths::product(product_id)).await? {
    Some(product) => Ok(product),
    None => {
      warn!("Product {} not found.", product_id);
      Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)))
    }
  }
}

#[instrument(name = "common_step::fetch_order", skip(app_state))]
pub async fn fetch_order(app_state: &AppState, user_id: &str, order_id: &str) -> Result<Order> {
  require_id(order_id, "order")?;
  match app_state.store.get_as::<Order>(&paths::order(user_id, order_id)).await? {
    Some(order) => Ok(order),
    None => {
      warn!("Order {} of user {} not found.", order_id, user_id);
      Err(AppError::NotFound(format!("Order with ID {} not found.", order_id)))
    }
  }
}
