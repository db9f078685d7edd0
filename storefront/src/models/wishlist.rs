// storefront/src/models/wishlist.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::product::Product;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
  pub product_id: String,
  pub name: String,
  pub price: f64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image_url: Option<String>,
  pub added_at: DateTime<Utc>,
}

impl WishlistEntry {
  pub fn snapshot(product: &Product, now: DateTime<Utc>) -> Self {
    Self {
      product_id: product.id.clone(),
      name: product.name.clone(),
      price: product.price,
      image_url: product.image_url.clone(),
      added_at: now,
    }
  }
}
