// storefront/src/models/cart_item.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::product::Product;
use crate::services::pricing;

/// One cart line. Name, price and image are copied from the product when the
/// line is first created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
  pub product_id: String,
  pub name: String,
  pub price: f64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub discount: Option<u8>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image_url: Option<String>,
  pub quantity: u32,
  pub added_at: DateTime<Utc>,
}

impl CartItem {
  pub fn snapshot(product: &Product, quantity: u32, now: DateTime<Utc>) -> Self {
    Self {
      product_id: product.id.clone(),
      name: product.name.clone(),
      price: product.price,
      discount: product.discount,
      image_url: product.image_url.clone(),
      quantity,
      added_at: now,
    }
  }

  pub fn unit_price(&self) -> f64 {
    pricing::discounted_price(self.price, self.discount)
  }

  pub fn line_total(&self) -> f64 {
    pricing::round_cents(self.unit_price() * f64::from(self.quantity))
  }
}
