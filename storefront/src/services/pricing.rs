// storefront/src/services/pricing.rs

use serde::Serialize;

use crate::models::Product;

pub fn round_cents(amount: f64) -> f64 {
  (amount * 100.0).round() / 100.0
}

/// Price after a percentage discount. No discount (or 0) returns `price` as is.
pub fn discounted_price(price: f64, discount: Option<u8>) -> f64 {
  match discount {
    Some(pct) if pct > 0 => round_cents(price * f64::from(100 - pct.min(100)) / 100.0),
    _ => price,
  }
}

pub fn format_amount(amount: f64) -> String {
  format!("{:.2}", amount)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPrice {
  pub base: f64,
  pub final_price: f64,
  pub formatted: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub discount: Option<u8>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
}

pub fn display_price(product: &Product) -> DisplayPrice {
  let discount = product.discount.filter(|d| *d > 0);
  let final_price = discounted_price(product.price, discount);
  DisplayPrice {
    base: product.price,
    final_price,
    formatted: format_amount(final_price),
    discount,
    label: discount.and(product.discount_label.clone()),
  }
}
