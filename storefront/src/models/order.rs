// storefront/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::cart_item::CartItem;
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Paid,
  Completed,
  Cancelled,
}

impl OrderStatus {
  /// Completed and cancelled orders are final; a paid order can only complete.
  pub fn can_become(self, next: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
      (self, next),
      (Pending, Paid) | (Pending, Completed) | (Pending, Cancelled) | (Paid, Completed)
    )
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Paid => "paid",
      OrderStatus::Completed => "completed",
      OrderStatus::Cancelled => "cancelled",
    }
  }
}

impl FromStr for OrderStatus {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pending" => Ok(OrderStatus::Pending),
      "paid" => Ok(OrderStatus::Paid),
      "completed" => Ok(OrderStatus::Completed),
      "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
      other => Err(AppError::Validation(format!("Unknown order status '{}'", other))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
  CashOnDelivery,
  Card,
  EWallet,
}

/// Snapshot of one purchased line; `unit_price` already has the discount applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
  pub product_id: String,
  pub name: String,
  pub unit_price: f64,
  pub quantity: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image_url: Option<String>,
}

impl From<&CartItem> for OrderItem {
  fn from(line: &CartItem) -> Self {
    Self {
      product_id: line.product_id.clone(),
      name: line.name.clone(),
      unit_price: line.unit_price(),
      quantity: line.quantity,
      image_url: line.image_url.clone(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: String,
  pub user_id: String,
  pub items: Vec<OrderItem>,
  pub total: f64,
  pub payment_method: PaymentMethod,
  pub status: OrderStatus,
  #[serde(default)]
  pub rated: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
