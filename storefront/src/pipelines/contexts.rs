// storefront/src/pipelines/contexts.rs

//! Data carried through each flow. Handlers receive these wrapped in
//! `wheelwork::FlowContext`; the HTTP layer keeps a handle and reads the
//! results once the flow finishes.

use serde::Deserialize;

use crate::models::{CartItem, Order, PaymentMethod, Product, RatingEntry, WishlistEntry};
use crate::services::rating_review::{ReviewState, ScoredItem};
use crate::state::AppState;

#[derive(Debug)]
pub struct AddToCartCtx {
  pub app_state: AppState,
  pub user_id: String,
  pub product_id: String,
  pub quantity: i64,
  pub product: Option<Product>,
  /// Stock seen before the reservation.
  pub available: Option<u32>,
  pub remaining_stock: Option<u32>,
  pub cart_item: Option<CartItem>,
  pub notice: Option<String>,
}

impl AddToCartCtx {
  pub fn new(app_state: AppState, user_id: &str, product_id: &str, quantity: i64) -> Self {
    Self {
      app_state,
      user_id: user_id.to_string(),
      product_id: product_id.to_string(),
      quantity,
      product: None,
      available: None,
      remaining_stock: None,
      cart_item: None,
      notice: None,
    }
  }
}

#[derive(Debug)]
pub struct RemoveFromCartCtx {
  pub app_state: AppState,
  pub user_id: String,
  pub product_id: String,
  /// `None` removes the whole line.
  pub quantity: Option<i64>,
  pub line: Option<CartItem>,
  pub removed: u32,
  pub restocked_to: Option<u32>,
  /// What is left of the line; `None` once it is gone.
  pub remaining_line: Option<CartItem>,
  pub notice: Option<String>,
}

impl RemoveFromCartCtx {
  pub fn new(app_state: AppState, user_id: &str, product_id: &str, quantity: Option<i64>) -> Self {
    Self {
      app_state,
      user_id: user_id.to_string(),
      product_id: product_id.to_string(),
      quantity,
      line: None,
      removed: 0,
      restocked_to: None,
      remaining_line: None,
      notice: None,
    }
  }
}

pub struct WishlistToggleCtx {
  pub app_state: AppState,
  pub user_id: String,
  pub product_id: String,
  /// `Some(true)` when the product was added, `Some(false)` when removed.
  pub added: Option<bool>,
  pub entry: Option<WishlistEntry>,
}

impl WishlistToggleCtx {
  pub fn new(app_state: AppState, user_id: &str, product_id: &str) -> Self {
    Self {
      app_state,
      user_id: user_id.to_string(),
      product_id: product_id.to_string(),
      added: None,
      entry: None,
    }
  }
}

pub struct CheckoutCtx {
  pub app_state: AppState,
  pub user_id: String,
  pub payment_method: PaymentMethod,
  pub cart: Vec<CartItem>,
  pub order: Option<Order>,
}

impl CheckoutCtx {
  pub fn new(app_state: AppState, user_id: &str, payment_method: PaymentMethod) -> Self {
    Self {
      app_state,
      user_id: user_id.to_string(),
      payment_method,
      cart: Vec::new(),
      order: None,
    }
  }
}

pub struct CancelOrderCtx {
  pub app_state: AppState,
  pub user_id: String,
  pub order_id: String,
  pub order: Option<Order>,
  pub restocked: Vec<(String, u32)>,
}

impl CancelOrderCtx {
  pub fn new(app_state: AppState, user_id: &str, order_id: &str) -> Self {
    Self {
      app_state,
      user_id: user_id.to_string(),
      order_id: order_id.to_string(),
      order: None,
      restocked: Vec::new(),
    }
  }
}

/// One score from the rating form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemScore {
  pub product_id: String,
  #[serde(default)]
  pub score: u8,
  #[serde(default)]
  pub comment: Option<String>,
}

pub struct RatingCtx {
  pub app_state: AppState,
  pub user_id: String,
  pub order_id: String,
  pub scores: Vec<ItemScore>,
  pub abandoned: bool,
  pub order: Option<Order>,
  pub review_state: Option<ReviewState>,
  pub to_persist: Vec<ScoredItem>,
  pub persisted: Vec<RatingEntry>,
}

impl RatingCtx {
  pub fn new(app_state: AppState, user_id: &str, order_id: &str, scores: Vec<ItemScore>, abandoned: bool) -> Self {
    Self {
      app_state,
      user_id: user_id.to_string(),
      order_id: order_id.to_string(),
      scores,
      abandoned,
      order: None,
      review_state: None,
      to_persist: Vec::new(),
      persisted: Vec::new(),
    }
  }
}
