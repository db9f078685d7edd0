// storefront/src/services/stock.rs

//! Local view of product stock counts and the single mutator that writes them.
//!
//! Writes go to the store first and to the local view second. There is no
//! version check, so two writers racing on one product end with whichever
//! wrote last.

use chrono::Utc;
use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::models::Product;
use crate::store::{paths, Repository, StoreError, StoreEvent, StoreResult};

/// `current - quantity`, or `None` when that would go below zero or when
/// nothing is requested.
pub fn decremented(current: u32, quantity: u32) -> Option<u32> {
  if quantity == 0 {
    return None;
  }
  current.checked_sub(quantity)
}

pub fn incremented(current: u32, quantity: u32) -> u32 {
  current.saturating_add(quantity)
}

#[derive(Clone)]
pub struct StockLedger {
  store: Arc<dyn Repository>,
  counts: Arc<RwLock<HashMap<String, u32>>>,
}

impl StockLedger {
  pub fn new(store: Arc<dyn Repository>) -> Self {
    Self {
      store,
      counts: Arc::new(RwLock::new(HashMap::new())),
    }
  }

  /// Replaces the view with the stock of every product in the store.
  #[instrument(name = "StockLedger::seed", skip(self))]
  pub async fn seed(&self) -> StoreResult<usize> {
    let products = self.store.list_as::<Product>(paths::PRODUCTS).await?;
    let fresh: HashMap<String, u32> = products.into_iter().map(|(id, p)| (id, p.stock)).collect();
    let count = fresh.len();
    *self.counts.write() = fresh;
    info!(products = count, "Stock ledger seeded.");
    Ok(count)
  }

  pub fn cached(&self, product_id: &str) -> Option<u32> {
    self.counts.read().get(product_id).copied()
  }

  /// Cached count, falling back to the product document on a miss.
  pub async fn current(&self, product_id: &str) -> StoreResult<Option<u32>> {
    if let Some(count) = self.cached(product_id) {
      return Ok(Some(count));
    }
    let product = self.store.get_as::<Product>(&paths::product(product_id)).await?;
    Ok(product.map(|p| {
      self.apply(product_id, p.stock);
      p.stock
    }))
  }

  /// Writes `count` to the product document, then to the local view.
  ///
  /// Only existing products are written. When the document is gone the local
  /// count is dropped as well and [`StoreError::NotFound`] is returned.
  #[instrument(name = "StockLedger::set_stock", skip(self))]
  pub async fn set_stock(&self, product_id: &str, count: u32) -> StoreResult<()> {
    let mut fields = Map::new();
    fields.insert("stock".to_string(), json!(count));
    fields.insert("updatedAt".to_string(), json!(Utc::now()));
    match self.store.patch(&paths::product(product_id), fields).await {
      Ok(()) => {
        self.apply(product_id, count);
        debug!("Stock updated.");
        Ok(())
      }
      Err(e @ StoreError::NotFound(_)) => {
        self.forget(product_id);
        Err(e)
      }
      Err(e) => Err(e),
    }
  }

  /// Puts `quantity` units back. `Ok(None)` means the product no longer
  /// exists and nothing was written.
  #[instrument(name = "StockLedger::restock", skip(self))]
  pub async fn restock(&self, product_id: &str, quantity: u32) -> StoreResult<Option<u32>> {
    let Some(current) = self.current(product_id).await? else {
      return Ok(None);
    };
    let count = incremented(current, quantity);
    match self.set_stock(product_id, count).await {
      Ok(()) => Ok(Some(count)),
      Err(StoreError::NotFound(_)) => Ok(None),
      Err(e) => Err(e),
    }
  }

  /// Sets the local count without writing to the store.
  pub fn apply(&self, product_id: &str, count: u32) {
    self.counts.write().insert(product_id.to_string(), count);
  }

  pub fn forget(&self, product_id: &str) {
    self.counts.write().remove(product_id);
  }

  pub fn snapshot(&self) -> HashMap<String, u32> {
    self.counts.read().clone()
  }

  /// Keeps the view in line with product writes made anywhere, including other
  /// server processes sharing the store.
  pub fn follow(&self) -> JoinHandle<()> {
    let ledger = self.clone();
    let mut watch = self.store.watch(paths::PRODUCTS);
    tokio::spawn(async move {
      while let Some(event) = watch.next().await {
        ledger.apply_event(&event);
      }
      debug!("Product watch closed; ledger no longer follows the store.");
    })
  }

  fn apply_event(&self, event: &StoreEvent) {
    match event {
      StoreEvent::Put { path, value } if paths::parent_of(path) == paths::PRODUCTS => {
        match value.get("stock").and_then(Value::as_u64).and_then(|s| u32::try_from(s).ok()) {
          Some(stock) => self.apply(paths::last_segment(path), stock),
          None => warn!(%path, "Product event without a usable stock count."),
        }
      }
      StoreEvent::Removed { path } if path == paths::PRODUCTS => self.counts.write().clear(),
      StoreEvent::Removed { path } if paths::parent_of(path) == paths::PRODUCTS => {
        self.forget(paths::last_segment(path))
      }
      _ => {}
    }
  }
}
