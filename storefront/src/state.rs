// storefront/src/state.rs

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::pipelines;
use crate::services::{ImageHost, SessionRegistry, StockLedger};
use crate::store::Repository;
use std::sync::Arc;
use wheelwork::FlowRegistry;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Repository>,
  pub flows: Arc<FlowRegistry<AppError>>,
  pub config: Arc<AppConfig>,
  pub stock: StockLedger,
  pub sessions: SessionRegistry,
  pub images: ImageHost,
}

impl std::fmt::Debug for AppState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppState").field("config", &self.config).finish_non_exhaustive()
  }
}

impl AppState {
  /// Wires the services around `store` and registers every flow. The stock
  /// ledger starts empty; call [`StockLedger::seed`] before serving.
  pub fn new(config: Arc<AppConfig>, store: Arc<dyn Repository>) -> Result<Self> {
    let flows = Arc::new(FlowRegistry::<AppError>::new());
    pipelines::register_all_flows(&flows);
    Ok(Self {
      stock: StockLedger::new(store.clone()),
      sessions: SessionRegistry::new(store.clone()),
      images: ImageHost::new(config.image_host.clone())?,
      store,
      flows,
      config,
    })
  }
}
