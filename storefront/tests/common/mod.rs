// tests/common/mod.rs
#![allow(dead_code)]

use actix_web::{dev::ServerHandle, web, App, HttpRequest, HttpResponse, HttpServer};
use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::Level;

use storefront::config::AppConfig;
use storefront::models::{Category, Product};
use storefront::store::{paths, MemoryStore, Repository, StoreError, StoreResult, Watch};
use storefront::AppState;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn test_config(page_size: usize) -> Arc<AppConfig> {
  test_config_with(page_size, &[])
}

/// Test config with `overrides` layered over the defaults.
pub fn test_config_with(page_size: usize, overrides: &[(&str, &str)]) -> Arc<AppConfig> {
  let mut vars: HashMap<String, String> = HashMap::from([
    ("PAGE_SIZE".to_string(), page_size.to_string()),
    ("IMAGE_HOST_CLOUD_NAME".to_string(), "bikeshop".to_string()),
    ("IMAGE_HOST_DELIVERY_BASE".to_string(), "https://res.example.com".to_string()),
  ]);
  for (name, value) in overrides {
    vars.insert(name.to_string(), value.to_string());
  }
  Arc::new(AppConfig::from_lookup(|name| vars.get(name).cloned()).expect("test config"))
}

pub fn state_over(store: Arc<dyn Repository>) -> AppState {
  state_with_config(test_config(10), store)
}

pub fn state_with_config(config: Arc<AppConfig>, store: Arc<dyn Repository>) -> AppState {
  setup_tracing();
  AppState::new(config, store).expect("app state")
}

pub fn memory_state() -> (AppState, Arc<MemoryStore>) {
  let memory = Arc::new(MemoryStore::new());
  (state_over(memory.clone()), memory)
}

pub fn product(id: &str, price: f64, stock: u32) -> Product {
  let now = Utc::now();
  Product {
    id: id.to_string(),
    name: format!("Bike {}", id),
    category: Category::Bikes,
    brand: "Trailhead".to_string(),
    price,
    discount: None,
    discount_label: None,
    stock,
    specs: BTreeMap::new(),
    image_url: Some(format!("https://res.example.com/bikeshop/image/upload/v1/{}.jpg", id)),
    created_at: now,
    updated_at: now,
  }
}

/// Writes the product and loads its stock into the ledger.
pub async fn seed_product(state: &AppState, product: &Product) {
  state
    .store
    .put_as(&paths::product(&product.id), product)
    .await
    .expect("seed product");
  state.stock.apply(&product.id, product.stock);
}

pub async fn stock_in_store(state: &AppState, product_id: &str) -> u32 {
  state
    .store
    .get_as::<Product>(&paths::product(product_id))
    .await
    .unwrap()
    .expect("product exists")
    .stock
}

/// Memory store whose writes fail for paths under a chosen prefix.
pub struct FailingStore {
  inner: Arc<MemoryStore>,
  failing_prefix: Mutex<Option<String>>,
}

impl FailingStore {
  pub fn new(inner: Arc<MemoryStore>) -> Self {
    Self {
      inner,
      failing_prefix: Mutex::new(None),
    }
  }

  pub fn fail_writes_under(&self, prefix: &str) {
    *self.failing_prefix.lock() = Some(prefix.to_string());
  }

  pub fn heal(&self) {
    *self.failing_prefix.lock() = None;
  }

  fn check(&self, path: &str) -> StoreResult<()> {
    match self.failing_prefix.lock().as_deref() {
      Some(prefix) if paths::is_within(path, prefix) => {
        Err(StoreError::Unavailable(format!("injected failure writing {}", path)))
      }
      _ => Ok(()),
    }
  }
}

#[async_trait]
impl Repository for FailingStore {
  async fn get(&self, path: &str) -> StoreResult<Option<Value>> {
    self.inner.get(path).await
  }

  async fn list(&self, path: &str) -> StoreResult<Vec<(String, Value)>> {
    self.inner.list(path).await
  }

  async fn put(&self, path: &str, value: Value) -> StoreResult<()> {
    self.check(path)?;
    self.inner.put(path, value).await
  }

  async fn patch(&self, path: &str, fields: Map<String, Value>) -> StoreResult<()> {
    self.check(path)?;
    self.inner.patch(path, fields).await
  }

  async fn push(&self, parent: &str, value: Value) -> StoreResult<String> {
    self.check(parent)?;
    self.inner.push(parent, value).await
  }

  async fn delete(&self, path: &str) -> StoreResult<()> {
    self.check(path)?;
    self.inner.delete(path).await
  }

  fn watch(&self, prefix: &str) -> Watch {
    self.inner.watch(prefix)
  }
}

pub fn failing_state() -> (AppState, Arc<FailingStore>, Arc<MemoryStore>) {
  let memory = Arc::new(MemoryStore::new());
  let failing = Arc::new(FailingStore::new(memory.clone()));
  (state_over(failing.clone()), failing, memory)
}

// --- Local stand-in for the image host ---

/// Cloud name for which the mock host answers every upload with a 500.
pub const BROKEN_CLOUD: &str = "broken";

#[derive(Debug, Clone)]
pub struct ReceivedUpload {
  pub cloud: String,
  pub content_type: String,
  pub body: Vec<u8>,
}

impl ReceivedUpload {
  pub fn body_text(&self) -> String {
    String::from_utf8_lossy(&self.body).to_lowercase()
  }
}

type Received = web::Data<Mutex<Vec<ReceivedUpload>>>;

pub struct MockImageHost {
  pub api_base: String,
  received: Received,
  handle: ServerHandle,
}

impl MockImageHost {
  /// Binds an ephemeral local port and serves `POST /{cloud}/image/upload`.
  pub async fn start() -> Self {
    let received: Received = web::Data::new(Mutex::new(Vec::new()));
    let shared = received.clone();
    let server = HttpServer::new(move || {
      App::new()
        .app_data(shared.clone())
        .app_data(web::PayloadConfig::new(16 * 1024 * 1024))
        .route("/{cloud}/image/upload", web::post().to(mock_upload))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind mock image host");
    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_rt::spawn(server);
    Self {
      api_base: format!("http://{}", addr),
      received,
      handle,
    }
  }

  pub fn uploads(&self) -> Vec<ReceivedUpload> {
    self.received.lock().clone()
  }

  pub async fn stop(self) {
    self.handle.stop(false).await;
  }
}

async fn mock_upload(
  cloud: web::Path<String>,
  req: HttpRequest,
  body: web::Bytes,
  received: Received,
) -> HttpResponse {
  let cloud = cloud.into_inner();
  let content_type = req
    .headers()
    .get("content-type")
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default()
    .to_string();
  received.lock().push(ReceivedUpload {
    cloud: cloud.clone(),
    content_type,
    body: body.to_vec(),
  });
  if cloud == BROKEN_CLOUD {
    return HttpResponse::InternalServerError().body("storage offline");
  }
  HttpResponse::Ok().json(json!({
    "secure_url": format!("https://res.example.com/{}/image/upload/v1712/products/bike.jpg", cloud),
    "public_id": "products/bike",
    "bytes": body.len(),
  }))
}
