// storefront/src/store/mod.rs

//! Key-path document store.
//!
//! Documents are JSON values addressed by slash-separated paths such as
//! `products/{id}` or `ratings/{productId}/{entryId}`. A path's direct children
//! form a collection that can be listed; deleting a path removes everything
//! beneath it. Every write is published to watchers as a [`StoreEvent`].
//!
//! [`MemoryStore`] backs tests and local runs, [`PgStore`] keeps documents in a
//! single Postgres table.

pub mod memory;
pub mod paths;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Store unavailable: {0}")]
  Unavailable(String),

  #[error("Store backend error: {0}")]
  Backend(#[from] sqlx::Error),

  #[error("Document serialization failed: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("Invalid document path '{0}'")]
  InvalidPath(String),

  #[error("No document at '{0}'")]
  NotFound(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A change published after a successful write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreEvent {
  /// `value` is the full document after the write, also for patches.
  Put { path: String, value: Value },
  /// `path` and everything below it were removed.
  Removed { path: String },
}

impl StoreEvent {
  pub fn path(&self) -> &str {
    match self {
      StoreEvent::Put { path, .. } | StoreEvent::Removed { path } => path,
    }
  }
}

#[async_trait]
pub trait Repository: Send + Sync {
  async fn get(&self, path: &str) -> StoreResult<Option<Value>>;

  /// Direct children of `path` as `(key, document)`, ordered by key.
  async fn list(&self, path: &str) -> StoreResult<Vec<(String, Value)>>;

  /// Writes `value` at `path`, replacing any existing document.
  async fn put(&self, path: &str, value: Value) -> StoreResult<()>;

  /// Merges top-level `fields` into the existing document at `path`. Fails with
  /// [`StoreError::NotFound`] when there is none.
  async fn patch(&self, path: &str, fields: Map<String, Value>) -> StoreResult<()>;

  /// Appends `value` under `parent` with a generated key and returns the key.
  async fn push(&self, parent: &str, value: Value) -> StoreResult<String>;

  /// Removes `path` and every document below it. Missing paths are not an error.
  async fn delete(&self, path: &str) -> StoreResult<()>;

  /// Subscribes to events at or below `prefix`.
  fn watch(&self, prefix: &str) -> Watch;
}

impl dyn Repository {
  pub async fn get_as<T: DeserializeOwned>(&self, path: &str) -> StoreResult<Option<T>> {
    match self.get(path).await? {
      Some(value) => Ok(Some(serde_json::from_value(value)?)),
      None => Ok(None),
    }
  }

  /// Children that deserialize as `T`. Documents that do not are logged and
  /// left out so one bad entry cannot hide the rest of the collection.
  pub async fn list_as<T: DeserializeOwned>(&self, path: &str) -> StoreResult<Vec<(String, T)>> {
    Ok(
      self
        .list(path)
        .await?
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value(value) {
          Ok(doc) => Some((key, doc)),
          Err(e) => {
            warn!(parent = %path, %key, error = %e, "Skipping unreadable document.");
            None
          }
        })
        .collect(),
    )
  }

  pub async fn put_as<T: Serialize + ?Sized>(&self, path: &str, doc: &T) -> StoreResult<()> {
    self.put(path, serde_json::to_value(doc)?).await
  }

  pub async fn push_as<T: Serialize + ?Sized>(&self, parent: &str, doc: &T) -> StoreResult<String> {
    self.push(parent, serde_json::to_value(doc)?).await
  }
}

/// Fresh key for a new document.
pub fn new_key() -> String {
  uuid::Uuid::new_v4().simple().to_string()
}

/// Receiving half of [`Repository::watch`].
pub struct Watch {
  prefix: String,
  rx: broadcast::Receiver<StoreEvent>,
}

impl Watch {
  pub fn new(prefix: &str, rx: broadcast::Receiver<StoreEvent>) -> Self {
    Self {
      prefix: prefix.trim_matches('/').to_string(),
      rx,
    }
  }

  pub fn prefix(&self) -> &str {
    &self.prefix
  }

  /// Next matching event, or `None` once the store is gone.
  pub async fn next(&mut self) -> Option<StoreEvent> {
    loop {
      match self.rx.recv().await {
        Ok(event) if paths::is_within(event.path(), &self.prefix) => return Some(event),
        Ok(_) => continue,
        Err(broadcast::error::RecvError::Lagged(skipped)) => {
          warn!(prefix = %self.prefix, skipped, "Store watcher lagged; events were dropped.");
        }
        Err(broadcast::error::RecvError::Closed) => return None,
      }
    }
  }
}
