// storefront/src/store/memory.rs

use super::{new_key, paths, Repository, StoreError, StoreEvent, StoreResult, Watch};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tokio::sync::broadcast;
use tracing::{debug, instrument};

const EVENT_CAPACITY: usize = 256;

/// In-process document store. Documents live in a sorted map keyed by path.
pub struct MemoryStore {
  docs: RwLock<BTreeMap<String, Value>>,
  events: broadcast::Sender<StoreEvent>,
}

impl Default for MemoryStore {
  fn default() -> Self {
    Self::new()
  }
}

impl MemoryStore {
  pub fn new() -> Self {
    let (events, _) = broadcast::channel(EVENT_CAPACITY);
    Self {
      docs: RwLock::new(BTreeMap::new()),
      events,
    }
  }

  /// Number of documents currently held.
  pub fn len(&self) -> usize {
    self.docs.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.docs.read().is_empty()
  }

  fn publish(&self, event: StoreEvent) {
    // No receivers is fine.
    let _ = self.events.send(event);
  }
}

#[async_trait]
impl Repository for MemoryStore {
  async fn get(&self, path: &str) -> StoreResult<Option<Value>> {
    paths::validate(path)?;
    Ok(self.docs.read().get(path).cloned())
  }

  async fn list(&self, path: &str) -> StoreResult<Vec<(String, Value)>> {
    paths::validate(path)?;
    let prefix = format!("{}/", path);
    let docs = self.docs.read();
    let children = docs
      .range(prefix.clone()..)
      .take_while(|(key, _)| key.starts_with(&prefix))
      .filter_map(|(key, value)| {
        let rest = &key[prefix.len()..];
        (!rest.contains('/')).then(|| (rest.to_string(), value.clone()))
      })
      .collect();
    Ok(children)
  }

  #[instrument(name = "MemoryStore::put", skip(self, value))]
  async fn put(&self, path: &str, value: Value) -> StoreResult<()> {
    paths::validate(path)?;
    self.docs.write().insert(path.to_string(), value.clone());
    debug!("Document written.");
    self.publish(StoreEvent::Put {
      path: path.to_string(),
      value,
    });
    Ok(())
  }

  #[instrument(name = "MemoryStore::patch", skip(self, fields), fields(num_fields = fields.len()))]
  async fn patch(&self, path: &str, fields: Map<String, Value>) -> StoreResult<()> {
    paths::validate(path)?;
    let merged = {
      let mut docs = self.docs.write();
      let doc = docs
        .get_mut(path)
        .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
      match &mut *doc {
        Value::Object(existing) => existing.extend(fields),
        other => *other = Value::Object(fields),
      }
      doc.clone()
    };
    self.publish(StoreEvent::Put {
      path: path.to_string(),
      value: merged,
    });
    Ok(())
  }

  async fn push(&self, parent: &str, value: Value) -> StoreResult<String> {
    let key = new_key();
    self.put(&format!("{}/{}", parent, key), value).await?;
    Ok(key)
  }

  #[instrument(name = "MemoryStore::delete", skip(self))]
  async fn delete(&self, path: &str) -> StoreResult<()> {
    paths::validate(path)?;
    let removed = {
      let mut docs = self.docs.write();
      let before = docs.len();
      docs.retain(|key, _| key != path && !paths::is_within(key, path));
      before - docs.len()
    };
    debug!(removed, "Documents removed.");
    self.publish(StoreEvent::Removed { path: path.to_string() });
    Ok(())
  }

  fn watch(&self, prefix: &str) -> Watch {
    Watch::new(prefix, self.events.subscribe())
  }
}
