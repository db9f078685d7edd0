// storefront/src/store/postgres.rs

use super::{new_key, paths, Repository, StoreError, StoreEvent, StoreResult, Watch};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::{PgListener, PgPool};
use sqlx::types::Json;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info, instrument, warn};

const NOTIFY_CHANNEL: &str = "document_events";
const EVENT_CAPACITY: usize = 256;

const SCHEMA: &[&str] = &[
  r#"CREATE TABLE IF NOT EXISTS documents (
       path       TEXT PRIMARY KEY,
       parent     TEXT NOT NULL,
       body       JSONB NOT NULL,
       updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
     )"#,
  "CREATE INDEX IF NOT EXISTS documents_parent_idx ON documents (parent)",
];

/// Documents kept as JSONB rows; watch events travel over `LISTEN/NOTIFY` so
/// every server process sees writes made by the others.
pub struct PgStore {
  pool: PgPool,
  events: broadcast::Sender<StoreEvent>,
}

impl PgStore {
  /// Connects, creates the schema if needed and starts the notification listener.
  pub async fn connect(database_url: &str) -> StoreResult<Self> {
    let pool = PgPool::connect(database_url).await?;
    info!("Successfully connected to the database.");
    Self::from_pool(pool).await
  }

  pub async fn from_pool(pool: PgPool) -> StoreResult<Self> {
    for statement in SCHEMA {
      sqlx::query(statement).execute(&pool).await?;
    }
    let (events, _) = broadcast::channel(EVENT_CAPACITY);

    let mut listener = PgListener::connect_with(&pool).await?;
    listener.listen(NOTIFY_CHANNEL).await?;
    tokio::spawn(forward_notifications(listener, events.clone()));

    Ok(Self { pool, events })
  }

  /// Publishes a committed write. The row is already durable by the time this
  /// runs, so a failed notification is logged and the write still succeeds;
  /// watchers catch up on the next event for that path.
  async fn announce(&self, event: StoreEvent) {
    if let Err(e) = self.notify(&event).await {
      warn!(path = %event.path(), error = %e, "Write committed but change notification failed.");
    }
  }

  async fn notify(&self, event: &StoreEvent) -> StoreResult<()> {
    let payload = notification_payload(event)?;
    sqlx::query("SELECT pg_notify($1, $2)")
      .bind(NOTIFY_CHANNEL)
      .bind(payload)
      .execute(&self.pool)
      .await?;
    Ok(())
  }
}

/// `pg_notify` rejects payloads of 8000 bytes or more.
const MAX_NOTIFY_PAYLOAD: usize = 7999;

fn notification_payload(event: &StoreEvent) -> StoreResult<String> {
  let payload = serde_json::to_string(event)?;
  if payload.len() > MAX_NOTIFY_PAYLOAD {
    return Err(StoreError::Unavailable(format!(
      "notification for '{}' is {} bytes, over the {} byte limit",
      event.path(),
      payload.len(),
      MAX_NOTIFY_PAYLOAD
    )));
  }
  Ok(payload)
}

async fn forward_notifications(mut listener: PgListener, events: broadcast::Sender<StoreEvent>) {
  loop {
    match listener.recv().await {
      Ok(notification) => match serde_json::from_str::<StoreEvent>(notification.payload()) {
        Ok(event) => {
          let _ = events.send(event);
        }
        Err(e) => warn!(error = %e, "Ignoring malformed document notification."),
      },
      Err(e) => {
        error!(error = %e, "Document listener failed; retrying.");
        tokio::time::sleep(Duration::from_secs(1)).await;
      }
    }
  }
}

#[async_trait]
impl Repository for PgStore {
  async fn get(&self, path: &str) -> StoreResult<Option<Value>> {
    paths::validate(path)?;
    let body = sqlx::query_scalar::<_, Json<Value>>("SELECT body FROM documents WHERE path = $1")
      .bind(path)
      .fetch_optional(&self.pool)
      .await?;
    Ok(body.map(|Json(v)| v))
  }

  async fn list(&self, path: &str) -> StoreResult<Vec<(String, Value)>> {
    paths::validate(path)?;
    let rows = sqlx::query_as::<_, (String, Json<Value>)>(
      "SELECT path, body FROM documents WHERE parent = $1 ORDER BY path",
    )
    .bind(path)
    .fetch_all(&self.pool)
    .await?;
    Ok(
      rows
        .into_iter()
        .map(|(child, Json(body))| (paths::last_segment(&child).to_string(), body))
        .collect(),
    )
  }

  #[instrument(name = "PgStore::put", skip(self, value))]
  async fn put(&self, path: &str, value: Value) -> StoreResult<()> {
    paths::validate(path)?;
    sqlx::query(
      "INSERT INTO documents (path, parent, body, updated_at) VALUES ($1, $2, $3, now())
       ON CONFLICT (path) DO UPDATE SET body = EXCLUDED.body, updated_at = now()",
    )
    .bind(path)
    .bind(paths::parent_of(path))
    .bind(Json(&value))
    .execute(&self.pool)
    .await?;
    self
      .announce(StoreEvent::Put {
        path: path.to_string(),
        value,
      })
      .await;
    Ok(())
  }

  #[instrument(name = "PgStore::patch", skip(self, fields), fields(num_fields = fields.len()))]
  async fn patch(&self, path: &str, fields: Map<String, Value>) -> StoreResult<()> {
    paths::validate(path)?;
    let merged = sqlx::query_scalar::<_, Json<Value>>(
      "UPDATE documents
       SET body = CASE WHEN jsonb_typeof(body) = 'object' THEN body || $2 ELSE $2 END,
           updated_at = now()
       WHERE path = $1
       RETURNING body",
    )
    .bind(path)
    .bind(Json(Value::Object(fields)))
    .fetch_optional(&self.pool)
    .await?;
    let Some(Json(merged)) = merged else {
      return Err(StoreError::NotFound(path.to_string()));
    };
    self
      .announce(StoreEvent::Put {
        path: path.to_string(),
        value: merged,
      })
      .await;
    Ok(())
  }

  async fn push(&self, parent: &str, value: Value) -> StoreResult<String> {
    let key = new_key();
    self.put(&format!("{}/{}", parent, key), value).await?;
    Ok(key)
  }

  #[instrument(name = "PgStore::delete", skip(self))]
  async fn delete(&self, path: &str) -> StoreResult<()> {
    paths::validate(path)?;
    let result = sqlx::query("DELETE FROM documents WHERE path = $1 OR starts_with(path, $2)")
      .bind(path)
      .bind(format!("{}/", path))
      .execute(&self.pool)
      .await?;
    info!(removed = result.rows_affected(), "Documents removed.");
    self.announce(StoreEvent::Removed { path: path.to_string() }).await;
    Ok(())
  }

  fn watch(&self, prefix: &str) -> Watch {
    Watch::new(prefix, self.events.subscribe())
  }
}
