// storefront/src/services/session.rs

//! Per-user session context: who the caller is and which menu they see.
//!
//! Contexts are resolved from `users/{uid}` on first use and cached until the
//! user signs out or an admin changes their permissions. Callers without a
//! profile document are never cached, so the cache holds at most one entry
//! per stored user no matter which ids arrive in request headers.

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::permissions::{self, MenuEntry};
use crate::errors::AppError;
use crate::models::{PageAccess, Role, UserProfile};
use crate::store::{paths, Repository};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
  pub user_id: String,
  pub email: Option<String>,
  pub role: Role,
  pub page_access: PageAccess,
}

impl SessionContext {
  pub fn from_profile(user_id: &str, profile: UserProfile) -> Self {
    Self {
      user_id: user_id.to_string(),
      email: profile.email,
      role: profile.role,
      page_access: profile.page_access,
    }
  }

  pub fn menu(&self) -> Vec<&'static MenuEntry> {
    permissions::visible_menu(self.role, &self.page_access)
  }

  pub fn require_page(&self, page: &str) -> Result<(), AppError> {
    permissions::require_page(self.role, &self.page_access, page)
  }

  pub fn require_admin(&self) -> Result<(), AppError> {
    permissions::require_admin(self.role)
  }
}

#[derive(Clone)]
pub struct SessionRegistry {
  store: Arc<dyn Repository>,
  sessions: Arc<RwLock<HashMap<String, Arc<SessionContext>>>>,
}

impl SessionRegistry {
  pub fn new(store: Arc<dyn Repository>) -> Self {
    Self {
      store,
      sessions: Arc::new(RwLock::new(HashMap::new())),
    }
  }

  /// Cached context for `user_id`, loading the profile on a miss. Users
  /// without a profile document are customers.
  #[instrument(name = "SessionRegistry::resolve", skip(self))]
  pub async fn resolve(&self, user_id: &str) -> Result<Arc<SessionContext>, AppError> {
    let cached = self.sessions.read().get(user_id).cloned();
    if let Some(session) = cached {
      return Ok(session);
    }
    let Some(profile) = self.store.get_as::<UserProfile>(&paths::user(user_id)).await? else {
      return Ok(Arc::new(SessionContext::from_profile(user_id, UserProfile::default())));
    };
    let session = Arc::new(SessionContext::from_profile(user_id, profile));
    debug!(role = session.role.as_str(), "Session context resolved.");
    self.sessions.write().insert(user_id.to_string(), session.clone());
    Ok(session)
  }

  /// Drops the cached context. Returns whether one existed.
  pub fn invalidate(&self, user_id: &str) -> bool {
    self.sessions.write().remove(user_id).is_some()
  }

  pub fn active(&self) -> usize {
    self.sessions.read().len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::MemoryStore;
  use serde_json::json;

  #[tokio::test]
  async fn resolves_caches_and_invalidates() {
    let store = Arc::new(MemoryStore::new());
    store
      .put("users/s1", json!({"role": "staff", "pageAccess": "inventory"}))
      .await
      .unwrap();
    let sessions = SessionRegistry::new(store.clone());

    let session = sessions.resolve("s1").await.unwrap();
    assert_eq!(session.role, Role::Staff);
    assert_eq!(sessions.active(), 1);

    store.put("users/s1", json!({"role": "admin"})).await.unwrap();
    assert_eq!(sessions.resolve("s1").await.unwrap().role, Role::Staff);

    assert!(sessions.invalidate("s1"));
    assert_eq!(sessions.resolve("s1").await.unwrap().role, Role::Admin);
  }

  #[tokio::test]
  async fn unknown_users_are_customers() {
    let sessions = SessionRegistry::new(Arc::new(MemoryStore::new()));
    let session = sessions.resolve("new-user").await.unwrap();
    assert_eq!(session.role, Role::Customer);
    assert!(session.require_page("inventory").is_err());
  }

  #[tokio::test]
  async fn callers_without_a_profile_are_not_cached() {
    let store = Arc::new(MemoryStore::new());
    let sessions = SessionRegistry::new(store.clone());
    for i in 0..500 {
      sessions.resolve(&format!("anon-{}", i)).await.unwrap();
    }
    assert_eq!(sessions.active(), 0);

    // A profile written later is picked up without an invalidation.
    store.put("users/anon-7", json!({"role": "staff"})).await.unwrap();
    assert_eq!(sessions.resolve("anon-7").await.unwrap().role, Role::Staff);
    assert_eq!(sessions.active(), 1);
  }
}
