// storefront/src/models/user.rs

use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Staff,
  #[default]
  Customer,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::Admin => "admin",
      Role::Staff => "staff",
      Role::Customer => "customer",
    }
  }
}

impl FromStr for Role {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "admin" => Ok(Role::Admin),
      "staff" => Ok(Role::Staff),
      "customer" => Ok(Role::Customer),
      other => Err(AppError::Validation(format!("Unknown role '{}'", other))),
    }
  }
}

/// Admin pages a staff member may open, e.g. `inventory` or `orders`.
///
/// Stored either as a single (possibly comma-separated) string or as a list;
/// always written back as a list of lowercase names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PageAccess(Vec<String>);

impl PageAccess {
  pub fn new<I, S>(pages: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut normalized: Vec<String> = pages
      .into_iter()
      .flat_map(|p| {
        p.as_ref()
          .split(',')
          .map(|s| s.trim().to_ascii_lowercase())
          .filter(|s| !s.is_empty())
          .collect::<Vec<_>>()
      })
      .collect();
    normalized.sort();
    normalized.dedup();
    PageAccess(normalized)
  }

  pub fn allows(&self, page: &str) -> bool {
    self.0.iter().any(|p| p.eq_ignore_ascii_case(page))
  }

  pub fn pages(&self) -> &[String] {
    &self.0
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl<'de> Deserialize<'de> for PageAccess {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
      One(String),
      Many(Vec<String>),
      Nothing(Option<()>),
    }
    Ok(match Raw::deserialize(deserializer)? {
      Raw::One(s) => PageAccess::new([s]),
      Raw::Many(list) => PageAccess::new(list),
      Raw::Nothing(_) => PageAccess::default(),
    })
  }
}

/// Profile document at `users/{uid}`. Accounts themselves live with the
/// external identity provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub display_name: Option<String>,
  #[serde(default)]
  pub role: Role,
  #[serde(default)]
  pub page_access: PageAccess,
}
