// storefront/src/models/rating.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_SCORE: u8 = 5;

/// A stored product rating. Ratings are only ever appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
  pub product_id: String,
  pub score: u8,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub comment: Option<String>,
  pub user_id: String,
  pub order_id: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingEntry {
  pub id: String,
  #[serde(flatten)]
  pub rating: Rating,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
  pub product_id: String,
  pub count: usize,
  pub average: Option<f64>,
  pub entries: Vec<RatingEntry>,
}

impl RatingSummary {
  pub fn from_entries(product_id: &str, mut entries: Vec<RatingEntry>) -> Self {
    entries.sort_by(|a, b| b.rating.created_at.cmp(&a.rating.created_at));
    let count = entries.len();
    let average = (count > 0).then(|| {
      let sum: u32 = entries.iter().map(|e| u32::from(e.rating.score)).sum();
      (f64::from(sum) / count as f64 * 100.0).round() / 100.0
    });
    Self {
      product_id: product_id.to_string(),
      count,
      average,
      entries,
    }
  }
}
