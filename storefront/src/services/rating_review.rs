// storefront/src/services/rating_review.rs

//! Walks the items of one order, collecting a score for each.
//!
//! `Reviewing(i)` moves to `Reviewing(i + 1)` on [`RatingReview::rate`] or
//! [`RatingReview::skip`]; moving past the last item ends in `Submitted`.
//! [`RatingReview::abandon`] ends in `Abandoned` and drops every score.

use serde::Serialize;

use crate::errors::AppError;
use crate::models::rating::MAX_SCORE;
use crate::models::OrderItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "item", rename_all = "snake_case")]
pub enum ReviewState {
  Reviewing(usize),
  Submitted,
  Abandoned,
}

/// A score waiting to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredItem {
  pub product_id: String,
  pub score: u8,
  pub comment: Option<String>,
}

#[derive(Debug)]
pub struct RatingReview {
  items: Vec<OrderItem>,
  state: ReviewState,
  scored: Vec<ScoredItem>,
}

impl RatingReview {
  pub fn new(items: Vec<OrderItem>) -> Self {
    let state = if items.is_empty() {
      ReviewState::Submitted
    } else {
      ReviewState::Reviewing(0)
    };
    Self {
      items,
      state,
      scored: Vec::new(),
    }
  }

  pub fn state(&self) -> ReviewState {
    self.state
  }

  pub fn current_item(&self) -> Option<&OrderItem> {
    match self.state {
      ReviewState::Reviewing(i) => self.items.get(i),
      _ => None,
    }
  }

  /// Records `score` for the current item and advances. A score of 0 counts as
  /// a skip.
  pub fn rate(&mut self, score: u8, comment: Option<String>) -> Result<ReviewState, AppError> {
    if score > MAX_SCORE {
      return Err(AppError::Validation(format!(
        "Scores range from 1 to {}, got {}.",
        MAX_SCORE, score
      )));
    }
    let product_id = self
      .current_item()
      .map(|item| item.product_id.clone())
      .ok_or_else(|| AppError::Validation("The rating review has already finished.".to_string()))?;
    if score > 0 {
      let comment = comment.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
      self.scored.push(ScoredItem {
        product_id,
        score,
        comment,
      });
    }
    Ok(self.advance())
  }

  pub fn skip(&mut self) -> Result<ReviewState, AppError> {
    self.rate(0, None)
  }

  pub fn abandon(&mut self) {
    if matches!(self.state, ReviewState::Reviewing(_)) {
      self.scored.clear();
      self.state = ReviewState::Abandoned;
    }
  }

  fn advance(&mut self) -> ReviewState {
    if let ReviewState::Reviewing(i) = self.state {
      self.state = if i + 1 < self.items.len() {
        ReviewState::Reviewing(i + 1)
      } else {
        ReviewState::Submitted
      };
    }
    self.state
  }

  /// Non-zero scores collected so far, in item order. Empty unless submitted.
  pub fn into_scored(self) -> Vec<ScoredItem> {
    match self.state {
      ReviewState::Submitted => self.scored,
      _ => Vec::new(),
    }
  }
}
