// storefront/src/pipelines/rating_pipeline.rs

//! Post-purchase rating. The review walks every item of the order; non-zero
//! scores are written as one parallel batch, then the order's `rated` flag is
//! flipped with a separate write.

use chrono::Utc;
use futures_util::future::join_all;
use serde_json::{json, Map};
use std::collections::HashSet;
use tracing::{info, instrument, warn};
use wheelwork::{Flow, FlowContext, FlowRegistry, StepControl, StepDef};

use crate::errors::{AppError, Result};
use crate::models::{OrderStatus, Rating, RatingEntry};
use crate::pipelines::common_steps::fetch_order;
use crate::pipelines::contexts::RatingCtx;
use crate::services::rating_review::RatingReview;
use crate::store::paths;

pub fn register_rating_flow(registry: &FlowRegistry<AppError>) {
  let mut flow = Flow::<RatingCtx, AppError>::new(
    "rating.submit",
    [
      StepDef::new("load_order"),
      StepDef::new("review_items"),
      StepDef::new("persist_ratings").skip_if(|ctx: FlowContext<RatingCtx>| ctx.with(|c| c.to_persist.is_empty())),
      StepDef::new("mark_order_rated"),
    ],
  );
  flow.on("load_order", load_order);
  flow.on("review_items", review_items);
  flow.on("persist_ratings", persist_ratings);
  flow.on("mark_order_rated", mark_order_rated);

  registry.register(flow);
  info!("Rating flow registered.");
}

async fn load_order(ctx: FlowContext<RatingCtx>) -> Result<StepControl> {
  let (app_state, user_id, order_id) = ctx.with(|c| (c.app_state.clone(), c.user_id.clone(), c.order_id.clone()));
  let order = fetch_order(&app_state, &user_id, &order_id).await?;
  if order.status != OrderStatus::Completed {
    return Err(AppError::Validation(format!(
      "Only completed orders can be rated; this order is {}.",
      order.status.as_str()
    )));
  }
  if order.rated {
    return Err(AppError::Validation("This order has already been rated.".to_string()));
  }
  ctx.update(|c| c.order = Some(order));
  Ok(StepControl::Continue)
}

/// Drives the review over the order's items. An abandoned review stops the
/// flow with nothing written.
async fn review_items(ctx: FlowContext<RatingCtx>) -> Result<StepControl> {
  let (items, scores, abandoned) = ctx.with(|c| {
    (
      c.order.as_ref().map(|o| o.items.clone()).unwrap_or_default(),
      c.scores.clone(),
      c.abandoned,
    )
  });

  let ordered: HashSet<&str> = items.iter().map(|i| i.product_id.as_str()).collect();
  let mut seen = HashSet::new();
  for score in &scores {
    if !ordered.contains(score.product_id.as_str()) {
      return Err(AppError::Validation(format!(
        "Product {} is not part of this order.",
        score.product_id
      )));
    }
    if !seen.insert(score.product_id.as_str()) {
      return Err(AppError::Validation(format!(
        "Product {} was rated more than once.",
        score.product_id
      )));
    }
  }

  let mut review = RatingReview::new(items.clone());
  if abandoned {
    review.abandon();
    info!("Rating review abandoned; nothing persisted.");
    ctx.update(|c| c.review_state = Some(review.state()));
    return Ok(StepControl::Stop);
  }

  while let Some(product_id) = review.current_item().map(|i| i.product_id.clone()) {
    match scores.iter().find(|s| s.product_id == product_id) {
      Some(s) => review.rate(s.score, s.comment.clone())?,
      None => review.skip()?,
    };
  }

  let state = review.state();
  let to_persist = review.into_scored();
  ctx.update(|c| {
    c.review_state = Some(state);
    c.to_persist = to_persist;
  });
  Ok(StepControl::Continue)
}

#[instrument(name = "rating.submit::persist_ratings", skip(ctx))]
async fn persist_ratings(ctx: FlowContext<RatingCtx>) -> Result<StepControl> {
  let (app_state, user_id, order_id, to_persist) = ctx.with(|c| {
    (
      c.app_state.clone(),
      c.user_id.clone(),
      c.order_id.clone(),
      c.to_persist.clone(),
    )
  });
  let now = Utc::now();
  let ratings: Vec<Rating> = to_persist
    .into_iter()
    .map(|s| Rating {
      product_id: s.product_id,
      score: s.score,
      comment: s.comment,
      user_id: user_id.clone(),
      order_id: order_id.clone(),
      created_at: now,
      updated_at: now,
    })
    .collect();

  let store = &app_state.store;
  let results = join_all(
    ratings
      .iter()
      .map(|rating| async move { store.push_as(&paths::ratings(&rating.product_id), rating).await }),
  )
  .await;

  let total = ratings.len();
  let mut persisted = Vec::new();
  let mut first_error = None;
  for (rating, result) in ratings.into_iter().zip(results) {
    match result {
      Ok(id) => persisted.push(RatingEntry { id, rating }),
      Err(e) => {
        warn!("Rating for product {} was not saved: {}", rating.product_id, e);
        if first_error.is_none() {
          first_error = Some(e);
        }
      }
    }
  }
  let saved = persisted.len();
  ctx.update(|c| c.persisted = persisted);

  match first_error {
    None => {
      info!("Persisted {} rating(s) for order {}.", saved, order_id);
      Ok(StepControl::Continue)
    }
    Some(e) if saved == 0 => Err(AppError::Store(e)),
    Some(e) => Err(AppError::partial(
      format!("saving {} of {} ratings", saved, total),
      format!("the rest ({})", e),
    )),
  }
}

#[instrument(name = "rating.submit::mark_order_rated", skip(ctx))]
async fn mark_order_rated(ctx: FlowContext<RatingCtx>) -> Result<StepControl> {
  let (app_state, user_id, order_id, saved) =
    ctx.with(|c| (c.app_state.clone(), c.user_id.clone(), c.order_id.clone(), c.persisted.len()));
  let mut fields = Map::new();
  fields.insert("rated".to_string(), json!(true));
  fields.insert("updatedAt".to_string(), json!(Utc::now()));

  match app_state.store.patch(&paths::order(&user_id, &order_id), fields).await {
    Ok(()) => {
      ctx.update(|c| {
        if let Some(order) = c.order.as_mut() {
          order.rated = true;
        }
      });
      Ok(StepControl::Continue)
    }
    Err(e) if saved == 0 => Err(AppError::Store(e)),
    Err(e) => Err(AppError::partial(
      format!("saving {} rating(s)", saved),
      format!("marking order {} as rated ({})", order_id, e),
    )),
  }
}
