// storefront/src/web/handlers/rating_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use wheelwork::{FlowContext, FlowOutcome};

use crate::errors::AppError;
use crate::pipelines::contexts::{ItemScore, RatingCtx};
use crate::state::AppState;
use crate::web::SessionUser;

#[derive(Deserialize, Debug)]
pub struct SubmitRatingsPayload {
  #[serde(default)]
  pub ratings: Vec<ItemScore>,
  #[serde(default)]
  pub abandoned: bool,
}

#[instrument(
  name = "handler::submit_ratings",
  skip(app_state, path, req_payload, user),
  fields(user_id = %user.user_id, order_id = %path.as_ref())
)]
pub async fn submit_ratings_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  req_payload: web::Json<SubmitRatingsPayload>,
  user: SessionUser,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let payload = req_payload.into_inner();
  let ctx = FlowContext::new(RatingCtx::new(
    app_state.get_ref().clone(),
    &user.user_id,
    &order_id,
    payload.ratings,
    payload.abandoned,
  ));

  let outcome = app_state.flows.run(ctx.clone()).await?;
  let (state, persisted) = ctx.with(|c| (c.review_state, c.persisted.clone()));
  match outcome {
    FlowOutcome::Completed => {
      info!("{} rating(s) saved for order {}.", persisted.len(), order_id);
      Ok(HttpResponse::Created().json(json!({
        "review": state,
        "ratings": persisted,
      })))
    }
    FlowOutcome::Stopped => Ok(HttpResponse::Ok().json(json!({
      "review": state,
      "ratings": [],
    }))),
  }
}
