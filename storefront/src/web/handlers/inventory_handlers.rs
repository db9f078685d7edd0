// storefront/src/web/handlers/inventory_handlers.rs

//! Product administration. Every handler here needs the inventory page.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument, warn};

use super::product_handlers::{all_products, ListProductsQuery, ProductView};
use crate::errors::AppError;
use crate::models::ProductDraft;
use crate::pipelines::common_steps::fetch_product;
use crate::services::catalog;
use crate::state::AppState;
use crate::store::{new_key, paths};
use crate::web::SessionUser;

const INVENTORY_PAGE: &str = "inventory";

#[instrument(name = "handler::inventory_list", skip(app_state, query_params, user), fields(user_id = %user.user_id))]
pub async fn inventory_list_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ListProductsQuery>,
  user: SessionUser,
) -> Result<HttpResponse, AppError> {
  user.session.require_page(INVENTORY_PAGE)?;
  let query = query_params.to_query()?;
  let page = catalog::query_products(all_products(&app_state).await?, &query, app_state.config.page_size);
  Ok(HttpResponse::Ok().json(page.map(|p| ProductView::new(&app_state, p))))
}

#[instrument(name = "handler::create_product", skip(app_state, req_payload, user), fields(user_id = %user.user_id))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<ProductDraft>,
  user: SessionUser,
) -> Result<HttpResponse, AppError> {
  user.session.require_page(INVENTORY_PAGE)?;
  let product = req_payload.into_inner().into_product(new_key(), None, Utc::now())?;
  app_state.store.put_as(&paths::product(&product.id), &product).await?;
  app_state.stock.apply(&product.id, product.stock);
  info!("Product {} ({}) created with stock {}.", product.id, product.name, product.stock);
  Ok(HttpResponse::Created().json(json!({ "product": ProductView::new(&app_state, product) })))
}

#[instrument(
  name = "handler::update_product",
  skip(app_state, path, req_payload, user),
  fields(user_id = %user.user_id, product_id = %path.as_ref())
)]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  req_payload: web::Json<ProductDraft>,
  user: SessionUser,
) -> Result<HttpResponse, AppError> {
  user.session.require_page(INVENTORY_PAGE)?;
  let product_id = path.into_inner();
  let existing = fetch_product(&app_state, &product_id).await?;
  let product = req_payload
    .into_inner()
    .into_product(product_id, Some(&existing), Utc::now())?;
  app_state.store.put_as(&paths::product(&product.id), &product).await?;
  app_state.stock.apply(&product.id, product.stock);
  if existing.stock != product.stock {
    info!("Stock of {} changed from {} to {}.", product.id, existing.stock, product.stock);
  }
  Ok(HttpResponse::Ok().json(json!({ "product": ProductView::new(&app_state, product) })))
}

/// Removes the product document. Carts and orders keep their snapshots.
#[instrument(
  name = "handler::delete_product",
  skip(app_state, path, user),
  fields(user_id = %user.user_id, product_id = %path.as_ref())
)]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  user: SessionUser,
) -> Result<HttpResponse, AppError> {
  user.session.require_page(INVENTORY_PAGE)?;
  let product_id = path.into_inner();
  let product = fetch_product(&app_state, &product_id).await?;
  app_state.store.delete(&paths::product(&product_id)).await?;
  app_state.stock.forget(&product_id);
  warn!("Product {} ({}) deleted.", product_id, product.name);
  Ok(HttpResponse::NoContent().finish())
}
