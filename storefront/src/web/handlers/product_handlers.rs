// storefront/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::{Category, Product, Rating, RatingEntry, RatingSummary};
use crate::pipelines::common_steps::{fetch_product, require_id};
use crate::services::catalog::{self, ProductQuery};
use crate::services::image_host::Transform;
use crate::services::pricing::{self, DisplayPrice};
use crate::state::AppState;
use crate::store::paths;

#[derive(Deserialize, Debug, Default)]
pub struct ListProductsQuery {
  pub search: Option<String>,
  pub category: Option<String>,
  pub sort: Option<String>,
  pub order: Option<String>,
  pub page: Option<usize>,
}

impl ListProductsQuery {
  pub fn to_query(&self) -> Result<ProductQuery, AppError> {
    let category = match self.category.as_deref().map(str::trim) {
      None | Some("") | Some("all") | Some("All") => None,
      Some(raw) => Some(raw.parse::<Category>()?),
    };
    Ok(ProductQuery {
      search: self.search.clone(),
      category,
      sort: self.sort.as_deref().map(str::parse).transpose()?.unwrap_or_default(),
      order: self.order.as_deref().map(str::parse).transpose()?.unwrap_or_default(),
      page: self.page.unwrap_or(1),
    })
  }
}

/// A product as shown in the shop: display price and a thumbnail URL.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
  #[serde(flatten)]
  pub product: Product,
  pub display_price: DisplayPrice,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub thumbnail_url: Option<String>,
  pub in_stock: bool,
}

impl ProductView {
  pub fn new(app_state: &AppState, product: Product) -> Self {
    let thumbnail_url = product
      .image_url
      .as_deref()
      .map(|url| app_state.images.transformed_url(url, Transform::THUMBNAIL));
    Self {
      display_price: pricing::display_price(&product),
      in_stock: product.stock > 0,
      thumbnail_url,
      product,
    }
  }
}

pub async fn all_products(app_state: &AppState) -> Result<Vec<Product>, AppError> {
  Ok(
    app_state
      .store
      .list_as::<Product>(paths::PRODUCTS)
      .await?
      .into_iter()
      .map(|(_, p)| p)
      .collect(),
  )
}

#[instrument(name = "handler::list_products", skip(app_state, query_params))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ListProductsQuery>,
) -> Result<HttpResponse, AppError> {
  let query = query_params.to_query()?;
  let products = all_products(&app_state).await?;
  let page = catalog::query_products(products, &query, app_state.config.page_size);
  info!(
    "Listing page {} of {} ({} matching products).",
    page.page, page.total_pages, page.total_items
  );
  let page = page.map(|p| ProductView::new(&app_state, p));
  Ok(HttpResponse::Ok().json(page))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let product = fetch_product(&app_state, &product_id).await?;
  Ok(HttpResponse::Ok().json(json!({
    "product": ProductView::new(&app_state, product)
  })))
}

#[instrument(name = "handler::product_ratings", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn product_ratings_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  require_id(&product_id, "product")?;
  let entries: Vec<RatingEntry> = app_state
    .store
    .list_as::<Rating>(&paths::ratings(&product_id))
    .await?
    .into_iter()
    .map(|(id, rating)| RatingEntry { id, rating })
    .collect();
  Ok(HttpResponse::Ok().json(RatingSummary::from_entries(&product_id, entries)))
}
