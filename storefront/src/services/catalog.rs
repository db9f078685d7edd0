// storefront/src/services/catalog.rs

//! Search, filter, sort and pagination over the full product list.

use serde::Serialize;
use std::cmp::Ordering;
use std::str::FromStr;

use crate::errors::AppError;
use crate::models::{Category, Product};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
  #[default]
  Name,
  Stock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
  #[default]
  Asc,
  Desc,
}

impl FromStr for SortField {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "name" => Ok(SortField::Name),
      "stock" => Ok(SortField::Stock),
      other => Err(AppError::Validation(format!("Cannot sort by '{}'", other))),
    }
  }
}

impl FromStr for SortOrder {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "asc" => Ok(SortOrder::Asc),
      "desc" => Ok(SortOrder::Desc),
      other => Err(AppError::Validation(format!("Unknown sort order '{}'", other))),
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
  pub search: Option<String>,
  pub category: Option<Category>,
  pub sort: SortField,
  pub order: SortOrder,
  /// 1-based.
  pub page: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
  pub items: Vec<T>,
  pub page: usize,
  pub page_size: usize,
  pub total_items: usize,
  pub total_pages: usize,
}

impl<T> Page<T> {
  pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
    Page {
      items: self.items.into_iter().map(f).collect(),
      page: self.page,
      page_size: self.page_size,
      total_items: self.total_items,
      total_pages: self.total_pages,
    }
  }
}

/// Case-insensitive comparison with a case-sensitive tiebreak, so the order is
/// total and `A` < `a` < `B`.
pub fn compare_names(a: &str, b: &str) -> Ordering {
  a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

fn matches_search(product: &Product, needle: &str) -> bool {
  product.name.to_lowercase().contains(needle)
    || product.brand.to_lowercase().contains(needle)
    || product.category.as_str().to_lowercase().contains(needle)
}

/// Applies search and category filters, then a stable sort.
pub fn filter_and_sort(mut products: Vec<Product>, query: &ProductQuery) -> Vec<Product> {
  if let Some(needle) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
    let needle = needle.to_lowercase();
    products.retain(|p| matches_search(p, &needle));
  }
  if let Some(category) = query.category {
    products.retain(|p| p.category == category);
  }

  let cmp = |a: &Product, b: &Product| match query.sort {
    SortField::Name => compare_names(&a.name, &b.name),
    SortField::Stock => a.stock.cmp(&b.stock),
  };
  match query.order {
    SortOrder::Asc => products.sort_by(cmp),
    SortOrder::Desc => products.sort_by(|a, b| cmp(b, a)),
  }
  products
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
  if page_size == 0 {
    return 0;
  }
  total_items.div_ceil(page_size)
}

/// Cuts out page `page` (1-based; 0 is read as 1). Pages past the end are empty.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
  let page = page.max(1);
  let total_items = items.len();
  let start = (page - 1).saturating_mul(page_size);
  let items = items.into_iter().skip(start).take(page_size).collect();
  Page {
    items,
    page,
    page_size,
    total_items,
    total_pages: total_pages(total_items, page_size),
  }
}

pub fn query_products(products: Vec<Product>, query: &ProductQuery, page_size: usize) -> Page<Product> {
  paginate(filter_and_sort(products, query), query.page, page_size)
}
