// storefront/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
  Bikes,
  Gears,
  Parts,
  Accessories,
}

impl Category {
  pub const ALL: [Category; 4] = [Category::Bikes, Category::Gears, Category::Parts, Category::Accessories];

  pub fn as_str(&self) -> &'static str {
    match self {
      Category::Bikes => "Bikes",
      Category::Gears => "Gears",
      Category::Parts => "Parts",
      Category::Accessories => "Accessories",
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Category {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let wanted = s.trim();
    Category::ALL
      .into_iter()
      .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
      .ok_or_else(|| AppError::Validation(format!("Unknown category '{}'", wanted)))
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: String,
  pub name: String,
  pub category: Category,
  pub brand: String,
  pub price: f64,
  /// Percentage off `price`; `None` and `Some(0)` both mean no discount.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub discount: Option<u8>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub discount_label: Option<String>,
  pub stock: u32,
  #[serde(default)]
  pub specs: BTreeMap<String, String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image_url: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Product fields as submitted from the inventory form, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub brand: String,
  pub price: Option<f64>,
  #[serde(default)]
  pub discount: Option<i64>,
  #[serde(default)]
  pub discount_label: Option<String>,
  pub stock: Option<i64>,
  #[serde(default)]
  pub specs: BTreeMap<String, String>,
  #[serde(default)]
  pub image_url: Option<String>,
}

impl ProductDraft {
  /// Validates the draft and builds the stored product. `existing` keeps the
  /// id and creation time of the product being edited.
  pub fn into_product(self, id: String, existing: Option<&Product>, now: DateTime<Utc>) -> Result<Product, AppError> {
    let name = required(&self.name, "Name")?;
    let brand = required(&self.brand, "Brand")?;
    if self.category.trim().is_empty() {
      return Err(AppError::Validation("Category is required.".to_string()));
    }
    let category: Category = self.category.parse()?;

    let price = self
      .price
      .ok_or_else(|| AppError::Validation("Price is required.".to_string()))?;
    if !price.is_finite() || price <= 0.0 {
      return Err(AppError::Validation("Price must be greater than zero.".to_string()));
    }

    let discount = match self.discount {
      None | Some(0) => None,
      Some(d) if (1..=100).contains(&d) => Some(d as u8),
      Some(d) => {
        return Err(AppError::Validation(format!(
          "Discount must be between 0 and 100, got {}.",
          d
        )))
      }
    };

    let stock = self
      .stock
      .ok_or_else(|| AppError::Validation("Stock is required.".to_string()))?;
    let stock = u32::try_from(stock)
      .map_err(|_| AppError::Validation(format!("Stock must be a non-negative whole number, got {}.", stock)))?;

    let discount_label = self
      .discount_label
      .map(|l| l.trim().to_string())
      .filter(|l| !l.is_empty());
    let image_url = self.image_url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
    let specs = self
      .specs
      .into_iter()
      .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
      .filter(|(k, _)| !k.is_empty())
      .collect();

    Ok(Product {
      id,
      name,
      category,
      brand,
      price,
      discount,
      discount_label,
      stock,
      specs,
      image_url,
      created_at: existing.map(|p| p.created_at).unwrap_or(now),
      updated_at: now,
    })
  }
}

fn required(value: &str, field: &str) -> Result<String, AppError> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    Err(AppError::Validation(format!("{} is required.", field)))
  } else {
    Ok(trimmed.to_string())
  }
}
