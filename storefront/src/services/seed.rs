// storefront/src/services/seed.rs

//! Demo catalog and accounts written when `SEED_DB=true` and the store has no
//! products yet.

use chrono::Utc;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::errors::Result;
use crate::models::{Category, PageAccess, Product, Role, UserProfile};
use crate::store::{paths, Repository};

pub const DEMO_ADMIN_ID: &str = "demo-admin";
pub const DEMO_STAFF_ID: &str = "demo-staff";

struct DemoProduct {
  id: &'static str,
  name: &'static str,
  category: Category,
  brand: &'static str,
  price: f64,
  discount: Option<u8>,
  label: Option<&'static str>,
  stock: u32,
  specs: &'static [(&'static str, &'static str)],
}

const CATALOG: &[DemoProduct] = &[
  DemoProduct {
    id: "trail-blazer-29",
    name: "Trail Blazer 29",
    category: Category::Bikes,
    brand: "Ridgeback",
    price: 1000.0,
    discount: Some(20),
    label: Some("Summer Sale"),
    stock: 5,
    specs: &[("frame", "aluminium"), ("wheel", "29\"")],
  },
  DemoProduct {
    id: "city-glide-7",
    name: "City Glide 7",
    category: Category::Bikes,
    brand: "Urbana",
    price: 640.0,
    discount: None,
    label: None,
    stock: 8,
    specs: &[("gears", "7-speed hub")],
  },
  DemoProduct {
    id: "aero-helmet",
    name: "Aero Helmet",
    category: Category::Gears,
    brand: "Kask",
    price: 120.0,
    discount: Some(10),
    label: Some("Members"),
    stock: 20,
    specs: &[("size", "M")],
  },
  DemoProduct {
    id: "chain-11s",
    name: "11-Speed Chain",
    category: Category::Parts,
    brand: "Shimano",
    price: 35.5,
    discount: None,
    label: None,
    stock: 40,
    specs: &[("links", "116")],
  },
  DemoProduct {
    id: "bottle-cage",
    name: "Carbon Bottle Cage",
    category: Category::Accessories,
    brand: "Elite",
    price: 24.0,
    discount: None,
    label: None,
    stock: 0,
    specs: &[],
  },
];

/// Returns the number of products written; 0 when the catalog already exists.
#[instrument(name = "seed::demo_data", skip(store))]
pub async fn seed_demo_data(store: &Arc<dyn Repository>) -> Result<usize> {
  if !store.list(paths::PRODUCTS).await?.is_empty() {
    info!("Products already present; skipping demo seed.");
    return Ok(0);
  }

  let now = Utc::now();
  for demo in CATALOG {
    let product = Product {
      id: demo.id.to_string(),
      name: demo.name.to_string(),
      category: demo.category,
      brand: demo.brand.to_string(),
      price: demo.price,
      discount: demo.discount,
      discount_label: demo.label.map(str::to_string),
      stock: demo.stock,
      specs: demo
        .specs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<BTreeMap<_, _>>(),
      image_url: None,
      created_at: now,
      updated_at: now,
    };
    store.put_as(&paths::product(demo.id), &product).await?;
  }

  let admin = UserProfile {
    email: Some("admin@bikeshop.test".to_string()),
    display_name: Some("Shop Admin".to_string()),
    role: Role::Admin,
    page_access: PageAccess::default(),
  };
  store.put_as(&paths::user(DEMO_ADMIN_ID), &admin).await?;
  store
    .put(
      &paths::user(DEMO_STAFF_ID),
      json!({"email": "staff@bikeshop.test", "role": "staff", "pageAccess": "inventory"}),
    )
    .await?;

  info!(products = CATALOG.len(), "Demo data seeded.");
  Ok(CATALOG.len())
}
