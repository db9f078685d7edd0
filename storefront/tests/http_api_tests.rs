// tests/http_api_tests.rs
mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};

use common::*;
use storefront::models::CartItem;
use storefront::web::configure_app_routes;
use storefront::AppState;

macro_rules! app {
  ($state:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($state.clone()))
        .configure(configure_app_routes),
    )
    .await
  };
}

async fn seed_users(state: &AppState) {
  state
    .store
    .put("users/admin1", json!({"role": "admin", "email": "admin@bikeshop.test"}))
    .await
    .unwrap();
  state
    .store
    .put("users/staff1", json!({"role": "staff", "pageAccess": "inventory"}))
    .await
    .unwrap();
}

#[actix_rt::test]
async fn health_is_public() {
  let (state, _) = memory_state();
  let app = app!(state);
  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn catalog_pages_through_twenty_three_products() {
  let (state, _) = memory_state();
  for i in 0..23 {
    seed_product(&state, &product(&format!("p{:02}", i), 10.0, 1)).await;
  }
  let app = app!(state);

  let req = test::TestRequest::get().uri("/api/v1/products?page=3").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["totalPages"], 3);
  assert_eq!(body["totalItems"], 23);
  assert_eq!(body["items"].as_array().unwrap().len(), 3);
  assert_eq!(body["items"][0]["displayPrice"]["formatted"], "10.00");
  assert!(body["items"][0]["thumbnailUrl"]
    .as_str()
    .unwrap()
    .contains("/upload/w_300,h_300,c_fill,q_auto/"));

  let req = test::TestRequest::get().uri("/api/v1/products?page=9").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert!(body["items"].as_array().unwrap().is_empty());

  let req = test::TestRequest::get().uri("/api/v1/products?sort=price").to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn cart_requires_an_identity() {
  let (state, _) = memory_state();
  let app = app!(state);
  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/cart").to_request()).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn cart_over_http_reports_out_of_stock_as_conflict() {
  let (state, _) = memory_state();
  seed_product(&state, &product("p1", 25.0, 2)).await;
  let app = app!(state);

  let req = test::TestRequest::post()
    .uri("/api/v1/cart")
    .insert_header(("X-User-ID", "u1"))
    .set_json(json!({"productId": "p1", "quantity": 2}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let req = test::TestRequest::post()
    .uri("/api/v1/cart")
    .insert_header(("X-User-ID", "u1"))
    .set_json(json!({"productId": "p1"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["available"], 0);

  let req = test::TestRequest::get()
    .uri("/api/v1/cart")
    .insert_header(("X-User-ID", "u1"))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["itemCount"], 2);
  assert_eq!(body["total"], 50.0);
}

#[actix_rt::test]
async fn staff_menu_follows_page_access() {
  let (state, _) = memory_state();
  seed_users(&state).await;
  let app = app!(state);

  let req = test::TestRequest::get()
    .uri("/api/v1/session")
    .insert_header(("X-User-ID", "staff1"))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  let keys: Vec<&str> = body["menu"]
    .as_array()
    .unwrap()
    .iter()
    .map(|e| e["key"].as_str().unwrap())
    .collect();
  assert_eq!(keys, vec!["INVENTORY", "POS"]);
  assert_eq!(body["session"]["role"], "staff");
}

#[actix_rt::test]
async fn customers_are_kept_out_of_admin_pages() {
  let (state, _) = memory_state();
  seed_users(&state).await;
  let app = app!(state);

  for (method, uri) in [("GET", "/api/v1/admin/products"), ("GET", "/api/v1/admin/staff")] {
    let req = test::TestRequest::default()
      .method(method.parse().unwrap())
      .uri(uri)
      .insert_header(("X-User-ID", "shopper"))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{}", uri);
  }

  // Staff with inventory access still cannot manage staff.
  let req = test::TestRequest::get()
    .uri("/api/v1/admin/staff")
    .insert_header(("X-User-ID", "staff1"))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn inventory_create_validates_and_feeds_the_ledger() {
  let (state, _) = memory_state();
  seed_users(&state).await;
  let app = app!(state);

  let req = test::TestRequest::post()
    .uri("/api/v1/admin/products")
    .insert_header(("X-User-ID", "staff1"))
    .set_json(json!({"name": "Gravel King", "category": "bikes", "brand": "Trailhead", "stock": 4}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let req = test::TestRequest::post()
    .uri("/api/v1/admin/products")
    .insert_header(("X-User-ID", "staff1"))
    .set_json(json!({
      "name": "Gravel King",
      "category": "bikes",
      "brand": "Trailhead",
      "price": 1299.0,
      "discount": 10,
      "stock": 4
    }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  let id = body["product"]["id"].as_str().unwrap().to_string();
  assert_eq!(state.stock.cached(&id), Some(4));

  let req = test::TestRequest::delete()
    .uri(&format!("/api/v1/admin/products/{}", id))
    .insert_header(("X-User-ID", "staff1"))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
  assert_eq!(state.stock.cached(&id), None);
}

#[actix_rt::test]
async fn promoting_a_user_takes_effect_on_the_next_request() {
  let (state, _) = memory_state();
  seed_users(&state).await;
  let app = app!(state);

  let session_of = |user: &'static str| {
    test::TestRequest::get()
      .uri("/api/v1/session")
      .insert_header(("X-User-ID", user))
      .to_request()
  };
  let body: Value = test::call_and_read_body_json(&app, session_of("shopper")).await;
  assert_eq!(body["session"]["role"], "customer");

  let req = test::TestRequest::put()
    .uri("/api/v1/admin/staff/shopper")
    .insert_header(("X-User-ID", "admin1"))
    .set_json(json!({"role": "staff", "pageAccess": ["orders"]}))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

  let body: Value = test::call_and_read_body_json(&app, session_of("shopper")).await;
  assert_eq!(body["session"]["role"], "staff");
  let keys: Vec<&str> = body["menu"]
    .as_array()
    .unwrap()
    .iter()
    .map(|e| e["key"].as_str().unwrap())
    .collect();
  assert_eq!(keys, vec!["POS", "ORDERS"]);
}

#[actix_rt::test]
async fn admin_can_complete_and_cancel_orders() {
  let (state, _) = memory_state();
  seed_users(&state).await;
  seed_product(&state, &product("p1", 25.0, 5)).await;
  let app = app!(state);

  for _ in 0..2 {
    let req = test::TestRequest::post()
      .uri("/api/v1/cart")
      .insert_header(("X-User-ID", "u1"))
      .set_json(json!({"productId": "p1", "quantity": 2}))
      .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    let req = test::TestRequest::post()
      .uri("/api/v1/orders")
      .insert_header(("X-User-ID", "u1"))
      .set_json(json!({"paymentMethod": "e_wallet"}))
      .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
  }
  assert_eq!(stock_in_store(&state, "p1").await, 1);

  let req = test::TestRequest::get()
    .uri("/api/v1/orders")
    .insert_header(("X-User-ID", "u1"))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  let ids: Vec<String> = body["orders"]
    .as_array()
    .unwrap()
    .iter()
    .map(|o| o["id"].as_str().unwrap().to_string())
    .collect();
  assert_eq!(ids.len(), 2);

  let status_req = |order_id: &str, status: &str| {
    test::TestRequest::put()
      .uri(&format!("/api/v1/admin/orders/u1/{}/status", order_id))
      .insert_header(("X-User-ID", "admin1"))
      .set_json(json!({ "status": status }))
      .to_request()
  };
  let resp = test::call_service(&app, status_req(&ids[0], "completed")).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let resp = test::call_service(&app, status_req(&ids[0], "pending")).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let resp = test::call_service(&app, status_req(&ids[1], "cancelled")).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(stock_in_store(&state, "p1").await, 3);

  let req = test::TestRequest::post()
    .uri(&format!("/api/v1/orders/{}/ratings", ids[0]))
    .insert_header(("X-User-ID", "u1"))
    .set_json(json!({"ratings": [{"productId": "p1", "score": 5, "comment": "Great"}]}))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

  let req = test::TestRequest::get().uri("/api/v1/products/p1/ratings").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["count"], 1);
  assert_eq!(body["average"], 5.0);
}

#[actix_rt::test]
async fn catalog_skips_documents_that_are_not_products() {
  let (state, _) = memory_state();
  seed_product(&state, &product("p1", 10.0, 2)).await;
  state.store.put("products/ghost", json!({"stock": 3})).await.unwrap();
  let app = app!(state);

  let req = test::TestRequest::get().uri("/api/v1/products").to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["totalItems"], 1);
  assert_eq!(body["items"][0]["id"], "p1");
}

#[actix_rt::test]
async fn removing_a_cart_line_for_a_deleted_product_leaves_no_trace_in_the_catalog() {
  let (state, _) = memory_state();
  seed_users(&state).await;
  seed_product(&state, &product("p1", 25.0, 3)).await;
  let app = app!(state);

  let req = test::TestRequest::post()
    .uri("/api/v1/cart")
    .insert_header(("X-User-ID", "u1"))
    .set_json(json!({"productId": "p1", "quantity": 2}))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

  let req = test::TestRequest::delete()
    .uri("/api/v1/admin/products/p1")
    .insert_header(("X-User-ID", "staff1"))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

  let req = test::TestRequest::delete()
    .uri("/api/v1/cart/p1?quantity=2")
    .insert_header(("X-User-ID", "u1"))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["stock"], Value::Null);

  assert_eq!(state.store.get("products/p1").await.unwrap(), None);
  let req = test::TestRequest::get().uri("/api/v1/products").to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["totalItems"], 0);
}

#[actix_rt::test]
async fn anonymous_callers_do_not_accumulate_sessions() {
  let (state, _) = memory_state();
  seed_users(&state).await;
  let app = app!(state);

  for i in 0..200 {
    let req = test::TestRequest::get()
      .uri("/api/v1/session")
      .insert_header(("X-User-ID", format!("visitor-{}", i)))
      .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
  }
  assert_eq!(state.sessions.active(), 0);

  let req = test::TestRequest::get()
    .uri("/api/v1/session")
    .insert_header(("X-User-ID", "staff1"))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
  assert_eq!(state.sessions.active(), 1);
}

#[actix_rt::test]
async fn cart_item_count_does_not_overflow() {
  let (state, _) = memory_state();
  let now = chrono::Utc::now();
  for id in ["p1", "p2"] {
    let line = CartItem::snapshot(&product(id, 1.0, 0), u32::MAX, now);
    state.store.put_as(&format!("carts/u1/{}", id), &line).await.unwrap();
  }
  let app = app!(state);

  let req = test::TestRequest::get()
    .uri("/api/v1/cart")
    .insert_header(("X-User-ID", "u1"))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["itemCount"], 2 * u64::from(u32::MAX));
}
