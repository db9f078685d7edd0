// storefront/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{
  cart_handlers, image_handlers, inventory_handlers, order_handlers, product_handlers, rating_handlers,
  session_handlers, staff_handlers, wishlist_handlers,
};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::resource("/session")
          .route(web::get().to(session_handlers::get_session_handler))
          .route(web::delete().to(session_handlers::sign_out_handler)),
      )
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler))
          .route(
            "/{product_id}/ratings",
            web::get().to(product_handlers::product_ratings_handler),
          ),
      )
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::get_cart_handler))
          .route("", web::post().to(cart_handlers::add_to_cart_handler))
          .route("/{product_id}", web::delete().to(cart_handlers::remove_from_cart_handler)),
      )
      .service(
        web::scope("/wishlist")
          .route("", web::get().to(wishlist_handlers::get_wishlist_handler))
          .route("/{product_id}", web::post().to(wishlist_handlers::toggle_wishlist_handler)),
      )
      .service(
        web::scope("/orders")
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("", web::post().to(order_handlers::checkout_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route("/{order_id}/cancel", web::post().to(order_handlers::cancel_order_handler))
          .route("/{order_id}/ratings", web::post().to(rating_handlers::submit_ratings_handler)),
      )
      .service(
        web::scope("/admin")
          .route("/products", web::get().to(inventory_handlers::inventory_list_handler))
          .route("/products", web::post().to(inventory_handlers::create_product_handler))
          .route("/products/{product_id}", web::put().to(inventory_handlers::update_product_handler))
          .route(
            "/products/{product_id}",
            web::delete().to(inventory_handlers::delete_product_handler),
          )
          .route("/images", web::post().to(image_handlers::upload_image_handler))
          .route(
            "/orders/{user_id}/{order_id}/status",
            web::put().to(order_handlers::update_order_status_handler),
          )
          .route("/staff", web::get().to(staff_handlers::list_staff_handler))
          .route("/staff/{user_id}", web::put().to(staff_handlers::update_staff_handler)),
      ),
  );
}
