// storefront/src/web/handlers/mod.rs

pub mod cart_handlers;
pub mod image_handlers;
pub mod inventory_handlers;
pub mod order_handlers;
pub mod product_handlers;
pub mod rating_handlers;
pub mod session_handlers;
pub mod staff_handlers;
pub mod wishlist_handlers;
