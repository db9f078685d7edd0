// storefront/src/models/mod.rs

//! Documents stored under the key paths in [`crate::store::paths`].

pub mod cart_item;
pub mod order;
pub mod product;
pub mod rating;
pub mod user;
pub mod wishlist;

pub use cart_item::CartItem;
pub use order::{Order, OrderItem, OrderStatus, PaymentMethod};
pub use product::{Category, Product, ProductDraft};
pub use rating::{Rating, RatingEntry, RatingSummary};
pub use user::{PageAccess, Role, UserProfile};
pub use wishlist::WishlistEntry;
