// storefront/src/services/mod.rs

pub mod catalog;
pub mod image_host;
pub mod permissions;
pub mod pricing;
pub mod rating_review;
pub mod seed;
pub mod session;
pub mod stock;

pub use image_host::ImageHost;
pub use session::{SessionContext, SessionRegistry};
pub use stock::StockLedger;
