// storefront/src/lib.rs

//! Storefront and admin console for a bicycle shop, served as a JSON API over
//! a key-path document store and an external image host.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod web;

pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use state::AppState;
