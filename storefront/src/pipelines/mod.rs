// storefront/src/pipelines/mod.rs

//! Every storefront workflow is a `wheelwork` flow registered here, one per
//! context type.

use crate::errors::AppError;
use wheelwork::FlowRegistry;

pub mod common_steps;
pub mod contexts;

pub mod cart_pipeline;
pub mod checkout_pipeline;
pub mod order_pipeline;
pub mod rating_pipeline;
pub mod wishlist_pipeline;

/// Registers all flows. Called once while building the application state.
pub fn register_all_flows(registry: &FlowRegistry<AppError>) {
  tracing::info!("Registering storefront flows...");

  cart_pipeline::register_add_to_cart_flow(registry);
  cart_pipeline::register_remove_from_cart_flow(registry);
  wishlist_pipeline::register_wishlist_toggle_flow(registry);
  checkout_pipeline::register_checkout_flow(registry);
  order_pipeline::register_cancel_order_flow(registry);
  rating_pipeline::register_rating_flow(registry);

  tracing::info!(flows = ?registry.flow_names(), "All storefront flows registered.");
}
