// wheelwork/src/lib.rs

//! Wheelwork: a small async step workflow engine.
//!
//! A [`Flow`] is an ordered list of named steps. Each step can carry `before`,
//! `on` and `after` handlers; handlers share one [`FlowContext`], may stop the
//! flow early, and fail with the flow's own error type. Steps can be optional
//! or skipped by a predicate. A [`FlowRegistry`] keeps one flow per context
//! type so call sites only build a context and run it.
//!
//! ```ignore
//! let mut flow = Flow::<Checkout, AppError>::with_steps("checkout", &["load_cart", "write_order"]);
//! flow.on("load_cart", |ctx| async move { /* ... */ Ok(StepControl::Continue) });
//! registry.register(flow);
//! let outcome = registry.run(FlowContext::new(Checkout::default())).await?;
//! ```

pub mod core;
pub mod error;
pub mod flow;
pub mod registry;

pub use crate::core::context::FlowContext;
pub use crate::core::control::{FlowOutcome, StepControl};
pub use crate::core::step::{Handler, SkipCondition, StepDef};
pub use crate::error::{FlowError, FlowResult};
pub use crate::flow::{Flow, Phase};
pub use crate::registry::FlowRegistry;
