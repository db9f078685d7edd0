pub mod context;
pub mod control;
pub mod step;

pub use context::FlowContext;
pub use control::{FlowOutcome, StepControl};
pub use step::{Handler, SkipCondition, StepDef};
