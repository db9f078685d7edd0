// wheelwork/src/core/step.rs

use super::context::FlowContext;
use super::control::StepControl;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Predicate evaluated before a step runs; `true` skips the step.
pub type SkipCondition<TData> = Arc<dyn Fn(FlowContext<TData>) -> bool + Send + Sync + 'static>;

/// Boxed async step handler.
///
/// Handlers receive their own handle to the flow context and must release any
/// lock guard before awaiting.
pub type Handler<TData, Err> = Box<
  dyn Fn(FlowContext<TData>) -> Pin<Box<dyn Future<Output = Result<StepControl, Err>> + Send>> + Send + Sync,
>;

/// One named step of a flow.
#[derive(Clone)]
pub struct StepDef<TData: Send + Sync + 'static> {
  pub name: String,
  /// An optional step with no handlers is skipped instead of failing the run.
  pub optional: bool,
  pub skip_if: Option<SkipCondition<TData>>,
}

impl<TData: Send + Sync + 'static> StepDef<TData> {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      optional: false,
      skip_if: None,
    }
  }

  pub fn optional(mut self) -> Self {
    self.optional = true;
    self
  }

  pub fn skip_if(mut self, cond: impl Fn(FlowContext<TData>) -> bool + Send + Sync + 'static) -> Self {
    self.skip_if = Some(Arc::new(cond));
    self
  }
}

impl<TData: Send + Sync + 'static> std::fmt::Debug for StepDef<TData> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("optional", &self.optional)
      .field("has_skip_condition", &self.skip_if.is_some())
      .finish()
  }
}
