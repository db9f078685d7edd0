// wheelwork/src/flow/hooks.rs

//! Registration of `before`, `on` and `after` handlers.

use super::definition::{Flow, Phase};
use crate::core::context::FlowContext;
use crate::core::control::StepControl;
use crate::core::step::Handler;
use crate::error::FlowError;
use std::future::Future;
use tracing::{event, Level};

impl<TData, Err> Flow<TData, Err>
where
  TData: Send + Sync + 'static,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn before<F>(&mut self, step_name: &str, handler_fn: impl Fn(FlowContext<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, Err>> + Send + 'static,
  {
    self.push_handler(step_name, Phase::Before, handler_fn);
  }

  pub fn on<F>(&mut self, step_name: &str, handler_fn: impl Fn(FlowContext<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, Err>> + Send + 'static,
  {
    self.push_handler(step_name, Phase::On, handler_fn);
  }

  pub fn after<F>(&mut self, step_name: &str, handler_fn: impl Fn(FlowContext<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, Err>> + Send + 'static,
  {
    self.push_handler(step_name, Phase::After, handler_fn);
  }

  /// Registers an already boxed handler, e.g. one shared between flows.
  pub fn on_boxed(&mut self, step_name: &str, handler: Handler<TData, Err>) {
    self.expect_step(step_name);
    self
      .handlers
      .entry((step_name.to_string(), Phase::On))
      .or_default()
      .push(handler);
  }

  fn push_handler<F>(
    &mut self,
    step_name: &str,
    phase: Phase,
    handler_fn: impl Fn(FlowContext<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<StepControl, Err>> + Send + 'static,
  {
    self.expect_step(step_name);
    let boxed: Handler<TData, Err> = Box::new(move |ctx| Box::pin(handler_fn(ctx)));
    self
      .handlers
      .entry((step_name.to_string(), phase))
      .or_default()
      .push(boxed);
    event!(Level::TRACE, flow = %self.name, step = step_name, phase = phase.as_str(), "Handler registered.");
  }
}
