// wheelwork/src/flow/execution.rs

//! `Flow::run`: walks the steps in order and drives each hook phase.

use super::definition::{Flow, Phase};
use crate::core::context::FlowContext;
use crate::core::control::{FlowOutcome, StepControl};
use crate::error::FlowError;
use tracing::{event, instrument, Instrument, Level};

impl<TData, Err> Flow<TData, Err>
where
  TData: Send + Sync + 'static,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step against `ctx`.
  ///
  /// Handlers of one phase run sequentially in registration order. The first
  /// error aborts the run and is returned as-is; a `Stop` ends it with
  /// [`FlowOutcome::Stopped`].
  #[instrument(
    name = "Flow::run",
    skip_all,
    fields(flow = %self.name, num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx: FlowContext<TData>) -> Result<FlowOutcome, Err> {
    event!(Level::DEBUG, "Flow starting.");

    for (step_idx, step) in self.steps.iter().enumerate() {
      let step_span = tracing::info_span!("flow_step", step = %step.name, step_index = step_idx);

      if let Some(skip) = &step.skip_if {
        if skip(ctx.clone()) {
          event!(parent: &step_span, Level::DEBUG, "Step skipped by condition.");
          continue;
        }
      }

      if self.handler_count(&step.name) == 0 {
        if step.optional {
          event!(parent: &step_span, Level::DEBUG, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(parent: &step_span, Level::ERROR, "Required step has no handlers.");
        return Err(Err::from(FlowError::HandlerMissing {
          step_name: step.name.clone(),
        }));
      }

      for phase in Phase::ALL {
        let control = self
          .run_phase(&step.name, phase, &ctx)
          .instrument(step_span.clone())
          .await?;
        if control == StepControl::Stop {
          event!(parent: &step_span, Level::INFO, phase = phase.as_str(), "Flow stopped by handler.");
          return Ok(FlowOutcome::Stopped);
        }
      }
    }

    event!(Level::DEBUG, "Flow completed.");
    Ok(FlowOutcome::Completed)
  }

  async fn run_phase(&self, step_name: &str, phase: Phase, ctx: &FlowContext<TData>) -> Result<StepControl, Err> {
    let Some(handlers) = self.handlers.get(&(step_name.to_string(), phase)) else {
      return Ok(StepControl::Continue);
    };
    for (handler_idx, handler) in handlers.iter().enumerate() {
      match handler(ctx.clone()).await {
        Ok(StepControl::Continue) => {}
        Ok(StepControl::Stop) => return Ok(StepControl::Stop),
        Err(e) => {
          event!(Level::WARN, phase = phase.as_str(), handler_index = handler_idx, error = %e, "Handler failed.");
          return Err(e);
        }
      }
    }
    Ok(StepControl::Continue)
  }
}
