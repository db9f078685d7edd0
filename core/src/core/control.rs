// wheelwork/src/core/control.rs

//! Signals a handler returns, and the overall outcome of a run.

/// Returned by every handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  /// Keep going with the remaining handlers and steps.
  Continue,
  /// Halt the flow now. Nothing after this handler runs.
  Stop,
}

/// Outcome of a finished run that did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
  Completed,
  /// A handler returned [`StepControl::Stop`].
  Stopped,
}

impl FlowOutcome {
  pub fn is_completed(self) -> bool {
    matches!(self, FlowOutcome::Completed)
  }
}
