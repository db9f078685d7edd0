// wheelwork/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Framework-level failures raised by the engine itself.
///
/// Application flows use their own error type; it must be `From<FlowError>` so that
/// these can be folded into it.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("No flow registered for context type {context_type}")]
  NotRegistered { context_type: String },

  #[error("Type mismatch while dispatching context (expected {expected_type})")]
  TypeMismatch { expected_type: String },

  #[error("Handler failed in step '{step_name}'. Source: {source}")]
  HandlerError {
    step_name: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Internal engine error: {0}")]
  Internal(String),
}

impl FlowError {
  /// Wraps an arbitrary handler failure, tagging it with the step it came from.
  pub fn handler(step_name: impl Into<String>, source: impl Into<AnyhowError>) -> Self {
    FlowError::HandlerError {
      step_name: step_name.into(),
      source: source.into(),
    }
  }
}

impl From<AnyhowError> for FlowError {
  fn from(err: AnyhowError) -> Self {
    // Don't double-wrap engine errors that travelled through anyhow.
    match err.downcast::<FlowError>() {
      Ok(flow_err) => flow_err,
      Err(other) => FlowError::HandlerError {
        step_name: "<unknown>".to_string(),
        source: other,
      },
    }
  }
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
