// tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use tracing::Level;
use wheelwork::{FlowContext, FlowError, Handler, StepControl};

#[derive(Clone, Debug, Default)]
pub struct OrderCtx {
  pub units: i32,
  pub trail: Vec<String>,
  pub stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("engine: {0}")]
  Engine(String),

  #[error("handler: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(e: FlowError) -> Self {
    TestError::Engine(format!("{:?}", e))
  }
}

/// Records `label` in the trail, bumps the unit counter, and stops if asked to.
pub fn recording_handler(label: &'static str) -> Handler<OrderCtx, TestError> {
  Box::new(move |ctx: FlowContext<OrderCtx>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.units += 1;
      guard.trail.push(label.to_string());
      if guard.stop_at.as_deref() == Some(label) {
        return Ok(StepControl::Stop);
      }
      Ok(StepControl::Continue)
    })
  })
}

pub fn failing_handler(label: &'static str, message: &'static str) -> Handler<OrderCtx, TestError> {
  Box::new(move |ctx: FlowContext<OrderCtx>| {
    Box::pin(async move {
      ctx.write().trail.push(label.to_string());
      Err(TestError::Handler(message.to_string()))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
