// tests/registry_tests.rs
mod common;

use common::*;
use wheelwork::{Flow, FlowContext, FlowError, FlowOutcome, FlowRegistry, StepControl};

#[derive(Debug, Default)]
struct CartCtx {
  lines: u32,
}

#[derive(Debug, Default)]
struct RatingCtx {
  persisted: Vec<u8>,
}

#[tokio::test]
async fn registry_dispatches_by_context_type() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();

  let mut cart = Flow::<CartCtx, TestError>::with_steps("cart.add", &["add_line"]);
  cart.on("add_line", |ctx: FlowContext<CartCtx>| async move {
    ctx.write().lines += 1;
    Ok(StepControl::Continue)
  });
  registry.register(cart);

  let mut rating = Flow::<RatingCtx, TestError>::with_steps("rating.submit", &["persist"]);
  rating.on("persist", |ctx: FlowContext<RatingCtx>| async move {
    ctx.write().persisted.extend([5, 4]);
    Ok(StepControl::Continue)
  });
  registry.register(rating);

  let cart_ctx = FlowContext::new(CartCtx::default());
  assert_eq!(registry.run(cart_ctx.clone()).await.unwrap(), FlowOutcome::Completed);
  assert_eq!(cart_ctx.read().lines, 1);

  let rating_ctx = FlowContext::new(RatingCtx::default());
  registry.run(rating_ctx.clone()).await.unwrap();
  assert_eq!(rating_ctx.read().persisted, vec![5, 4]);

  assert_eq!(registry.flow_names(), vec!["cart.add".to_string(), "rating.submit".to_string()]);
  assert!(registry.is_registered::<CartCtx>());
}

#[tokio::test]
async fn running_an_unregistered_context_is_an_engine_error() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();
  let err = registry.run(FlowContext::new(CartCtx::default())).await.unwrap_err();
  match err {
    TestError::Engine(msg) => assert!(msg.contains("NotRegistered")),
    other => panic!("expected engine error, got {:?}", other),
  }
}

#[tokio::test]
async fn registry_with_engine_error_type() {
  setup_tracing();
  let registry = FlowRegistry::<FlowError>::new();
  let mut flow = Flow::<CartCtx, FlowError>::with_steps("cart.fail", &["add_line"]);
  flow.on("add_line", |_ctx: FlowContext<CartCtx>| async move {
    Err(FlowError::handler("add_line", anyhow::anyhow!("cart write rejected")))
  });
  registry.register(flow);

  let err = registry.run(FlowContext::new(CartCtx::default())).await.unwrap_err();
  match err {
    FlowError::HandlerError { step_name, source } => {
      assert_eq!(step_name, "add_line");
      assert_eq!(source.to_string(), "cart write rejected");
    }
    other => panic!("unexpected error {:?}", other),
  }
}

#[tokio::test]
async fn re_registering_replaces_the_flow() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();
  let mut first = Flow::<CartCtx, TestError>::with_steps("cart.v1", &["add_line"]);
  first.on("add_line", |ctx: FlowContext<CartCtx>| async move {
    ctx.write().lines = 1;
    Ok(StepControl::Continue)
  });
  registry.register(first);

  let mut second = Flow::<CartCtx, TestError>::with_steps("cart.v2", &["add_line"]);
  second.on("add_line", |ctx: FlowContext<CartCtx>| async move {
    ctx.write().lines = 2;
    Ok(StepControl::Continue)
  });
  registry.register(second);

  let ctx = FlowContext::new(CartCtx::default());
  registry.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().lines, 2);
  assert_eq!(registry.flow_names(), vec!["cart.v2".to_string()]);
}
