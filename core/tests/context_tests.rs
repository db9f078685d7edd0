// tests/context_tests.rs
mod common;

use common::*;
use wheelwork::{Flow, FlowContext, StepControl};

#[test]
fn clones_share_the_same_data() {
  let ctx = FlowContext::new(OrderCtx::default());
  let other = ctx.clone();
  other.update(|c| c.units = 7);
  assert_eq!(ctx.with(|c| c.units), 7);
  assert_eq!(*ctx.map_read(|c| &c.units), 7);
}

#[tokio::test]
async fn handlers_see_writes_from_earlier_steps() {
  setup_tracing();
  let mut flow = Flow::<OrderCtx, TestError>::with_steps("handoff", &["produce", "consume"]);
  flow.on("produce", |ctx: FlowContext<OrderCtx>| async move {
    ctx.update(|c| c.units = 3);
    Ok(StepControl::Continue)
  });
  flow.on("consume", |ctx: FlowContext<OrderCtx>| async move {
    let units = ctx.with(|c| c.units);
    // guard already released here
    tokio::task::yield_now().await;
    ctx.update(|c| c.trail.push(format!("saw {}", units)));
    Ok(StepControl::Continue)
  });

  let ctx = FlowContext::new(OrderCtx::default());
  flow.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().trail, vec!["saw 3"]);
}
