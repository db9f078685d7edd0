// tests/flow_execution_tests.rs
mod common;

use common::*;
use serial_test::serial;
use wheelwork::{Flow, FlowContext, FlowOutcome, StepControl, StepDef};

#[tokio::test]
#[serial]
async fn steps_run_in_declared_order() {
  setup_tracing();
  let mut flow = Flow::<OrderCtx, TestError>::with_steps("ordered", &["reserve", "record", "notify"]);
  flow.on_boxed("notify", recording_handler("notify"));
  flow.on_boxed("reserve", recording_handler("reserve"));
  flow.on_boxed("record", recording_handler("record"));

  let ctx = FlowContext::new(OrderCtx::default());
  let outcome = flow.run(ctx.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Completed);
  let guard = ctx.read();
  assert_eq!(guard.units, 3);
  assert_eq!(guard.trail, vec!["reserve", "record", "notify"]);
}

#[tokio::test]
#[serial]
async fn before_on_after_phases_run_in_that_order() {
  setup_tracing();
  let mut flow = Flow::<OrderCtx, TestError>::with_steps("phases", &["write"]);
  flow.after("write", |ctx: FlowContext<OrderCtx>| async move {
    ctx.write().trail.push("after".into());
    Ok(StepControl::Continue)
  });
  flow.on("write", |ctx: FlowContext<OrderCtx>| async move {
    ctx.write().trail.push("on".into());
    Ok(StepControl::Continue)
  });
  flow.before("write", |ctx: FlowContext<OrderCtx>| async move {
    ctx.write().trail.push("before".into());
    Ok(StepControl::Continue)
  });

  let ctx = FlowContext::new(OrderCtx::default());
  flow.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().trail, vec!["before", "on", "after"]);
}

#[tokio::test]
#[serial]
async fn stop_halts_remaining_steps() {
  setup_tracing();
  let mut flow = Flow::<OrderCtx, TestError>::with_steps("stopping", &["a", "b", "c"]);
  flow.on_boxed("a", recording_handler("a"));
  flow.on_boxed("b", recording_handler("b"));
  flow.on_boxed("c", recording_handler("c"));

  let ctx = FlowContext::new(OrderCtx {
    stop_at: Some("b".into()),
    ..Default::default()
  });
  let outcome = flow.run(ctx.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Stopped);
  assert!(!outcome.is_completed());
  assert_eq!(ctx.read().trail, vec!["a", "b"]);
}

#[tokio::test]
#[serial]
async fn stop_in_before_phase_skips_on_handlers() {
  setup_tracing();
  let mut flow = Flow::<OrderCtx, TestError>::with_steps("guarded", &["charge"]);
  flow.before("charge", |_ctx: FlowContext<OrderCtx>| async move { Ok(StepControl::Stop) });
  flow.on_boxed("charge", recording_handler("charge"));

  let ctx = FlowContext::new(OrderCtx::default());
  assert_eq!(flow.run(ctx.clone()).await.unwrap(), FlowOutcome::Stopped);
  assert!(ctx.read().trail.is_empty());
}

#[tokio::test]
#[serial]
async fn handler_error_aborts_the_run() {
  setup_tracing();
  let mut flow = Flow::<OrderCtx, TestError>::with_steps("failing", &["ok", "broken", "never"]);
  flow.on_boxed("ok", recording_handler("ok"));
  flow.on_boxed("broken", failing_handler("broken", "store unavailable"));
  flow.on_boxed("never", recording_handler("never"));

  let ctx = FlowContext::new(OrderCtx::default());
  let err = flow.run(ctx.clone()).await.unwrap_err();

  assert_eq!(err, TestError::Handler("store unavailable".into()));
  assert_eq!(ctx.read().trail, vec!["ok", "broken"]);
  assert_eq!(ctx.read().units, 1);
}

#[tokio::test]
#[serial]
async fn skip_condition_is_evaluated_against_current_state() {
  setup_tracing();
  let mut flow = Flow::<OrderCtx, TestError>::new(
    "skipping",
    [
      StepDef::new("first"),
      StepDef::new("only_when_empty").skip_if(|ctx: FlowContext<OrderCtx>| ctx.read().units > 0),
      StepDef::new("last"),
    ],
  );
  flow.on_boxed("first", recording_handler("first"));
  flow.on_boxed("only_when_empty", recording_handler("only_when_empty"));
  flow.on_boxed("last", recording_handler("last"));

  let ctx = FlowContext::new(OrderCtx::default());
  flow.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().trail, vec!["first", "last"]);
}

#[tokio::test]
#[serial]
async fn optional_step_without_handlers_is_skipped() {
  setup_tracing();
  let mut flow = Flow::<OrderCtx, TestError>::new("optional", [StepDef::new("main"), StepDef::new("extra").optional()]);
  flow.on_boxed("main", recording_handler("main"));

  let ctx = FlowContext::new(OrderCtx::default());
  assert_eq!(flow.run(ctx.clone()).await.unwrap(), FlowOutcome::Completed);
  assert_eq!(ctx.read().trail, vec!["main"]);
}

#[tokio::test]
#[serial]
async fn steps_can_be_made_optional_after_construction() {
  setup_tracing();
  let mut flow = Flow::<OrderCtx, TestError>::with_steps("toggled", &["main", "audit"]);
  flow.on_boxed("main", recording_handler("main"));

  assert!(flow.run(FlowContext::new(OrderCtx::default())).await.is_err());

  flow.set_optional("audit", true).unwrap();
  let ctx = FlowContext::new(OrderCtx::default());
  let outcome = flow.run(ctx.clone()).await.unwrap();
  assert!(outcome.is_completed());
  assert_eq!(ctx.read().trail, vec!["main"]);

  flow.set_optional("audit", false).unwrap();
  assert!(flow.run(FlowContext::new(OrderCtx::default())).await.is_err());
  assert!(flow.set_optional("missing", true).is_err());
}

#[tokio::test]
#[serial]
async fn inserted_and_removed_steps_change_the_run() {
  setup_tracing();
  let mut flow = Flow::<OrderCtx, TestError>::with_steps("editable", &["a", "c"]);
  flow.insert_after_step("a", StepDef::new("b")).unwrap();
  flow.on_boxed("a", recording_handler("a"));
  flow.on_boxed("b", recording_handler("b"));
  flow.on_boxed("c", recording_handler("c"));
  assert_eq!(flow.step_names(), vec!["a", "b", "c"]);

  flow.remove_step("a").unwrap();
  let ctx = FlowContext::new(OrderCtx::default());
  flow.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().trail, vec!["b", "c"]);

  assert!(flow.remove_step("a").is_err());
  assert!(flow.insert_after_step("b", StepDef::new("c")).is_err());
}
