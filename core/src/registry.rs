// wheelwork/src/registry.rs

//! `FlowRegistry<E>`: flows keyed by the type of data they run on.
//!
//! Each context type maps to exactly one flow, so callers only need to build the
//! context and call [`FlowRegistry::run`].

use crate::core::context::FlowContext;
use crate::core::control::FlowOutcome;
use crate::error::FlowError;
use crate::flow::Flow;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, Level};

#[async_trait]
trait ErasedFlow<AppErr>: Send + Sync
where
  AppErr: std::error::Error + Send + Sync + 'static,
{
  fn name(&self) -> &str;

  /// `ctx` must be a boxed `FlowContext<TData>` for the wrapped flow's `TData`.
  async fn run_erased(&self, ctx: Box<dyn Any + Send>) -> Result<FlowOutcome, AppErr>;
}

struct TypedFlow<TData, FlowErr, AppErr>
where
  TData: Send + Sync + 'static,
  FlowErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  flow: Flow<TData, FlowErr>,
  _app_err: PhantomData<fn() -> AppErr>,
}

#[async_trait]
impl<TData, FlowErr, AppErr> ErasedFlow<AppErr> for TypedFlow<TData, FlowErr, AppErr>
where
  TData: Send + Sync + 'static,
  FlowErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
  AppErr: std::error::Error + From<FlowErr> + From<FlowError> + Send + Sync + 'static,
{
  fn name(&self) -> &str {
    self.flow.name()
  }

  async fn run_erased(&self, ctx: Box<dyn Any + Send>) -> Result<FlowOutcome, AppErr> {
    let typed = match ctx.downcast::<FlowContext<TData>>() {
      Ok(boxed) => *boxed,
      Err(_) => {
        let expected_type = std::any::type_name::<FlowContext<TData>>().to_string();
        event!(Level::ERROR, %expected_type, "Context type mismatch in registry dispatch.");
        return Err(AppErr::from(FlowError::TypeMismatch { expected_type }));
      }
    };
    self.flow.run(typed).await.map_err(AppErr::from)
  }
}

/// Holds one flow per context type and dispatches runs to it.
pub struct FlowRegistry<AppErr = FlowError>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  flows: RwLock<HashMap<TypeId, Arc<dyn ErasedFlow<AppErr>>>>,
}

impl<AppErr> Default for FlowRegistry<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<AppErr> FlowRegistry<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      flows: RwLock::new(HashMap::new()),
    }
  }

  /// Registers `flow` for its context type, replacing any earlier registration.
  pub fn register<TData, FlowErr>(&self, flow: Flow<TData, FlowErr>)
  where
    TData: Send + Sync + 'static,
    FlowErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
    AppErr: From<FlowErr>,
  {
    event!(
      Level::DEBUG,
      flow = %flow.name(),
      context_type = %std::any::type_name::<TData>(),
      "Registering flow."
    );
    let typed = TypedFlow::<TData, FlowErr, AppErr> {
      flow,
      _app_err: PhantomData,
    };
    let previous = self.flows.write().insert(TypeId::of::<TData>(), Arc::new(typed));
    if let Some(previous) = previous {
      event!(Level::WARN, replaced = %previous.name(), "Flow registration replaced an existing flow.");
    }
  }

  pub fn is_registered<TData: Send + Sync + 'static>(&self) -> bool {
    self.flows.read().contains_key(&TypeId::of::<TData>())
  }

  /// Names of all registered flows, sorted.
  pub fn flow_names(&self) -> Vec<String> {
    let mut names: Vec<String> = self.flows.read().values().map(|f| f.name().to_string()).collect();
    names.sort();
    names
  }

  /// Runs the flow registered for `TData`. The caller keeps its own handle to
  /// `ctx` to read results afterwards.
  pub async fn run<TData>(&self, ctx: FlowContext<TData>) -> Result<FlowOutcome, AppErr>
  where
    TData: Send + Sync + 'static,
  {
    let runner = {
      let flows = self.flows.read();
      flows.get(&TypeId::of::<TData>()).cloned()
    };
    let runner = runner.ok_or_else(|| {
      let context_type = std::any::type_name::<TData>().to_string();
      event!(Level::ERROR, %context_type, "No flow registered.");
      AppErr::from(FlowError::NotRegistered { context_type })
    })?;
    runner.run_erased(Box::new(ctx)).await
  }
}
