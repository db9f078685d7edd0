// wheelwork/src/flow/definition.rs

//! The `Flow<TData, Err>` type and its structural editing methods.

use crate::core::step::{Handler, StepDef};
use crate::error::FlowError;
use std::collections::HashMap;

/// Which hook list a handler belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
  Before,
  On,
  After,
}

impl Phase {
  pub const ALL: [Phase; 3] = [Phase::Before, Phase::On, Phase::After];

  pub fn as_str(self) -> &'static str {
    match self {
      Phase::Before => "before",
      Phase::On => "on",
      Phase::After => "after",
    }
  }
}

/// An ordered list of named steps with async handlers attached to each.
///
/// `Err` is what handlers return; it must absorb engine failures through
/// `From<FlowError>`.
pub struct Flow<TData, Err>
where
  TData: Send + Sync + 'static,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) name: String,
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) handlers: HashMap<(String, Phase), Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Flow<TData, Err>
where
  TData: Send + Sync + 'static,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new(name: impl Into<String>, steps: impl IntoIterator<Item = StepDef<TData>>) -> Self {
    let flow = Self {
      name: name.into(),
      steps: steps.into_iter().collect(),
      handlers: HashMap::new(),
    };
    for (idx, step) in flow.steps.iter().enumerate() {
      if flow.steps[..idx].iter().any(|s| s.name == step.name) {
        panic!("wheelwork setup error: duplicate step '{}' in flow '{}'", step.name, flow.name);
      }
    }
    flow
  }

  /// Shorthand for a flow made of required steps only.
  pub fn with_steps(name: impl Into<String>, step_names: &[&str]) -> Self {
    Self::new(name, step_names.iter().map(|n| StepDef::new(*n)))
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub(crate) fn position(&self, step_name: &str) -> Result<usize, FlowError> {
    self
      .steps
      .iter()
      .position(|s| s.name == step_name)
      .ok_or_else(|| FlowError::StepNotFound {
        step_name: step_name.to_string(),
      })
  }

  /// Panics on unknown names; hooks are registered at startup, so a typo is a
  /// programming error.
  pub(crate) fn expect_step(&self, step_name: &str) {
    if let Err(e) = self.position(step_name) {
      panic!("wheelwork setup error in flow '{}': {}", self.name, e);
    }
  }

  pub(crate) fn handler_count(&self, step_name: &str) -> usize {
    Phase::ALL
      .iter()
      .map(|phase| {
        self
          .handlers
          .get(&(step_name.to_string(), *phase))
          .map_or(0, Vec::len)
      })
      .sum()
  }

  /// Inserts `step` right after `existing`.
  pub fn insert_after_step(&mut self, existing: &str, step: StepDef<TData>) -> Result<(), FlowError> {
    let idx = self.position(existing)?;
    if self.position(&step.name).is_ok() {
      return Err(FlowError::Internal(format!(
        "step '{}' already exists in flow '{}'",
        step.name, self.name
      )));
    }
    self.steps.insert(idx + 1, step);
    Ok(())
  }

  /// Removes a step and every handler attached to it.
  pub fn remove_step(&mut self, step_name: &str) -> Result<(), FlowError> {
    let idx = self.position(step_name)?;
    self.steps.remove(idx);
    self.handlers.retain(|(name, _), _| name != step_name);
    Ok(())
  }

  pub fn set_optional(&mut self, step_name: &str, optional: bool) -> Result<(), FlowError> {
    let idx = self.position(step_name)?;
    self.steps[idx].optional = optional;
    Ok(())
  }
}
