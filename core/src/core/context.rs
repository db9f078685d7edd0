// wheelwork/src/core/context.rs
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Shared, lockable state threaded through every step of a flow.
///
/// Cloning is cheap and yields another handle to the same data, so the caller
/// can keep a handle and read the results after the flow finishes.
///
/// Guards are blocking. Drop them before any `.await`.
#[derive(Debug)]
pub struct FlowContext<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> FlowContext<T> {
  pub fn new(data: T) -> Self {
    FlowContext(Arc::new(RwLock::new(data)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }

  /// Read-locks and narrows the guard to one part of the data.
  pub fn map_read<F, U: ?Sized>(&self, f: F) -> MappedRwLockReadGuard<'_, U>
  where
    F: FnOnce(&T) -> &U,
  {
    RwLockReadGuard::map(self.read(), f)
  }

  /// Runs `f` against a read guard and returns its output, releasing the lock
  /// before the caller can reach an await point.
  pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
    f(&self.read())
  }

  /// Same as [`FlowContext::with`] for a write guard.
  pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
    f(&mut self.write())
  }
}

impl<T: Send + Sync + 'static> Clone for FlowContext<T> {
  fn clone(&self) -> Self {
    FlowContext(Arc::clone(&self.0))
  }
}

impl<T: Send + Sync + Default + 'static> Default for FlowContext<T> {
  fn default() -> Self {
    Self::new(T::default())
  }
}
