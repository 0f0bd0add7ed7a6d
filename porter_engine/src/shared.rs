//! The session's lock guard discipline.
//!
//! [`SharedWorld`] is the only handle actors receive to the [`GameWorld`].
//! Every mutation and every multi-field snapshot happens inside one
//! [`SharedWorld::lock`] scope, so release on all exit paths (including
//! panics and `?` returns) comes from the guard's RAII.

use crate::world::GameWorld;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable handle to the single mutex-guarded world of a session.
#[derive(Debug, Clone)]
pub struct SharedWorld {
    inner: Arc<Mutex<GameWorld>>,
}

impl SharedWorld {
    pub fn new(world: GameWorld) -> Self {
        Self {
            inner: Arc::new(Mutex::new(world)),
        }
    }

    /// Acquire the world lock.
    ///
    /// A panicked actor poisons the mutex, but the world it leaves behind is
    /// still structurally valid (every mutation keeps the invariants before
    /// releasing), so the poisoned guard is recovered rather than propagated.
    pub fn lock(&self) -> MutexGuard<'_, GameWorld> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
