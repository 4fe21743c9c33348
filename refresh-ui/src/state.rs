//! Shared state handles for component controllers.
//!
//! ## Usage
//!
//! Keep controller state alive across renders and share it with listeners.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;

/// A cloneable handle to state shared between a component and its listeners.
///
/// Clones point at the same value.
pub struct State<T> {
    inner: Arc<RwLock<T>>,
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Default> Default for State<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> State<T> {
    /// Wraps `value` in a new handle.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    /// Executes a closure with a shared reference to the stored value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.read())
    }

    /// Executes a closure with a mutable reference to the stored value.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Returns a clone of the stored value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner.read().clone()
    }

    /// Replaces the stored value.
    pub fn set(&self, value: T) {
        *self.inner.write() = value;
    }

    /// Returns a handle that does not keep the value alive.
    pub fn downgrade(&self) -> WeakState<T> {
        WeakState {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

/// A non-owning [`State`] handle.
pub struct WeakState<T> {
    inner: Weak<RwLock<T>>,
}

impl<T> Clone for WeakState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> WeakState<T> {
    /// Returns the strong handle if the value is still alive.
    pub fn upgrade(&self) -> Option<State<T>> {
        self.inner.upgrade().map(|inner| State { inner })
    }
}
