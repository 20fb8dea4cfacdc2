//! Deferred values for fields that are loaded from metadata on first read.
//!
//! A [`Deferred`] cell is the single mechanism behind every lazily resolved field of a row-backed
//! entity. It is created with an original-value function; the first [`Deferred::read`] invokes that
//! function and caches its outcome. A [`Deferred::write`] replaces whatever the cell holds and the
//! function is never consulted again, whether or not it had already run.
//!
//! # States
//!
//! ```text
//!             read (Ok)
//! Unresolved ──────────► Resolved ──┐
//!     │  read (Err)                 │ write
//!     ├──────────► Failed ──────────┤
//!     │ write                       ▼
//!     └───────────────────────► Overridden
//! ```
//!
//! A failed resolution is cached: every later read returns the same error without calling the
//! original-value function again. Writing still works from the `Failed` state.
//!
//! # Examples
//!
//! ```rust
//! use dotbind::metadata::deferred::{Deferred, DeferredState};
//!
//! let mut cell = Deferred::lazy(|| Ok(42_u32));
//! assert_eq!(cell.state(), DeferredState::Unresolved);
//!
//! assert_eq!(*cell.read()?, 42);
//! assert_eq!(cell.state(), DeferredState::Resolved);
//!
//! cell.write(7);
//! assert_eq!(*cell.read()?, 7);
//! assert_eq!(cell.state(), DeferredState::Overridden);
//! # Ok::<(), dotbind::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! Reads take `&mut self`, so a cell can never be resolved from two places at once. Entities that
//! are shared across threads must be wrapped in a lock by the caller.

use std::fmt;

use crate::{metadata::token::Token, Error, Result};

/// The function producing the value stored in the underlying metadata
pub type OriginalValueFn<T> = Box<dyn FnOnce() -> Result<T>>;

/// Observable state of a [`Deferred`] cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredState {
    /// The original-value function has not been invoked yet
    Unresolved,
    /// The original value was resolved and cached
    Resolved,
    /// The original-value function failed; the error is cached
    Failed,
    /// A value was explicitly written
    Overridden,
}

enum Slot<T> {
    Unresolved(OriginalValueFn<T>),
    // Only observable if the original-value function panicked
    Resolving,
    Resolved(T),
    Failed(Error),
    Overridden(T),
}

fn incomplete() -> Error {
    Error::Resolution {
        token: Token::new(0),
        message: "original value function did not complete".to_string(),
    }
}

/// A value that is resolved on first read and can be overridden at any time.
pub struct Deferred<T> {
    slot: Slot<T>,
}

impl<T> Deferred<T> {
    /// Creates a cell whose value will be produced by `original` on first read.
    pub fn lazy<F>(original: F) -> Self
    where
        F: FnOnce() -> Result<T> + 'static,
    {
        Deferred {
            slot: Slot::Unresolved(Box::new(original)),
        }
    }

    /// Creates a cell that already holds its original value
    pub fn resolved(value: T) -> Self {
        Deferred {
            slot: Slot::Resolved(value),
        }
    }

    /// Returns the value of this cell, resolving it first if required.
    ///
    /// The original-value function is invoked at most once over the lifetime of the cell.
    ///
    /// # Errors
    ///
    /// Returns the error produced by the original-value function. The error is cached and
    /// returned again on every following read until the cell is written.
    pub fn read(&mut self) -> Result<&T> {
        if matches!(self.slot, Slot::Unresolved(_)) {
            if let Slot::Unresolved(original) = std::mem::replace(&mut self.slot, Slot::Resolving)
            {
                self.slot = match original() {
                    Ok(value) => Slot::Resolved(value),
                    Err(error) => {
                        log::warn!("Deferred resolution failed, caching error - {error}");
                        Slot::Failed(error)
                    }
                };
            }
        }

        match &self.slot {
            Slot::Resolved(value) | Slot::Overridden(value) => Ok(value),
            Slot::Failed(error) => Err(error.clone()),
            Slot::Resolving | Slot::Unresolved(_) => Err(incomplete()),
        }
    }

    /// Mutable access to the value of this cell, resolving it first if required.
    ///
    /// Modifying the value in place counts as an explicit write.
    ///
    /// # Errors
    ///
    /// Same as [`Deferred::read`].
    pub fn read_mut(&mut self) -> Result<&mut T> {
        self.read()?;

        if matches!(self.slot, Slot::Resolved(_)) {
            if let Slot::Resolved(value) = std::mem::replace(&mut self.slot, Slot::Resolving) {
                self.slot = Slot::Overridden(value);
            }
        }

        match &mut self.slot {
            Slot::Overridden(value) => Ok(value),
            _ => Err(incomplete()),
        }
    }

    /// Explicitly sets the value of this cell.
    ///
    /// Any pending original-value function is dropped without being invoked.
    pub fn write(&mut self, value: T) {
        self.slot = Slot::Overridden(value);
    }

    /// Returns `true` once the cell holds a value, either resolved or written
    #[must_use]
    pub fn is_resolved_or_overridden(&self) -> bool {
        matches!(self.slot, Slot::Resolved(_) | Slot::Overridden(_))
    }

    /// The current state of this cell
    #[must_use]
    pub fn state(&self) -> DeferredState {
        match self.slot {
            Slot::Unresolved(_) => DeferredState::Unresolved,
            Slot::Resolved(_) => DeferredState::Resolved,
            Slot::Failed(_) | Slot::Resolving => DeferredState::Failed,
            Slot::Overridden(_) => DeferredState::Overridden,
        }
    }

    /// Returns the value if it is already available, without resolving
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        match &self.slot {
            Slot::Resolved(value) | Slot::Overridden(value) => Some(value),
            _ => None,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            Slot::Unresolved(_) | Slot::Resolving => f.write_str("Deferred(<unresolved>)"),
            Slot::Resolved(value) => f.debug_tuple("Resolved").field(value).finish(),
            Slot::Failed(error) => f.debug_tuple("Failed").field(error).finish(),
            Slot::Overridden(value) => f.debug_tuple("Overridden").field(value).finish(),
        }
    }
}
