//! Action identity types.
//!
//! Every control action carries a process-wide unique id assigned at
//! construction time. The id doubles as the key of the action's PID file,
//! so two separate program invocations (the start run and the later stop
//! run) derive the same path as long as the scenario declares the actions
//! in the same order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Control action ID wrapper with display formatting.
///
/// Ids are assigned in construction order, starting at 1, and never reused
/// within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub u32);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ActionId {
    fn from(id: u32) -> Self {
        ActionId(id)
    }
}

/// Monotonic allocator for [`ActionId`]s.
///
/// Construction is single-threaded in practice; the atomic is the explicit
/// counter object. A run creates exactly one allocator and threads it
/// through every action constructor, so tests can use a fresh allocator
/// instead of resetting global state.
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicU32,
}

impl IdAllocator {
    /// Create an allocator whose first id is 1.
    pub fn new() -> Self {
        IdAllocator {
            next: AtomicU32::new(1),
        }
    }

    /// Hand out the next id.
    pub fn next_id(&self) -> ActionId {
        ActionId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Peek at the id the next allocation would return.
    pub fn peek(&self) -> ActionId {
        ActionId(self.next.load(Ordering::Relaxed))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
