//! Loop thread reservation
//!
//! The first thread that enters a loop is bound as the loop thread and stays
//! bound for the life of the owning dispatcher. Rust threads are OS threads,
//! so the binding pins every dispatched task to one OS thread.

use once_cell::sync::OnceCell;
use std::thread::{self, ThreadId};

/// One-time binding of a dispatcher to an OS thread
#[derive(Debug, Default)]
pub struct ThreadAffinity {
    owner: OnceCell<ThreadId>,
}

impl ThreadAffinity {
    /// Create an unbound affinity
    pub fn new() -> Self {
        Self {
            owner: OnceCell::new(),
        }
    }

    /// Bind the calling thread if nothing is bound yet.
    ///
    /// Returns the bound thread, which is the caller only on the first call.
    pub fn reserve(&self) -> ThreadId {
        *self.owner.get_or_init(|| thread::current().id())
    }

    /// The bound thread, if any
    pub fn owner(&self) -> Option<ThreadId> {
        self.owner.get().copied()
    }

    /// Whether the calling thread is the bound thread
    pub fn is_owner(&self) -> bool {
        self.owner() == Some(thread::current().id())
    }
}
