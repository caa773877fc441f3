//! Main loop dispatcher
//!
//! Pins a dispatch loop to one OS thread and lets every other thread hand it
//! work. Meant for resources that may only be touched from a single thread
//! (GUI toolkits, native UI frameworks, thread-affine native APIs):
//! - Thread reservation (the loop thread is bound once and never released)
//! - Loop lifecycle (start, terminate, restart)
//! - Fire-and-forget, blocking and result-returning submission
//!
//! A [`Dispatcher`] can be created and shared explicitly, or the process-wide
//! instance can be driven through the free functions in this module:
//!
//! ```ignore
//! fn main() {
//!     mainloop::run(|| {
//!         let title = mainloop::schedule_await_with(|| window_title());
//!         println!("{:?}", title);
//!         mainloop::terminate();
//!     });
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod affinity;
pub mod config;
pub mod dispatcher;
pub mod error;

pub use affinity::ThreadAffinity;
pub use config::{LoopConfig, DEFAULT_BODY_THREAD_NAME};
pub use dispatcher::{Dispatcher, DispatcherStats, Task};
pub use error::{ScheduleError, ScheduleResult};

use once_cell::sync::Lazy;
use std::thread::ThreadId;

static GLOBAL: Lazy<Dispatcher> = Lazy::new(Dispatcher::new);

/// The process-wide dispatcher
pub fn global() -> &'static Dispatcher {
    &GLOBAL
}

/// Reserve the calling thread as the process-wide loop thread.
///
/// Call this first thing in `main` to pin the primordial thread before any
/// other code gets a chance to run a loop.
pub fn reserve() -> ThreadId {
    global().reserve()
}

/// Run the process-wide loop unbuffered. See [`Dispatcher::run`].
pub fn run<F>(body: F)
where
    F: FnOnce() + Send + 'static,
{
    global().run(body)
}

/// Run the process-wide loop with a buffered queue. See
/// [`Dispatcher::run_with_capacity`].
pub fn run_with_capacity<F>(capacity: usize, body: F)
where
    F: FnOnce() + Send + 'static,
{
    global().run_with_capacity(capacity, body)
}

/// Run the process-wide loop with explicit settings. See
/// [`Dispatcher::run_with_config`].
pub fn run_with_config<F>(config: LoopConfig, body: F)
where
    F: FnOnce() + Send + 'static,
{
    global().run_with_config(config, body)
}

/// Terminate the process-wide loop. See [`Dispatcher::terminate`].
pub fn terminate() {
    global().terminate()
}

/// Submit to the process-wide loop. See [`Dispatcher::schedule`].
pub fn schedule<F>(task: F) -> bool
where
    F: FnOnce() + Send + 'static,
{
    global().schedule(task)
}

/// Submit to the process-wide loop. See [`Dispatcher::try_schedule`].
pub fn try_schedule<F>(task: F) -> ScheduleResult<()>
where
    F: FnOnce() + Send + 'static,
{
    global().try_schedule(task)
}

/// Submit to the process-wide loop and wait. See
/// [`Dispatcher::schedule_await`].
pub fn schedule_await<F>(task: F) -> bool
where
    F: FnOnce() + Send + 'static,
{
    global().schedule_await(task)
}

/// Run `f` on the process-wide loop and return its result. See
/// [`Dispatcher::schedule_await_with`].
pub fn schedule_await_with<F, R>(f: F) -> ScheduleResult<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    global().schedule_await_with(f)
}

/// Whether the process-wide loop is running. Only a hint.
pub fn is_running() -> bool {
    global().is_running()
}
