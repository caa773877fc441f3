//! Main loop dispatcher
//!
//! One loop thread drains a FIFO queue of closures while any number of other
//! threads submit to it. The run state and the queue handle live behind a
//! single mutex that is only held for short, non-blocking sections; tasks run
//! outside of it.

use crate::affinity::ThreadAffinity;
use crate::config::LoopConfig;
use crate::error::{ScheduleError, ScheduleResult};
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};
use tracing::{debug, trace, warn};

/// Work item executed on the loop thread
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Dispatcher statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatcherStats {
    /// Total loops started
    pub loops_started: u64,

    /// Total tasks accepted onto a queue
    pub tasks_accepted: u64,

    /// Total tasks that ran to completion on the loop thread
    pub tasks_executed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    loops_started: AtomicU64,
    tasks_accepted: AtomicU64,
    tasks_executed: AtomicU64,
}

/// Run state guarded by the dispatcher mutex
#[derive(Debug, Default)]
struct LoopState {
    /// Producer side of the queue, present exactly while running
    queue: Option<Sender<Task>>,

    /// Set from loop start until the loop has drained and returned
    active: bool,
}

/// Resets the run state when the loop returns or unwinds
struct ResetOnExit<'a> {
    state: &'a Mutex<LoopState>,
}

impl Drop for ResetOnExit<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            warn!("main loop unwinding from a panicking task, pending tasks are dropped");
        }
        *self.state.lock() = LoopState::default();
    }
}

/// Dispatch loop pinned to a single OS thread.
///
/// The first thread to call one of the `run*` methods becomes the loop thread
/// for the life of the dispatcher. At most one loop is active at a time; loops
/// may be started and terminated repeatedly in sequence.
///
/// # Deadlocks
///
/// Code running on the loop thread must not wait for the loop thread:
/// [`Dispatcher::schedule_await`] called from a task never returns, and so
/// does [`Dispatcher::schedule`] when the queue is full or unbuffered.
#[derive(Debug, Default)]
pub struct Dispatcher {
    /// Run state and queue handle
    state: Mutex<LoopState>,

    /// Reserved loop thread
    affinity: ThreadAffinity,

    /// Statistics counters
    counters: Counters,
}

impl Dispatcher {
    /// Create an idle dispatcher with no reserved thread
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the calling thread as the loop thread.
    ///
    /// Idempotent: once a thread is reserved it stays reserved and later calls
    /// return it unchanged. Called implicitly by every `run*` method.
    pub fn reserve(&self) -> ThreadId {
        self.affinity.reserve()
    }

    /// The reserved loop thread, if one has been reserved
    pub fn loop_thread(&self) -> Option<ThreadId> {
        self.affinity.owner()
    }

    /// Whether the calling thread is the reserved loop thread
    pub fn is_loop_thread(&self) -> bool {
        self.affinity.is_owner()
    }

    /// Run an unbuffered loop; every submission rendezvous with the loop thread.
    ///
    /// See [`Dispatcher::run_with_config`].
    pub fn run<F>(&self, body: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.run_with_config(LoopConfig::default(), body)
    }

    /// Run a loop whose queue holds up to `capacity` pending tasks.
    ///
    /// See [`Dispatcher::run_with_config`].
    pub fn run_with_capacity<F>(&self, capacity: usize, body: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.run_with_config(LoopConfig::default().with_capacity(capacity), body)
    }

    /// Run the loop on the calling thread until [`Dispatcher::terminate`] is
    /// called and every accepted task has executed.
    ///
    /// `body` starts on its own thread as soon as the queue exists. No task is
    /// processed before startup completes, so submissions made by `body`
    /// while the loop is still initializing are ordered after it.
    ///
    /// # Panics
    ///
    /// - if a loop is already active on this dispatcher
    /// - if the calling thread is not the reserved loop thread
    /// - if the body thread cannot be spawned
    ///
    /// A panic raised by a task is not caught; it unwinds out of this call.
    /// The run state is reset on the way out so the dispatcher can be started
    /// again.
    pub fn run_with_config<F>(&self, config: LoopConfig, body: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.state.lock();
        if state.active {
            panic!("main loop is already running");
        }

        let owner = self.affinity.reserve();
        if owner != thread::current().id() {
            panic!("main loop must run on its reserved thread {:?}", owner);
        }

        let (sender, receiver) = channel::bounded(config.capacity);
        state.queue = Some(sender);
        state.active = true;
        self.counters.loops_started.fetch_add(1, Ordering::Relaxed);

        let spawned = thread::Builder::new()
            .name(config.body_thread_name.clone())
            .spawn(body);
        if let Err(err) = spawned {
            *state = LoopState::default();
            drop(state);
            panic!("Failed to spawn main loop body thread: {}", err);
        }

        debug!(
            capacity = config.capacity,
            unbuffered = config.is_unbuffered(),
            body = %config.body_thread_name,
            "main loop started"
        );

        let _reset = ResetOnExit { state: &self.state };

        // Releasing the guard is the first thing the loop does; submitters
        // parked on it (the body included) enqueue only after this point.
        drop(state);

        self.drain(receiver);
        debug!("main loop drained");
    }

    /// Execute tasks in FIFO order until the queue is closed and empty
    fn drain(&self, receiver: Receiver<Task>) {
        for task in receiver.iter() {
            trace!("running main loop task");
            task();
            self.counters.tasks_executed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Stop accepting work. The loop exits once already accepted tasks ran.
    ///
    /// No-op when no loop is running. Never waits for the loop.
    pub fn terminate(&self) {
        let mut state = self.state.lock();
        if state.queue.take().is_some() {
            debug!("main loop terminating");
        }
    }

    /// Submit a task to the loop without waiting for it to run.
    ///
    /// Returns `false` when no loop is running. Blocks while the queue is full
    /// (or, for an unbuffered loop, until the loop thread receives the task).
    pub fn schedule<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.try_schedule(task).is_ok()
    }

    /// Submit a task to the loop, reporting why submission failed.
    ///
    /// The running check and the enqueue are tied together: the queue handle
    /// is cloned under the guard, and a live handle keeps the queue open, so a
    /// concurrent [`Dispatcher::terminate`] cannot close the queue under an
    /// accepted send. Anything sent this way runs before the loop returns.
    ///
    /// Any call that starts after `terminate` has returned fails with
    /// [`ScheduleError::NotRunning`]. A call racing `terminate` may still
    /// succeed; its task then runs as part of the drain.
    pub fn try_schedule<F>(&self, task: F) -> ScheduleResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = match &self.state.lock().queue {
            Some(sender) => sender.clone(),
            None => return Err(ScheduleError::NotRunning),
        };

        if sender.is_full() && self.affinity.is_owner() {
            warn!("loop thread is submitting to a full main loop queue, this blocks forever");
        }

        sender
            .send(Box::new(task))
            .map_err(|_| ScheduleError::Disconnected)?;
        self.counters.tasks_accepted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Submit a task and block until it has executed on the loop thread.
    ///
    /// Returns `false` if the task could not be submitted, or if it never
    /// completed because the loop unwound first. Calling this from the loop
    /// thread deadlocks. There is no timeout: a task that hangs blocks the
    /// caller forever.
    pub fn schedule_await<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.schedule_await_with(task).is_ok()
    }

    /// Run `f` on the loop thread and hand its result back to the caller.
    ///
    /// Same blocking rules as [`Dispatcher::schedule_await`]. If `f` panics,
    /// the loop unwinds and this returns [`ScheduleError::TaskAborted`].
    pub fn schedule_await_with<F, R>(&self, f: F) -> ScheduleResult<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.affinity.is_owner() && self.is_running() {
            warn!("schedule_await called from the main loop thread, this never returns");
        }

        let (done_tx, done_rx) = channel::bounded(1);
        self.try_schedule(move || {
            // The awaiter may be gone; nothing to report to then
            let _ = done_tx.send(f());
        })?;

        done_rx.recv().map_err(|_| ScheduleError::TaskAborted)
    }

    /// Snapshot of whether a loop is running.
    ///
    /// This is only a hint: the loop may start or stop right after the call
    /// returns.
    pub fn is_running(&self) -> bool {
        self.state.lock().queue.is_some()
    }

    /// Snapshot of the dispatcher statistics
    pub fn stats(&self) -> DispatcherStats {
        DispatcherStats {
            loops_started: self.counters.loops_started.load(Ordering::Relaxed),
            tasks_accepted: self.counters.tasks_accepted.load(Ordering::Relaxed),
            tasks_executed: self.counters.tasks_executed.load(Ordering::Relaxed),
        }
    }
}
