//! Process-wide dispatcher smoke test
//!
//! Kept as a single test so nothing else in this binary touches the global
//! loop or its reserved thread.

use crossbeam::channel;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;

#[test]
fn test_global_loop_lifecycle() {
    let me = mainloop::reserve();
    assert_eq!(me, thread::current().id());
    assert!(!mainloop::is_running());
    assert!(!mainloop::schedule(|| {}));
    mainloop::terminate();

    let log = Arc::new(Mutex::new(Vec::new()));
    let (result_tx, result_rx) = channel::bounded(1);

    let l = log.clone();
    mainloop::run_with_capacity(4, move || {
        for i in 0..10 {
            let l = l.clone();
            mainloop::schedule(move || l.lock().push(i));
        }
        let answer = mainloop::schedule_await_with(|| 42);
        let awaited = mainloop::schedule_await(|| {});
        let running = mainloop::is_running();
        mainloop::terminate();
        let rejected = mainloop::try_schedule(|| {});
        let _ = result_tx.send((answer, awaited, running, rejected));
    });

    let (answer, awaited, running, rejected) = result_rx.recv().unwrap();
    assert_eq!(answer, Ok(42));
    assert!(awaited);
    assert!(running);
    assert_eq!(rejected, Err(mainloop::ScheduleError::NotRunning));
    assert_eq!(*log.lock(), (0..10).collect::<Vec<_>>());
    assert!(!mainloop::is_running());

    // Second run on the same reserved thread
    mainloop::run(mainloop::terminate);
    assert_eq!(mainloop::global().stats().loops_started, 2);
    assert_eq!(mainloop::global().loop_thread(), Some(me));
}
