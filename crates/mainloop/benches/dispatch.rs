use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mainloop::Dispatcher;
use std::sync::Arc;
use std::thread;

/// Start a loop on a dedicated thread and wait until it accepts work
fn spawn_loop(capacity: usize) -> (Arc<Dispatcher>, thread::JoinHandle<()>) {
    let dispatcher = Arc::new(Dispatcher::new());
    let (ready_tx, ready_rx) = crossbeam::channel::bounded(1);

    let d = dispatcher.clone();
    let handle = thread::Builder::new()
        .name("bench-loop".to_string())
        .spawn(move || {
            d.run_with_capacity(capacity, move || {
                let _ = ready_tx.send(());
            });
        })
        .unwrap();

    ready_rx.recv().unwrap();
    (dispatcher, handle)
}

fn bench_schedule_await(c: &mut Criterion) {
    let mut group = c.benchmark_group("schedule_await");

    for capacity in [0usize, 64] {
        let (dispatcher, handle) = spawn_loop(capacity);
        group.bench_with_input(BenchmarkId::new("round_trip", capacity), &capacity, |b, _| {
            b.iter(|| dispatcher.schedule_await_with(|| black_box(1u64) + 1).unwrap());
        });
        dispatcher.terminate();
        handle.join().unwrap();
    }

    group.finish();
}

fn bench_schedule(c: &mut Criterion) {
    let (dispatcher, handle) = spawn_loop(1024);

    c.bench_function("schedule_fire_and_forget", |b| {
        b.iter(|| dispatcher.schedule(|| {
            black_box(0u64);
        }));
    });

    dispatcher.terminate();
    handle.join().unwrap();
}

criterion_group!(benches, bench_schedule_await, bench_schedule);
criterion_main!(benches);
