use std::{collections::VecDeque, hint::black_box};

use criterion::{criterion_group, criterion_main, Criterion};
use string_queue::Queue;

const WORDS: [&str; 8] = [
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel",
];

fn bench_queue(c: &mut Criterion) {
    let n = 256;
    {
        let mut group = c.benchmark_group("VecDeque vs Queue (FIFO 256)");
        group.bench_function("std::collections::VecDeque<String>", |b| {
            b.iter(|| {
                let mut d = VecDeque::new();
                for i in 0..n {
                    d.push_back(black_box(WORDS[i % WORDS.len()]).to_owned());
                }
                while let Some(value) = d.pop_front() {
                    black_box(value);
                }
            })
        });

        group.bench_function("Queue", |b| {
            b.iter(|| {
                let mut q = Queue::new();
                for i in 0..n {
                    q.push_back(black_box(WORDS[i % WORDS.len()])).unwrap();
                }
                while let Some(value) = q.pop_front() {
                    black_box(value);
                }
            })
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("VecDeque vs Queue (LIFO 256)");
        group.bench_function("std::collections::VecDeque<String>", |b| {
            b.iter(|| {
                let mut d = VecDeque::new();
                for i in 0..n {
                    d.push_front(black_box(WORDS[i % WORDS.len()]).to_owned());
                }
                while let Some(value) = d.pop_front() {
                    black_box(value);
                }
            })
        });

        group.bench_function("Queue", |b| {
            b.iter(|| {
                let mut q = Queue::new();
                for i in 0..n {
                    q.push_front(black_box(WORDS[i % WORDS.len()])).unwrap();
                }
                while let Some(value) = q.pop_front() {
                    black_box(value);
                }
            })
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("Reverse 1024");
        let mut q = Queue::new();
        for i in 0..1024 {
            q.push_back(WORDS[i % WORDS.len()]).unwrap();
        }

        group.bench_function("Queue::reverse", |b| {
            b.iter(|| {
                q.reverse();
                black_box(q.len())
            })
        });
        group.finish();
    }
}

criterion_group!(benches, bench_queue);
criterion_main!(benches);
