//! Basic benchmarks for the `bitmap_pool` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::iter;
use std::time::Instant;

use alloc_tracker::Allocator;
use bitmap_pool::{PlacementPolicy, Pool, PoolChain, SlotPool};
use criterion::{Criterion, criterion_group, criterion_main};
use new_zealand::nz;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

type TestItem = u64;

fn entrypoint(c: &mut Criterion) {
    let allocs = alloc_tracker::Session::new();

    let mut group = c.benchmark_group("bitmap_chain");

    let mut allocs_op = allocs.operation("allocate_first");
    group.bench_function("allocate_first", |b| {
        b.iter_custom(|iters| {
            let mut chains = iter::repeat_with(PoolChain::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for chain in &mut chains {
                _ = black_box(chain.allocate(black_box(1)).unwrap());
            }

            start.elapsed()
        });
    });

    let mut allocs_op = allocs.operation("allocate_second");
    group.bench_function("allocate_second", |b| {
        b.iter_custom(|iters| {
            let mut chains = iter::repeat_with(PoolChain::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            // Pre-warm each chain so that its first pool exists.
            for chain in &mut chains {
                _ = chain.allocate(1).unwrap();
            }

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for chain in &mut chains {
                _ = black_box(chain.allocate(black_box(1)).unwrap());
            }

            start.elapsed()
        });
    });

    for policy in [PlacementPolicy::FirstFit, PlacementPolicy::LastFit] {
        let name = format!("churn_{policy:?}");

        let mut allocs_op = allocs.operation(&name);
        group.bench_function(&name, |b| {
            let mut chain = PoolChain::<TestItem>::builder()
                .placement_policy(policy)
                .build();

            // Keep a few long-lived slots so the churn happens next to occupied slots.
            for _ in 0..16 {
                _ = chain.allocate(1).unwrap();
            }

            b.iter_custom(|iters| {
                let _span = allocs_op.measure_thread().iterations(iters);

                let start = Instant::now();

                for _ in 0..iters {
                    let ptr = chain.allocate(black_box(1)).unwrap();
                    chain.deallocate(black_box(ptr), 1).unwrap();
                }

                start.elapsed()
            });
        });
    }

    group.finish();

    let mut group = c.benchmark_group("bitmap_pool");

    let mut allocs_op = allocs.operation("first_fit_fragmented");
    group.bench_function("first_fit_fragmented", |b| {
        let mut pool = Pool::<TestItem>::with_capacity(nz!(64), PlacementPolicy::FirstFit);

        // Leave only single-slot holes below the top half, so a run of two has to be searched.
        let mut holes = Vec::new();
        for _ in 0..16 {
            holes.push(pool.allocate(1).unwrap());
            _ = pool.allocate(1).unwrap();
        }
        for hole in holes {
            pool.deallocate(hole, 1);
        }

        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                let ptr = pool.allocate(black_box(2)).unwrap();
                pool.deallocate(black_box(ptr), 2);
            }

            start.elapsed()
        });
    });

    group.finish();

    allocs.print_to_stdout();
}
