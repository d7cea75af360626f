// ============================================================================
// Matching Benchmarks
// ============================================================================

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use exchange_core::prelude::*;

const INSTRUMENT: &str = "IRO1MAPN0001";

fn setup(depth: u64) -> (Security, AccountLedger) {
    let mut security = Security::new(
        SecurityConfig::new(INSTRUMENT).with_reference_price(15_800),
    );
    let mut ledger = AccountLedger::new();
    ledger.add_broker(Broker::new(BrokerId::new(1), u64::MAX / 4));
    let mut holder = Shareholder::new(ShareholderId::new(1));
    holder.increase_position(INSTRUMENT, u64::MAX / 4);
    ledger.add_shareholder(holder);

    for level in 0..depth {
        security.new_order(&request(level + 1, Side::Sell, 100, 15_810 + level), &mut ledger);
        security.new_order(
            &request(depth + level + 1, Side::Buy, 100, 15_790 - level),
            &mut ledger,
        );
    }
    (security, ledger)
}

fn request(id: u64, side: Side, quantity: Quantity, price: Price) -> OrderRequest {
    OrderRequest::new(
        RequestId::new(id),
        OrderId::new(id),
        INSTRUMENT,
        side,
        quantity,
        price,
        BrokerId::new(1),
        ShareholderId::new(1),
    )
}

fn bench_continuous_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("continuous_matching");
    for depth in [16u64, 64, 256] {
        group.bench_with_input(
            BenchmarkId::new("sweep_levels", depth),
            &depth,
            |b, &depth| {
                b.iter_batched(
                    || setup(depth),
                    |(mut security, mut ledger)| {
                        let rq = request(10_000, Side::Buy, 100 * depth, 15_810 + depth);
                        black_box(security.new_order(&rq, &mut ledger))
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }
    group.finish();
}

fn bench_order_entry(c: &mut Criterion) {
    c.bench_function("resting_order_entry", |b| {
        b.iter_batched(
            || setup(64),
            |(mut security, mut ledger)| {
                // Far from the spread: pure book insertion, no matching.
                let rq = request(10_000, Side::Buy, 100, 15_000);
                black_box(security.new_order(&rq, &mut ledger))
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

fn bench_auction_uncross(c: &mut Criterion) {
    let mut group = c.benchmark_group("auction");
    for depth in [16u64, 64, 256] {
        group.bench_with_input(
            BenchmarkId::new("opening_price", depth),
            &depth,
            |b, &depth| {
                let (mut security, mut ledger) = setup(depth);
                security.change_state(MatchingState::Auction, &mut ledger);
                // Cross the book so an opening price exists.
                security.new_order(
                    &request(20_000, Side::Buy, 100 * depth, 15_810 + depth),
                    &mut ledger,
                );
                b.iter(|| black_box(security.opening_price()));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("uncross", depth),
            &depth,
            |b, &depth| {
                b.iter_batched(
                    || {
                        let (mut security, mut ledger) = setup(depth);
                        security.change_state(MatchingState::Auction, &mut ledger);
                        security.new_order(
                            &request(20_000, Side::Buy, 100 * depth, 15_810 + depth),
                            &mut ledger,
                        );
                        (security, ledger)
                    },
                    |(mut security, mut ledger)| {
                        black_box(security.change_state(MatchingState::Continuous, &mut ledger))
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_continuous_matching,
    bench_order_entry,
    bench_auction_uncross
);
criterion_main!(benches);
