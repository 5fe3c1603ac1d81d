//! Benchmarks MDG's full callback-to-publish path: normalize, stamp, encode,
//! non-blocking send. This is the one hot path spec.md budgets latency for
//! ("sub-millisecond tick fan-out").

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pipeline_mdg::{MarketDataGateway, VendorTick};
use rust_decimal_macros::dec;

fn bench_on_vendor_tick(c: &mut Criterion) {
    let mdg = MarketDataGateway::bind("tcp://127.0.0.1:17999", 100_000).unwrap();

    c.bench_function("mdg_on_vendor_tick", |b| {
        b.iter(|| {
            mdg.on_vendor_tick(black_box(VendorTick {
                commodity_id: "MXFF5",
                match_price: dec!(22010),
            }));
        })
    });
}

criterion_group!(benches, bench_on_vendor_tick);
criterion_main!(benches);
