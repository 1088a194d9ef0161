//! Benchmarks `Ring::primary` over a ring populated with a realistic
//! member count and vnode count. Measures only; correctness is covered by
//! the unit and property tests.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ring_core::node::{NodeId, NodeInfo};
use ring_core::ring::Ring;

fn populated_ring(nodes: usize, vnodes: u32) -> Ring {
    let ring = Ring::new(vnodes);
    let members: Vec<NodeInfo> = (0..nodes)
        .map(|i| NodeInfo::new(NodeId::new(format!("node-{i}")), format!("10.0.0.{i}:8080")))
        .collect();
    ring.update(&members);
    ring
}

fn bench_primary(c: &mut Criterion) {
    let ring = populated_ring(50, 100);
    c.bench_function("ring_primary_lookup_50_nodes", |b| {
        b.iter(|| ring.primary(black_box(b"benchmark-key")))
    });
}

fn bench_update(c: &mut Criterion) {
    c.bench_function("ring_update_50_nodes_cold", |b| {
        let members: Vec<NodeInfo> = (0..50)
            .map(|i| NodeInfo::new(NodeId::new(format!("node-{i}")), format!("10.0.0.{i}:8080")))
            .collect();
        b.iter(|| {
            let ring = Ring::new(100);
            ring.update(black_box(&members));
        })
    });
}

criterion_group!(benches, bench_primary, bench_update);
criterion_main!(benches);
