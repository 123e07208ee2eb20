use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use meshring::{Context, Node};
use std::sync::Arc;
use tempfile::NamedTempFile;

const MESSAGES: u64 = 100_000;

fn bench_single_ring(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc_ring");
    group.throughput(Throughput::Elements(MESSAGES));

    group.bench_function("send_recv_u32_payload", |b| {
        b.iter(|| {
            let tmp = NamedTempFile::new().unwrap();
            let path = tmp.path().to_path_buf();
            drop(tmp);
            let _ = std::fs::remove_file(&path);

            let ctx = Arc::new(Context::create(&path, 3, 1024, 64).unwrap());
            let producer = Node::new(Arc::clone(&ctx), 0);
            let consumer = Node::new(Arc::clone(&ctx), 1);

            for i in 0..(MESSAGES as u32) {
                producer.send(1, &i.to_le_bytes()).unwrap();
                let mut buf = [0u8; 64];
                let n = consumer.recv_from(0, &mut buf).unwrap();
                black_box(n);
            }

            let _ = std::fs::remove_file(&path);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_single_ring);
criterion_main!(benches);
