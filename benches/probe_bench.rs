//! AVS2 探测与起始码扫描性能基准测试.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use avs2::codec::parsers::avs2::StartCodeScanner;
use avs2::format::avs2_probe;

/// 构造一段典型裸流: 序列头 + 若干图像, 每个图像带多个 slice
fn make_stream(pictures: usize) -> Vec<u8> {
    let mut data = vec![0x00, 0x00, 0x01, 0xB0, 0x20, 0x42];
    data.extend(std::iter::repeat_n(0x5A, 32));
    for i in 0..pictures {
        let code = if i % 8 == 0 { 0xB3 } else { 0xB6 };
        data.extend_from_slice(&[0x00, 0x00, 0x01, code]);
        data.extend(std::iter::repeat_n(0x11, 64));
        for slice in 0..4u8 {
            data.extend_from_slice(&[0x00, 0x00, 0x01, slice]);
            data.extend((0..1024u32).map(|v| (v % 251) as u8 | 0x01));
        }
    }
    data
}

fn bench_probe(c: &mut Criterion) {
    let data = make_stream(2);
    let mut group = c.benchmark_group("avs2_probe");
    group.throughput(Throughput::Bytes(8192));
    group.bench_function("probe_8k_head", |b| {
        b.iter(|| avs2_probe(black_box(&data[..8192.min(data.len())])));
    });

    // 没有起始码时需要扫描整个缓冲区
    let noise = vec![0x5Au8; 8192];
    group.bench_function("probe_8k_noise", |b| {
        b.iter(|| avs2_probe(black_box(&noise)));
    });
    group.finish();
}

fn bench_scanner(c: &mut Criterion) {
    let data = make_stream(64);
    let mut group = c.benchmark_group("start_code_scanner");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("count_units", |b| {
        b.iter(|| StartCodeScanner::new(black_box(&data)).count());
    });
    group.finish();
}

criterion_group!(benches, bench_probe, bench_scanner);
criterion_main!(benches);
