use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

fn bench_parse_env(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_env");
    for size in [1_024usize, 10_240, 102_400] {
        let input = repeat_to("KEY=value # note\nPORT=3000\nNAME=\"quoted#text\"\n", size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| confloader::parse_env(black_box(input)));
        });
    }
    group.finish();
}

fn bench_parse_yaml(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_yaml");
    let block = "\
service:
  name: api
  port: 8080
  replicas:
    - host: a
      weight: 1
    - host: b
      weight: 2
  tags:
    - blue
    - green
";
    for size in [1_024usize, 10_240, 102_400] {
        let input = repeat_to(block, size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| confloader::parse_yaml(black_box(input)));
        });
    }
    group.finish();
}

fn repeat_to(chunk: &str, bytes: usize) -> String {
    chunk.repeat(bytes / chunk.len() + 1)
}

criterion_group!(benches, bench_parse_env, bench_parse_yaml);
criterion_main!(benches);
