use criterion::{Criterion, criterion_group, criterion_main};
use confloader::{EnvLoader, EnvStore};

fn bench_load(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let env_path = dir.path().join(".env");
    std::fs::write(&env_path, make_env_content(2_000)).expect("failed to write bench file");

    c.bench_function("load_in_memory", |b| {
        b.iter(|| {
            let mut loader = EnvLoader::new()
                .path(&env_path)
                .target(EnvStore::memory());
            loader.load().expect("load should succeed")
        });
    });

    let yaml_path = dir.path().join("config.yaml");
    std::fs::write(&yaml_path, make_yaml_content(500)).expect("failed to write bench file");

    c.bench_function("load_yaml", |b| {
        b.iter(|| confloader::load_yaml(&yaml_path).expect("load should succeed"));
    });
}

fn make_env_content(entries: usize) -> String {
    let mut content = String::with_capacity(entries * 16);
    for idx in 0..entries {
        content.push_str(&format!("KEY_{idx}={idx}\n"));
    }
    content
}

fn make_yaml_content(sections: usize) -> String {
    let mut content = String::with_capacity(sections * 48);
    for idx in 0..sections {
        content.push_str(&format!("section_{idx}:\n  id: {idx}\n  items:\n    - one\n    - two\n"));
    }
    content
}

criterion_group!(benches, bench_load);
criterion_main!(benches);
