use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slicesimd_f32 as f32ops;

const N: usize = 1000;

fn random_vec(seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..N).map(|_| rng.gen_range(-8.0f32..8.0)).collect()
}

fn bench_ops(c: &mut Criterion) {
    let a = random_vec(1);
    let b = random_vec(2);

    c.bench_function("f32/add/1000", |bench| {
        let mut dst = vec![0.0f32; N];
        bench.iter(|| f32ops::add(&mut dst, black_box(&a), black_box(&b)));
    });

    c.bench_function("f32/dot/1000", |bench| {
        bench.iter(|| f32ops::dot(black_box(&a), black_box(&b)));
    });

    c.bench_function("f32/sum/1000", |bench| {
        bench.iter(|| f32ops::sum(black_box(&a)));
    });

    c.bench_function("f32/sigmoid/1000", |bench| {
        let mut dst = vec![0.0f32; N];
        bench.iter(|| f32ops::sigmoid(&mut dst, black_box(&a)));
    });
}

criterion_group!(benches, bench_ops);
criterion_main!(benches);
