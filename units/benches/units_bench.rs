use criterion::{black_box, criterion_group, criterion_main, Criterion};
use unitcoder_units::{compute_fbank, Codebook, FbankConfig, FrameSequence, Quantizer};

fn lcg_values(n: usize, seed: u64) -> Vec<f32> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 33) as f32) / (u32::MAX as f32) - 0.25
        })
        .collect()
}

fn bench_quantize(c: &mut Criterion) {
    let (k, dim, frames) = (100, 256, 500);
    let rows: Vec<Vec<f32>> = (0..k).map(|i| lcg_values(dim, i as u64 + 1)).collect();
    let codebook = Codebook::from_rows(rows).unwrap();
    let seq = FrameSequence::from_flat(dim, lcg_values(frames * dim, 99)).unwrap();
    let q = Quantizer::new(&codebook);

    c.bench_function("quantize_500x256_k100", |b| {
        b.iter(|| q.quantize(black_box(&seq)).unwrap())
    });
}

fn bench_fbank(c: &mut Criterion) {
    let cfg = FbankConfig::default();
    let samples = lcg_values(16000, 7);

    c.bench_function("fbank_1s_16k", |b| {
        b.iter(|| compute_fbank(black_box(&samples), &cfg).unwrap())
    });
}

criterion_group!(benches, bench_quantize, bench_fbank);
criterion_main!(benches);
