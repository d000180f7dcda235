use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use lincode::constructions::golay24;
use lincode::linalg::{dual_code, gauss_reduce, rank};
use lincode::search::minimum_distance;
use lincode::{LinearCode, NdArray, NdArrayMut, SyndromeDecoder, Tensor};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn bench_linalg(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(1);
    let g = Tensor::<u8>::random_full_rank(&mut rng, 32, 64);

    c.bench_function("rank 32x64", |b| b.iter(|| rank(black_box(&g))));
    c.bench_function("dual_code 32x64", |b| b.iter(|| dual_code(black_box(&g))));
    c.bench_function("gauss_reduce window 32x32", |b| {
        let square = Tensor::<u8>::random_full_rank(&mut rng, 32, 32);
        b.iter(|| {
            let mut m = Tensor::<u8>::zeros([40, 40]);
            let mut w = m.window_mut(&[4, 4], &[32, 32]).unwrap();
            w.assign(&square).unwrap();
            black_box(gauss_reduce(&mut w, true).is_ok())
        })
    });
}

fn bench_golay(c: &mut Criterion) {
    let g = golay24();
    c.bench_function("golay24 minimum_distance", |b| {
        b.iter(|| minimum_distance(black_box(&g)))
    });

    let code = LinearCode::from_generator(g).unwrap();
    c.bench_function("golay24 decoder table", |b| {
        b.iter(|| SyndromeDecoder::with_radius(black_box(&code), 3).unwrap())
    });

    let decoder = SyndromeDecoder::new(&code).unwrap();
    let mut word = code.encode(&Tensor::<u8>::ones([12])).unwrap();
    for pos in [0, 9, 17] {
        word.set(&[pos], 1 - word.at(&[pos]));
    }
    c.bench_function("golay24 decode", |b| {
        b.iter(|| decoder.decode(black_box(&word)).unwrap())
    });
}

criterion_group!(benches, bench_linalg, bench_golay);
criterion_main!(benches);
