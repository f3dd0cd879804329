use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use position::{BoardState, Color, RandomPositionGenerator};
use rand::{SeedableRng, rngs::SmallRng};
use std::hint::black_box;

fn bench_generator(c: &mut Criterion) {
    c.bench_function("pseudo_legal_moves", |b| {
        let board = BoardState::starting();
        b.iter(|| black_box(board.pseudo_legal_moves(Color::White)))
    });

    c.bench_function("generate_20", |b| {
        b.iter_batched(
            || SmallRng::seed_from_u64(0xC0FFEE),
            |mut rng| black_box(RandomPositionGenerator::walk(20, &mut rng)),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_generator);
criterion_main!(benches);
