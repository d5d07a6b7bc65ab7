use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use hexmapper::{Difficulty, Direction, EngineConfig, ExplorerSession};

fn bench_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("explore");

    for moves in [50usize, 200, 1000] {
        group.bench_with_input(BenchmarkId::new("moves", moves), &moves, |b, &moves| {
            b.iter_batched(
                || {
                    ExplorerSession::new(EngineConfig {
                        difficulty: Difficulty::Normal,
                        ..EngineConfig::with_seed("bench")
                    })
                    .expect("default config is valid")
                },
                |mut session| {
                    for i in 0..moves {
                        let direction = Direction::ALL[(i * 7 + i / 3) % 3];
                        session.move_explorer(direction);
                    }
                    session
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.bench_function("reroll_last_move", |b| {
        let mut session = ExplorerSession::new(EngineConfig::with_seed("bench")).expect("valid");
        for _ in 0..20 {
            session.move_explorer(Direction::East);
        }
        b.iter(|| session.reroll_last_move());
    });

    group.finish();
}

criterion_group!(explore_benches, bench_moves);
criterion_main!(explore_benches);
