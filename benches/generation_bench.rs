use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use realm_core::engine::{EngineConfig, GameSession, InputKey, InputSnapshot};
use realm_core::entity::IdGen;
use realm_core::generation::{self, MapParams, WorldSeed};
use realm_core::world::Location;

fn bench_generation(c: &mut Criterion) {
    let world = WorldSeed { seed: 42 };
    let locations = [
        ("overworld", Location::default()),
        ("town", Location::Town),
        (
            "cave",
            Location::Mine {
                level: 2,
                max_depth: 3,
            },
        ),
        (
            "dungeon",
            Location::Dungeon {
                level: 1,
                max_depth: 3,
                id: 7,
            },
        ),
    ];

    let mut group = c.benchmark_group("generate");
    for (name, location) in locations {
        group.bench_with_input(BenchmarkId::from_parameter(name), &location, |b, loc| {
            b.iter(|| {
                let mut rng = world.rng_for(loc);
                let mut ids = IdGen::default();
                generation::generate(*loc, MapParams::new(64, 64), &mut ids, &mut rng)
            })
        });
    }
    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut session = GameSession::new(EngineConfig::default());
    if session.start().is_err() {
        return;
    }
    let input = InputSnapshot::default()
        .with(InputKey::Right)
        .with(InputKey::Attack);

    c.bench_function("session_tick_overworld", |b| {
        b.iter(|| session.tick(black_box(&input), black_box(1.0 / 60.0)))
    });
}

criterion_group!(benches, bench_generation, bench_tick);
criterion_main!(benches);
