use std::time::Duration;
use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use laser_arena::{Action, ArenaMap, Direction, GameConfig, GameState, Laser};
use laser_arena::game::tick::{apply_action, sweep};

fn populated_state(players: usize, lasers: usize) -> (GameState, laser_arena::EntityId) {
    let map = ArenaMap::default_arena().unwrap();
    let mut state = GameState::new(map, GameConfig::default());
    let mover = state.spawn_player("mover", 'M');
    for i in 1..players {
        state.spawn_player(format!("p{i}"), 'p');
    }
    for _ in 0..lasers {
        // Parked on the mover's own cell so they never hit anyone
        let at = state.entities.get(mover).and_then(|e| e.position()).unwrap();
        state.add_entity(Box::new(Laser::new(mover, at, Direction::Up)));
    }
    state.take_changes();
    (state, mover)
}

fn bench_move_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("move_resolution");
    let base = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

    for entities in [2usize, 16, 64, 256] {
        let (mut state, mover) = populated_state(entities.min(9), entities);
        let mut n: i64 = 0;

        group.bench_with_input(BenchmarkId::from_parameter(entities), &entities, |b, _| {
            b.iter(|| {
                n += 1;
                let direction = if n % 2 == 0 { Direction::Right } else { Direction::Left };
                let at = base + chrono::Duration::seconds(n);
                black_box(apply_action(&mut state, &Action::movement(mover, direction, at)))
            })
        });
    }

    group.finish();
}

fn bench_laser_sweep(c: &mut Criterion) {
    let (mut state, _) = populated_state(9, 0);
    let base = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

    c.bench_function("laser_sweep_idle", |b| {
        b.iter(|| black_box(sweep(&mut state, Duration::from_millis(10), base)))
    });
}

criterion_group!(benches, bench_move_resolution, bench_laser_sweep);
criterion_main!(benches);
