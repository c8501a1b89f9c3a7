use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tetris_duel::core::{collides, EngineConfig, GameState, Piece, Stage};
use tetris_duel::relay::protocol::{ClientMessage, StatePayload};
use tetris_duel::types::{Cell, PieceKind, TurnDirection, STAGE_WIDTH};

fn started() -> GameState {
    let mut game = GameState::new(EngineConfig {
        win_rows: None,
        ..EngineConfig::with_seed(12345)
    });
    game.start();
    game
}

fn bench_tick(c: &mut Criterion) {
    let mut game = started();

    c.bench_function("game_tick_16ms", |b| {
        b.iter(|| {
            if !game.tick(black_box(16)) && game.game_over() {
                game.start();
            }
        })
    });
}

fn bench_sweep(c: &mut Criterion) {
    c.bench_function("sweep_4_rows", |b| {
        b.iter(|| {
            let mut stage = Stage::new();
            for y in 16..20 {
                for x in 0..STAGE_WIDTH as i8 {
                    stage.set(x, y, Cell::settled(PieceKind::I));
                }
            }
            black_box(stage.sweep());
        })
    });
}

fn bench_collides(c: &mut Criterion) {
    let stage = Stage::new();
    let piece = Piece::spawn(PieceKind::T);

    c.bench_function("collides", |b| {
        b.iter(|| collides(black_box(&piece), &stage, black_box((1, 5))))
    });
}

fn bench_hard_drop(c: &mut Criterion) {
    let mut game = started();

    c.bench_function("hard_drop", |b| {
        b.iter(|| {
            game.hard_drop();
            if game.game_over() {
                game.start();
            }
        })
    });
}

fn bench_rotate(c: &mut Criterion) {
    let mut game = started();

    c.bench_function("rotate", |b| {
        b.iter(|| {
            game.rotate(TurnDirection::Clockwise);
        })
    });
}

fn bench_snapshot_encode(c: &mut Criterion) {
    let game = started();

    c.bench_function("snapshot_to_update_state_line", |b| {
        b.iter(|| {
            let msg = ClientMessage::UpdateState(StatePayload::from(&game.snapshot()));
            black_box(serde_json::to_string(&msg).ok());
        })
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_sweep,
    bench_collides,
    bench_hard_drop,
    bench_rotate,
    bench_snapshot_encode
);
criterion_main!(benches);
