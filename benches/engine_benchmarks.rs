use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rand::{SeedableRng, rngs::StdRng};

use coup_engine::{
    GameSettings, GameState,
    entities::{ActionKind, SessionId},
    game::vote::VoteChoice,
};
use std::time::Duration;

/// Helper to create a game state with N registered players.
fn setup_game_with_players(n_players: usize) -> (GameState, Vec<SessionId>) {
    let mut game = GameState::with_rng(GameSettings::default(), StdRng::seed_from_u64(0));
    let sessions = (0..n_players)
        .map(|i| {
            let session = SessionId::new();
            game.register(session, &format!("player{i}")).unwrap();
            session
        })
        .collect();
    (game, sessions)
}

/// Benchmark registering a full table of six players.
fn bench_register_full_table(c: &mut Criterion) {
    c.bench_function("register_six_players", |b| {
        b.iter_batched(
            || GameState::with_rng(GameSettings::default(), StdRng::seed_from_u64(0)),
            |mut game| {
                for i in 0..6 {
                    game.register(SessionId::new(), &format!("player{i}")).unwrap();
                }
                game
            },
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark one full round of income actions at a six-player table.
fn bench_income_round(c: &mut Criterion) {
    c.bench_function("income_round_six_players", |b| {
        b.iter_batched(
            || setup_game_with_players(6),
            |(mut game, sessions)| {
                for session in &sessions {
                    game.take_action(*session, ActionKind::Income, None).unwrap();
                }
                game
            },
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark a coup resolution, including the random card kill.
fn bench_coup(c: &mut Criterion) {
    c.bench_function("coup_resolution", |b| {
        b.iter_batched(
            || {
                let mut game = GameState::with_rng(
                    GameSettings::new(6, 7, 50),
                    StdRng::seed_from_u64(0),
                );
                let a = SessionId::new();
                game.register(a, "a").unwrap();
                game.register(SessionId::new(), "b").unwrap();
                (game, a)
            },
            |(mut game, a)| {
                game.take_action(a, ActionKind::Coup, Some("b")).unwrap();
                game
            },
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark casting a vote through to its passing conclusion.
fn bench_vote_to_pass(c: &mut Criterion) {
    c.bench_function("vote_cast_to_pass", |b| {
        b.iter_batched(
            || {
                let (mut game, sessions) = setup_game_with_players(6);
                game.create_vote(
                    "challenge",
                    Duration::from_secs(10),
                    0.5,
                    Box::new(|_| vec![]),
                    Box::new(|_| vec![]),
                )
                .unwrap();
                (game, sessions)
            },
            |(mut game, sessions)| {
                for session in &sessions[..3] {
                    game.cast_vote("challenge", *session, VoteChoice::Yes).unwrap();
                }
                game
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_register_full_table,
    bench_income_round,
    bench_coup,
    bench_vote_to_pass
);
criterion_main!(benches);
