//! Property-based tests for the coin economy.
//!
//! Whatever mix of actions a table of 2-6 players throws at the game,
//! the coins in circulation must always add back up to the starting
//! treasury, and there must always be exactly one current player.

use coup_engine::{
    GameSettings, GameState, STARTING_TREASURY,
    entities::{ActionKind, SessionId},
};
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

#[derive(Clone, Debug)]
enum Op {
    Income,
    ForeignAid,
    Tax,
    Coup(usize),
    Assassinate(usize),
    Deregister(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Income),
        3 => Just(Op::ForeignAid),
        3 => Just(Op::Tax),
        2 => (0..6usize).prop_map(Op::Coup),
        2 => (0..6usize).prop_map(Op::Assassinate),
        1 => (0..6usize).prop_map(Op::Deregister),
    ]
}

fn build_game(player_count: usize, seed: u64) -> (GameState, Vec<SessionId>) {
    let mut game = GameState::with_rng(GameSettings::default(), StdRng::seed_from_u64(seed));
    let sessions = (0..player_count)
        .map(|i| {
            let session = SessionId::new();
            game.register(session, &format!("p{i}")).unwrap();
            session
        })
        .collect();
    (game, sessions)
}

proptest! {
    #[test]
    fn coins_are_conserved_under_any_action_sequence(
        player_count in 2..=6usize,
        seed in any::<u64>(),
        ops in prop::collection::vec(op_strategy(), 1..80),
    ) {
        let (mut game, sessions) = build_game(player_count, seed);
        prop_assert_eq!(game.total_coins(), STARTING_TREASURY);

        for op in ops {
            // Whoever is current acts; rejected actions must leave the
            // balance untouched, so errors are deliberately ignored.
            let Some(actor) = game.players().current().map(|p| p.session()) else {
                break;
            };
            match op {
                Op::Income => {
                    let _ = game.take_action(actor, ActionKind::Income, None);
                }
                Op::ForeignAid => {
                    let _ = game.take_action(actor, ActionKind::ForeignAid, None);
                }
                Op::Tax => {
                    let _ = game.take_action(actor, ActionKind::Tax, None);
                }
                Op::Coup(idx) => {
                    let target = format!("p{}", idx % player_count);
                    let _ = game.take_action(actor, ActionKind::Coup, Some(&target));
                }
                Op::Assassinate(idx) => {
                    let target = format!("p{}", idx % player_count);
                    let _ = game.take_action(actor, ActionKind::Assassinate, Some(&target));
                }
                Op::Deregister(idx) => {
                    let _ = game.deregister(sessions[idx % player_count]);
                }
            }

            prop_assert_eq!(game.total_coins(), STARTING_TREASURY);
            prop_assert_eq!(game.players().current().is_some(), !game.players().is_empty());
        }
    }

    #[test]
    fn advance_cycles_every_player_before_repeating(
        player_count in 2..=6usize,
        seed in any::<u64>(),
    ) {
        let (mut game, sessions) = build_game(player_count, seed);

        // One full loop of income actions visits each player once, in
        // registration order, and lands back on the first.
        for session in &sessions {
            prop_assert!(game.players().is_current_turn(*session));
            game.take_action(*session, ActionKind::Income, None).unwrap();
        }
        prop_assert!(game.players().is_current_turn(sessions[0]));
    }
}
