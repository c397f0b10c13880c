//! Cross-game tests for the dispatch layer.
//!
//! These drive every engine through [`init_game`] and [`apply_action`] from start to finish
//! using randomly chosen legal actions.

use super::{apply_action, init_game, GameConfig, GameError, GameRng, GameState};
use crate::mocks::test_seed;
use pengu_types::minigame::{Action, GameType, Role, TicTacToeAction};
use proptest::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Upper bound on moves per game; Monopoly and UNO can run long under random play.
const MAX_MOVES: u32 = 2_000;

fn new_game(game_type: GameType, seed: u64) -> GameState {
    let mut rng = GameRng::new(&test_seed(seed), seed, 0);
    init_game(&GameConfig::default_for(game_type), &mut rng).unwrap()
}

fn assert_turn_invariant(state: &GameState) {
    match state.check_terminal() {
        Some(_) => {
            assert_eq!(state.current_turn(), None);
            for role in Role::BOTH {
                assert!(state.legal_actions(role).is_empty());
            }
        }
        None => {
            let role = state.current_turn().expect("live match must have a mover");
            assert!(
                !state.legal_actions(role).is_empty(),
                "{} has no legal action in {}",
                role,
                state.phase_name()
            );
            assert!(state.legal_actions(role.opponent()).is_empty());
        }
    }
}

/// Plays random legal actions; returns the number of accepted moves.
fn play_random(state: &mut GameState, seed: u64, match_id: u64) -> u32 {
    let mut picker = StdRng::seed_from_u64(seed);
    let mut moves = 0;
    while state.check_terminal().is_none() && moves < MAX_MOVES {
        assert_turn_invariant(state);
        let role = state.current_turn().unwrap();
        let actions = state.legal_actions(role);
        let action = actions[picker.gen_range(0..actions.len())];
        let mut rng = GameRng::new(&test_seed(seed), match_id, moves + 1);
        apply_action(state, role, action, &mut rng)
            .unwrap_or_else(|err| panic!("legal {action:?} rejected: {err}"));
        moves += 1;
    }
    assert_turn_invariant(state);
    moves
}

#[test]
fn test_all_games_initialize() {
    for (i, game_type) in GameType::ALL.into_iter().enumerate() {
        let state = new_game(game_type, i as u64);
        assert_eq!(state.game_type(), game_type);
        assert_turn_invariant(&state);
        // A Blackjack seat holding a natural is skipped straight away.
        if game_type != GameType::Blackjack {
            assert_eq!(state.current_turn(), Some(Role::Player1));
        }
    }
}

#[test]
fn test_short_games_finish_under_random_play() {
    for game_type in [
        GameType::TicTacToe,
        GameType::Connect4,
        GameType::Blackjack,
        GameType::Battleship,
    ] {
        for seed in 0..5 {
            let mut state = new_game(game_type, seed);
            if state.check_terminal().is_some() {
                continue;
            }
            play_random(&mut state, seed, seed + 1);
            assert!(
                state.check_terminal().is_some(),
                "{game_type} seed {seed} did not finish"
            );
        }
    }
}

#[test]
fn test_rejections_leave_state_unchanged() {
    let mut rng = GameRng::new(&test_seed(9), 9, 1);
    for game_type in GameType::ALL {
        let mut state = new_game(game_type, 9);
        let Some(mover) = state.current_turn() else {
            continue;
        };
        let before = state.clone();

        let err = apply_action(&mut state, mover.opponent(), first_legal(&before), &mut rng)
            .unwrap_err();
        assert_eq!(err, GameError::NotYourTurn);
        assert_eq!(state, before);

        let foreign: Action = if game_type == GameType::TicTacToe {
            pengu_types::minigame::Connect4Action::Drop { column: 0 }.into()
        } else {
            TicTacToeAction::Place { index: 0 }.into()
        };
        let err = apply_action(&mut state, mover, foreign, &mut rng).unwrap_err();
        assert_eq!(err.code(), "ILLEGAL_MOVE");
        assert_eq!(state, before);
    }
}

fn first_legal(state: &GameState) -> Action {
    let role = state.current_turn().unwrap();
    state.legal_actions(role)[0]
}

#[test]
fn test_forced_actions_are_always_accepted() {
    for game_type in GameType::ALL {
        let mut state = new_game(game_type, 21);
        for move_number in 1..200 {
            let Some(role) = state.current_turn() else {
                break;
            };
            let action = state
                .forced_action(role)
                .unwrap_or_else(|| panic!("{game_type} has no forced action"));
            assert!(state.forced_action(role.opponent()).is_none());
            let mut rng = GameRng::new(&test_seed(21), 21, move_number);
            apply_action(&mut state, role, action, &mut rng)
                .unwrap_or_else(|err| panic!("{game_type}: forced {action:?} rejected: {err}"));
        }
    }
}

#[test]
fn test_completed_match_rejects_everything() {
    let mut state = new_game(GameType::TicTacToe, 3);
    play_random(&mut state, 3, 3);
    let finished = state.clone();
    for role in Role::BOTH {
        let mut rng = GameRng::new(&test_seed(3), 3, 99);
        let action = TicTacToeAction::Place { index: 0 }.into();
        let err = apply_action(&mut state, role, action, &mut rng).unwrap_err();
        assert_eq!(err.code(), "MATCH_ALREADY_COMPLETE");
    }
    assert_eq!(state, finished);
}

#[test]
fn test_views_serialize_for_both_seats() {
    for game_type in GameType::ALL {
        let state = new_game(game_type, 4);
        for role in Role::BOTH {
            let json = serde_json::to_value(state.view(role)).unwrap();
            assert!(json.get("game").is_some(), "{game_type} view is untagged");
            assert!(json.get("view").is_some());
        }
    }
}

#[test]
fn test_replay_from_seed_is_identical() {
    for game_type in GameType::ALL {
        let mut a = new_game(game_type, 77);
        let mut b = new_game(game_type, 77);
        play_random(&mut a, 77, 5);
        play_random(&mut b, 77, 5);
        assert_eq!(a, b);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn turn_invariant_holds_under_random_play(seed in any::<u64>(), game in 0usize..6) {
        let game_type = GameType::ALL[game];
        let mut state = new_game(game_type, seed);
        play_random(&mut state, seed, seed.wrapping_add(1));
    }
}
