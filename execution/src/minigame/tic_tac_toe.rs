//! Tic-Tac-Toe.
//!
//! Cells are indexed row-major `0..9`. Player1 plays X and moves first.

use super::{GameError, GameRng, RulesEngine};
use pengu_types::minigame::{Effect, Outcome, Role, TicTacToeAction, TIC_TAC_TOE_CELLS};
use serde::Serialize;

use super::registry::TicTacToeConfig;

const LINES: [[u8; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    Playing,
    Complete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicTacToeState {
    pub board: [Option<Role>; TIC_TAC_TOE_CELLS],
    pub turn: Role,
    pub winning_line: Option<[u8; 3]>,
}

impl TicTacToeState {
    fn winner(&self) -> Option<(Role, [u8; 3])> {
        LINES.iter().find_map(|line| {
            let first = self.board[line[0] as usize]?;
            line.iter()
                .all(|&i| self.board[i as usize] == Some(first))
                .then_some((first, *line))
        })
    }

    fn is_full(&self) -> bool {
        self.board.iter().all(Option::is_some)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TicTacToeView {
    /// `"X"`, `"O"` or empty per cell.
    pub board: Vec<&'static str>,
    pub winning_line: Option<[u8; 3]>,
}

fn mark(role: Role) -> &'static str {
    match role {
        Role::Player1 => "X",
        Role::Player2 => "O",
    }
}

pub struct TicTacToe;

impl RulesEngine for TicTacToe {
    type Config = TicTacToeConfig;
    type State = TicTacToeState;
    type Action = TicTacToeAction;
    type Phase = Phase;
    type View = TicTacToeView;

    fn init(_: &Self::Config, _: &mut GameRng) -> Result<Self::State, GameError> {
        Ok(TicTacToeState {
            board: [None; TIC_TAC_TOE_CELLS],
            turn: Role::Player1,
            winning_line: None,
        })
    }

    fn current_turn(state: &Self::State) -> Option<Role> {
        match Self::phase(state) {
            Phase::Playing => Some(state.turn),
            Phase::Complete => None,
        }
    }

    fn phase(state: &Self::State) -> Phase {
        if state.winning_line.is_some() || state.is_full() {
            Phase::Complete
        } else {
            Phase::Playing
        }
    }

    fn apply(
        state: &mut Self::State,
        role: Role,
        action: Self::Action,
        _: &mut GameRng,
    ) -> Result<Vec<Effect>, GameError> {
        let TicTacToeAction::Place { index } = action;
        let cell = state
            .board
            .get_mut(index as usize)
            .ok_or(GameError::IllegalMove("cell out of range"))?;
        if cell.is_some() {
            return Err(GameError::IllegalMove("cell occupied"));
        }
        *cell = Some(role);
        if let Some((_, line)) = state.winner() {
            state.winning_line = Some(line);
        }
        state.turn = role.opponent();
        Ok(vec![Effect::MarkPlaced { role, index }])
    }

    fn check_terminal(state: &Self::State) -> Option<Outcome> {
        if let Some((role, _)) = state.winner() {
            return Some(Outcome::Winner(role));
        }
        state.is_full().then_some(Outcome::Draw)
    }

    fn legal_actions(state: &Self::State, _: Role) -> Vec<Self::Action> {
        (0..TIC_TAC_TOE_CELLS as u8)
            .filter(|&index| state.board[index as usize].is_none())
            .map(|index| TicTacToeAction::Place { index })
            .collect()
    }

    fn forced_action(state: &Self::State, role: Role) -> Option<Self::Action> {
        Self::legal_actions(state, role).into_iter().next()
    }

    fn view(state: &Self::State, _: Role) -> Self::View {
        TicTacToeView {
            board: state.board.iter().map(|c| c.map_or("", mark)).collect(),
            winning_line: state.winning_line,
        }
    }
}
