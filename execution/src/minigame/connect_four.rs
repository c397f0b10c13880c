//! Connect-4.
//!
//! The grid has 6 rows and 7 columns; row 0 is the bottom. Cells are reported as
//! `row * 7 + column`. Player1 plays red and moves first.

use super::registry::Connect4Config;
use super::{GameError, GameRng, RulesEngine};
use pengu_types::minigame::{Connect4Action, Effect, Outcome, Role, CONNECT4_COLUMNS, CONNECT4_ROWS};
use serde::Serialize;

const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    Playing,
    Complete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connect4State {
    pub grid: [[Option<Role>; CONNECT4_COLUMNS]; CONNECT4_ROWS],
    pub turn: Role,
    pub winning_line: Option<[u8; 4]>,
}

impl Connect4State {
    fn at(&self, row: isize, col: isize) -> Option<Role> {
        if row < 0 || col < 0 || row >= CONNECT4_ROWS as isize || col >= CONNECT4_COLUMNS as isize {
            return None;
        }
        self.grid[row as usize][col as usize]
    }

    /// Lowest empty row of a column, if any.
    fn landing_row(&self, column: usize) -> Option<usize> {
        (0..CONNECT4_ROWS).find(|&row| self.grid[row][column].is_none())
    }

    fn winner(&self) -> Option<(Role, [u8; 4])> {
        for row in 0..CONNECT4_ROWS as isize {
            for col in 0..CONNECT4_COLUMNS as isize {
                let Some(role) = self.at(row, col) else {
                    continue;
                };
                for (dr, dc) in DIRECTIONS {
                    if (1..4).all(|k| self.at(row + dr * k, col + dc * k) == Some(role)) {
                        let mut line = [0u8; 4];
                        for (k, cell) in line.iter_mut().enumerate() {
                            let (r, c) = (row + dr * k as isize, col + dc * k as isize);
                            *cell = (r * CONNECT4_COLUMNS as isize + c) as u8;
                        }
                        return Some((role, line));
                    }
                }
            }
        }
        None
    }

    fn is_full(&self) -> bool {
        self.grid[CONNECT4_ROWS - 1].iter().all(Option::is_some)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Connect4View {
    /// Rows from bottom to top; `"R"`, `"Y"` or empty per cell.
    pub grid: Vec<Vec<&'static str>>,
    pub winning_line: Option<[u8; 4]>,
}

pub struct ConnectFour;

impl RulesEngine for ConnectFour {
    type Config = Connect4Config;
    type State = Connect4State;
    type Action = Connect4Action;
    type Phase = Phase;
    type View = Connect4View;

    fn init(_: &Self::Config, _: &mut GameRng) -> Result<Self::State, GameError> {
        Ok(Connect4State {
            grid: [[None; CONNECT4_COLUMNS]; CONNECT4_ROWS],
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
        let Connect4Action::Drop { column } = action;
        let col = column as usize;
        if col >= CONNECT4_COLUMNS {
            return Err(GameError::IllegalMove("column out of range"));
        }
        let row = state
            .landing_row(col)
            .ok_or(GameError::IllegalMove("column full"))?;
        state.grid[row][col] = Some(role);
        if let Some((_, line)) = state.winner() {
            state.winning_line = Some(line);
        }
        state.turn = role.opponent();
        Ok(vec![Effect::DiscDropped {
            role,
            column,
            row: row as u8,
        }])
    }

    fn check_terminal(state: &Self::State) -> Option<Outcome> {
        if let Some((role, _)) = state.winner() {
            return Some(Outcome::Winner(role));
        }
        state.is_full().then_some(Outcome::Draw)
    }

    fn legal_actions(state: &Self::State, _: Role) -> Vec<Self::Action> {
        (0..CONNECT4_COLUMNS)
            .filter(|&col| state.landing_row(col).is_some())
            .map(|col| Connect4Action::Drop { column: col as u8 })
            .collect()
    }

    fn forced_action(state: &Self::State, role: Role) -> Option<Self::Action> {
        Self::legal_actions(state, role).into_iter().next()
    }

    fn view(state: &Self::State, _: Role) -> Self::View {
        let disc = |cell: &Option<Role>| match cell {
            Some(Role::Player1) => "R",
            Some(Role::Player2) => "Y",
            None => "",
        };
        Connect4View {
            grid: state
                .grid
                .iter()
                .map(|row| row.iter().map(disc).collect())
                .collect(),
            winning_line: state.winning_line,
        }
    }
}
