//! Hunt/target opponent for Battleship.
//!
//! The AI remembers every hit that has not yet been explained by a sunk ship. While such hits
//! exist it fires next to them; otherwise it hunts uniformly at random.

use super::battleship::{unfired_cells, BattleshipState, Phase};
use super::GameRng;
use pengu_types::minigame::{BattleshipAction, Effect, Role, BATTLESHIP_CELLS, BATTLESHIP_SIZE};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TargetingAi {
    pub unresolved_hits: Vec<u8>,
}

/// Orthogonal neighbours of a cell.
fn neighbours(cell: u8) -> impl Iterator<Item = u8> {
    let (row, col) = (cell as usize / BATTLESHIP_SIZE, cell as usize % BATTLESHIP_SIZE);
    let up = (row > 0).then(|| cell as usize - BATTLESHIP_SIZE);
    let down = (row + 1 < BATTLESHIP_SIZE).then(|| cell as usize + BATTLESHIP_SIZE);
    let left = (col > 0).then(|| cell as usize - 1);
    let right = (col + 1 < BATTLESHIP_SIZE).then(|| cell as usize + 1);
    [up, down, left, right].into_iter().flatten().map(|c| c as u8)
}

impl TargetingAi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks a cell to fire at given the cells already fired on the enemy board.
    pub fn choose_target(&self, fired: &[bool; BATTLESHIP_CELLS], rng: &mut GameRng) -> Option<u8> {
        let mut candidates: Vec<u8> = self
            .unresolved_hits
            .iter()
            .flat_map(|&hit| neighbours(hit))
            .filter(|&cell| !fired[cell as usize])
            .collect();
        candidates.sort_unstable();
        candidates.dedup();
        if candidates.is_empty() {
            candidates = (0..BATTLESHIP_CELLS as u8)
                .filter(|&cell| !fired[cell as usize])
                .collect();
        }
        rng.pick(&candidates)
    }

    /// Records the result of a shot. `sunk` carries the cells of the ship it finished off.
    pub fn record_shot(&mut self, cell: u8, hit: bool, sunk: Option<&[u8]>) {
        if hit && !self.unresolved_hits.contains(&cell) {
            self.unresolved_hits.push(cell);
        }
        if let Some(cells) = sunk {
            self.unresolved_hits.retain(|c| !cells.contains(c));
        }
    }

    /// Feeds the AI every shot `role` fired in `effects`, looking up sunk ships in `state`.
    pub fn observe(&mut self, role: Role, effects: &[Effect], state: &BattleshipState) {
        for effect in effects {
            if let Effect::ShotResolved {
                role: shooter,
                cell,
                hit,
                sunk,
            } = effect
            {
                if *shooter != role {
                    continue;
                }
                let ship = sunk
                    .as_ref()
                    .and_then(|_| state.target_board(role).ship_at(*cell));
                self.record_shot(*cell, *hit, ship.map(|s| s.cells.as_slice()));
            }
        }
    }

    /// Next action for an AI seat: lock in the random fleet during setup, then fire.
    pub fn next_action(
        &self,
        state: &BattleshipState,
        role: Role,
        rng: &mut GameRng,
    ) -> Option<BattleshipAction> {
        match state.phase {
            Phase::Setup => Some(BattleshipAction::Ready),
            Phase::Playing => self
                .choose_target(&state.target_board(role).fired, rng)
                .or_else(|| unfired_cells(state.target_board(role)).next())
                .map(|cell| BattleshipAction::Fire { cell }),
            Phase::Complete => None,
        }
    }
}
