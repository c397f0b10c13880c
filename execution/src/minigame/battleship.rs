//! Battleship.
//!
//! Each seat owns a 10x10 board carrying the standard five-ship fleet. During setup Player1 and
//! then Player2 may re-roll their placement with `Randomize` and lock it in with `Ready`. Once
//! both are ready seats alternate firing at the enemy board, Player1 first. A ship sinks when
//! every one of its cells has been hit; the first seat to sink the whole enemy fleet wins.

use super::registry::BattleshipConfig;
use super::{GameError, GameRng, RulesEngine};
use pengu_types::minigame::{
    BattleshipAction, Effect, Outcome, Role, ShipTemplate, BATTLESHIP_CELLS, BATTLESHIP_SIZE,
    FLEET,
};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    Setup,
    Playing,
    Complete,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Ship {
    pub name: &'static str,
    pub cells: Vec<u8>,
    pub hits: u8,
}

impl Ship {
    pub fn is_sunk(&self) -> bool {
        self.hits as usize == self.cells.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pub ships: Vec<Ship>,
    /// Cells the opponent has fired at.
    pub fired: [bool; BATTLESHIP_CELLS],
}

impl Board {
    pub fn ship_at(&self, cell: u8) -> Option<&Ship> {
        self.ships.iter().find(|ship| ship.cells.contains(&cell))
    }

    pub fn all_sunk(&self) -> bool {
        self.ships.iter().all(Ship::is_sunk)
    }

    fn occupied(&self) -> [bool; BATTLESHIP_CELLS] {
        let mut occupied = [false; BATTLESHIP_CELLS];
        for cell in self.ships.iter().flat_map(|ship| ship.cells.iter()) {
            occupied[*cell as usize] = true;
        }
        occupied
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BattleshipState {
    pub boards: [Board; 2],
    pub ready: [bool; 2],
    pub turn: Role,
    pub phase: Phase,
    pub winner: Option<Role>,
    pub placement_attempts: u16,
}

impl BattleshipState {
    /// Board `role` is shooting at.
    pub fn target_board(&self, role: Role) -> &Board {
        &self.boards[role.opponent().index()]
    }
}

/// Cells covered by a ship anchored at `start`, or `None` if it would leave the board.
fn ship_cells(start: usize, size: u8, horizontal: bool) -> Option<Vec<u8>> {
    let (row, col) = (start / BATTLESHIP_SIZE, start % BATTLESHIP_SIZE);
    let size = size as usize;
    let fits = if horizontal {
        col + size <= BATTLESHIP_SIZE
    } else {
        row + size <= BATTLESHIP_SIZE
    };
    if !fits {
        return None;
    }
    let step = if horizontal { 1 } else { BATTLESHIP_SIZE };
    Some((0..size).map(|i| (start + i * step) as u8).collect())
}

fn is_free(occupied: &[bool; BATTLESHIP_CELLS], cells: &[u8]) -> bool {
    cells.iter().all(|&cell| !occupied[cell as usize])
}

fn place_ship(
    template: &ShipTemplate,
    occupied: &mut [bool; BATTLESHIP_CELLS],
    attempts: u16,
    rng: &mut GameRng,
) -> Result<Ship, GameError> {
    let random = (0..attempts).find_map(|_| {
        let horizontal = rng.next_u8() & 1 == 0;
        let start = rng.next_index(BATTLESHIP_CELLS);
        ship_cells(start, template.size, horizontal).filter(|cells| is_free(occupied, cells))
    });
    // Ordered scan when sampling keeps colliding.
    let cells = match random {
        Some(cells) => cells,
        None => [true, false]
            .into_iter()
            .flat_map(|horizontal| (0..BATTLESHIP_CELLS).map(move |start| (start, horizontal)))
            .find_map(|(start, horizontal)| {
                ship_cells(start, template.size, horizontal)
                    .filter(|cells| is_free(occupied, cells))
            })
            .ok_or_else(|| GameError::Invariant(format!("no room for {}", template.name)))?,
    };
    for &cell in &cells {
        occupied[cell as usize] = true;
    }
    Ok(Ship {
        name: template.name,
        cells,
        hits: 0,
    })
}

/// Places the standard fleet at random positions.
pub fn place_fleet(attempts: u16, rng: &mut GameRng) -> Result<Vec<Ship>, GameError> {
    let mut occupied = [false; BATTLESHIP_CELLS];
    FLEET
        .iter()
        .map(|template| place_ship(template, &mut occupied, attempts, rng))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellMark {
    Empty,
    Ship,
    Miss,
    Hit,
}

#[derive(Clone, Debug, Serialize)]
pub struct BattleshipView {
    pub phase: Phase,
    pub ready: [bool; 2],
    pub fleet: Vec<Ship>,
    /// Own board including incoming fire.
    pub own_board: Vec<CellMark>,
    /// Enemy board as seen by the viewer; unfired cells show as empty.
    pub target_board: Vec<CellMark>,
    pub enemy_sunk: Vec<Ship>,
}

pub struct Battleship;

impl RulesEngine for Battleship {
    type Config = BattleshipConfig;
    type State = BattleshipState;
    type Action = BattleshipAction;
    type Phase = Phase;
    type View = BattleshipView;

    fn init(config: &Self::Config, rng: &mut GameRng) -> Result<Self::State, GameError> {
        let board = |rng: &mut GameRng| -> Result<Board, GameError> {
            Ok(Board {
                ships: place_fleet(config.placement_attempts, rng)?,
                fired: [false; BATTLESHIP_CELLS],
            })
        };
        Ok(BattleshipState {
            boards: [board(rng)?, board(rng)?],
            ready: [false; 2],
            turn: Role::Player1,
            phase: Phase::Setup,
            winner: None,
            placement_attempts: config.placement_attempts,
        })
    }

    fn current_turn(state: &Self::State) -> Option<Role> {
        (state.phase != Phase::Complete).then_some(state.turn)
    }

    fn phase(state: &Self::State) -> Phase {
        state.phase
    }

    fn apply(
        state: &mut Self::State,
        role: Role,
        action: Self::Action,
        rng: &mut GameRng,
    ) -> Result<Vec<Effect>, GameError> {
        match (state.phase, action) {
            (Phase::Setup, BattleshipAction::Randomize) => {
                state.boards[role.index()].ships = place_fleet(state.placement_attempts, rng)?;
                Ok(vec![Effect::FleetPlaced { role }])
            }
            (Phase::Setup, BattleshipAction::Ready) => {
                state.ready[role.index()] = true;
                if state.ready.iter().all(|r| *r) {
                    state.phase = Phase::Playing;
                    state.turn = Role::Player1;
                } else {
                    state.turn = role.opponent();
                }
                Ok(vec![Effect::SeatReady { role }])
            }
            (Phase::Playing, BattleshipAction::Fire { cell }) => fire(state, role, cell),
            (phase, _) => Err(GameError::invalid_phase(phase)),
        }
    }

    fn check_terminal(state: &Self::State) -> Option<Outcome> {
        state.winner.map(Outcome::Winner)
    }

    fn legal_actions(state: &Self::State, role: Role) -> Vec<Self::Action> {
        if Self::current_turn(state) != Some(role) {
            return Vec::new();
        }
        match state.phase {
            Phase::Setup => vec![BattleshipAction::Randomize, BattleshipAction::Ready],
            Phase::Playing => unfired_cells(state.target_board(role))
                .map(|cell| BattleshipAction::Fire { cell })
                .collect(),
            Phase::Complete => Vec::new(),
        }
    }

    fn forced_action(state: &Self::State, role: Role) -> Option<Self::Action> {
        if Self::current_turn(state) != Some(role) {
            return None;
        }
        match state.phase {
            Phase::Setup => Some(BattleshipAction::Ready),
            Phase::Playing => unfired_cells(state.target_board(role))
                .next()
                .map(|cell| BattleshipAction::Fire { cell }),
            Phase::Complete => None,
        }
    }

    fn view(state: &Self::State, viewer: Role) -> Self::View {
        let own = &state.boards[viewer.index()];
        let enemy = state.target_board(viewer);
        let occupied = own.occupied();
        let enemy_occupied = enemy.occupied();

        let own_board = (0..BATTLESHIP_CELLS)
            .map(|i| match (occupied[i], own.fired[i]) {
                (true, true) => CellMark::Hit,
                (true, false) => CellMark::Ship,
                (false, true) => CellMark::Miss,
                (false, false) => CellMark::Empty,
            })
            .collect();
        let target_board = (0..BATTLESHIP_CELLS)
            .map(|i| match (enemy.fired[i], enemy_occupied[i]) {
                (false, _) => CellMark::Empty,
                (true, true) => CellMark::Hit,
                (true, false) => CellMark::Miss,
            })
            .collect();

        BattleshipView {
            phase: state.phase,
            ready: state.ready,
            fleet: own.ships.clone(),
            own_board,
            target_board,
            enemy_sunk: enemy.ships.iter().filter(|s| s.is_sunk()).cloned().collect(),
        }
    }
}

pub(crate) fn unfired_cells(board: &Board) -> impl Iterator<Item = u8> + '_ {
    (0..BATTLESHIP_CELLS as u8).filter(|&cell| !board.fired[cell as usize])
}

fn fire(state: &mut BattleshipState, role: Role, cell: u8) -> Result<Vec<Effect>, GameError> {
    if cell as usize >= BATTLESHIP_CELLS {
        return Err(GameError::IllegalMove("cell out of range"));
    }
    let board = &mut state.boards[role.opponent().index()];
    if board.fired[cell as usize] {
        return Err(GameError::IllegalMove("cell already fired"));
    }
    board.fired[cell as usize] = true;

    let mut sunk = None;
    let hit = match board.ships.iter_mut().find(|ship| ship.cells.contains(&cell)) {
        Some(ship) => {
            ship.hits += 1;
            if ship.hits as usize > ship.cells.len() {
                return Err(GameError::Invariant(format!("{} hit past its size", ship.name)));
            }
            if ship.is_sunk() {
                sunk = Some(ship.name.to_string());
            }
            true
        }
        None => false,
    };

    if board.all_sunk() {
        state.winner = Some(role);
        state.phase = Phase::Complete;
    } else {
        state.turn = role.opponent();
    }
    Ok(vec![Effect::ShotResolved {
        role,
        cell,
        hit,
        sunk,
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{test_rng, test_seed};
    use pengu_types::minigame::FLEET_CELLS;
    use proptest::prelude::*;

    fn playing_state() -> BattleshipState {
        let mut state = Battleship::init(&BattleshipConfig::default(), &mut test_rng()).unwrap();
        state.ready = [true; 2];
        state.phase = Phase::Playing;
        state
    }

    fn fire_at(state: &mut BattleshipState, cell: u8) -> Result<Vec<Effect>, GameError> {
        let role = state.turn;
        Battleship::apply(state, role, BattleshipAction::Fire { cell }, &mut test_rng())
    }

    fn assert_valid_fleet(ships: &[Ship]) {
        let mut seen = [false; BATTLESHIP_CELLS];
        let mut total = 0;
        for (ship, template) in ships.iter().zip(FLEET.iter()) {
            assert_eq!(ship.cells.len(), template.size as usize);
            let step = ship.cells[1] - ship.cells[0];
            assert!(step == 1 || step == BATTLESHIP_SIZE as u8);
            for pair in ship.cells.windows(2) {
                assert_eq!(pair[1] - pair[0], step);
                if step == 1 {
                    let row = |cell: u8| cell as usize / BATTLESHIP_SIZE;
                    assert_eq!(row(pair[0]), row(pair[1]));
                }
            }
            for &cell in &ship.cells {
                assert!((cell as usize) < BATTLESHIP_CELLS);
                assert!(!seen[cell as usize], "overlap at {cell}");
                seen[cell as usize] = true;
                total += 1;
            }
        }
        assert_eq!(total, FLEET_CELLS);
    }

    #[test]
    fn test_setup_order() {
        let mut state = Battleship::init(&BattleshipConfig::default(), &mut test_rng()).unwrap();
        assert_eq!(Battleship::current_turn(&state), Some(Role::Player1));
        let err = fire_at(&mut state, 0).unwrap_err();
        assert_eq!(err.code(), "INVALID_PHASE");

        let randomize = BattleshipAction::Randomize;
        let effects =
            Battleship::apply(&mut state, Role::Player1, randomize, &mut test_rng()).unwrap();
        assert_eq!(effects, vec![Effect::FleetPlaced { role: Role::Player1 }]);
        assert_valid_fleet(&state.boards[0].ships);

        Battleship::apply(&mut state, Role::Player1, BattleshipAction::Ready, &mut test_rng())
            .unwrap();
        assert_eq!(Battleship::current_turn(&state), Some(Role::Player2));
        Battleship::apply(&mut state, Role::Player2, BattleshipAction::Ready, &mut test_rng())
            .unwrap();
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(Battleship::current_turn(&state), Some(Role::Player1));
    }

    #[test]
    fn test_fire_hit_miss_and_repeat() {
        let mut state = playing_state();
        let target = state.boards[1].ships[0].cells[0];
        let effects = fire_at(&mut state, target).unwrap();
        assert_eq!(
            effects,
            vec![Effect::ShotResolved {
                role: Role::Player1,
                cell: target,
                hit: true,
                sunk: None
            }]
        );
        assert_eq!(state.turn, Role::Player2);

        let miss = unfired_cells(&state.boards[0])
            .find(|&c| state.boards[0].ship_at(c).is_none())
            .unwrap();
        let effects = fire_at(&mut state, miss).unwrap();
        assert!(matches!(effects[0], Effect::ShotResolved { hit: false, .. }));

        let err = fire_at(&mut state, target).unwrap_err();
        assert_eq!(err, GameError::IllegalMove("cell already fired"));
        let err = fire_at(&mut state, 100).unwrap_err();
        assert_eq!(err, GameError::IllegalMove("cell out of range"));
    }

    #[test]
    fn test_sinking_whole_fleet_wins() {
        let mut state = playing_state();
        let targets: Vec<u8> = state.boards[1]
            .ships
            .iter()
            .flat_map(|s| s.cells.clone())
            .collect();
        let mut sunk = Vec::new();
        for cell in targets {
            // Player2 burns a turn on its own target board between shots.
            if state.turn == Role::Player2 {
                let spare = unfired_cells(&state.boards[0])
                    .find(|&c| state.boards[0].ship_at(c).is_none())
                    .unwrap();
                fire_at(&mut state, spare).unwrap();
            }
            for effect in fire_at(&mut state, cell).unwrap() {
                if let Effect::ShotResolved { sunk: Some(name), .. } = effect {
                    sunk.push(name);
                }
            }
        }
        assert_eq!(sunk.len(), FLEET.len());
        assert_eq!(
            Battleship::check_terminal(&state),
            Some(Outcome::Winner(Role::Player1))
        );
        assert_eq!(Battleship::current_turn(&state), None);
    }

    #[test]
    fn test_view_hides_enemy_ships() {
        let mut state = playing_state();
        let target = state.boards[1].ships[4].cells[0];
        fire_at(&mut state, target).unwrap();

        let view = Battleship::view(&state, Role::Player1);
        assert_eq!(view.target_board[target as usize], CellMark::Hit);
        assert_eq!(
            view.target_board.iter().filter(|m| **m != CellMark::Empty).count(),
            1
        );
        assert!(view.enemy_sunk.is_empty());
        assert_eq!(
            view.own_board.iter().filter(|m| **m == CellMark::Ship).count(),
            FLEET_CELLS
        );

        let enemy_view = Battleship::view(&state, Role::Player2);
        assert_eq!(enemy_view.own_board[target as usize], CellMark::Hit);
    }

    #[test]
    fn test_ordered_scan_when_sampling_fails() {
        let ships = place_fleet(0, &mut test_rng()).unwrap();
        assert_valid_fleet(&ships);
        assert_eq!(ships[0].cells, vec![0, 1, 2, 3, 4]);
    }

    proptest! {
        #[test]
        fn placement_is_disjoint_and_in_bounds(seed in any::<u64>()) {
            let mut rng = GameRng::new(&test_seed(seed), seed, 0);
            let ships = place_fleet(100, &mut rng).unwrap();
            assert_valid_fleet(&ships);
        }

        #[test]
        fn ship_sunk_iff_every_cell_hit(
            seed in any::<u64>(),
            shots in proptest::collection::vec(0u8..100, 0..120),
        ) {
            let mut rng = GameRng::new(&test_seed(seed), seed, 0);
            let mut state = Battleship::init(&BattleshipConfig::default(), &mut rng).unwrap();
            state.ready = [true; 2];
            state.phase = Phase::Playing;
            for cell in shots {
                if Battleship::check_terminal(&state).is_some() {
                    break;
                }
                let role = state.turn;
                let _ =
                    Battleship::apply(&mut state, role, BattleshipAction::Fire { cell }, &mut rng);
            }
            for board in &state.boards {
                for ship in &board.ships {
                    let hit_cells = ship.cells.iter().filter(|c| board.fired[**c as usize]).count();
                    prop_assert_eq!(ship.hits as usize, hit_cells);
                    prop_assert_eq!(ship.is_sunk(), hit_cells == ship.cells.len());
                }
            }
        }
    }
}
