//! Two-player Monopoly.
//!
//! Classic 40-space board without houses, hotels, mortgages or trading. Rent is the printed base
//! rent, doubled when the owner holds the whole colour group. Railroads charge 25, 50, 100 or
//! 200 depending on how many the owner holds; utilities charge 4x the dice total (10x with
//! both). A player whose money drops below zero is bankrupt and loses.

use super::registry::MonopolyConfig;
use super::{GameError, GameRng, RulesEngine};
use pengu_types::minigame::{
    board_space, CardDeckKind, CardEffect, DeckCard, Effect, MonopolyAction, Outcome, Role,
    SpaceKind, CHANCE_CARDS, COMMUNITY_CHEST_CARDS, MONOPOLY_JAIL_SPACE,
    MONOPOLY_MAX_DOUBLES, MONOPOLY_MAX_JAIL_TURNS, MONOPOLY_SPACES,
};
use serde::Serialize;

const RAILROAD_BASE_RENT: i64 = 25;
const UTILITY_MULTIPLIERS: [i64; 2] = [4, 10];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    AwaitingRoll,
    AwaitingBuyDecision,
    AwaitingEndTurn,
    Complete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonopolyState {
    pub positions: [u8; 2],
    pub money: [i64; 2],
    pub owners: [Option<Role>; MONOPOLY_SPACES],
    pub in_jail: [bool; 2],
    /// Failed doubles attempts while jailed.
    pub jail_turns: [u8; 2],
    /// Consecutive doubles rolled by the mover this turn.
    pub doubles: u8,
    /// The mover rolled doubles and rolls again once the current space is resolved.
    pub extra_roll: bool,
    pub last_roll: Option<[u8; 2]>,
    pub pending_purchase: Option<u8>,
    pub bankrupt: Option<Role>,
    pub turn: Role,
    pub phase: Phase,
    pub go_salary: i64,
    pub jail_bail: i64,
}

impl MonopolyState {
    fn owned_by(&self, role: Role) -> impl Iterator<Item = u8> + '_ {
        self.owners
            .iter()
            .enumerate()
            .filter(move |(_, owner)| **owner == Some(role))
            .map(|(index, _)| index as u8)
    }

    fn count_owned(&self, role: Role, kind: SpaceKind) -> usize {
        self.owned_by(role)
            .filter(|&index| board_space(index).kind == kind)
            .count()
    }

    fn dice_total(&self) -> i64 {
        self.last_roll.map_or(0, |[a, b]| (a + b) as i64)
    }

    /// Rent owed by a visitor to `space`, or zero if unowned or owned by the visitor.
    pub fn rent_for(&self, space: u8, visitor: Role) -> i64 {
        let Some(owner) = self.owners[space as usize] else {
            return 0;
        };
        if owner == visitor {
            return 0;
        }
        let square = board_space(space);
        match square.kind {
            SpaceKind::Property(group) => {
                let monopoly = group
                    .members()
                    .all(|member| self.owners[member as usize] == Some(owner));
                if monopoly {
                    square.rent * 2
                } else {
                    square.rent
                }
            }
            SpaceKind::Railroad => {
                let held = self.count_owned(owner, SpaceKind::Railroad) as u32;
                RAILROAD_BASE_RENT << held.saturating_sub(1)
            }
            SpaceKind::Utility => {
                let held = self.count_owned(owner, SpaceKind::Utility);
                UTILITY_MULTIPLIERS[held.clamp(1, 2) - 1] * self.dice_total()
            }
            _ => 0,
        }
    }
}

fn credit(state: &mut MonopolyState, role: Role, delta: i64, effects: &mut Vec<Effect>) {
    state.money[role.index()] += delta;
    effects.push(Effect::MoneyChanged { role, delta });
}

fn send_to_jail(state: &mut MonopolyState, role: Role, effects: &mut Vec<Effect>) {
    let from = state.positions[role.index()];
    state.positions[role.index()] = MONOPOLY_JAIL_SPACE;
    state.in_jail[role.index()] = true;
    state.jail_turns[role.index()] = 0;
    state.doubles = 0;
    state.extra_roll = false;
    effects.push(Effect::TokenMoved {
        role,
        from,
        to: MONOPOLY_JAIL_SPACE,
    });
    effects.push(Effect::SentToJail { role });
}

/// Moves a token to `to`, paying the GO salary if the move passes or lands on GO.
fn move_to(state: &mut MonopolyState, role: Role, to: u8, effects: &mut Vec<Effect>) {
    let from = state.positions[role.index()];
    state.positions[role.index()] = to;
    effects.push(Effect::TokenMoved { role, from, to });
    if to <= from {
        state.money[role.index()] += state.go_salary;
        effects.push(Effect::GoSalary {
            role,
            amount: state.go_salary,
        });
    }
}

/// Moves a token forward by `steps`, wrapping around the board.
pub(crate) fn move_forward(
    state: &mut MonopolyState,
    role: Role,
    steps: u8,
    effects: &mut Vec<Effect>,
) {
    let from = state.positions[role.index()];
    let to = ((from as usize + steps as usize) % MONOPOLY_SPACES) as u8;
    move_to(state, role, to, effects);
}

/// Resolves the space a token just landed on.
fn resolve_space(
    state: &mut MonopolyState,
    role: Role,
    rng: &mut GameRng,
    effects: &mut Vec<Effect>,
) -> Result<(), GameError> {
    let position = state.positions[role.index()];
    let square = board_space(position);
    match square.kind {
        SpaceKind::Property(_) | SpaceKind::Railroad | SpaceKind::Utility => {
            match state.owners[position as usize] {
                None => {
                    state.pending_purchase = Some(position);
                    state.phase = Phase::AwaitingBuyDecision;
                }
                Some(owner) if owner != role => {
                    let amount = state.rent_for(position, role);
                    state.money[role.index()] -= amount;
                    state.money[owner.index()] += amount;
                    effects.push(Effect::RentPaid {
                        payer: role,
                        space: position,
                        amount,
                    });
                }
                Some(_) => {}
            }
        }
        SpaceKind::Tax(amount) => {
            state.money[role.index()] -= amount;
            effects.push(Effect::TaxPaid { role, amount });
        }
        SpaceKind::Chance => draw_card(state, role, CardDeckKind::Chance, rng, effects)?,
        SpaceKind::CommunityChest => {
            draw_card(state, role, CardDeckKind::CommunityChest, rng, effects)?
        }
        SpaceKind::GoToJail => send_to_jail(state, role, effects),
        SpaceKind::Go | SpaceKind::Jail | SpaceKind::FreeParking => {}
    }
    Ok(())
}

fn draw_card(
    state: &mut MonopolyState,
    role: Role,
    deck: CardDeckKind,
    rng: &mut GameRng,
    effects: &mut Vec<Effect>,
) -> Result<(), GameError> {
    let cards: &[DeckCard] = match deck {
        CardDeckKind::Chance => &CHANCE_CARDS,
        CardDeckKind::CommunityChest => &COMMUNITY_CHEST_CARDS,
    };
    let card = rng
        .pick(cards)
        .ok_or_else(|| GameError::Invariant("empty card deck".into()))?;
    effects.push(Effect::CardDrawn {
        role,
        deck,
        text: card.text.to_string(),
    });

    match card.effect {
        CardEffect::Collect(amount) => credit(state, role, amount, effects),
        CardEffect::Pay(amount) => credit(state, role, -amount, effects),
        CardEffect::CollectFromOpponent(amount) => {
            credit(state, role.opponent(), -amount, effects);
            credit(state, role, amount, effects);
        }
        CardEffect::AdvanceTo(target) => {
            move_to(state, role, target, effects);
            resolve_space(state, role, rng, effects)?;
        }
        CardEffect::MoveBack(steps) => {
            let from = state.positions[role.index()];
            let to = ((from as usize + MONOPOLY_SPACES - steps as usize) % MONOPOLY_SPACES) as u8;
            state.positions[role.index()] = to;
            effects.push(Effect::TokenMoved { role, from, to });
            resolve_space(state, role, rng, effects)?;
        }
        CardEffect::GoToJail => send_to_jail(state, role, effects),
    }
    Ok(())
}

/// Phase to enter once the mover's landing has been fully resolved.
fn settle_turn(state: &mut MonopolyState, role: Role, effects: &mut Vec<Effect>) {
    for seat in [role, role.opponent()] {
        if state.money[seat.index()] < 0 {
            state.bankrupt = Some(seat);
            state.pending_purchase = None;
            state.phase = Phase::Complete;
            effects.push(Effect::Bankrupt { role: seat });
            return;
        }
    }
    if state.phase == Phase::AwaitingBuyDecision {
        return;
    }
    state.phase = if state.extra_roll {
        Phase::AwaitingRoll
    } else {
        Phase::AwaitingEndTurn
    };
}

fn roll(
    state: &mut MonopolyState,
    role: Role,
    rng: &mut GameRng,
    effects: &mut Vec<Effect>,
) -> Result<(), GameError> {
    let dice = [rng.roll_die(), rng.roll_die()];
    let is_double = dice[0] == dice[1];
    let steps = dice[0] + dice[1];
    state.last_roll = Some(dice);
    state.extra_roll = false;
    effects.push(Effect::DiceRolled { role, dice });

    let seat = role.index();
    if state.in_jail[seat] {
        if is_double {
            state.in_jail[seat] = false;
            state.jail_turns[seat] = 0;
            effects.push(Effect::LeftJail {
                role,
                paid_bail: false,
            });
        } else {
            state.jail_turns[seat] += 1;
            if state.jail_turns[seat] < MONOPOLY_MAX_JAIL_TURNS {
                state.phase = Phase::AwaitingEndTurn;
                return Ok(());
            }
            let bail = state.jail_bail;
            state.money[seat] -= bail;
            state.in_jail[seat] = false;
            state.jail_turns[seat] = 0;
            effects.push(Effect::MoneyChanged { role, delta: -bail });
            effects.push(Effect::LeftJail {
                role,
                paid_bail: true,
            });
        }
    } else if is_double {
        state.doubles += 1;
        if state.doubles >= MONOPOLY_MAX_DOUBLES {
            send_to_jail(state, role, effects);
            state.phase = Phase::AwaitingEndTurn;
            return Ok(());
        }
        state.extra_roll = true;
    }

    move_forward(state, role, steps, effects);
    resolve_space(state, role, rng, effects)
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatView {
    pub position: u8,
    pub money: i64,
    pub in_jail: bool,
    pub properties: Vec<u8>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonopolyView {
    pub phase: Phase,
    pub turn: Role,
    pub seats: [SeatView; 2],
    pub last_roll: Option<[u8; 2]>,
    pub pending_purchase: Option<u8>,
}

pub struct Monopoly;

impl RulesEngine for Monopoly {
    type Config = MonopolyConfig;
    type State = MonopolyState;
    type Action = MonopolyAction;
    type Phase = Phase;
    type View = MonopolyView;

    fn init(config: &Self::Config, _: &mut GameRng) -> Result<Self::State, GameError> {
        Ok(MonopolyState {
            positions: [0; 2],
            money: [config.starting_money; 2],
            owners: [None; MONOPOLY_SPACES],
            in_jail: [false; 2],
            jail_turns: [0; 2],
            doubles: 0,
            extra_roll: false,
            last_roll: None,
            pending_purchase: None,
            bankrupt: None,
            turn: Role::Player1,
            phase: Phase::AwaitingRoll,
            go_salary: config.go_salary,
            jail_bail: config.jail_bail,
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
        let mut effects = Vec::new();
        let seat = role.index();
        match (state.phase, action) {
            (Phase::AwaitingRoll, MonopolyAction::Roll) => {
                roll(state, role, rng, &mut effects)?;
                settle_turn(state, role, &mut effects);
            }
            (Phase::AwaitingRoll, MonopolyAction::PayBail) => {
                if !state.in_jail[seat] {
                    return Err(GameError::IllegalMove("not in jail"));
                }
                let bail = state.jail_bail;
                state.in_jail[seat] = false;
                state.jail_turns[seat] = 0;
                credit(state, role, -bail, &mut effects);
                effects.push(Effect::LeftJail {
                    role,
                    paid_bail: true,
                });
                settle_turn(state, role, &mut effects);
                if state.phase != Phase::Complete {
                    state.phase = Phase::AwaitingRoll;
                }
            }
            (Phase::AwaitingBuyDecision, MonopolyAction::Buy) => {
                let space = state.pending_purchase.ok_or_else(|| {
                    GameError::Invariant("buy decision without a pending space".into())
                })?;
                let price = board_space(space).price;
                if state.money[seat] < price {
                    return Err(GameError::IllegalMove("cannot afford property"));
                }
                state.money[seat] -= price;
                state.owners[space as usize] = Some(role);
                state.pending_purchase = None;
                state.phase = Phase::AwaitingRoll;
                effects.push(Effect::PropertyBought { role, space, price });
                settle_turn(state, role, &mut effects);
            }
            (Phase::AwaitingBuyDecision, MonopolyAction::Decline) => {
                let space = state.pending_purchase.take().ok_or_else(|| {
                    GameError::Invariant("buy decision without a pending space".into())
                })?;
                state.phase = Phase::AwaitingRoll;
                effects.push(Effect::PurchaseDeclined { role, space });
                settle_turn(state, role, &mut effects);
            }
            (Phase::AwaitingEndTurn, MonopolyAction::EndTurn) => {
                effects.push(Effect::TurnEnded { role });
                state.turn = role.opponent();
                state.doubles = 0;
                state.extra_roll = false;
                state.phase = Phase::AwaitingRoll;
            }
            (phase, _) => return Err(GameError::invalid_phase(phase)),
        }

        if state.positions.iter().any(|&p| p as usize >= MONOPOLY_SPACES) {
            return Err(GameError::Invariant("token off the board".into()));
        }
        Ok(effects)
    }

    fn check_terminal(state: &Self::State) -> Option<Outcome> {
        state
            .bankrupt
            .map(|loser| Outcome::Winner(loser.opponent()))
    }

    fn legal_actions(state: &Self::State, role: Role) -> Vec<Self::Action> {
        if Self::current_turn(state) != Some(role) {
            return Vec::new();
        }
        match state.phase {
            Phase::AwaitingRoll => {
                let mut actions = vec![MonopolyAction::Roll];
                if state.in_jail[role.index()] {
                    actions.push(MonopolyAction::PayBail);
                }
                actions
            }
            Phase::AwaitingBuyDecision => {
                let affordable = state
                    .pending_purchase
                    .is_some_and(|space| board_space(space).price <= state.money[role.index()]);
                if affordable {
                    vec![MonopolyAction::Buy, MonopolyAction::Decline]
                } else {
                    vec![MonopolyAction::Decline]
                }
            }
            Phase::AwaitingEndTurn => vec![MonopolyAction::EndTurn],
            Phase::Complete => Vec::new(),
        }
    }

    fn forced_action(state: &Self::State, role: Role) -> Option<Self::Action> {
        if Self::current_turn(state) != Some(role) {
            return None;
        }
        match state.phase {
            Phase::AwaitingRoll => Some(MonopolyAction::Roll),
            Phase::AwaitingBuyDecision => Some(MonopolyAction::Decline),
            Phase::AwaitingEndTurn => Some(MonopolyAction::EndTurn),
            Phase::Complete => None,
        }
    }

    fn view(state: &Self::State, _: Role) -> Self::View {
        let seat = |role: Role| SeatView {
            position: state.positions[role.index()],
            money: state.money[role.index()],
            in_jail: state.in_jail[role.index()],
            properties: state.owned_by(role).collect(),
        };
        MonopolyView {
            phase: state.phase,
            turn: state.turn,
            seats: [seat(Role::Player1), seat(Role::Player2)],
            last_roll: state.last_roll,
            pending_purchase: state.pending_purchase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::test_rng;
    use pengu_types::minigame::{MONOPOLY_GO_SALARY, MONOPOLY_STARTING_MONEY};

    fn new_state() -> MonopolyState {
        Monopoly::init(&MonopolyConfig::default(), &mut test_rng()).unwrap()
    }

    #[test]
    fn test_wraparound_pays_go_once() {
        let mut state = new_state();
        state.positions[0] = 38;
        let mut effects = Vec::new();
        move_forward(&mut state, Role::Player1, 5, &mut effects);

        assert_eq!(state.positions[0], 3);
        assert_eq!(
            state.money[0],
            MONOPOLY_STARTING_MONEY + MONOPOLY_GO_SALARY
        );
        let salaries = effects
            .iter()
            .filter(|e| matches!(e, Effect::GoSalary { .. }))
            .count();
        assert_eq!(salaries, 1);
    }

    #[test]
    fn test_no_salary_without_passing_go() {
        let mut state = new_state();
        let mut effects = Vec::new();
        move_forward(&mut state, Role::Player1, 7, &mut effects);
        assert_eq!(state.positions[0], 7);
        assert_eq!(state.money[0], MONOPOLY_STARTING_MONEY);
    }

    #[test]
    fn test_jail_never_pays_salary() {
        let mut state = new_state();
        state.positions[0] = 30;
        let mut effects = Vec::new();
        send_to_jail(&mut state, Role::Player1, &mut effects);
        assert_eq!(state.positions[0], MONOPOLY_JAIL_SPACE);
        assert!(state.in_jail[0]);
        assert_eq!(state.money[0], MONOPOLY_STARTING_MONEY);
    }

    #[test]
    fn test_rent_rules() {
        let mut state = new_state();
        // Mediterranean alone, then the full brown group.
        state.owners[1] = Some(Role::Player2);
        assert_eq!(state.rent_for(1, Role::Player1), 2);
        state.owners[3] = Some(Role::Player2);
        assert_eq!(state.rent_for(1, Role::Player1), 4);
        assert_eq!(state.rent_for(1, Role::Player2), 0);

        state.owners[5] = Some(Role::Player2);
        assert_eq!(state.rent_for(5, Role::Player1), 25);
        state.owners[15] = Some(Role::Player2);
        state.owners[25] = Some(Role::Player2);
        assert_eq!(state.rent_for(5, Role::Player1), 100);

        state.last_roll = Some([3, 4]);
        state.owners[12] = Some(Role::Player2);
        assert_eq!(state.rent_for(12, Role::Player1), 28);
        state.owners[28] = Some(Role::Player2);
        assert_eq!(state.rent_for(12, Role::Player1), 70);
    }

    #[test]
    fn test_buy_requires_decision_phase() {
        let mut state = new_state();
        let err = Monopoly::apply(&mut state, Role::Player1, MonopolyAction::Buy, &mut test_rng())
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_PHASE");
    }

    #[test]
    fn test_buy_and_decline() {
        let mut state = new_state();
        state.positions[0] = 39;
        state.pending_purchase = Some(39);
        state.phase = Phase::AwaitingBuyDecision;

        let effects =
            Monopoly::apply(&mut state, Role::Player1, MonopolyAction::Buy, &mut test_rng())
                .unwrap();
        assert_eq!(
            effects,
            vec![Effect::PropertyBought {
                role: Role::Player1,
                space: 39,
                price: 400
            }]
        );
        assert_eq!(state.owners[39], Some(Role::Player1));
        assert_eq!(state.money[0], MONOPOLY_STARTING_MONEY - 400);
        assert_eq!(state.phase, Phase::AwaitingEndTurn);
        assert_eq!(Monopoly::view(&state, Role::Player2).seats[0].properties, vec![39]);

        let mut broke = new_state();
        broke.money[0] = 10;
        broke.pending_purchase = Some(39);
        broke.phase = Phase::AwaitingBuyDecision;
        assert_eq!(
            Monopoly::legal_actions(&broke, Role::Player1),
            vec![MonopolyAction::Decline]
        );
        let err = Monopoly::apply(&mut broke, Role::Player1, MonopolyAction::Buy, &mut test_rng())
            .unwrap_err();
        assert_eq!(err, GameError::IllegalMove("cannot afford property"));
    }

    #[test]
    fn test_doubles_roll_again_after_purchase() {
        let mut state = new_state();
        state.pending_purchase = Some(6);
        state.phase = Phase::AwaitingBuyDecision;
        state.extra_roll = true;
        Monopoly::apply(&mut state, Role::Player1, MonopolyAction::Decline, &mut test_rng())
            .unwrap();
        assert_eq!(state.phase, Phase::AwaitingRoll);
        assert_eq!(Monopoly::current_turn(&state), Some(Role::Player1));
    }

    #[test]
    fn test_bail_and_bankruptcy() {
        let mut state = new_state();
        let pay_bail = MonopolyAction::PayBail;
        let err =
            Monopoly::apply(&mut state, Role::Player1, pay_bail, &mut test_rng()).unwrap_err();
        assert_eq!(err, GameError::IllegalMove("not in jail"));

        state.in_jail[0] = true;
        state.money[0] = 20;
        Monopoly::apply(&mut state, Role::Player1, MonopolyAction::PayBail, &mut test_rng())
            .unwrap();
        assert_eq!(state.phase, Phase::Complete);
        assert_eq!(
            Monopoly::check_terminal(&state),
            Some(Outcome::Winner(Role::Player2))
        );
        assert_eq!(Monopoly::current_turn(&state), None);
    }

    #[test]
    fn test_rolling_keeps_token_on_board() {
        let mut state = new_state();
        let mut rng = test_rng();
        for _ in 0..200 {
            if Monopoly::check_terminal(&state).is_some() {
                break;
            }
            let role = Monopoly::current_turn(&state).unwrap();
            let action = Monopoly::forced_action(&state, role).unwrap();
            Monopoly::apply(&mut state, role, action, &mut rng).unwrap();
            assert!(state.positions.iter().all(|&p| (p as usize) < MONOPOLY_SPACES));
            assert_eq!(
                state.pending_purchase.is_some(),
                state.phase == Phase::AwaitingBuyDecision
            );
        }
    }

    #[test]
    fn test_end_turn_passes_control() {
        let mut state = new_state();
        state.phase = Phase::AwaitingEndTurn;
        state.doubles = 2;
        Monopoly::apply(&mut state, Role::Player1, MonopolyAction::EndTurn, &mut test_rng())
            .unwrap();
        assert_eq!(state.turn, Role::Player2);
        assert_eq!(state.doubles, 0);
        assert_eq!(state.phase, Phase::AwaitingRoll);
    }
}
