//! Head-to-head Blackjack.
//!
//! Both seats play their own hand against a shared house dealer, Player1 first. Once both are
//! done the dealer plays out and each seat is scored against the dealer. The match winner is
//! decided head to head:
//! - both bust: draw
//! - one busts: the other wins
//! - otherwise the higher total wins; equal totals are a draw unless exactly one hand is a
//!   natural blackjack
//!
//! House rules: single shoe (1 deck by default), dealer stands on soft 17 unless configured,
//! no splits, no insurance. Double takes exactly one card and stands; it does not change the
//! pot.

use super::registry::BlackjackConfig;
use super::{GameError, GameRng, RulesEngine};
use pengu_types::minigame::{
    card_points, is_ace, BlackjackAction, Effect, HandResult, Outcome, Role,
};
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    Player1Turn,
    Player2Turn,
    DealerTurn,
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandStatus {
    Playing,
    Stood,
    Bust,
    Blackjack,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hand {
    pub cards: Vec<u8>,
    pub status: HandStatus,
    pub doubled: bool,
}

impl Hand {
    fn total(&self) -> u8 {
        hand_value(&self.cards).0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlackjackState {
    pub shoe: Vec<u8>,
    pub hands: [Hand; 2],
    pub dealer: Vec<u8>,
    pub phase: Phase,
    pub dealer_hits_soft_17: bool,
    pub results: Option<[HandResult; 2]>,
}

/// Returns `(total, is_soft)`: aces count 11 unless that would bust the hand.
pub fn hand_value(cards: &[u8]) -> (u8, bool) {
    let mut value: u16 = 0;
    let mut aces: u8 = 0;

    for &card in cards {
        if is_ace(card) {
            aces += 1;
            value += 11;
        } else {
            value += card_points(card) as u16;
        }
    }

    while value > 21 && aces > 0 {
        value -= 10;
        aces -= 1;
    }

    let is_soft = aces > 0 && value <= 21;
    (value.min(255) as u8, is_soft)
}

/// Check if hand is a blackjack (21 with 2 cards).
pub fn is_blackjack(cards: &[u8]) -> bool {
    cards.len() == 2 && hand_value(cards).0 == 21
}

fn draw(state: &mut BlackjackState, rng: &mut GameRng) -> Result<u8, GameError> {
    rng.draw_card(&mut state.shoe)
        .ok_or_else(|| GameError::Invariant("shoe exhausted".into()))
}

/// Result of a single seat against the dealer.
fn score_against_dealer(hand: &Hand, dealer: &[u8]) -> HandResult {
    let player = hand.total();
    let dealer_total = hand_value(dealer).0;
    let player_natural = hand.status == HandStatus::Blackjack;
    let dealer_natural = is_blackjack(dealer);

    if hand.status == HandStatus::Bust {
        return HandResult::Lose;
    }
    match (player_natural, dealer_natural) {
        (true, true) => return HandResult::Push,
        (true, false) => return HandResult::Blackjack,
        (false, true) => return HandResult::Lose,
        (false, false) => {}
    }
    if dealer_total > 21 {
        return HandResult::Win;
    }
    match player.cmp(&dealer_total) {
        Ordering::Greater => HandResult::Win,
        Ordering::Less => HandResult::Lose,
        Ordering::Equal => HandResult::Push,
    }
}

/// Moves play to the next seat that still has decisions, or runs the dealer.
fn advance(
    state: &mut BlackjackState,
    rng: &mut GameRng,
    effects: &mut Vec<Effect>,
) -> Result<(), GameError> {
    if state.phase == Phase::Player1Turn && state.hands[1].status == HandStatus::Playing {
        state.phase = Phase::Player2Turn;
        return Ok(());
    }
    state.phase = Phase::DealerTurn;
    play_dealer(state, rng, effects)
}

fn play_dealer(
    state: &mut BlackjackState,
    rng: &mut GameRng,
    effects: &mut Vec<Effect>,
) -> Result<(), GameError> {
    effects.push(Effect::DealerRevealed {
        cards: state.dealer.clone(),
        total: hand_value(&state.dealer).0,
    });

    let everyone_bust = state.hands.iter().all(|h| h.status == HandStatus::Bust);
    if !everyone_bust {
        loop {
            let (val, is_soft) = hand_value(&state.dealer);
            if val > 17 || (val == 17 && (!is_soft || !state.dealer_hits_soft_17)) {
                break;
            }
            let card = draw(state, rng)?;
            state.dealer.push(card);
            effects.push(Effect::CardDealt {
                role: None,
                card: Some(card),
            });
        }
    }

    let results = [
        score_against_dealer(&state.hands[0], &state.dealer),
        score_against_dealer(&state.hands[1], &state.dealer),
    ];
    for role in Role::BOTH {
        effects.push(Effect::HandResolved {
            role,
            result: results[role.index()],
            total: state.hands[role.index()].total(),
        });
    }
    state.results = Some(results);
    state.phase = Phase::Complete;
    Ok(())
}

/// Head-to-head winner once both hands are settled.
fn head_to_head(hands: &[Hand; 2]) -> Outcome {
    let bust = |h: &Hand| h.status == HandStatus::Bust;
    match (bust(&hands[0]), bust(&hands[1])) {
        (true, true) => return Outcome::Draw,
        (true, false) => return Outcome::Winner(Role::Player2),
        (false, true) => return Outcome::Winner(Role::Player1),
        (false, false) => {}
    }
    match hands[0].total().cmp(&hands[1].total()) {
        Ordering::Greater => Outcome::Winner(Role::Player1),
        Ordering::Less => Outcome::Winner(Role::Player2),
        Ordering::Equal => {
            let natural = |h: &Hand| h.status == HandStatus::Blackjack;
            match (natural(&hands[0]), natural(&hands[1])) {
                (true, false) => Outcome::Winner(Role::Player1),
                (false, true) => Outcome::Winner(Role::Player2),
                _ => Outcome::Draw,
            }
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SeatView {
    pub cards: Vec<u8>,
    pub total: u8,
    pub status: HandStatus,
    pub doubled: bool,
    pub result: Option<HandResult>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BlackjackView {
    pub phase: Phase,
    pub seats: [SeatView; 2],
    /// The hole card is `None` until the dealer plays.
    pub dealer: Vec<Option<u8>>,
    pub dealer_total: Option<u8>,
}

pub struct Blackjack;

impl RulesEngine for Blackjack {
    type Config = BlackjackConfig;
    type State = BlackjackState;
    type Action = BlackjackAction;
    type Phase = Phase;
    type View = BlackjackView;

    fn init(config: &Self::Config, rng: &mut GameRng) -> Result<Self::State, GameError> {
        let empty = Hand {
            cards: Vec::new(),
            status: HandStatus::Playing,
            doubled: false,
        };
        let mut state = BlackjackState {
            shoe: rng.create_shoe(config.decks),
            hands: [empty.clone(), empty],
            dealer: Vec::new(),
            phase: Phase::Player1Turn,
            dealer_hits_soft_17: config.dealer_hits_soft_17,
            results: None,
        };
        for _ in 0..2 {
            for seat in 0..2 {
                let card = draw(&mut state, rng)?;
                state.hands[seat].cards.push(card);
            }
            let card = draw(&mut state, rng)?;
            state.dealer.push(card);
        }
        for hand in state.hands.iter_mut() {
            if is_blackjack(&hand.cards) {
                hand.status = HandStatus::Blackjack;
            }
        }

        // Seats holding a natural have nothing to decide.
        if state.hands[0].status != HandStatus::Playing {
            if state.hands[1].status == HandStatus::Playing {
                state.phase = Phase::Player2Turn;
            } else {
                state.phase = Phase::DealerTurn;
                play_dealer(&mut state, rng, &mut Vec::new())?;
            }
        }
        Ok(state)
    }

    fn current_turn(state: &Self::State) -> Option<Role> {
        match state.phase {
            Phase::Player1Turn => Some(Role::Player1),
            Phase::Player2Turn => Some(Role::Player2),
            Phase::DealerTurn | Phase::Complete => None,
        }
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
        if Self::current_turn(state) != Some(role) {
            return Err(GameError::invalid_phase(state.phase));
        }
        let seat = role.index();
        if state.hands[seat].status != HandStatus::Playing {
            return Err(GameError::Invariant(format!("{role} acting on a settled hand")));
        }

        let mut effects = Vec::new();
        match action {
            BlackjackAction::Hit => {
                let card = draw(state, rng)?;
                let hand = &mut state.hands[seat];
                hand.cards.push(card);
                effects.push(Effect::CardDealt {
                    role: Some(role),
                    card: Some(card),
                });
                let total = hand.total();
                if total > 21 {
                    hand.status = HandStatus::Bust;
                    effects.push(Effect::Busted { role, total });
                } else if total == 21 {
                    hand.status = HandStatus::Stood;
                    effects.push(Effect::Stood { role, total });
                }
            }
            BlackjackAction::Stand => {
                let hand = &mut state.hands[seat];
                hand.status = HandStatus::Stood;
                effects.push(Effect::Stood {
                    role,
                    total: hand.total(),
                });
            }
            BlackjackAction::Double => {
                if state.hands[seat].cards.len() != 2 {
                    return Err(GameError::IllegalMove("double only on two cards"));
                }
                let card = draw(state, rng)?;
                let hand = &mut state.hands[seat];
                hand.cards.push(card);
                hand.doubled = true;
                effects.push(Effect::CardDealt {
                    role: Some(role),
                    card: Some(card),
                });
                let total = hand.total();
                if total > 21 {
                    hand.status = HandStatus::Bust;
                    effects.push(Effect::Busted { role, total });
                } else {
                    hand.status = HandStatus::Stood;
                    effects.push(Effect::Stood { role, total });
                }
            }
        }

        if state.hands[seat].status != HandStatus::Playing {
            advance(state, rng, &mut effects)?;
        }
        Ok(effects)
    }

    fn check_terminal(state: &Self::State) -> Option<Outcome> {
        (state.phase == Phase::Complete).then(|| head_to_head(&state.hands))
    }

    fn legal_actions(state: &Self::State, role: Role) -> Vec<Self::Action> {
        if Self::current_turn(state) != Some(role) {
            return Vec::new();
        }
        let mut actions = vec![BlackjackAction::Hit, BlackjackAction::Stand];
        if state.hands[role.index()].cards.len() == 2 {
            actions.push(BlackjackAction::Double);
        }
        actions
    }

    fn forced_action(state: &Self::State, role: Role) -> Option<Self::Action> {
        (Self::current_turn(state) == Some(role)).then_some(BlackjackAction::Stand)
    }

    fn view(state: &Self::State, _: Role) -> Self::View {
        let revealed = matches!(state.phase, Phase::DealerTurn | Phase::Complete);
        let seat = |index: usize| {
            let hand = &state.hands[index];
            SeatView {
                cards: hand.cards.clone(),
                total: hand.total(),
                status: hand.status,
                doubled: hand.doubled,
                result: state.results.map(|r| r[index]),
            }
        };
        BlackjackView {
            phase: state.phase,
            seats: [seat(0), seat(1)],
            dealer: state
                .dealer
                .iter()
                .enumerate()
                .map(|(i, &card)| (revealed || i == 0).then_some(card))
                .collect(),
            dealer_total: revealed.then(|| hand_value(&state.dealer).0),
        }
    }
}
