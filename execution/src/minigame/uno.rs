//! UNO for two players.
//!
//! Rules implemented:
//! - 108-card deck, 7 cards each, the first number card flipped to start the discard
//! - Skip and Reverse make the opponent lose their turn (the mover goes again)
//! - +2 and Wild +4 make the opponent draw and lose their turn
//! - Wilds wait for the mover to choose a colour before the turn moves on
//! - Draw takes one card and passes; the discard is reshuffled when the pile runs dry
//!
//! Calling UNO is tracked but never penalised.

use super::registry::UnoConfig;
use super::{GameError, GameRng, RulesEngine};
use pengu_types::minigame::{
    standard_uno_deck, Effect, Outcome, Role, UnoAction, UnoCard, UnoColor, UnoValue,
    UNO_DECK_SIZE,
};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    MustPlayOrDraw,
    WaitingForColor,
    Complete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnoState {
    pub hands: [Vec<UnoCard>; 2],
    /// Top of the pile is the last element.
    pub draw_pile: Vec<UnoCard>,
    /// Top card is the last element.
    pub discard: Vec<UnoCard>,
    pub active_color: UnoColor,
    /// `None` after a wild: only colour (or another wild) matches.
    pub active_value: Option<UnoValue>,
    pub turn: Role,
    pub phase: Phase,
    /// Cards the opponent draws once the pending wild colour is chosen.
    pub pending_penalty: u8,
    pub uno_called: [bool; 2],
    pub winner: Option<Role>,
}

impl UnoState {
    pub fn hand(&self, role: Role) -> &[UnoCard] {
        &self.hands[role.index()]
    }

    pub fn top_card(&self) -> Option<&UnoCard> {
        self.discard.last()
    }

    /// Whether a card could be drawn, counting what a reshuffle would recover.
    pub fn can_draw(&self) -> bool {
        !self.draw_pile.is_empty() || self.discard.len() > 1
    }

    fn playable(&self, role: Role) -> impl Iterator<Item = &UnoCard> {
        self.hand(role)
            .iter()
            .filter(|card| card.matches(self.active_color, self.active_value))
    }

    fn card_count(&self) -> usize {
        self.hands[0].len() + self.hands[1].len() + self.draw_pile.len() + self.discard.len()
    }
}

/// Takes the top card of the draw pile, reshuffling the discard (minus its top) if needed.
fn draw_one(state: &mut UnoState, rng: &mut GameRng, effects: &mut Vec<Effect>) -> Option<UnoCard> {
    if state.draw_pile.is_empty() && state.discard.len() > 1 {
        let top = state.discard.pop()?;
        let mut recovered = std::mem::replace(&mut state.discard, vec![top]);
        rng.shuffle(&mut recovered);
        effects.push(Effect::DiscardReshuffled {
            cards: recovered.len() as u8,
        });
        state.draw_pile = recovered;
    }
    state.draw_pile.pop()
}

/// Deals up to `count` cards to `role`; returns how many were actually dealt.
fn deal(
    state: &mut UnoState,
    role: Role,
    count: u8,
    rng: &mut GameRng,
    effects: &mut Vec<Effect>,
) -> u8 {
    let mut dealt = 0;
    for _ in 0..count {
        let Some(card) = draw_one(state, rng, effects) else {
            break;
        };
        state.hands[role.index()].push(card);
        dealt += 1;
    }
    if state.hands[role.index()].len() > 1 {
        state.uno_called[role.index()] = false;
    }
    if dealt > 0 {
        effects.push(Effect::UnoCardsDrawn { role, count: dealt });
    }
    dealt
}

/// Opponent draws the penalty (if any) and loses their turn.
fn punish_opponent(
    state: &mut UnoState,
    role: Role,
    penalty: u8,
    rng: &mut GameRng,
    effects: &mut Vec<Effect>,
) {
    let opponent = role.opponent();
    if penalty > 0 {
        deal(state, opponent, penalty, rng, effects);
    }
    effects.push(Effect::TurnSkipped { role: opponent });
    state.turn = role;
}

#[derive(Clone, Debug, Serialize)]
pub struct UnoView {
    pub phase: Phase,
    pub turn: Option<Role>,
    pub hand: Vec<UnoCard>,
    pub opponent_cards: usize,
    pub top_card: Option<UnoCard>,
    pub active_color: UnoColor,
    pub active_value: Option<UnoValue>,
    pub draw_pile: usize,
    pub uno_called: [bool; 2],
}

pub struct Uno;

impl RulesEngine for Uno {
    type Config = UnoConfig;
    type State = UnoState;
    type Action = UnoAction;
    type Phase = Phase;
    type View = UnoView;

    fn init(config: &Self::Config, rng: &mut GameRng) -> Result<Self::State, GameError> {
        let hand_size = config.starting_hand as usize;
        if hand_size == 0 || hand_size * 2 >= UNO_DECK_SIZE {
            return Err(GameError::Invariant(format!(
                "starting hand of {hand_size} cards cannot be dealt"
            )));
        }
        let mut draw_pile = standard_uno_deck();
        rng.shuffle(&mut draw_pile);

        let mut hands = [Vec::with_capacity(hand_size), Vec::with_capacity(hand_size)];
        for _ in 0..hand_size {
            for hand in hands.iter_mut() {
                let card = draw_pile
                    .pop()
                    .ok_or_else(|| GameError::Invariant("deck exhausted while dealing".into()))?;
                hand.push(card);
            }
        }

        // Flip until a number card shows; action cards go to the bottom of the pile.
        let start = loop {
            let card = draw_pile
                .pop()
                .ok_or_else(|| GameError::Invariant("no number card to start".into()))?;
            if card.is_number() {
                break card;
            }
            draw_pile.insert(0, card);
        };
        let active_color = start
            .color
            .ok_or_else(|| GameError::Invariant("number card without colour".into()))?;

        Ok(UnoState {
            hands,
            draw_pile,
            discard: vec![start],
            active_color,
            active_value: Some(start.value),
            turn: Role::Player1,
            phase: Phase::MustPlayOrDraw,
            pending_penalty: 0,
            uno_called: [false; 2],
            winner: None,
        })
    }

    fn current_turn(state: &Self::State) -> Option<Role> {
        match state.phase {
            Phase::Complete => None,
            _ => Some(state.turn),
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
        let mut effects = Vec::new();
        match action {
            UnoAction::Play { card } => {
                if state.phase != Phase::MustPlayOrDraw {
                    return Err(GameError::invalid_phase(state.phase));
                }
                let hand = &mut state.hands[role.index()];
                let position = hand
                    .iter()
                    .position(|c| *c == card)
                    .ok_or(GameError::IllegalMove("card not in hand"))?;
                if !card.matches(state.active_color, state.active_value) {
                    return Err(GameError::IllegalMove("card does not match"));
                }
                hand.remove(position);
                state.discard.push(card);
                effects.push(Effect::UnoCardPlayed { role, card });

                if state.hands[role.index()].is_empty() {
                    state.winner = Some(role);
                    state.phase = Phase::Complete;
                    if let Some(color) = card.color {
                        state.active_color = color;
                    }
                    state.active_value = (!card.is_wild()).then_some(card.value);
                } else if card.is_wild() {
                    state.active_value = None;
                    state.pending_penalty = card.value.penalty();
                    state.phase = Phase::WaitingForColor;
                } else {
                    if let Some(color) = card.color {
                        state.active_color = color;
                    }
                    state.active_value = Some(card.value);
                    if card.value.skips_opponent() {
                        punish_opponent(state, role, card.value.penalty(), rng, &mut effects);
                    } else {
                        state.turn = role.opponent();
                    }
                }
            }
            UnoAction::ChooseColor { color } => {
                if state.phase != Phase::WaitingForColor {
                    return Err(GameError::invalid_phase(state.phase));
                }
                state.active_color = color;
                state.phase = Phase::MustPlayOrDraw;
                effects.push(Effect::ColorChosen { role, color });
                let penalty = std::mem::take(&mut state.pending_penalty);
                if penalty > 0 {
                    punish_opponent(state, role, penalty, rng, &mut effects);
                } else {
                    state.turn = role.opponent();
                }
            }
            UnoAction::Draw => {
                if state.phase != Phase::MustPlayOrDraw {
                    return Err(GameError::invalid_phase(state.phase));
                }
                if !state.can_draw() {
                    return Err(GameError::IllegalMove("no cards left to draw"));
                }
                if deal(state, role, 1, rng, &mut effects) != 1 {
                    return Err(GameError::Invariant("draw pile empty after reshuffle".into()));
                }
                state.turn = role.opponent();
                effects.push(Effect::TurnPassed { role });
            }
            UnoAction::Pass => {
                if state.phase != Phase::MustPlayOrDraw {
                    return Err(GameError::invalid_phase(state.phase));
                }
                if state.can_draw() {
                    return Err(GameError::IllegalMove("draw before passing"));
                }
                state.turn = role.opponent();
                effects.push(Effect::TurnPassed { role });
            }
            UnoAction::CallUno => {
                if state.phase != Phase::MustPlayOrDraw {
                    return Err(GameError::invalid_phase(state.phase));
                }
                if state.hand(role).len() > 2 {
                    return Err(GameError::IllegalMove("too many cards to call UNO"));
                }
                if state.uno_called[role.index()] {
                    return Err(GameError::IllegalMove("UNO already called"));
                }
                state.uno_called[role.index()] = true;
                effects.push(Effect::UnoCalled { role });
            }
        }

        if state.card_count() != UNO_DECK_SIZE {
            return Err(GameError::Invariant(format!(
                "card count drifted to {}",
                state.card_count()
            )));
        }
        Ok(effects)
    }

    fn check_terminal(state: &Self::State) -> Option<Outcome> {
        state.winner.map(Outcome::Winner)
    }

    fn legal_actions(state: &Self::State, role: Role) -> Vec<Self::Action> {
        match state.phase {
            Phase::Complete => Vec::new(),
            Phase::WaitingForColor => UnoColor::ALL
                .into_iter()
                .map(|color| UnoAction::ChooseColor { color })
                .collect(),
            Phase::MustPlayOrDraw => {
                let mut actions: Vec<_> = state
                    .playable(role)
                    .map(|card| UnoAction::Play { card: *card })
                    .collect();
                actions.push(if state.can_draw() {
                    UnoAction::Draw
                } else {
                    UnoAction::Pass
                });
                if state.hand(role).len() <= 2 && !state.uno_called[role.index()] {
                    actions.push(UnoAction::CallUno);
                }
                actions
            }
        }
    }

    fn forced_action(state: &Self::State, _: Role) -> Option<Self::Action> {
        match state.phase {
            Phase::Complete => None,
            Phase::WaitingForColor => Some(UnoAction::ChooseColor {
                color: UnoColor::ALL[0],
            }),
            Phase::MustPlayOrDraw if state.can_draw() => Some(UnoAction::Draw),
            Phase::MustPlayOrDraw => Some(UnoAction::Pass),
        }
    }

    fn view(state: &Self::State, viewer: Role) -> Self::View {
        UnoView {
            phase: state.phase,
            turn: Self::current_turn(state),
            hand: state.hand(viewer).to_vec(),
            opponent_cards: state.hand(viewer.opponent()).len(),
            top_card: state.top_card().copied(),
            active_color: state.active_color,
            active_value: state.active_value,
            draw_pile: state.draw_pile.len(),
            uno_called: state.uno_called,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minigame::{apply_action, GameState};
    use crate::mocks::{test_rng, test_seed};
    use proptest::prelude::*;

    fn card(id: u8) -> UnoCard {
        UnoCard::from_id(id).unwrap()
    }

    fn new_state() -> UnoState {
        Uno::init(&UnoConfig::default(), &mut test_rng()).unwrap()
    }

    /// A state with hand-picked hands; every other card sits in the draw pile.
    fn arranged(p1: &[u8], p2: &[u8], top: u8) -> UnoState {
        let mut state = new_state();
        let used: Vec<u8> = p1.iter().chain(p2).chain([&top]).copied().collect();
        state.hands = [
            p1.iter().map(|&id| card(id)).collect(),
            p2.iter().map(|&id| card(id)).collect(),
        ];
        state.discard = vec![card(top)];
        state.draw_pile = (0..UNO_DECK_SIZE as u8)
            .filter(|id| !used.contains(id))
            .map(card)
            .collect();
        let top = card(top);
        state.active_color = top.color.unwrap_or(UnoColor::Red);
        state.active_value = Some(top.value);
        state.turn = Role::Player1;
        state
    }

    fn play(state: &mut UnoState, role: Role, id: u8) -> Result<Vec<Effect>, GameError> {
        Uno::apply(state, role, UnoAction::Play { card: card(id) }, &mut test_rng())
    }

    #[test]
    fn test_initial_deal() {
        let state = new_state();
        assert_eq!(state.hands[0].len(), 7);
        assert_eq!(state.hands[1].len(), 7);
        assert!(state.top_card().unwrap().is_number());
        assert_eq!(state.draw_pile.len(), UNO_DECK_SIZE - 15);
        assert_eq!(Uno::current_turn(&state), Some(Role::Player1));
    }

    #[test]
    fn test_matching_play_passes_turn() {
        // Red 3 (id 5) on red 7 (id 13).
        let mut state = arranged(&[5, 30], &[40, 41], 13);
        let effects = play(&mut state, Role::Player1, 5).unwrap();
        assert_eq!(
            effects,
            vec![Effect::UnoCardPlayed {
                role: Role::Player1,
                card: card(5)
            }]
        );
        assert_eq!(state.hands[0].len(), 1);
        assert_eq!(state.turn, Role::Player2);
        assert_eq!(state.active_value, Some(UnoValue::Number(3)));
    }

    #[test]
    fn test_non_matching_card_is_illegal() {
        // Yellow 5 (id 34) on red 7.
        let mut state = arranged(&[34, 1], &[40], 13);
        let err = play(&mut state, Role::Player1, 34).unwrap_err();
        assert_eq!(err, GameError::IllegalMove("card does not match"));
        let err = play(&mut state, Role::Player1, 77).unwrap_err();
        assert_eq!(err, GameError::IllegalMove("card not in hand"));
    }

    #[test]
    fn test_skip_keeps_the_turn() {
        // Red skip (id 19) on red 7.
        let mut state = arranged(&[19, 1], &[40, 41], 13);
        let effects = play(&mut state, Role::Player1, 19).unwrap();
        assert!(effects.contains(&Effect::TurnSkipped { role: Role::Player2 }));
        assert_eq!(state.turn, Role::Player1);
    }

    #[test]
    fn test_draw_two_penalises_opponent() {
        // Red +2 (id 23) on red 7.
        let mut state = arranged(&[23, 1], &[40, 41], 13);
        play(&mut state, Role::Player1, 23).unwrap();
        assert_eq!(state.hands[1].len(), 4);
        assert_eq!(state.turn, Role::Player1);
    }

    #[test]
    fn test_wild_draw_four_waits_for_colour() {
        let mut state = arranged(&[104, 1], &[40, 41], 13);
        play(&mut state, Role::Player1, 104).unwrap();
        assert_eq!(state.phase, Phase::WaitingForColor);
        assert_eq!(state.hands[1].len(), 2);
        assert_eq!(Uno::current_turn(&state), Some(Role::Player1));

        // Playing again before choosing is the wrong phase.
        let err = play(&mut state, Role::Player1, 1).unwrap_err();
        assert_eq!(err.code(), "INVALID_PHASE");
        // So is calling UNO, which the colour prompt never offers.
        assert!(!Uno::legal_actions(&state, Role::Player1).contains(&UnoAction::CallUno));
        let err = Uno::apply(&mut state, Role::Player1, UnoAction::CallUno, &mut test_rng())
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_PHASE");
        assert!(!state.uno_called[0]);

        let effects = Uno::apply(
            &mut state,
            Role::Player1,
            UnoAction::ChooseColor {
                color: UnoColor::Green,
            },
            &mut test_rng(),
        )
        .unwrap();
        assert!(effects.contains(&Effect::ColorChosen {
            role: Role::Player1,
            color: UnoColor::Green
        }));
        assert_eq!(state.hands[1].len(), 6);
        assert_eq!(state.active_color, UnoColor::Green);
        assert_eq!(state.active_value, None);
        assert_eq!(state.turn, Role::Player1);
        assert_eq!(state.phase, Phase::MustPlayOrDraw);
    }

    #[test]
    fn test_plain_wild_passes_after_colour() {
        let mut state = arranged(&[100, 1], &[40, 41], 13);
        play(&mut state, Role::Player1, 100).unwrap();
        Uno::apply(
            &mut state,
            Role::Player1,
            UnoAction::ChooseColor {
                color: UnoColor::Blue,
            },
            &mut test_rng(),
        )
        .unwrap();
        assert_eq!(state.turn, Role::Player2);
        assert_eq!(state.hands[1].len(), 2);
        // Only blue or wild can follow a wild.
        // Green 1 (id 51) no longer matches; blue 1 (id 76) does.
        assert!(!card(51).matches(state.active_color, state.active_value));
        assert!(card(76).matches(state.active_color, state.active_value));
    }

    #[test]
    fn test_emptying_hand_wins() {
        let mut state = arranged(&[5], &[40, 41], 13);
        play(&mut state, Role::Player1, 5).unwrap();
        assert_eq!(Uno::check_terminal(&state), Some(Outcome::Winner(Role::Player1)));
        assert_eq!(Uno::current_turn(&state), None);
        assert!(Uno::legal_actions(&state, Role::Player2).is_empty());
    }

    #[test]
    fn test_draw_adds_one_and_passes() {
        let mut state = arranged(&[34, 35], &[40, 41], 13);
        let effects =
            Uno::apply(&mut state, Role::Player1, UnoAction::Draw, &mut test_rng()).unwrap();
        assert!(effects.contains(&Effect::UnoCardsDrawn {
            role: Role::Player1,
            count: 1
        }));
        assert_eq!(state.hands[0].len(), 3);
        assert_eq!(state.turn, Role::Player2);
    }

    #[test]
    fn test_empty_pile_reshuffles_discard() {
        let mut state = arranged(&[34, 35], &[40, 41], 13);
        let mut pile = std::mem::take(&mut state.draw_pile);
        // Everything but the top card sits in the discard.
        pile.push(card(13));
        state.discard = pile;
        let effects =
            Uno::apply(&mut state, Role::Player1, UnoAction::Draw, &mut test_rng()).unwrap();
        assert!(effects
            .iter()
            .any(|e| matches!(e, Effect::DiscardReshuffled { .. })));
        assert_eq!(state.discard, vec![card(13)]);
        assert_eq!(state.hands[0].len(), 3);
    }

    #[test]
    fn test_pass_only_when_nothing_to_draw() {
        let mut state = arranged(&[34, 35], &[40, 41], 13);
        let err =
            Uno::apply(&mut state, Role::Player1, UnoAction::Pass, &mut test_rng()).unwrap_err();
        assert_eq!(err, GameError::IllegalMove("draw before passing"));

        // Park every remaining card in Player2's hand.
        let rest = std::mem::take(&mut state.draw_pile);
        state.hands[1].extend(rest);
        assert!(!state.can_draw());
        assert_eq!(
            Uno::forced_action(&state, Role::Player1),
            Some(UnoAction::Pass)
        );
        let err =
            Uno::apply(&mut state, Role::Player1, UnoAction::Draw, &mut test_rng()).unwrap_err();
        assert_eq!(err, GameError::IllegalMove("no cards left to draw"));
        Uno::apply(&mut state, Role::Player1, UnoAction::Pass, &mut test_rng()).unwrap();
        assert_eq!(state.turn, Role::Player2);
    }

    #[test]
    fn test_call_uno_is_declarative() {
        let mut state = arranged(&[5, 6], &[40, 41], 13);
        Uno::apply(&mut state, Role::Player1, UnoAction::CallUno, &mut test_rng()).unwrap();
        assert!(state.uno_called[0]);
        assert_eq!(state.turn, Role::Player1);

        let mut crowded = arranged(&[5, 6, 7], &[40, 41], 13);
        let call = UnoAction::CallUno;
        assert!(Uno::apply(&mut crowded, Role::Player1, call, &mut test_rng()).is_err());
    }

    #[test]
    fn test_forced_action_chooses_first_colour() {
        let mut state = arranged(&[100, 1], &[40, 41], 13);
        play(&mut state, Role::Player1, 100).unwrap();
        assert_eq!(
            Uno::forced_action(&state, Role::Player1),
            Some(UnoAction::ChooseColor {
                color: UnoColor::Red
            })
        );
    }

    #[test]
    fn test_view_hides_opponent_hand() {
        let state = arranged(&[5, 6, 7], &[40, 41], 13);
        let view = Uno::view(&state, Role::Player2);
        assert_eq!(view.hand.len(), 2);
        assert_eq!(view.opponent_cards, 3);
        assert_eq!(view.top_card, Some(card(13)));
    }

    proptest! {
        #[test]
        fn hand_sizes_follow_actions(
            seed in any::<u8>(),
            picks in proptest::collection::vec(any::<u16>(), 1..80),
        ) {
            let seed = test_seed(seed as u64);
            let mut rng = GameRng::new(&seed, 1, 0);
            let mut game = GameState::Uno(Uno::init(&UnoConfig::default(), &mut rng).unwrap());
            for (step, pick) in picks.into_iter().enumerate() {
                let Some(role) = game.current_turn() else { break };
                let actions = game.legal_actions(role);
                prop_assert!(!actions.is_empty());
                let action = actions[pick as usize % actions.len()];
                let before = match &game { GameState::Uno(s) => s.clone(), _ => unreachable!() };
                let mut rng = GameRng::new(&seed, 1, step as u32 + 1);
                apply_action(&mut game, role, action, &mut rng).unwrap();
                let GameState::Uno(after) = &game else { unreachable!() };
                let mover_before = before.hand(role).len();
                let mover_after = after.hand(role).len();
                match action {
                    pengu_types::minigame::Action::Uno(UnoAction::Draw) => {
                        prop_assert_eq!(mover_after, mover_before + 1);
                    }
                    pengu_types::minigame::Action::Uno(UnoAction::Play { .. }) => {
                        prop_assert_eq!(mover_after, mover_before - 1);
                    }
                    _ => prop_assert_eq!(mover_after, mover_before),
                }
                prop_assert_eq!(after.card_count(), UNO_DECK_SIZE);
            }
        }
    }
}
