//! Wager settlement.
//!
//! A winner collects both stakes; a draw or an aborted match refunds each seat its own stake.
//! Token wagers follow the same rule on `token_amount` and additionally produce
//! [`TokenPayout`] instructions for the wallet subsystem. Transfer confirmation arrives later
//! and only ever touches [`PaymentStatus`]; the match itself is complete as soon as it is
//! settled.

use pengu_types::minigame::{Match, Outcome, Role};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettlementError {
    #[error("payout overflow for match {match_id}")]
    Overflow { match_id: u64 },
    #[error("match {match_id} already settled as {settled:?}")]
    OutcomeMismatch { match_id: u64, settled: Outcome },
    #[error("match {match_id} payment cannot move from {from:?} to {to:?}")]
    PaymentTransition {
        match_id: u64,
        from: PaymentStatus,
        to: PaymentStatus,
    },
}

/// Transfer state of a settlement's token payouts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum PaymentStatus {
    /// Coin-only wager; nothing leaves the arcade.
    NotRequired,
    Pending,
    Confirmed { signature: String },
    Failed { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub role: Role,
    pub participant_id: String,
    pub amount: u64,
}

/// Instruction for the wallet subsystem to move tokens to a seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayout {
    pub recipient: String,
    pub amount: u64,
    pub mint_address: String,
    pub symbol: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementRecord {
    pub match_id: u64,
    pub outcome: Outcome,
    pub payouts: Vec<Payout>,
    pub token_payouts: Vec<TokenPayout>,
    pub payment_status: PaymentStatus,
    pub settled_at_ms: u64,
}

impl SettlementRecord {
    pub fn payout_for(&self, role: Role) -> u64 {
        self.payouts
            .iter()
            .filter(|p| p.role == role)
            .map(|p| p.amount)
            .sum()
    }

    /// Records the wallet's answer for the token transfer. Only a `Pending` transfer can
    /// resolve, and only to `Confirmed` or `Failed`.
    pub fn update_payment(&mut self, status: PaymentStatus) -> Result<(), SettlementError> {
        match (&self.payment_status, &status) {
            (PaymentStatus::Pending, PaymentStatus::Confirmed { .. })
            | (PaymentStatus::Pending, PaymentStatus::Failed { .. }) => {
                self.payment_status = status;
                Ok(())
            }
            _ => Err(SettlementError::PaymentTransition {
                match_id: self.match_id,
                from: self.payment_status.clone(),
                to: status,
            }),
        }
    }
}

/// Splits `stake` per seat for an outcome: `2 * stake` to a winner, `stake` each otherwise.
fn split(stake: u64, outcome: Outcome, match_id: u64) -> Result<[u64; 2], SettlementError> {
    match outcome.winner() {
        Some(winner) => {
            let pot = stake
                .checked_mul(2)
                .ok_or(SettlementError::Overflow { match_id })?;
            let mut amounts = [0; 2];
            amounts[winner.index()] = pot;
            Ok(amounts)
        }
        None => Ok([stake; 2]),
    }
}

/// Computes the settlement for a match that ended with `outcome`.
pub fn settle(
    record: &Match,
    outcome: Outcome,
    now_ms: u64,
) -> Result<SettlementRecord, SettlementError> {
    let match_id = record.match_id;
    let coins = split(record.wager.amount, outcome, match_id)?;
    let payouts = Role::BOTH
        .into_iter()
        .map(|role| Payout {
            role,
            participant_id: record.participant(role).id.clone(),
            amount: coins[role.index()],
        })
        .collect();

    let mut token_payouts = Vec::new();
    if let Some(token) = &record.wager.token {
        let amounts = split(token.token_amount, outcome, match_id)?;
        for role in Role::BOTH {
            let amount = amounts[role.index()];
            let seat = record.participant(role);
            if amount == 0 || seat.is_computer() {
                continue;
            }
            token_payouts.push(TokenPayout {
                recipient: seat.id.clone(),
                amount,
                mint_address: token.mint_address.clone(),
                symbol: token.symbol.clone(),
            });
        }
    }

    let payment_status = if token_payouts.is_empty() {
        PaymentStatus::NotRequired
    } else {
        PaymentStatus::Pending
    };
    Ok(SettlementRecord {
        match_id,
        outcome,
        payouts,
        token_payouts,
        payment_status,
        settled_at_ms: now_ms,
    })
}

/// Settles once; later calls return the stored record unchanged.
pub fn settle_once<'a>(
    stored: &'a mut Option<SettlementRecord>,
    record: &Match,
    outcome: Outcome,
    now_ms: u64,
) -> Result<&'a SettlementRecord, SettlementError> {
    let settled = match stored.take() {
        Some(existing) if existing.outcome != outcome => {
            let settled = existing.outcome;
            *stored = Some(existing);
            return Err(SettlementError::OutcomeMismatch {
                match_id: record.match_id,
                settled,
            });
        }
        Some(existing) => existing,
        None => settle(record, outcome, now_ms)?,
    };
    Ok(stored.insert(settled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{sample_match, token_match};
    use pengu_types::minigame::GameType;

    #[test]
    fn test_winner_takes_both_stakes() {
        let record = sample_match(1, GameType::Connect4, 100);
        let settlement = settle(&record, Outcome::Winner(Role::Player2), 5).unwrap();
        assert_eq!(settlement.payout_for(Role::Player1), 0);
        assert_eq!(settlement.payout_for(Role::Player2), 200);
        assert_eq!(settlement.payment_status, PaymentStatus::NotRequired);
        assert!(settlement.token_payouts.is_empty());
    }

    #[test]
    fn test_draw_and_abort_refund() {
        let record = sample_match(1, GameType::TicTacToe, 75);
        for outcome in [Outcome::Draw, Outcome::Aborted] {
            let settlement = settle(&record, outcome, 0).unwrap();
            assert_eq!(settlement.payout_for(Role::Player1), 75);
            assert_eq!(settlement.payout_for(Role::Player2), 75);
        }
    }

    #[test]
    fn test_token_payout_instruction() {
        let record = token_match(2, 40, 1_000);
        let settlement = settle(&record, Outcome::Winner(Role::Player1), 0).unwrap();
        assert_eq!(
            settlement.token_payouts,
            vec![TokenPayout {
                recipient: record.players[0].id.clone(),
                amount: 2_000,
                mint_address: record.wager.token.as_ref().unwrap().mint_address.clone(),
                symbol: "PENGU".into(),
            }]
        );
        assert_eq!(settlement.payment_status, PaymentStatus::Pending);

        let refund = settle(&record, Outcome::Draw, 0).unwrap();
        assert_eq!(refund.token_payouts.len(), 2);
        assert!(refund.token_payouts.iter().all(|p| p.amount == 1_000));
    }

    #[test]
    fn test_overflow_is_an_error() {
        let record = sample_match(3, GameType::Uno, u64::MAX);
        assert_eq!(
            settle(&record, Outcome::Winner(Role::Player1), 0),
            Err(SettlementError::Overflow { match_id: 3 })
        );
        // Refunds never overflow.
        assert!(settle(&record, Outcome::Aborted, 0).is_ok());
    }

    #[test]
    fn test_settle_once_is_idempotent() {
        let record = sample_match(4, GameType::Monopoly, 10);
        let mut stored = None;
        let first = settle_once(&mut stored, &record, Outcome::Draw, 1).unwrap().clone();
        let second = settle_once(&mut stored, &record, Outcome::Draw, 99).unwrap();
        assert_eq!(&first, second);
        assert_eq!(second.settled_at_ms, 1);

        let err = settle_once(&mut stored, &record, Outcome::Winner(Role::Player1), 2).unwrap_err();
        assert!(matches!(err, SettlementError::OutcomeMismatch { .. }));
    }

    #[test]
    fn test_payment_status_updates() {
        let record = token_match(5, 0, 50);
        let mut settlement = settle(&record, Outcome::Winner(Role::Player2), 0).unwrap();
        settlement
            .update_payment(PaymentStatus::Confirmed {
                signature: "5xSig".into(),
            })
            .unwrap();
        let json = serde_json::to_value(&settlement).unwrap();
        assert_eq!(json["paymentStatus"]["status"], "confirmed");
        assert_eq!(json["paymentStatus"]["signature"], "5xSig");

        // A confirmed transfer stays confirmed.
        let err = settlement
            .update_payment(PaymentStatus::Failed {
                reason: "late rpc error".into(),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            SettlementError::PaymentTransition {
                match_id: 5,
                from: PaymentStatus::Confirmed { .. },
                to: PaymentStatus::Failed { .. },
            }
        ));
        assert!(matches!(
            settlement.payment_status,
            PaymentStatus::Confirmed { .. }
        ));
    }

    #[test]
    fn test_coin_only_settlement_has_no_payment() {
        let record = sample_match(6, GameType::Blackjack, 20);
        let mut settlement = settle(&record, Outcome::Draw, 0).unwrap();
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Confirmed {
                signature: "sig".into(),
            },
        ] {
            assert!(settlement.update_payment(status).is_err());
        }
        assert_eq!(settlement.payment_status, PaymentStatus::NotRequired);
    }
}
