//! Outcome and settlement arithmetic.
//!
//! Everything here is pure integer math. Stakes leave the player's balance
//! when a wager starts and are held outside the house reserve until
//! settlement, so every settlement splits exactly `stake` between the player
//! and the reserve: `payout = stake + reserve debit - reserve credit`.

use banco_types::wager::{Outcome, Scores, Side, WagerError};

/// Higher score wins; equal scores push.
pub fn determine_outcome(scores: Scores) -> Outcome {
    use std::cmp::Ordering;
    match scores.banker.cmp(&scores.player) {
        Ordering::Greater => Outcome::Banker,
        Ordering::Less => Outcome::Player,
        Ordering::Equal => Outcome::Tie,
    }
}

/// Net effect of a settlement on the house reserve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReserveChange {
    Credit(u64),
    Debit(u64),
    Unchanged,
}

impl ReserveChange {
    pub fn apply(self, reserve: u64) -> Result<u64, WagerError> {
        match self {
            Self::Credit(amount) => reserve.checked_add(amount).ok_or(WagerError::Overflow),
            Self::Debit(amount) => {
                reserve
                    .checked_sub(amount)
                    .ok_or(WagerError::ReserveInsufficient {
                        reserve,
                        needed: amount,
                    })
            }
            Self::Unchanged => Ok(reserve),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub outcome: Outcome,
    /// Credited to the player's balance.
    pub payout: u64,
    pub commission: u64,
    pub reserve: ReserveChange,
}

/// Commission on a winning banker bet with gross payout `gross`.
///
/// `max(min_cut, floor(gross * edge / 100))`, capped at `gross`.
pub fn banker_commission(gross: u64, house_edge_percent: u8, min_house_cut: u64) -> u64 {
    let proportional = (gross as u128 * house_edge_percent as u128) / 100;
    // proportional <= gross because the edge never exceeds 100
    let proportional = proportional as u64;
    proportional.max(min_house_cut).min(gross)
}

pub fn settle(
    stake: u64,
    side: Side,
    outcome: Outcome,
    house_edge_percent: u8,
    min_house_cut: u64,
) -> Result<Settlement, WagerError> {
    let gross = stake.checked_mul(2).ok_or(WagerError::Overflow)?;

    let settlement = match outcome {
        Outcome::Tie => Settlement {
            outcome,
            payout: stake,
            commission: 0,
            reserve: ReserveChange::Unchanged,
        },
        _ if !outcome.wins(side) => Settlement {
            outcome,
            payout: 0,
            commission: 0,
            reserve: ReserveChange::Credit(stake),
        },
        Outcome::Player => Settlement {
            outcome,
            payout: gross,
            commission: 0,
            reserve: ReserveChange::Debit(stake),
        },
        Outcome::Banker => {
            let commission = banker_commission(gross, house_edge_percent, min_house_cut);
            let reserve = match commission.cmp(&stake) {
                std::cmp::Ordering::Greater => ReserveChange::Credit(commission - stake),
                std::cmp::Ordering::Less => ReserveChange::Debit(stake - commission),
                std::cmp::Ordering::Equal => ReserveChange::Unchanged,
            };
            Settlement {
                outcome,
                payout: gross - commission,
                commission,
                reserve,
            }
        }
    };

    Ok(settlement)
}
