//! Two-dice game: draws two independent dice from the derivation primitive
//! and evaluates the selected bet type against a fixed paytable.

use crate::config::GameParams;
use crate::errors::{EngineError, EngineResult};
use crate::games::types::{DiceBet, GameType, Outcome, ResultPayload, Selection};
use crate::games::{check_stake, edged_payout, OutcomeGenerator};
use crate::rng::SeedPack;

/// Cursors 0 and 1 give the two dice; each draw maps [0,1) onto 1..=6.
pub(crate) fn roll(seeds: &SeedPack) -> (u8, u8) {
    let die = |cursor: u32| (seeds.unit(cursor) * 6.0).floor() as u8 + 1;
    (die(0), die(1))
}

/// Paytable multiplier for a bet type. Exact sums pay by distance from 7:
/// 5x at the center up to 35x at the edges (sums 2 and 12).
fn multiplier(bet: &DiceBet) -> EngineResult<u64> {
    match bet {
        DiceBet::Over7 | DiceBet::Under7 => Ok(1),
        DiceBet::Exact7 | DiceBet::Doubles => Ok(5),
        DiceBet::ExactSum { sum } => {
            if !(2..=12).contains(sum) {
                return Err(EngineError::InvalidSelection {
                    game: GameType::Dice,
                    reason: format!("exact sum {} outside 2..=12", sum),
                });
            }
            Ok(match (i16::from(*sum) - 7).unsigned_abs() {
                0 => 5,
                1 => 6,
                2 => 8,
                3 => 11,
                4 => 17,
                _ => 35,
            })
        }
    }
}

fn wins(bet: &DiceBet, die1: u8, die2: u8) -> bool {
    let sum = die1 + die2;
    match bet {
        DiceBet::Over7 => sum > 7,
        DiceBet::Under7 => sum < 7,
        DiceBet::Exact7 => sum == 7,
        DiceBet::Doubles => die1 == die2,
        DiceBet::ExactSum { sum: target } => sum == *target,
    }
}

pub struct DiceGenerator;

impl OutcomeGenerator for DiceGenerator {
    fn game(&self) -> GameType {
        GameType::Dice
    }

    fn validate(&self, selection: &Selection) -> EngineResult<()> {
        let Selection::Dice { bet } = selection else {
            return Err(EngineError::InvalidSelection {
                game: GameType::Dice,
                reason: "expected a dice selection".to_string(),
            });
        };
        multiplier(bet).map(|_| ())
    }

    fn generate(
        &self,
        selection: &Selection,
        stake: u64,
        seeds: &SeedPack,
        params: &GameParams,
    ) -> EngineResult<Outcome> {
        let Selection::Dice { bet } = selection else {
            return Err(EngineError::InvalidSelection {
                game: GameType::Dice,
                reason: "expected a dice selection".to_string(),
            });
        };
        let mult = multiplier(bet)?;
        check_stake(stake, params)?;

        let (die1, die2) = roll(seeds);
        let won = wins(bet, die1, die2);
        let payout = if won {
            edged_payout(stake, mult, params.house_edge_bps)
        } else {
            0
        };
        Ok(Outcome::new(
            ResultPayload::Dice {
                die1,
                die2,
                sum: die1 + die2,
            },
            won,
            payout,
            stake,
        ))
    }
}
