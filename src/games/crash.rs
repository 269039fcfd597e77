//! Crash game: one uniform draw mapped through an inverse curve to a crash
//! multiplier. The player cashes out at a pre-selected target and wins iff
//! the crash point reaches it.
//!
//! With `u` uniform in [0,1) the curve `(1 - h) / (1 - u)` gives
//! `P(crash >= t) = (1 - h) / t` for any target `t >= 1`, so the expected
//! return of a `stake * t` payout is exactly `1 - h`. The house edge lives
//! entirely in the curve; the payout itself is not reduced again.

use crate::config::GameParams;
use crate::errors::{EngineError, EngineResult};
use crate::games::types::{GameType, Outcome, ResultPayload, Selection};
use crate::games::{check_stake, OutcomeGenerator};
use crate::rng::SeedPack;

/// Cash-out targets are hundredths of the multiplier: 1.01x to 100.00x.
pub const MIN_TARGET_X100: u32 = 101;
pub const MAX_TARGET_X100: u32 = 10_000;

/// Display cap for the crash point itself (10000.00x).
const MAX_CRASH_X100: u64 = 1_000_000;

/// Crash point in hundredths, floored, never below 1.00x.
pub fn crash_point_x100(u: f64, house_edge_bps: u32) -> u64 {
    let h = f64::from(house_edge_bps) / 10_000.0;
    let crash = ((1.0 - h) / (1.0 - u)).max(1.0);
    let x = (crash * 100.0).floor();
    if x >= MAX_CRASH_X100 as f64 {
        MAX_CRASH_X100
    } else {
        x as u64
    }
}

fn check_target(target_x100: u32) -> EngineResult<()> {
    if !(MIN_TARGET_X100..=MAX_TARGET_X100).contains(&target_x100) {
        return Err(EngineError::InvalidSelection {
            game: GameType::Crash,
            reason: format!(
                "target {} outside {}..={}",
                target_x100, MIN_TARGET_X100, MAX_TARGET_X100
            ),
        });
    }
    Ok(())
}

pub struct CrashGenerator;

impl OutcomeGenerator for CrashGenerator {
    fn game(&self) -> GameType {
        GameType::Crash
    }

    fn validate(&self, selection: &Selection) -> EngineResult<()> {
        let Selection::Crash { target_x100 } = selection else {
            return Err(EngineError::InvalidSelection {
                game: GameType::Crash,
                reason: "expected a crash selection".to_string(),
            });
        };
        check_target(*target_x100)
    }

    fn generate(
        &self,
        selection: &Selection,
        stake: u64,
        seeds: &SeedPack,
        params: &GameParams,
    ) -> EngineResult<Outcome> {
        let Selection::Crash { target_x100 } = selection else {
            return Err(EngineError::InvalidSelection {
                game: GameType::Crash,
                reason: "expected a crash selection".to_string(),
            });
        };
        check_target(*target_x100)?;
        check_stake(stake, params)?;

        let crash_x100 = crash_point_x100(seeds.unit(0), params.house_edge_bps);
        let won = crash_x100 >= u64::from(*target_x100);
        let payout = if won {
            // stake * target, floored to the minor unit
            u64::try_from(u128::from(stake) * u128::from(*target_x100) / 100).unwrap_or(u64::MAX)
        } else {
            0
        };
        Ok(Outcome::new(
            ResultPayload::Crash { crash_x100 },
            won,
            payout,
            stake,
        ))
    }
}
