//! Outcome generators: pure, deterministic functions from a seed triple and
//! selection to a game result and payout.
//!
//! Each game implements [`OutcomeGenerator`] and is registered once at
//! startup in a [`GeneratorRegistry`], which dispatches by game tag instead
//! of downcasting selection payloads.

pub mod crash;
pub mod dice;
pub mod slots;
pub mod types;
pub mod vegetables;

use crate::config::GameParams;
use crate::errors::{EngineError, EngineResult};
use crate::rng::SeedPack;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use types::{GameType, Outcome, Selection};

/// Shared registry of the built-in games. Generators are stateless, so one
/// instance serves the whole process.
pub fn builtin() -> Arc<GeneratorRegistry> {
    static REGISTRY: Lazy<Arc<GeneratorRegistry>> =
        Lazy::new(|| Arc::new(GeneratorRegistry::with_builtin()));
    Arc::clone(&REGISTRY)
}

pub trait OutcomeGenerator: Send + Sync {
    fn game(&self) -> GameType;

    /// Static selection check, also run before a round opens so a malformed
    /// bet is rejected before any seed is committed to it.
    fn validate(&self, selection: &Selection) -> EngineResult<()>;

    /// Derive the outcome for one round. Must be pure: same inputs always
    /// yield the same `Outcome`, bit for bit.
    fn generate(
        &self,
        selection: &Selection,
        stake: u64,
        seeds: &SeedPack,
        params: &GameParams,
    ) -> EngineResult<Outcome>;
}

/// Dispatch table from game identifier to its generator.
pub struct GeneratorRegistry {
    generators: HashMap<GameType, Box<dyn OutcomeGenerator>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self {
            generators: HashMap::new(),
        }
    }

    /// Registry with all built-in games.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(dice::DiceGenerator));
        registry.register(Box::new(crash::CrashGenerator));
        registry.register(Box::new(slots::SlotsGenerator));
        registry.register(Box::new(vegetables::VegetablesGenerator));
        registry
    }

    pub fn register(&mut self, generator: Box<dyn OutcomeGenerator>) {
        self.generators.insert(generator.game(), generator);
    }

    pub fn get(&self, game: GameType) -> Option<&dyn OutcomeGenerator> {
        self.generators.get(&game).map(|g| g.as_ref())
    }

    pub fn generate(
        &self,
        game: GameType,
        selection: &Selection,
        stake: u64,
        seeds: &SeedPack,
        params: &GameParams,
    ) -> EngineResult<Outcome> {
        if selection.game() != game {
            return Err(EngineError::InvalidSelection {
                game,
                reason: format!("selection is for {}", selection.game()),
            });
        }
        let generator = self
            .generators
            .get(&game)
            .ok_or_else(|| EngineError::InvalidSelection {
                game,
                reason: "no generator registered".to_string(),
            })?;
        generator.generate(selection, stake, seeds, params)
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

/// Stake checks shared by every generator: positive and inside the tier.
pub(crate) fn check_stake(stake: u64, params: &GameParams) -> EngineResult<()> {
    if stake == 0 {
        return Err(EngineError::InvalidStake {
            stake,
            reason: "stake must be positive".to_string(),
        });
    }
    if stake < params.min_stake || stake > params.max_stake {
        return Err(EngineError::InvalidStake {
            stake,
            reason: format!(
                "stake outside tier limits [{}, {}]",
                params.min_stake, params.max_stake
            ),
        });
    }
    Ok(())
}

/// `floor(stake * multiplier * (1 - house_edge))` in integer arithmetic.
/// Floor, never round-up: rounding must not cost the operator. An edge at
/// or beyond 10_000 bps saturates to a zero payout rather than wrapping.
pub(crate) fn edged_payout(stake: u64, multiplier: u64, house_edge_bps: u32) -> u64 {
    let gross = u128::from(stake) * u128::from(multiplier);
    let keep = u128::from(10_000u32.saturating_sub(house_edge_bps));
    let net = gross * keep / 10_000;
    u64::try_from(net).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::DiceBet;

    fn params() -> GameParams {
        GameParams::default()
    }

    #[test]
    fn registry_holds_all_builtin_games() {
        let registry = GeneratorRegistry::with_builtin();
        for game in [
            GameType::Crash,
            GameType::Dice,
            GameType::Slots,
            GameType::Vegetables,
        ] {
            assert!(registry.get(game).is_some(), "missing generator for {}", game);
        }
    }

    #[test]
    fn registry_rejects_selection_for_wrong_game() {
        let registry = GeneratorRegistry::with_builtin();
        let seeds = SeedPack::new("s", "c", 1);
        let err = registry
            .generate(
                GameType::Crash,
                &Selection::Dice { bet: DiceBet::Over7 },
                1_000,
                &seeds,
                &params(),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidSelection { .. }));
    }

    #[test]
    fn stake_checks() {
        assert!(check_stake(0, &params()).is_err());
        assert!(check_stake(99, &params()).is_err());
        assert!(check_stake(100_000_001, &params()).is_err());
        assert!(check_stake(500, &params()).is_ok());
    }

    #[test]
    fn edged_payout_floors() {
        // 500 * 5 = 2500, 1% edge -> 2475
        assert_eq!(edged_payout(500, 5, 100), 2_475);
        // zero edge keeps the gross amount
        assert_eq!(edged_payout(500, 5, 0), 2_500);
        // 333 * 1 at 1% = 329.67 -> floored to 329
        assert_eq!(edged_payout(333, 1, 100), 329);
    }

    #[test]
    fn edged_payout_saturates_instead_of_wrapping() {
        // An edge past 100% must not underflow the haircut factor.
        assert_eq!(edged_payout(500, 5, 10_000), 0);
        assert_eq!(edged_payout(500, 5, 20_000), 0);
    }
}
