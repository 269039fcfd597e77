//! Vegetables: a single weighted draw against a fixed paytable. The player
//! picks one symbol and wins its multiplier iff the draw matches.

use crate::config::GameParams;
use crate::errors::{EngineError, EngineResult};
use crate::games::types::{GameType, Outcome, ResultPayload, Selection, VegetableSymbol};
use crate::games::{check_stake, edged_payout, OutcomeGenerator};
use crate::rng::SeedPack;

use VegetableSymbol::{Cabbage, Carrot, GoldenRadish, Pumpkin, Tomato};

/// (symbol, weight, multiplier); weights sum to 100. Rarer vegetables pay
/// more: the golden radish lands once per hundred draws.
const PAYTABLE: [(VegetableSymbol, u32, u64); 5] = [
    (Carrot, 40, 2),
    (Tomato, 30, 3),
    (Cabbage, 20, 5),
    (Pumpkin, 9, 10),
    (GoldenRadish, 1, 50),
];

const TOTAL_WEIGHT: u32 = 100;

pub(crate) fn draw(seeds: &SeedPack) -> VegetableSymbol {
    let ticket = (seeds.unit(0) * f64::from(TOTAL_WEIGHT)).floor() as u32;
    let mut acc = 0;
    for (symbol, weight, _) in PAYTABLE {
        acc += weight;
        if ticket < acc {
            return symbol;
        }
    }
    // ticket < 100 always holds; the loop covers the full weight range.
    GoldenRadish
}

fn multiplier(symbol: VegetableSymbol) -> u64 {
    PAYTABLE
        .iter()
        .find(|(s, _, _)| *s == symbol)
        .map(|(_, _, m)| *m)
        .unwrap_or(0)
}

pub struct VegetablesGenerator;

impl OutcomeGenerator for VegetablesGenerator {
    fn game(&self) -> GameType {
        GameType::Vegetables
    }

    fn validate(&self, selection: &Selection) -> EngineResult<()> {
        match selection {
            Selection::Vegetables { .. } => Ok(()),
            _ => Err(EngineError::InvalidSelection {
                game: GameType::Vegetables,
                reason: "expected a vegetables selection".to_string(),
            }),
        }
    }

    fn generate(
        &self,
        selection: &Selection,
        stake: u64,
        seeds: &SeedPack,
        params: &GameParams,
    ) -> EngineResult<Outcome> {
        let Selection::Vegetables { pick } = selection else {
            return Err(EngineError::InvalidSelection {
                game: GameType::Vegetables,
                reason: "expected a vegetables selection".to_string(),
            });
        };
        check_stake(stake, params)?;

        let drawn = draw(seeds);
        let won = drawn == *pick;
        let payout = if won {
            edged_payout(stake, multiplier(drawn), params.house_edge_bps)
        } else {
            0
        };
        Ok(Outcome::new(
            ResultPayload::Vegetables { drawn },
            won,
            payout,
            stake,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER: &str = "a3f1c2d4e5b697a8b9c0d1e2f3a4b5c6";
    const CLIENT: &str = "player-seed";

    #[test]
    fn weights_sum_to_total() {
        assert_eq!(
            PAYTABLE.iter().map(|(_, w, _)| *w).sum::<u32>(),
            TOTAL_WEIGHT
        );
    }

    #[test]
    fn pinned_draws() {
        assert_eq!(draw(&SeedPack::new(SERVER, CLIENT, 7)), Carrot);
        assert_eq!(draw(&SeedPack::new(SERVER, CLIENT, 54)), GoldenRadish);
    }

    #[test]
    fn matching_pick_wins_its_multiplier() {
        let seeds = SeedPack::new(SERVER, CLIENT, 54);
        let outcome = VegetablesGenerator
            .generate(
                &Selection::Vegetables { pick: GoldenRadish },
                1_000,
                &seeds,
                &GameParams {
                    house_edge_bps: 0,
                    ..GameParams::default()
                },
            )
            .unwrap();
        assert!(outcome.won);
        assert_eq!(outcome.payout, 50_000);
    }

    #[test]
    fn mismatched_pick_loses() {
        let seeds = SeedPack::new(SERVER, CLIENT, 7); // draws Carrot
        let outcome = VegetablesGenerator
            .generate(
                &Selection::Vegetables { pick: Pumpkin },
                1_000,
                &seeds,
                &GameParams::default(),
            )
            .unwrap();
        assert!(!outcome.won);
        assert_eq!(outcome.payout, 0);
        assert_eq!(outcome.result, ResultPayload::Vegetables { drawn: Carrot });
    }

    #[test]
    fn house_edge_applies_to_wins() {
        let seeds = SeedPack::new(SERVER, CLIENT, 7); // draws Carrot
        let outcome = VegetablesGenerator
            .generate(
                &Selection::Vegetables { pick: Carrot },
                1_000,
                &seeds,
                &GameParams::default(), // 100 bps
            )
            .unwrap();
        assert!(outcome.won);
        // 1000 * 2 * 0.99 = 1980
        assert_eq!(outcome.payout, 1_980);
    }

    #[test]
    fn rejects_bad_stakes() {
        let seeds = SeedPack::new(SERVER, CLIENT, 1);
        let err = VegetablesGenerator
            .generate(
                &Selection::Vegetables { pick: Carrot },
                0,
                &seeds,
                &GameParams::default(),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidStake { .. }));
    }
}
