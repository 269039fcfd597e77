//! Three-reel slots: one weighted reel strip per reel, a 3x3 window read
//! circularly from each stop, and up to five paylines paying on
//! three-of-a-kind with Wild substitution.

use crate::config::GameParams;
use crate::errors::{EngineError, EngineResult};
use crate::games::types::{GameType, LineWin, Outcome, ResultPayload, Selection, SlotSymbol};
use crate::games::{check_stake, edged_payout, OutcomeGenerator};
use crate::rng::SeedPack;

use SlotSymbol::{Bell, Cherry, Grape, Lemon, Seven, Wild};

pub const REEL_LEN: usize = 32;
pub const REEL_COUNT: usize = 3;
pub const ROWS: usize = 3;
pub const MAX_LINES: u8 = 5;

/// Weighted strip shared by all three reels: 14 Cherry, 7 Lemon, 5 Grape,
/// 4 Bell, 1 Seven, 1 Wild.
const REEL_STRIP: [SlotSymbol; REEL_LEN] = [
    Cherry, Lemon, Cherry, Grape, Cherry, Lemon, Bell, Cherry, //
    Lemon, Cherry, Grape, Cherry, Seven, Cherry, Lemon, Bell, //
    Cherry, Grape, Cherry, Lemon, Cherry, Wild, Cherry, Bell, //
    Cherry, Grape, Lemon, Cherry, Grape, Cherry, Lemon, Bell,
];

/// Payline coordinates as (row, reel): middle, top, bottom, then the two
/// diagonals. A selection of N lines activates the first N.
const PAYLINES: [[(usize, usize); REEL_COUNT]; MAX_LINES as usize] = [
    [(1, 0), (1, 1), (1, 2)],
    [(0, 0), (0, 1), (0, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(2, 0), (1, 1), (0, 2)],
];

fn line_multiplier(symbol: SlotSymbol) -> u64 {
    match symbol {
        Cherry => 2,
        Lemon => 3,
        Grape => 5,
        Bell => 10,
        Seven | Wild => 50,
    }
}

/// Cursors 0..3 pick one stop per reel; the window holds the stop symbol
/// and the next two strip positions, wrapping around.
pub(crate) fn spin(seeds: &SeedPack) -> ([u8; 3], [[SlotSymbol; 3]; 3]) {
    let mut stops = [0u8; REEL_COUNT];
    for (reel, stop) in stops.iter_mut().enumerate() {
        *stop = (seeds.unit(reel as u32) * REEL_LEN as f64).floor() as u8;
    }
    let mut window = [[Cherry; REEL_COUNT]; ROWS];
    for reel in 0..REEL_COUNT {
        for row in 0..ROWS {
            window[row][reel] = REEL_STRIP[(stops[reel] as usize + row) % REEL_LEN];
        }
    }
    (stops, window)
}

/// Winning lines among the first `lines` paylines. Wild substitutes for any
/// symbol; an all-Wild line pays as Seven.
pub(crate) fn evaluate_lines(window: &[[SlotSymbol; 3]; 3], lines: u8) -> Vec<LineWin> {
    let mut wins = Vec::new();
    for (index, coords) in PAYLINES.iter().enumerate().take(lines as usize) {
        let symbols = coords.map(|(row, reel)| window[row][reel]);
        let effective = symbols.iter().copied().find(|s| *s != Wild).unwrap_or(Wild);
        if symbols.iter().all(|s| *s == effective || *s == Wild) {
            let symbol = if effective == Wild { Seven } else { effective };
            wins.push(LineWin {
                line: index as u8,
                symbol,
                multiplier: line_multiplier(symbol),
            });
        }
    }
    wins
}

fn check_lines(lines: u8) -> EngineResult<()> {
    if lines == 0 || lines > MAX_LINES {
        return Err(EngineError::InvalidSelection {
            game: GameType::Slots,
            reason: format!("lines {} outside 1..={}", lines, MAX_LINES),
        });
    }
    Ok(())
}

pub struct SlotsGenerator;

impl OutcomeGenerator for SlotsGenerator {
    fn game(&self) -> GameType {
        GameType::Slots
    }

    fn validate(&self, selection: &Selection) -> EngineResult<()> {
        let Selection::Slots { lines } = selection else {
            return Err(EngineError::InvalidSelection {
                game: GameType::Slots,
                reason: "expected a slots selection".to_string(),
            });
        };
        check_lines(*lines)
    }

    fn generate(
        &self,
        selection: &Selection,
        stake: u64,
        seeds: &SeedPack,
        params: &GameParams,
    ) -> EngineResult<Outcome> {
        let Selection::Slots { lines } = selection else {
            return Err(EngineError::InvalidSelection {
                game: GameType::Slots,
                reason: "expected a slots selection".to_string(),
            });
        };
        check_lines(*lines)?;
        check_stake(stake, params)?;

        let (stops, window) = spin(seeds);
        let line_wins = evaluate_lines(&window, *lines);
        let total_multiplier: u64 = line_wins.iter().map(|w| w.multiplier).sum();
        let won = !line_wins.is_empty();
        let payout = if won {
            edged_payout(stake, total_multiplier, params.house_edge_bps)
        } else {
            0
        };
        Ok(Outcome::new(
            ResultPayload::Slots {
                stops,
                window,
                line_wins,
            },
            won,
            payout,
            stake,
        ))
    }
}
