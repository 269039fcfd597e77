use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported game types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Crash,
    Dice,
    Vegetables,
    Slots,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameType::Crash => write!(f, "crash"),
            GameType::Dice => write!(f, "dice"),
            GameType::Vegetables => write!(f, "vegetables"),
            GameType::Slots => write!(f, "slots"),
        }
    }
}

/// Dice bet types. Odds are the listed multiplier applied to the stake,
/// reduced by the configured house edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiceBet {
    Over7,
    Under7,
    Exact7,
    Doubles,
    ExactSum { sum: u8 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SlotSymbol {
    Cherry,
    Lemon,
    Grape,
    Bell,
    Seven,
    Wild,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VegetableSymbol {
    Carrot,
    Tomato,
    Cabbage,
    Pumpkin,
    GoldenRadish,
}

/// Game-specific bet selection (discriminated union)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum Selection {
    Dice { bet: DiceBet },
    Crash { target_x100: u32 },
    Slots { lines: u8 },
    Vegetables { pick: VegetableSymbol },
}

impl Selection {
    pub fn game(&self) -> GameType {
        match self {
            Selection::Dice { .. } => GameType::Dice,
            Selection::Crash { .. } => GameType::Crash,
            Selection::Slots { .. } => GameType::Slots,
            Selection::Vegetables { .. } => GameType::Vegetables,
        }
    }
}

/// One winning payline in a slots spin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineWin {
    pub line: u8,
    pub symbol: SlotSymbol,
    pub multiplier: u64,
}

/// Game-specific structured result, attached to the round exactly once at
/// settlement and reproducible from the disclosed seed triple.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum ResultPayload {
    Dice {
        die1: u8,
        die2: u8,
        sum: u8,
    },
    /// Crash point in hundredths of the multiplier (142 == 1.42x).
    Crash {
        crash_x100: u64,
    },
    Slots {
        stops: [u8; 3],
        window: [[SlotSymbol; 3]; 3],
        line_wins: Vec<LineWin>,
    },
    Vegetables {
        drawn: VegetableSymbol,
    },
}

/// Outcome of one settlement call. Produced once, never mutated. Payout is
/// in integer minor units; `actual_rtp` is presentation-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Outcome {
    pub result: ResultPayload,
    pub won: bool,
    pub payout: u64,
    pub actual_rtp: Option<f64>,
}

impl Outcome {
    pub fn new(result: ResultPayload, won: bool, payout: u64, stake: u64) -> Self {
        let actual_rtp = if stake > 0 {
            Some(payout as f64 / stake as f64)
        } else {
            None
        };
        Self {
            result,
            won,
            payout,
            actual_rtp,
        }
    }
}
