//! Long-run return-to-player measurements over the deterministic derivation.
//!
//! The seeds are fixed, so these are exact regression checks, not flaky
//! statistical ones: one million nonces always produce the same outcomes.

use fairbet::games::crash::CrashGenerator;
use fairbet::games::dice::DiceGenerator;
use fairbet::games::types::DiceBet;
use fairbet::games::OutcomeGenerator;
use fairbet::rng::SeedPack;
use fairbet::{GameParams, Selection};

const SERVER: &str = "a3f1c2d4e5b697a8b9c0d1e2f3a4b5c6";
const CLIENT: &str = "player-seed";
const ROUNDS: u64 = 1_000_000;
const STAKE: u64 = 1_000;

fn params_100bps() -> GameParams {
    GameParams {
        house_edge_bps: 100,
        min_stake: 1,
        max_stake: u64::MAX,
    }
}

/// Crash carries its 1% edge entirely in the curve: cashing out at a fixed
/// 2.00x target over a million rounds must return 0.99 of the stakes.
#[test]
fn crash_long_run_rtp_matches_the_house_edge() {
    let generator = CrashGenerator;
    let selection = Selection::Crash { target_x100: 200 };
    let params = params_100bps();
    let mut seeds = SeedPack::new(SERVER, CLIENT, 0);

    let mut returned: u64 = 0;
    for nonce in 0..ROUNDS {
        seeds.nonce = nonce;
        let outcome = generator
            .generate(&selection, STAKE, &seeds, &params)
            .unwrap();
        returned += outcome.payout;
    }

    let rtp = returned as f64 / (ROUNDS * STAKE) as f64;
    assert!((rtp - 0.99).abs() < 0.005, "crash rtp drifted: {}", rtp);
}

/// Exact-7 pays 5x less the 1% edge; its hit rate is 1/6, so the long-run
/// return is 5 * 0.99 / 6 = 0.825.
#[test]
fn dice_exact_seven_long_run_rtp_matches_the_paytable() {
    let generator = DiceGenerator;
    let selection = Selection::Dice { bet: DiceBet::Exact7 };
    let params = params_100bps();
    let mut seeds = SeedPack::new(SERVER, CLIENT, 0);

    let mut returned: u64 = 0;
    let mut hits: u64 = 0;
    for nonce in 0..ROUNDS {
        seeds.nonce = nonce;
        let outcome = generator
            .generate(&selection, STAKE, &seeds, &params)
            .unwrap();
        returned += outcome.payout;
        if outcome.won {
            hits += 1;
        }
    }

    let hit_rate = hits as f64 / ROUNDS as f64;
    assert!(
        (hit_rate - 1.0 / 6.0).abs() < 0.002,
        "exact-7 hit rate drifted: {}",
        hit_rate
    );

    let rtp = returned as f64 / (ROUNDS * STAKE) as f64;
    assert!((rtp - 0.825).abs() < 0.005, "dice rtp drifted: {}", rtp);
}
