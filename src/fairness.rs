//! Provable-fairness verification.
//!
//! A [`Reveal`] is published with every settled round; anyone holding it can
//! recompute the commitment hash and replay the outcome derivation without
//! trusting the operator. [`FairnessVerifier`] runs the exact same generator
//! code the settlement path ran, so "verified" means bit-for-bit equality,
//! not approximate agreement. A [`RevealArtifact`] bundles the reveal with
//! the bet inputs so the check is self-contained (see the `verify-reveal`
//! binary).

use crate::config::{GameParams, MAX_HOUSE_EDGE_BPS};
use crate::errors::{EngineError, EngineResult};
use crate::games::types::{GameType, Outcome, ResultPayload, Selection};
use crate::games::GeneratorRegistry;
use crate::rng::{self, SeedPack};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Disclosure published at settlement: the committed seed material plus the
/// result it produced.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Reveal {
    pub server_seed: String,
    pub server_seed_hash: String,
    pub client_seed: String,
    pub nonce: u64,
    pub result: ResultPayload,
    pub verified: bool,
    pub timestamp: DateTime<Utc>,
}

/// Everything a third party needs to re-run the fairness check offline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RevealArtifact {
    pub game: GameType,
    pub selection: Selection,
    pub stake: u64,
    pub house_edge_bps: u32,
    pub outcome: Outcome,
    pub reveal: Reveal,
}

/// Why a reveal failed verification. `Ok(Verified)` vs `Ok(failure)` is the
/// caller's signal; an `Err` means the check itself could not run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Verified,
    /// SHA-256 of the revealed seed does not match the published commitment.
    CommitmentMismatch,
    /// Replaying the derivation produced a different result or payout.
    ResultMismatch,
}

impl Verdict {
    pub fn is_verified(&self) -> bool {
        matches!(self, Verdict::Verified)
    }
}

/// Verification seam between settlement and the fairness check. The
/// orchestrator holds a trait object so alternate verifiers can be swapped
/// in and faults injected in tests.
pub trait OutcomeVerifier: Send + Sync {
    fn verify(
        &self,
        reveal: &Reveal,
        selection: &Selection,
        stake: u64,
        house_edge_bps: u32,
        committed: &Outcome,
    ) -> EngineResult<Verdict>;
}

pub struct FairnessVerifier {
    registry: Arc<GeneratorRegistry>,
}

impl FairnessVerifier {
    pub fn new(registry: Arc<GeneratorRegistry>) -> Self {
        Self { registry }
    }

    /// Self-contained check over a serialized artifact.
    pub fn verify_artifact(&self, artifact: &RevealArtifact) -> EngineResult<Verdict> {
        if artifact.selection.game() != artifact.game {
            return Err(EngineError::InvalidSelection {
                game: artifact.game,
                reason: "selection does not belong to this game".to_string(),
            });
        }
        self.verify(
            &artifact.reveal,
            &artifact.selection,
            artifact.stake,
            artifact.house_edge_bps,
            &artifact.outcome,
        )
    }
}

impl OutcomeVerifier for FairnessVerifier {
    /// Recompute the commitment and replay the outcome derivation, comparing
    /// against what was committed at settlement time.
    ///
    /// Stake limits are not re-checked here: the stake was validated when the
    /// round opened, and tier configuration may have changed since. Only the
    /// house edge feeds the derivation, so it is the one input that must be
    /// range-checked before arithmetic sees it; artifacts arrive from
    /// untrusted JSON.
    fn verify(
        &self,
        reveal: &Reveal,
        selection: &Selection,
        stake: u64,
        house_edge_bps: u32,
        committed: &Outcome,
    ) -> EngineResult<Verdict> {
        if house_edge_bps >= MAX_HOUSE_EDGE_BPS {
            return Err(EngineError::InvalidSelection {
                game: selection.game(),
                reason: format!(
                    "house edge {} bps is outside 0..{}",
                    house_edge_bps, MAX_HOUSE_EDGE_BPS
                ),
            });
        }
        if rng::server_seed_hash(&reveal.server_seed) != reveal.server_seed_hash {
            return Ok(Verdict::CommitmentMismatch);
        }
        let seeds = SeedPack {
            server_seed: reveal.server_seed.clone(),
            server_seed_hash: reveal.server_seed_hash.clone(),
            client_seed: reveal.client_seed.clone(),
            nonce: reveal.nonce,
        };
        let params = GameParams {
            house_edge_bps,
            min_stake: 1,
            max_stake: u64::MAX,
        };
        let replayed = self
            .registry
            .generate(selection.game(), selection, stake, &seeds, &params)?;
        let matches = replayed.result == committed.result
            && replayed.result == reveal.result
            && replayed.won == committed.won
            && replayed.payout == committed.payout;
        if matches {
            Ok(Verdict::Verified)
        } else {
            Ok(Verdict::ResultMismatch)
        }
    }
}
