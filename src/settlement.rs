//! Settlement orchestration: open a round against a committed seed, then
//! settle it exactly once.
//!
//! The orchestrator owns the ordering guarantees. Authorization and
//! compliance run before the seed is disclosed, the outcome is derived and
//! fairness-checked before anything is written, and the single write goes
//! through [`EngineStore::apply_settlement`], whose check-and-set on the
//! round state is what makes concurrent settles collapse to one winner.
//! Alert delivery happens after the commit and is best-effort: a failed
//! alert never rolls back a settled round.

use crate::config::EngineConfig;
use crate::errors::{EngineError, EngineResult};
use crate::fairness::{FairnessVerifier, OutcomeVerifier, Reveal, RevealArtifact};
use crate::games::types::{GameType, Selection};
use crate::games::{check_stake, GeneratorRegistry};
use crate::rng::SeedPack;
use crate::seeds::{SeedAuthority, SeedStore};
use crate::store::{Bet, BetStatus, EngineStore, Round, RoundState, SettlementApply};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Regulatory checks consulted before any seed material is disclosed.
///
/// Implementations are expected to be fast lookups against already-synced
/// compliance state; the engine calls them synchronously on the settle path.
pub trait ComplianceGate: Send + Sync {
    /// Resolved jurisdiction for the user, `None` when unknown.
    fn jurisdiction(&self, user_id: &str) -> Option<String>;

    fn is_allowed(&self, jurisdiction: &str, game: GameType) -> bool;

    fn kyc_approved(&self, user_id: &str) -> bool;
}

/// Gate that admits everyone. Suitable for tests and single-jurisdiction
/// deployments where compliance is enforced upstream.
pub struct AllowAllGate;

impl ComplianceGate for AllowAllGate {
    fn jurisdiction(&self, _user_id: &str) -> Option<String> {
        Some("default".to_string())
    }

    fn is_allowed(&self, _jurisdiction: &str, _game: GameType) -> bool {
        true
    }

    fn kyc_approved(&self, _user_id: &str) -> bool {
        true
    }
}

#[derive(Clone, Debug)]
pub struct LargeWinAlert {
    pub round_id: Uuid,
    pub wallet_id: Uuid,
    pub game: GameType,
    pub stake: u64,
    pub payout: u64,
    pub timestamp: DateTime<Utc>,
}

/// Downstream notification channel for payouts over the configured
/// threshold. Delivery failures are logged and swallowed.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn large_win(&self, alert: &LargeWinAlert) -> EngineResult<()>;
}

/// Default sink: a structured log line.
pub struct TracingAlertSink;

#[async_trait]
impl AlertSink for TracingAlertSink {
    async fn large_win(&self, alert: &LargeWinAlert) -> EngineResult<()> {
        tracing::warn!(
            round_id = %alert.round_id,
            wallet_id = %alert.wallet_id,
            game = %alert.game,
            stake = alert.stake,
            payout = alert.payout,
            "large win"
        );
        Ok(())
    }
}

/// Outcome of a successful settlement, returned to the caller and suitable
/// for serialization to the player.
#[derive(Clone, Debug)]
pub struct SettlementResult {
    pub round: Round,
    pub bet: Bet,
    pub wallet_balance: u64,
    pub reveal: Reveal,
}

impl SettlementResult {
    /// Full disclosure bundle for offline verification.
    pub fn artifact(&self, house_edge_bps: u32) -> Option<RevealArtifact> {
        let result = self.round.result_payload.clone()?;
        let payout = self.bet.payout?;
        Some(RevealArtifact {
            game: self.round.game,
            selection: self.bet.selection.clone(),
            stake: self.bet.stake,
            house_edge_bps,
            outcome: crate::games::types::Outcome::new(
                result,
                self.bet.status == BetStatus::Won,
                payout,
                self.bet.stake,
            ),
            reveal: self.reveal.clone(),
        })
    }
}

pub struct SettlementEngine<S: SeedStore> {
    store: Arc<dyn EngineStore>,
    seeds: SeedAuthority<S>,
    registry: Arc<GeneratorRegistry>,
    verifier: Arc<dyn OutcomeVerifier>,
    config: EngineConfig,
    compliance: Arc<dyn ComplianceGate>,
    alerts: Arc<dyn AlertSink>,
}

impl<S: SeedStore> SettlementEngine<S> {
    pub fn new(
        store: Arc<dyn EngineStore>,
        seed_store: S,
        config: EngineConfig,
        compliance: Arc<dyn ComplianceGate>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        let verifier = Arc::new(FairnessVerifier::new(crate::games::builtin()));
        Self::with_verifier(store, seed_store, config, compliance, alerts, verifier)
    }

    /// Engine with a caller-supplied verifier, so the fairness check can be
    /// swapped out or fault-injected.
    pub fn with_verifier(
        store: Arc<dyn EngineStore>,
        seed_store: S,
        config: EngineConfig,
        compliance: Arc<dyn ComplianceGate>,
        alerts: Arc<dyn AlertSink>,
        verifier: Arc<dyn OutcomeVerifier>,
    ) -> Self {
        Self {
            store,
            seeds: SeedAuthority::new(seed_store),
            registry: crate::games::builtin(),
            verifier,
            config,
            compliance,
            alerts,
        }
    }

    pub fn seeds(&self) -> &SeedAuthority<S> {
        &self.seeds
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Commitment hash the next opened round will be bound to. Published to
    /// the player before they stake.
    pub fn next_commitment(&self) -> String {
        self.seeds.peek_commitment()
    }

    /// Open a round: validate the bet, bind the pending server seed to it,
    /// and persist the round with its pending bet. The server seed itself
    /// stays withheld; only its hash lands in the round record.
    pub async fn open_round(
        &self,
        game: GameType,
        owner_id: &str,
        wallet_id: Uuid,
        stake: u64,
        selection: Selection,
        client_seed: &str,
    ) -> EngineResult<(Round, Bet)> {
        if selection.game() != game {
            return Err(EngineError::InvalidSelection {
                game,
                reason: format!("selection is for {}", selection.game()),
            });
        }
        let params = self.config.params(game);
        check_stake(stake, params)?;
        if let Some(generator) = self.registry.get(game) {
            generator.validate(&selection)?;
        } else {
            return Err(EngineError::InvalidSelection {
                game,
                reason: "no generator registered for this game".to_string(),
            });
        }

        let round_id = Uuid::new_v4();
        let committed = self.seeds.commit(round_id, client_seed).await?;

        let round = Round {
            id: round_id,
            game,
            state: RoundState::Open,
            server_seed_hash: committed.server_seed_hash,
            server_seed: None,
            client_seed: client_seed.to_string(),
            nonce: committed.nonce,
            result_payload: None,
            rtp_actual: None,
            reveal: None,
            settled_at: None,
        };
        let bet = Bet {
            id: Uuid::new_v4(),
            round_id,
            wallet_id,
            owner_id: owner_id.to_string(),
            stake,
            selection,
            payout: None,
            status: BetStatus::Pending,
            settled_at: None,
        };
        self.store.insert_round(round.clone(), bet.clone()).await?;
        tracing::debug!(%round_id, game = %game, stake, nonce = round.nonce, "round opened");
        Ok((round, bet))
    }

    /// Settle a round exactly once.
    ///
    /// Re-running after a transient failure is safe: every step before the
    /// store commit is either a pure read or idempotent, and the commit
    /// itself refuses rounds that are not OPEN.
    pub async fn settle(&self, round_id: Uuid, caller_id: &str) -> EngineResult<SettlementResult> {
        let view = self.store.load_view(round_id).await?;
        if view.round.state != RoundState::Open {
            return Err(EngineError::AlreadySettled(round_id));
        }
        if view.bet.owner_id != caller_id {
            return Err(EngineError::Unauthorized {
                round_id,
                caller: caller_id.to_string(),
            });
        }

        let game = view.round.game;
        let jurisdiction = self.compliance.jurisdiction(caller_id).ok_or_else(|| {
            EngineError::ComplianceBlocked {
                reason: "jurisdiction could not be determined".to_string(),
            }
        })?;
        if !self.compliance.is_allowed(&jurisdiction, game) {
            return Err(EngineError::ComplianceBlocked {
                reason: format!("{} is not permitted in {}", game, jurisdiction),
            });
        }
        if !self.compliance.kyc_approved(caller_id) {
            return Err(EngineError::ComplianceBlocked {
                reason: "kyc approval required".to_string(),
            });
        }

        // Compliance passed; disclosing the seed is now safe. A missing seed
        // record for an OPEN round means the two stores have diverged.
        let seed = self.seeds.disclose(round_id).await.map_err(|err| match err {
            EngineError::RoundNotFound(_) => EngineError::Persistence(format!(
                "seed record missing for open round {}",
                round_id
            )),
            other => other,
        })?;
        if seed.server_seed_hash != view.round.server_seed_hash {
            return Err(EngineError::Persistence(format!(
                "seed commitment diverged for round {}",
                round_id
            )));
        }

        let seeds = SeedPack {
            server_seed: seed.server_seed.clone(),
            server_seed_hash: seed.server_seed_hash.clone(),
            client_seed: view.round.client_seed.clone(),
            nonce: view.round.nonce,
        };
        let params = self.config.params(game);
        let outcome = self
            .registry
            .generate(game, &view.bet.selection, view.bet.stake, &seeds, params)?;

        let mut reveal = Reveal {
            server_seed: seed.server_seed,
            server_seed_hash: seed.server_seed_hash,
            client_seed: view.round.client_seed.clone(),
            nonce: view.round.nonce,
            result: outcome.result.clone(),
            verified: false,
            timestamp: Utc::now(),
        };
        let verdict = self.verifier.verify(
            &reveal,
            &view.bet.selection,
            view.bet.stake,
            params.house_edge_bps,
            &outcome,
        )?;
        if !verdict.is_verified() {
            tracing::error!(%round_id, ?verdict, "fairness check failed, settlement aborted");
            return Err(EngineError::FairnessViolation {
                round_id,
                detail: format!("{:?}", verdict),
            });
        }
        reveal.verified = true;

        let applied = self
            .store
            .apply_settlement(SettlementApply {
                round_id,
                outcome: outcome.clone(),
                reveal: reveal.clone(),
                settled_at: Utc::now(),
            })
            .await?;

        if outcome.won && outcome.payout >= self.config.large_win_threshold {
            let alert = LargeWinAlert {
                round_id,
                wallet_id: applied.bet.wallet_id,
                game,
                stake: applied.bet.stake,
                payout: outcome.payout,
                timestamp: Utc::now(),
            };
            if let Err(err) = self.alerts.large_win(&alert).await {
                tracing::warn!(%round_id, error = %err, "large win alert delivery failed");
            }
        }

        tracing::info!(
            %round_id,
            game = %game,
            won = outcome.won,
            payout = outcome.payout,
            "round settled"
        );
        Ok(SettlementResult {
            round: applied.round,
            bet: applied.bet,
            wallet_balance: applied.balance_after,
            reveal,
        })
    }
}
