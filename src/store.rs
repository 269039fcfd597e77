//! Persistence interface and the in-memory reference store.
//!
//! The engine is agnostic to storage technology; it only requires that
//! [`EngineStore::apply_settlement`] is all-or-nothing and conditioned on
//! the round's current state (check-and-set). Under concurrent settlement
//! attempts on one round, exactly one apply succeeds and the rest observe
//! `AlreadySettled`. The wallet balance moves in the same transaction as
//! the round state, never as a separate write.

use crate::errors::{EngineError, EngineResult};
use crate::fairness::Reveal;
use crate::games::types::{GameType, Outcome, ResultPayload, Selection};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoundState {
    Open,
    Closed,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    Pending,
    Won,
    Lost,
}

/// One game round. Transitions OPEN -> CLOSED exactly once, never back;
/// the result payload and reveal are written atomically with that
/// transition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Round {
    pub id: Uuid,
    pub game: GameType,
    pub state: RoundState,
    pub server_seed_hash: String,
    /// Withheld until settlement.
    pub server_seed: Option<String>,
    pub client_seed: String,
    pub nonce: u64,
    pub result_payload: Option<ResultPayload>,
    pub rtp_actual: Option<f64>,
    pub reveal: Option<Reveal>,
    pub settled_at: Option<DateTime<Utc>>,
}

/// One bet on a round. Stake is integer minor units; the losing stake is
/// escrowed at placement time outside this engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bet {
    pub id: Uuid,
    pub round_id: Uuid,
    pub wallet_id: Uuid,
    /// Opaque authenticated user id from the identity collaborator.
    pub owner_id: String,
    pub stake: u64,
    pub selection: Selection,
    pub payout: Option<u64>,
    pub status: BetStatus,
    pub settled_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WalletTxKind {
    Payout,
}

/// Audit row appended for every settlement, win or lose.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub wallet_id: Uuid,
    pub amount: u64,
    pub kind: WalletTxKind,
    pub reference_id: Uuid,
    pub balance_before: u64,
    pub balance_after: u64,
    pub created_at: DateTime<Utc>,
}

/// Consistent snapshot of everything one settlement reads.
#[derive(Clone, Debug)]
pub struct SettlementView {
    pub round: Round,
    pub bet: Bet,
    pub wallet_balance: u64,
}

/// Everything the atomic settlement transaction writes.
#[derive(Clone, Debug)]
pub struct SettlementApply {
    pub round_id: Uuid,
    pub outcome: Outcome,
    pub reveal: Reveal,
    pub settled_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct AppliedSettlement {
    pub round: Round,
    pub bet: Bet,
    pub balance_before: u64,
    pub balance_after: u64,
}

#[async_trait]
pub trait EngineStore: Send + Sync {
    async fn create_wallet(&self, wallet_id: Uuid, opening_balance: u64) -> EngineResult<()>;

    /// Persist a freshly opened round with its pending bet.
    async fn insert_round(&self, round: Round, bet: Bet) -> EngineResult<()>;

    async fn load_view(&self, round_id: Uuid) -> EngineResult<SettlementView>;

    /// Atomic settlement: CAS the round OPEN -> CLOSED, update the bet,
    /// credit the wallet on a win, and append the audit row, together or
    /// not at all.
    async fn apply_settlement(&self, apply: SettlementApply) -> EngineResult<AppliedSettlement>;

    async fn wallet_balance(&self, wallet_id: Uuid) -> EngineResult<u64>;

    async fn wallet_transactions(&self, wallet_id: Uuid) -> EngineResult<Vec<WalletTransaction>>;
}

#[derive(Default)]
struct MemoryState {
    rounds: HashMap<Uuid, Round>,
    bets_by_round: HashMap<Uuid, Bet>,
    wallets: HashMap<Uuid, u64>,
    ledger: HashMap<Uuid, Vec<WalletTransaction>>,
}

/// In-memory reference store. A single lock around the whole state gives
/// every settlement a serializable transaction; the critical sections are
/// short and never hold the lock across an await.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> EngineResult<std::sync::RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| EngineError::Persistence("store lock poisoned".to_string()))
    }

    fn write(&self) -> EngineResult<std::sync::RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| EngineError::Persistence("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl EngineStore for MemoryStore {
    async fn create_wallet(&self, wallet_id: Uuid, opening_balance: u64) -> EngineResult<()> {
        let mut state = self.write()?;
        if state.wallets.contains_key(&wallet_id) {
            return Err(EngineError::Persistence(format!(
                "wallet {} already exists",
                wallet_id
            )));
        }
        state.wallets.insert(wallet_id, opening_balance);
        state.ledger.insert(wallet_id, Vec::new());
        Ok(())
    }

    async fn insert_round(&self, round: Round, bet: Bet) -> EngineResult<()> {
        let mut state = self.write()?;
        if !state.wallets.contains_key(&bet.wallet_id) {
            return Err(EngineError::Persistence(format!(
                "unknown wallet {}",
                bet.wallet_id
            )));
        }
        if state.rounds.contains_key(&round.id) {
            return Err(EngineError::Persistence(format!(
                "round {} already exists",
                round.id
            )));
        }
        let round_id = round.id;
        state.rounds.insert(round_id, round);
        state.bets_by_round.insert(round_id, bet);
        Ok(())
    }

    async fn load_view(&self, round_id: Uuid) -> EngineResult<SettlementView> {
        let state = self.read()?;
        let round = state
            .rounds
            .get(&round_id)
            .ok_or(EngineError::RoundNotFound(round_id))?
            .clone();
        let bet = state
            .bets_by_round
            .get(&round_id)
            .ok_or_else(|| EngineError::Persistence(format!("round {} has no bet", round_id)))?
            .clone();
        let wallet_balance = *state
            .wallets
            .get(&bet.wallet_id)
            .ok_or_else(|| EngineError::Persistence(format!("unknown wallet {}", bet.wallet_id)))?;
        Ok(SettlementView {
            round,
            bet,
            wallet_balance,
        })
    }

    async fn apply_settlement(&self, apply: SettlementApply) -> EngineResult<AppliedSettlement> {
        let mut state = self.write()?;

        // All checks run before any mutation so a failure leaves the state
        // untouched.
        let wallet_id = {
            let round = state
                .rounds
                .get(&apply.round_id)
                .ok_or(EngineError::RoundNotFound(apply.round_id))?;
            if round.state != RoundState::Open {
                return Err(EngineError::AlreadySettled(apply.round_id));
            }
            state
                .bets_by_round
                .get(&apply.round_id)
                .ok_or_else(|| {
                    EngineError::Persistence(format!("round {} has no bet", apply.round_id))
                })?
                .wallet_id
        };
        let balance_before = *state
            .wallets
            .get(&wallet_id)
            .ok_or_else(|| EngineError::Persistence(format!("unknown wallet {}", wallet_id)))?;
        let credit = if apply.outcome.won {
            apply.outcome.payout
        } else {
            0
        };
        let balance_after = balance_before.checked_add(credit).ok_or_else(|| {
            EngineError::Persistence(format!("wallet {} balance overflow", wallet_id))
        })?;

        let round = match state.rounds.get_mut(&apply.round_id) {
            Some(round) => {
                round.state = RoundState::Closed;
                round.server_seed = Some(apply.reveal.server_seed.clone());
                round.result_payload = Some(apply.outcome.result.clone());
                round.rtp_actual = apply.outcome.actual_rtp;
                round.reveal = Some(apply.reveal.clone());
                round.settled_at = Some(apply.settled_at);
                round.clone()
            }
            None => return Err(EngineError::RoundNotFound(apply.round_id)),
        };

        let bet = match state.bets_by_round.get_mut(&apply.round_id) {
            Some(bet) => {
                bet.status = if apply.outcome.won {
                    BetStatus::Won
                } else {
                    BetStatus::Lost
                };
                bet.payout = Some(apply.outcome.payout);
                bet.settled_at = Some(apply.settled_at);
                bet.clone()
            }
            None => {
                return Err(EngineError::Persistence(format!(
                    "round {} has no bet",
                    apply.round_id
                )))
            }
        };

        state.wallets.insert(wallet_id, balance_after);
        state
            .ledger
            .entry(wallet_id)
            .or_default()
            .push(WalletTransaction {
                wallet_id,
                amount: credit,
                kind: WalletTxKind::Payout,
                reference_id: apply.round_id,
                balance_before,
                balance_after,
                created_at: apply.settled_at,
            });

        Ok(AppliedSettlement {
            round,
            bet,
            balance_before,
            balance_after,
        })
    }

    async fn wallet_balance(&self, wallet_id: Uuid) -> EngineResult<u64> {
        let state = self.read()?;
        state
            .wallets
            .get(&wallet_id)
            .copied()
            .ok_or_else(|| EngineError::Persistence(format!("unknown wallet {}", wallet_id)))
    }

    async fn wallet_transactions(&self, wallet_id: Uuid) -> EngineResult<Vec<WalletTransaction>> {
        let state = self.read()?;
        Ok(state.ledger.get(&wallet_id).cloned().unwrap_or_default())
    }
}
