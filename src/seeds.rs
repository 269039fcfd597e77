//! Seed Authority: owns the server-seed lifecycle.
//!
//! A fresh server seed is committed per round: its one-way hash is handed
//! out at round open, the seed itself stays withheld until settlement.
//! Committed and revealed records go through a [`SeedStore`] before any
//! payout computation depends on them; losing a record after reveal but
//! before settlement would break fairness auditability.
//!
//! Public disclosure via [`SeedAuthority::reveal`] is at-most-once. The
//! orchestrator uses the crate-internal [`SeedAuthority::disclose`], which
//! tolerates re-reads so a settlement whose commit step failed can be
//! retried; exactly-one-settlement is enforced by the round state CAS,
//! not by the seed record.

use crate::errors::{EngineError, EngineResult};
use crate::rng::server_seed_hash;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use uuid::Uuid;

/// Durable record of one committed server seed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeedRecord {
    pub round_id: Uuid,
    pub server_seed: String,
    pub server_seed_hash: String,
    pub client_seed: String,
    pub nonce: u64,
    pub revealed: bool,
    pub created_at: DateTime<Utc>,
}

/// What round open hands back to the caller: the commitment, never the seed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommittedSeed {
    pub server_seed_hash: String,
    pub nonce: u64,
}

/// Persistence for seed records and per-client-seed nonce counters.
#[async_trait]
pub trait SeedStore: Send + Sync {
    async fn put(&self, record: SeedRecord) -> EngineResult<()>;

    async fn get(&self, round_id: Uuid) -> EngineResult<Option<SeedRecord>>;

    /// Set the revealed flag and return the record as it was *before* the
    /// update, so the caller can tell a first reveal from a repeat.
    async fn mark_revealed(&self, round_id: Uuid) -> EngineResult<SeedRecord>;

    /// Next nonce for a client seed; strictly increasing per client seed.
    async fn next_nonce(&self, client_seed: &str) -> EngineResult<u64>;
}

/// In-memory seed store. Production deployments put a durable store behind
/// the same trait.
#[derive(Default)]
pub struct MemorySeedStore {
    records: DashMap<Uuid, SeedRecord>,
    nonces: DashMap<String, u64>,
}

impl MemorySeedStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeedStore for MemorySeedStore {
    async fn put(&self, record: SeedRecord) -> EngineResult<()> {
        self.records.insert(record.round_id, record);
        Ok(())
    }

    async fn get(&self, round_id: Uuid) -> EngineResult<Option<SeedRecord>> {
        Ok(self.records.get(&round_id).map(|r| r.clone()))
    }

    async fn mark_revealed(&self, round_id: Uuid) -> EngineResult<SeedRecord> {
        let mut entry = self
            .records
            .get_mut(&round_id)
            .ok_or(EngineError::RoundNotFound(round_id))?;
        let before = entry.clone();
        entry.revealed = true;
        Ok(before)
    }

    async fn next_nonce(&self, client_seed: &str) -> EngineResult<u64> {
        let mut counter = self.nonces.entry(client_seed.to_string()).or_insert(0);
        let nonce = *counter;
        *counter += 1;
        Ok(nonce)
    }
}

fn generate_server_seed() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub struct SeedAuthority<S: SeedStore> {
    store: S,
    /// Pre-generated seed for the next round, so its commitment can be
    /// shown before a stake is accepted. Consumed once per round.
    next_seed: Mutex<String>,
}

impl<S: SeedStore> SeedAuthority<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            next_seed: Mutex::new(generate_server_seed()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Commitment hash of the seed the next round will use.
    pub fn peek_commitment(&self) -> String {
        let seed = self.next_seed.lock().expect("seed lock poisoned");
        server_seed_hash(&seed)
    }

    /// Retire the pending seed without using it and commit a fresh one.
    pub fn rotate(&self) -> String {
        let mut seed = self.next_seed.lock().expect("seed lock poisoned");
        *seed = generate_server_seed();
        server_seed_hash(&seed)
    }

    /// Bind the pending seed to a round, persist the record, and pre-generate
    /// a replacement. A server seed is never reused across rounds.
    pub async fn commit(&self, round_id: Uuid, client_seed: &str) -> EngineResult<CommittedSeed> {
        let server_seed = {
            let mut next = self.next_seed.lock().expect("seed lock poisoned");
            std::mem::replace(&mut *next, generate_server_seed())
        };
        let server_seed_hash = server_seed_hash(&server_seed);
        let nonce = self.store.next_nonce(client_seed).await?;
        self.store
            .put(SeedRecord {
                round_id,
                server_seed,
                server_seed_hash: server_seed_hash.clone(),
                client_seed: client_seed.to_string(),
                nonce,
                revealed: false,
                created_at: Utc::now(),
            })
            .await?;
        Ok(CommittedSeed {
            server_seed_hash,
            nonce,
        })
    }

    /// Public at-most-once disclosure of a round's server seed.
    pub async fn reveal(&self, round_id: Uuid) -> EngineResult<String> {
        let before = self.store.mark_revealed(round_id).await?;
        if before.revealed {
            return Err(EngineError::SeedAlreadyRevealed(round_id));
        }
        tracing::debug!(%round_id, "server seed revealed");
        Ok(before.server_seed)
    }

    /// Settlement-path disclosure: marks the seed revealed on first use but
    /// allows re-reads while the round is still open, so a settlement whose
    /// atomic commit failed can be retried.
    pub(crate) async fn disclose(&self, round_id: Uuid) -> EngineResult<SeedRecord> {
        let before = self.store.mark_revealed(round_id).await?;
        Ok(SeedRecord {
            revealed: true,
            ..before
        })
    }
}
