//! Fairbet - Provably-Fair Casino Settlement Engine
//!
//! Commit/reveal seed scheme, deterministic per-game outcome derivation,
//! atomic idempotent settlement, and an offline fairness verifier.
//! Every payout is integer minor-unit arithmetic; every round is
//! reproducible from its published reveal.

pub mod config;
pub mod errors;
pub mod fairness;
pub mod games;
pub mod rng;
pub mod seeds;
pub mod settlement;
pub mod store;

pub use config::{EngineConfig, GameParams};
pub use errors::{EngineError, EngineResult};
pub use fairness::{FairnessVerifier, OutcomeVerifier, Reveal, RevealArtifact, Verdict};
pub use games::types::{GameType, Outcome, ResultPayload, Selection};
pub use games::GeneratorRegistry;
pub use seeds::{MemorySeedStore, SeedAuthority};
pub use settlement::{AllowAllGate, SettlementEngine, SettlementResult, TracingAlertSink};
pub use store::{EngineStore, MemoryStore};
