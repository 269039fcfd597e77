use fairbet::{FairnessVerifier, RevealArtifact, Verdict};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: verify-reveal <reveal-artifact.json>");
        std::process::exit(2);
    };

    let json = match std::fs::read_to_string(&path) {
        Ok(json) => json,
        Err(err) => {
            println!("❌ Could not read {}: {}", path, err);
            std::process::exit(2);
        }
    };
    let artifact: RevealArtifact = match serde_json::from_str(&json) {
        Ok(artifact) => artifact,
        Err(err) => {
            println!("❌ Not a valid reveal artifact: {}", err);
            std::process::exit(2);
        }
    };

    println!("🔍 Reveal Verification");
    println!("======================");
    println!("Game:        {}", artifact.game);
    println!("Stake:       {}", artifact.stake);
    println!("Client Seed: {}", artifact.reveal.client_seed);
    println!("Nonce:       {}", artifact.reveal.nonce);
    println!("Commitment:  {}\n", artifact.reveal.server_seed_hash);

    let verifier = FairnessVerifier::new(fairbet::games::builtin());
    match verifier.verify_artifact(&artifact) {
        Ok(Verdict::Verified) => {
            println!("✅ REVEAL VERIFIED!");
            println!("   Commitment hash matches the revealed seed");
            println!("   Replayed outcome matches the settled result");
            println!("   Payout: {}", artifact.outcome.payout);
        }
        Ok(Verdict::CommitmentMismatch) => {
            println!("❌ VERIFICATION FAILED!");
            println!("   The revealed seed does not hash to the published commitment");
            std::process::exit(1);
        }
        Ok(Verdict::ResultMismatch) => {
            println!("❌ VERIFICATION FAILED!");
            println!("   Replaying the derivation produced a different result");
            std::process::exit(1);
        }
        Err(err) => {
            println!("❌ Verification could not run: {}", err);
            std::process::exit(2);
        }
    }
}
