//! End-to-end certification of one fact set.

use alloy::primitives::U256;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::encoder::encode;
use crate::error::Result;
use crate::facts::FactSet;
use crate::prover::Prover;
use crate::reconcile::reconcile;
use crate::verifier::Verifier;

/// Outcome of a completed run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Certification {
    /// Whether the verifier accepted the proof.
    pub certified: bool,
    /// Contract the proof was bound to.
    pub contract_address: String,
    /// Score as a raw field element.
    pub score: U256,
    /// Score projected onto `[0, 1)`.
    pub normalized_score: f64,
    /// Curve reported by the prover.
    pub curve: String,
    /// Proving scheme reported by the prover.
    pub scheme: String,
    /// Hex SHA-256 of the proof artifact.
    pub proof_digest: String,
}

/// Runs encode → prove → reconcile → verify, strictly in sequence.
///
/// A run either returns a [`Certification`] or fails before anything is
/// submitted on chain; submission happens at most once.
pub struct Certifier<P, V> {
    prover: P,
    verifier: V,
}

impl<P: Prover, V: Verifier> Certifier<P, V> {
    /// Wires a prover and a verifier together.
    pub fn new(prover: P, verifier: V) -> Self {
        Self { prover, verifier }
    }

    /// Certifies `facts`.
    #[instrument(skip_all, fields(contract = %facts.contract_address))]
    pub async fn certify(&self, facts: &FactSet) -> Result<Certification> {
        let input = encode(facts)?;
        info!(words = ?input.words(), "encoded prover input");

        let computation = self.prover.generate_proof(&input).await?;
        let inputs = reconcile(&computation, facts)?;

        let certified = self.verifier.verify(&inputs, &computation.proof).await?;
        if certified {
            info!("proof accepted");
        } else {
            warn!("proof rejected by verifier");
        }

        Ok(Certification {
            certified,
            contract_address: facts.contract_address.clone(),
            score: inputs.score,
            normalized_score: inputs.normalized_score(),
            curve: computation.curve,
            scheme: computation.scheme,
            proof_digest: hex::encode(computation.artifact_digest),
        })
    }
}
