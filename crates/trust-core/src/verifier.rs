//! Verifier gateway: submits a proof to the on-chain Groth16 verifier.

use std::time::Duration;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, U256};
use alloy::providers::ProviderBuilder;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use tracing::{info, instrument};

use crate::error::{CertifyError, Result, Stage};
use crate::types::{Proof, PublicInputs};

mod abi {
    #![allow(missing_docs)]

    use alloy::sol;

    sol! {
        struct G1Point {
            uint256 x;
            uint256 y;
        }

        struct G2Point {
            uint256[2] x;
            uint256[2] y;
        }

        struct Groth16Proof {
            G1Point a;
            G2Point b;
            G1Point c;
        }

        #[sol(rpc)]
        interface ITrustVerifier {
            function verifyTx(Groth16Proof proof, uint256[4] input) external returns (bool valid);
        }
    }
}

use abi::{G1Point, G2Point, Groth16Proof, ITrustVerifier};

/// Checks a proof against its public inputs.
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Returns whether the verifier accepts the proof.
    ///
    /// A logical rejection is `Ok(false)`; errors are reserved for failures to
    /// obtain an answer.
    async fn verify(&self, inputs: &PublicInputs, proof: &Proof) -> Result<bool>;
}

/// Connection and signing settings for [`OnChainVerifier`].
#[derive(Clone)]
pub struct OnChainConfig {
    /// JSON-RPC endpoint of the chain hosting the verifier.
    pub rpc_url: String,
    /// Address of the deployed verifier contract.
    pub verifier_address: Address,
    /// Hex-encoded key signing the verification transaction.
    pub private_key: String,
    /// Bound on submission, inclusion and the read-only call, each.
    pub timeout: Duration,
    /// Fixed gas limit; estimated when unset.
    pub gas_limit: Option<u64>,
}

impl std::fmt::Debug for OnChainConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnChainConfig")
            .field("rpc_url", &self.rpc_url)
            .field("verifier_address", &self.verifier_address)
            .field("private_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("gas_limit", &self.gas_limit)
            .finish()
    }
}

/// Verifier contract reached over JSON-RPC.
///
/// Each call sends one signed `verifyTx` transaction, waits for its receipt,
/// then reads the verdict with an `eth_call` of the same entry point so the
/// answer does not depend on how the receipt reports return data.
pub struct OnChainVerifier {
    config: OnChainConfig,
}

impl OnChainVerifier {
    /// Creates a gateway.
    pub fn new(config: OnChainConfig) -> Self {
        Self { config }
    }

    fn timeout(&self) -> CertifyError {
        CertifyError::Timeout {
            stage: Stage::Verification,
            after: self.config.timeout,
        }
    }
}

#[async_trait]
impl Verifier for OnChainVerifier {
    #[instrument(skip_all, fields(verifier = %self.config.verifier_address))]
    async fn verify(&self, inputs: &PublicInputs, proof: &Proof) -> Result<bool> {
        let signer = parse_private_key(&self.config.private_key)?;

        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(EthereumWallet::from(signer))
            .on_http(
                self.config
                    .rpc_url
                    .parse()
                    .map_err(|e| CertifyError::Configuration(format!("invalid RPC URL: {e}")))?,
            );

        let contract = ITrustVerifier::new(self.config.verifier_address, &provider);
        let proof = solidity_proof(proof);
        let words = inputs.to_words();

        info!(?words, "submitting verification transaction");

        let mut submission = contract.verifyTx(proof.clone(), words);
        if let Some(gas) = self.config.gas_limit {
            submission = submission.gas(gas);
        }

        let pending = tokio::time::timeout(self.config.timeout, submission.send())
            .await
            .map_err(|_| self.timeout())?
            .map_err(|e| {
                CertifyError::TransactionRejected(format!("failed to send transaction: {e}"))
            })?;
        let tx_hash = *pending.tx_hash();
        info!(%tx_hash, "transaction sent");

        let receipt = tokio::time::timeout(self.config.timeout, pending.get_receipt())
            .await
            .map_err(|_| {
                CertifyError::TransactionRejected(format!(
                    "transaction {tx_hash} not mined within {:?}",
                    self.config.timeout
                ))
            })?
            .map_err(|e| {
                CertifyError::TransactionRejected(format!("failed to get receipt for {tx_hash}: {e}"))
            })?;

        if !receipt.status() {
            return Err(CertifyError::TransactionRejected(format!(
                "transaction {tx_hash} reverted"
            )));
        }
        info!(
            %tx_hash,
            block = receipt.block_number.unwrap_or(0),
            "transaction confirmed"
        );

        let check = contract.verifyTx(proof, words);
        let verdict = tokio::time::timeout(self.config.timeout, check.call())
            .await
            .map_err(|_| self.timeout())?
            .map_err(|e| CertifyError::VerifierCallFailed(e.to_string()))?;

        info!(accepted = verdict.valid, "verifier answered");
        Ok(verdict.valid)
    }
}

/// Parses a hex signing key, with or without `0x`.
///
/// Exposed so callers can reject a bad key before doing any expensive work.
pub fn parse_private_key(raw: &str) -> Result<PrivateKeySigner> {
    raw.trim()
        .parse()
        .map_err(|e| CertifyError::Configuration(format!("invalid private key: {e}")))
}

/// Lays out a proof as the verifier's `((x, y), ([x], [y]), (x, y))` tuple.
fn solidity_proof(proof: &Proof) -> Groth16Proof {
    let g1 = |p: &[U256; 2]| G1Point { x: p[0], y: p[1] };

    Groth16Proof {
        a: g1(&proof.a),
        b: G2Point {
            x: proof.b[0],
            y: proof.b[1],
        },
        c: g1(&proof.c),
    }
}
