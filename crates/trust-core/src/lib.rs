//! Zero-knowledge trust-score certification for token contracts.
//!
//! A run turns a [`FactSet`] about one contract into a Groth16 proof and asks
//! an on-chain verifier to accept it:
//!
//! 1. [`encoder`] maps the facts onto the 8-word prover input vector,
//!    splitting the 160-bit address into two 80-bit halves.
//! 2. [`prover`] runs the external ZoKrates prover and decodes and checks its
//!    `proof.json` artifact.
//! 3. [`reconcile`] replaces the prover's claimed address halves with locally
//!    recomputed ones, binding the proof to the analysed contract.
//! 4. [`verifier`] submits the proof and the reconciled inputs on chain.
//!
//! [`pipeline::Certifier`] runs the four steps in sequence. The prover and the
//! verifier are traits so the pipeline can run against in-memory stand-ins.

pub mod crypto;
pub mod encoder;
pub mod error;
pub mod facts;
pub mod pipeline;
pub mod prover;
pub mod reconcile;
pub mod types;
pub mod verifier;

pub use alloy::primitives::{Address, U256};

pub use crypto::bn254::FIELD_PRIME;
pub use encoder::{encode, split_address, ADDRESS_HEX_DIGITS};
pub use error::{CertifyError, Result, Stage};
pub use facts::{normalize_address, FactSet};
pub use pipeline::{Certification, Certifier};
pub use prover::{parse_computation, Prover, ProverConfig, ZokratesProver, DEFAULT_PROGRAM};
pub use reconcile::reconcile;
pub use types::{Computation, Proof, ProverInput, PublicInputs};
pub use verifier::{OnChainConfig, OnChainVerifier, Verifier, parse_private_key};
