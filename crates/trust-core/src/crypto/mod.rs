//! BN254 helpers for checking prover output before it reaches the chain.
//!
//! The on-chain verifier consumes raw `uint256` words. Decoding those words
//! into arkworks field elements and curve points here catches non-canonical
//! field elements and off-curve points locally, instead of paying for a
//! transaction that can only fail.

pub mod bn254;
