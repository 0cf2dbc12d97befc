//! Rebuilds the public inputs that are actually submitted for verification.
//!
//! The prover's score and signature are accepted as-is: they only mean
//! something inside the circuit and the verifier checks them against the
//! proof. The address halves bind the proof to a contract, so they are
//! recomputed from the fact set and whatever the prover claimed is discarded.

use std::fmt;

use tracing::warn;

use crate::encoder::split_address;
use crate::error::Result;
use crate::facts::FactSet;
use crate::types::{Computation, PublicInputs};

/// A named public input.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InputField {
    /// `score`
    Score,
    /// `signature`
    Signature,
    /// `address_part1`
    AddressPart1,
    /// `address_part2`
    AddressPart2,
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InputField::Score => "score",
            InputField::Signature => "signature",
            InputField::AddressPart1 => "address_part1",
            InputField::AddressPart2 => "address_part2",
        })
    }
}

/// Fields copied from the prover's claim.
pub const TRUSTED_FIELDS: [InputField; 2] = [InputField::Score, InputField::Signature];

/// Fields recomputed locally from the fact set.
pub const RECOMPUTED_FIELDS: [InputField; 2] = [InputField::AddressPart1, InputField::AddressPart2];

/// Produces the public inputs to verify for `facts`.
///
/// The address halves of the result depend on `facts` only. The only errors
/// are the encoder's address errors.
pub fn reconcile(computation: &Computation, facts: &FactSet) -> Result<PublicInputs> {
    let (address_part1, address_part2) = split_address(&facts.contract_address)?;

    let reconciled = PublicInputs {
        score: computation.inputs.score,
        signature: computation.inputs.signature,
        address_part1,
        address_part2,
    };

    let replaced = mismatches(&computation.inputs, &reconciled);
    if !replaced.is_empty() {
        warn!(
            contract = %facts.contract_address,
            fields = ?replaced,
            "prover claimed address inputs that do not match the analysed contract; substituting"
        );
    }

    Ok(reconciled)
}

/// Lists the recomputed fields whose claimed value differs from the reconciled one.
pub fn mismatches(claimed: &PublicInputs, reconciled: &PublicInputs) -> Vec<InputField> {
    RECOMPUTED_FIELDS
        .into_iter()
        .filter(|field| match field {
            InputField::AddressPart1 => claimed.address_part1 != reconciled.address_part1,
            InputField::AddressPart2 => claimed.address_part2 != reconciled.address_part2,
            InputField::Score | InputField::Signature => false,
        })
        .collect()
}
