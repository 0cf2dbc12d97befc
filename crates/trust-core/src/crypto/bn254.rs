//! Decoding of raw `uint256` words into BN254 field elements and points.

use alloy::primitives::U256;
use ark_bn254::{Fq, Fq2, Fr, G1Affine, G2Affine};
use ark_ff::{BigInteger256, PrimeField};

/// BN254 scalar field modulus, the prime every public input must stay below.
pub const FIELD_PRIME: U256 = U256::from_limbs(<Fr as PrimeField>::MODULUS.0);

/// BN254 base field modulus, the bound on every proof coordinate.
pub const BASE_PRIME: U256 = U256::from_limbs(<Fq as PrimeField>::MODULUS.0);

/// Decodes a word into a scalar field element.
///
/// Returns `None` unless the word is a canonical element, i.e. strictly below
/// [`FIELD_PRIME`].
pub fn scalar(word: &U256) -> Option<Fr> {
    Fr::from_bigint(to_limbs(word))
}

/// Decodes a word into a base field element.
pub fn base(word: &U256) -> Option<Fq> {
    Fq::from_bigint(to_limbs(word))
}

/// Decodes a `(x, y)` pair into a G1 point, rejecting off-curve points.
pub fn g1_point(point: &[U256; 2]) -> Option<G1Affine> {
    let x = base(&point[0])?;
    let y = base(&point[1])?;

    let point = G1Affine::new_unchecked(x, y);
    point.is_on_curve().then_some(point)
}

/// Decodes a `[[x_im, x_re], [y_im, y_re]]` array into a G2 point.
///
/// Coordinates follow the EIP-197 precompile layout consumed by the verifier
/// contract: the imaginary part (c1) comes first in each pair.
pub fn g2_point(point: &[[U256; 2]; 2]) -> Option<G2Affine> {
    let [[x_im, x_re], [y_im, y_re]] = point;

    let x = Fq2::new(base(x_re)?, base(x_im)?);
    let y = Fq2::new(base(y_re)?, base(y_im)?);

    let point = G2Affine::new_unchecked(x, y);
    point.is_on_curve().then_some(point)
}

/// Projects a field element onto `[0, 1)` by dividing by [`FIELD_PRIME`].
///
/// This is a floating-point approximation for human reporting only.
pub fn normalize(word: &U256) -> f64 {
    approximate(word) / approximate(&FIELD_PRIME)
}

fn approximate(word: &U256) -> f64 {
    word.as_limbs()
        .iter()
        .rev()
        .fold(0.0, |acc, &limb| acc * 18_446_744_073_709_551_616.0 + limb as f64)
}

/// Reinterprets a word as the 4-limb little-endian representation arkworks expects.
fn to_limbs(word: &U256) -> BigInteger256 {
    BigInteger256::new(word.into_limbs())
}
