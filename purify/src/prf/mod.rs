//! Native (non-circuit) PRF evaluation and key handling.

use anyhow::{ensure, Result};
use num::bigint::BigUint;
use num::{Integer, One};
use purify_field::ops::Square;
use purify_field::secp256k1_scalar::Secp256K1Scalar;
use purify_field::types::{Field, PrimeField};

use crate::curve::curve_types::{AffinePoint, Curve};
use crate::curve::purify_curves::{Purify1, Purify2, D};
use crate::hash::hash_to_curve;

pub mod circuit;

type F = Secp256K1Scalar;

/// Split a packed secret in `[0, (N1−1)(N2−1)/4)` into the scalar pair
/// `(1 + z mod (N1−1)/2, 1 + z div (N1−1)/2)`.
pub fn unpack_secret(z: &BigUint) -> (BigUint, BigUint) {
    let half_n1 = (Purify1::order() - BigUint::one()) >> 1;
    (
        BigUint::one() + z.mod_floor(&half_n1),
        BigUint::one() + z.div_floor(&half_n1),
    )
}

/// Pack the two public x-coordinates into a single integer in `[0, P²)`.
pub fn pack_public(x1: F, x2: F) -> BigUint {
    x1.to_canonical_biguint() + F::order() * x2.to_canonical_biguint()
}

/// Split a packed public key into its two x-coordinates.
pub fn unpack_public(packed: &BigUint) -> Result<(F, F)> {
    ensure!(
        packed < &(F::order() * F::order()),
        "public key out of range"
    );
    let (hi, lo) = packed.div_rem(&F::order());
    Ok((
        F::from_noncanonical_biguint(lo),
        F::from_noncanonical_biguint(hi),
    ))
}

/// Combine x-coordinates from the two curves into the PRF output.
///
/// u − v is nonzero whenever x1 and x2 are x-coordinates on their respective
/// curves, since D is a non-square.
pub fn combine(x1: F, x2: F) -> F {
    let u = x1;
    let v = x2 * D.inverse();
    let w = (u - v).inverse();
    ((u + v) * (Purify1::A + u * v) + Purify1::B.double()) * w.square()
}

/// The per-message point pair, hashed onto both curves.
pub fn message_points(msg: &[u8]) -> Result<(AffinePoint<Purify1>, AffinePoint<Purify2>)> {
    let m1 = hash_to_curve(&[b"Eval/1/".as_slice(), msg].concat())?;
    let m2 = hash_to_curve(&[b"Eval/2/".as_slice(), msg].concat())?;
    Ok((m1, m2))
}

/// The affine public key pair `(z1·G1, z2·G2)`.
pub fn public_key_points(
    z1: &BigUint,
    z2: &BigUint,
) -> (AffinePoint<Purify1>, AffinePoint<Purify2>) {
    (
        Purify1::generator().to_jacobian().mul(z1).to_affine(),
        Purify2::generator().to_jacobian().mul(z2).to_affine(),
    )
}

/// Evaluate the PRF on `msg` under the packed secret `z`.
pub fn evaluate(msg: &[u8], z: &BigUint) -> Result<F> {
    let (z1, z2) = unpack_secret(z);
    let (m1, m2) = message_points(msg)?;
    let q1 = m1.to_jacobian().mul(&z1).to_affine();
    let q2 = m2.to_jacobian().mul(&z2).to_affine();
    Ok(combine(q1.x, q2.x))
}
