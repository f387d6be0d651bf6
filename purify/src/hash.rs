//! Uniform hash-to-int and hash-to-curve by HKDF-SHA256 rejection sampling.

use anyhow::{bail, Result};
use hkdf::Hkdf;
use num::bigint::BigUint;
use num::One;
use purify_field::types::Field;
use sha2::Sha256;

use crate::curve::curve_types::{AffinePoint, Curve};

fn hkdf_sha256(length: usize, ikm: &[u8], salt: &[u8], info: &[u8]) -> Vec<u8> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = vec![0u8; length];
    hk.expand(info, &mut okm).expect("okm length is valid");
    okm
}

/// Sample an integer uniformly from `[0, range)`, keyed by `data`.
///
/// Rejection sampling with a one-byte counter in the HKDF salt; the mask
/// keeps only `range.bits()` bits, so each retry accepts with probability at
/// least one half.
pub fn hash_to_int(data: &[u8], range: &BigUint, info: &[u8]) -> Result<BigUint> {
    let bits = range.bits();
    let mask = (BigUint::one() << bits) - BigUint::one();
    let length = bits.div_ceil(8) as usize;
    for counter in 0u8..=255 {
        let okm = hkdf_sha256(length, data, &[counter], info);
        let v = BigUint::from_bytes_be(&okm) & &mask;
        if &v < range {
            return Ok(v);
        }
    }
    bail!("hash-to-int exhausted its 256 rejection retries");
}

/// Hash `data` to a curve point.
///
/// Samples v uniformly from [0, 2P), takes x = v div 2, and on a liftable x
/// negates y when v is odd; otherwise retries with the next one-byte counter
/// in the HKDF info.
pub fn hash_to_curve<C: Curve>(data: &[u8]) -> Result<AffinePoint<C>> {
    let range = C::BaseField::order() << 1;
    for counter in 0u8..=255 {
        let v = hash_to_int(data, &range, &[counter])?;
        let x = C::BaseField::from_noncanonical_biguint(&v >> 1);
        if let Some(point) = C::lift_x(x) {
            return Ok(if v.bit(0) { -point } else { point });
        }
    }
    bail!("hash-to-curve exhausted its 256 retries");
}
