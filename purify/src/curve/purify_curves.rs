use std::sync::OnceLock;

use num::bigint::BigUint;
use purify_field::secp256k1_scalar::Secp256K1Scalar;
use serde::{Deserialize, Serialize};

use crate::curve::curve_types::{AffinePoint, Curve};
use crate::hash::hash_to_curve;

/// The twist multiplier relating the two curves; a non-square in the base
/// field.
pub const D: Secp256K1Scalar = Secp256K1Scalar([5, 0, 0, 0]);

/// First curve of the Purify pair: y² = x³ + 118x + 339 over the secp256k1
/// scalar field.
#[derive(Debug, Copy, Clone, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Purify1;

impl Curve for Purify1 {
    type BaseField = Secp256K1Scalar;

    const A: Secp256K1Scalar = Secp256K1Scalar([118, 0, 0, 0]);
    const B: Secp256K1Scalar = Secp256K1Scalar([339, 0, 0, 0]);

    fn order() -> BigUint {
        // 115792089237316195423570985008687907853146579067639158218940405176378157516777
        BigUint::from_slice(&[
            0x58E547E9, 0x8A5A2A2C, 0x05347212, 0xA328F244, 0xFFFFFFFF, 0xFFFFFFFF, 0xFFFFFFFF,
            0xFFFFFFFF,
        ])
    }

    fn generator() -> AffinePoint<Self> {
        static GENERATOR: OnceLock<AffinePoint<Purify1>> = OnceLock::new();
        *GENERATOR.get_or_init(|| hash_to_curve(b"Generator/1").expect("generator derivation failed"))
    }
}

/// Second curve of the Purify pair: y² = x³ + A·D²·x + B·D³, 2-isogenous to
/// the first.
#[derive(Debug, Copy, Clone, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Purify2;

impl Curve for Purify2 {
    type BaseField = Secp256K1Scalar;

    // 118 * 5² and 339 * 5³.
    const A: Secp256K1Scalar = Secp256K1Scalar([2950, 0, 0, 0]);
    const B: Secp256K1Scalar = Secp256K1Scalar([42375, 0, 0, 0]);

    fn order() -> BigUint {
        // 115792089237316195423570985008687907852528549490510650546269921106658165471899
        BigUint::from_slice(&[
            0x47873A9B, 0xF54A92ED, 0x595CCE64, 0xD234C789, 0xFFFFFFFD, 0xFFFFFFFF, 0xFFFFFFFF,
            0xFFFFFFFF,
        ])
    }

    fn generator() -> AffinePoint<Self> {
        static GENERATOR: OnceLock<AffinePoint<Purify2>> = OnceLock::new();
        *GENERATOR.get_or_init(|| hash_to_curve(b"Generator/2").expect("generator derivation failed"))
    }
}

#[cfg(test)]
mod tests {
    use purify_field::types::PrimeField;

    use super::{Purify1, Purify2, D};
    use crate::curve::curve_types::Curve;

    #[test]
    fn test_curves_are_safe() {
        assert!(Purify1::is_safe_curve());
        assert!(Purify2::is_safe_curve());
    }

    #[test]
    fn test_twist_multiplier_is_non_square() {
        assert_eq!(D.legendre(), -1);
    }

    #[test]
    fn test_generators_are_valid() {
        assert!(Purify1::generator().is_valid());
        assert!(Purify2::generator().is_valid());
    }

    #[test]
    fn test_generator_order() {
        // The generator's order divides the stored group order.
        let g1 = Purify1::generator().to_jacobian();
        assert!(g1.mul(&Purify1::order()).is_zero());
        let g2 = Purify2::generator().to_jacobian();
        assert!(g2.mul(&Purify2::order()).is_zero());
    }

    #[test]
    fn test_generators_are_deterministic() {
        assert_eq!(Purify1::generator(), Purify1::generator());
    }
}
