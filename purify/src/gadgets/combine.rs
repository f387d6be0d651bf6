//! The two-curve x-combiner.
//!
//! For x1 on the first curve and x2 on the second, set (u, v) = (x1, x2/D);
//! then `((u+v)·(u·v + A) + 2B) / (u−v)²` is uniform in the field. D being a
//! non-square guarantees u ≠ v.

use anyhow::Result;
use purify_field::secp256k1_scalar::Secp256K1Scalar;
use purify_field::types::Field;

use crate::curve::curve_types::Curve;
use crate::curve::purify_curves::{Purify1, D};
use crate::iop::expr::Expr;
use crate::iop::transcript::Transcript;

impl Transcript<Secp256K1Scalar> {
    /// Combine the two x-coordinates into the PRF output. Two
    /// multiplications, one squaring and one division.
    pub fn combine_x(
        &mut self,
        x1: &Expr<Secp256K1Scalar>,
        x2: &Expr<Secp256K1Scalar>,
    ) -> Result<Expr<Secp256K1Scalar>> {
        let u = x1.clone();
        let v = x2.clone() * D.inverse();
        let uv = self.mul(&u, &v);
        let numerator = self.mul(&(u.clone() + v.clone()), &(uv + Expr::from(Purify1::A)))
            + Expr::from(Purify1::B.double());
        let diff = u - v;
        let denominator = self.mul(&diff, &diff);
        self.div(&numerator, &denominator)
    }
}

#[cfg(test)]
mod tests {
    use num::bigint::BigUint;
    use purify_field::secp256k1_scalar::Secp256K1Scalar;

    use crate::curve::curve_types::Curve;
    use crate::curve::purify_curves::{Purify1, Purify2};
    use crate::iop::transcript::Transcript;
    use crate::prf;

    type F = Secp256K1Scalar;

    #[test]
    fn test_combine_gadget_matches_native() {
        for k in [1u64, 2, 12345] {
            let q1 = Purify1::generator()
                .to_jacobian()
                .mul(&BigUint::from(k))
                .to_affine();
            let q2 = Purify2::generator()
                .to_jacobian()
                .mul(&BigUint::from(k))
                .to_affine();

            let mut t = Transcript::<F>::new();
            let x1 = t.secret(Some(q1.x));
            let x2 = t.secret(Some(q2.x));
            let out = t.combine_x(&x1, &x2).unwrap();
            assert_eq!(t.evaluate(&out), Some(prf::combine(q1.x, q2.x)));
            // u·v, numerator, (u−v)² and the division.
            assert_eq!(t.muls().len(), 4);
        }
    }
}
