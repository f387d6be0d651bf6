//! Curve point gadgets over symbolic affine coordinates.

use anyhow::Result;
use purify_field::types::{Field, PrimeField};

use crate::curve::curve_types::{AffinePoint, Curve, JacobianPoint};
use crate::iop::expr::Expr;
use crate::iop::transcript::Transcript;

/// A curve point whose affine coordinates are expressions. The gadgets below
/// never produce the identity, so no zero flag is carried.
#[derive(Clone, Debug)]
pub struct AffinePointExpr<F: PrimeField> {
    pub x: Expr<F>,
    pub y: Expr<F>,
}

fn to_affine<C: Curve>(points: &[JacobianPoint<C>]) -> Vec<AffinePoint<C>> {
    points
        .iter()
        .map(|p| {
            let affine = p.to_affine();
            debug_assert!(!affine.zero);
            affine
        })
        .collect()
}

impl<F: PrimeField> Transcript<F> {
    /// Select one of two precomputed points by a boolean.
    pub fn select_point_1bit<C: Curve<BaseField = F>>(
        &mut self,
        points: &[JacobianPoint<C>; 2],
        b0: &Expr<F>,
    ) -> AffinePointExpr<F> {
        let a = to_affine(points);
        AffinePointExpr {
            x: self.lookup_1bit(&[a[0].x, a[1].x], b0),
            y: self.lookup_1bit(&[a[0].y, a[1].y], b0),
        }
    }

    /// Select one of four precomputed points by two booleans.
    pub fn select_point_2bit<C: Curve<BaseField = F>>(
        &mut self,
        points: &[JacobianPoint<C>; 4],
        b0: &Expr<F>,
        b1: &Expr<F>,
    ) -> AffinePointExpr<F> {
        let a = to_affine(points);
        AffinePointExpr {
            x: self.lookup_2bit(&[a[0].x, a[1].x, a[2].x, a[3].x], b0, b1),
            y: self.lookup_2bit(&[a[0].y, a[1].y, a[2].y, a[3].y], b0, b1),
        }
    }

    /// Select one of eight precomputed points by three booleans.
    pub fn select_point_3bit<C: Curve<BaseField = F>>(
        &mut self,
        points: &[JacobianPoint<C>; 8],
        b0: &Expr<F>,
        b1: &Expr<F>,
        b2: &Expr<F>,
    ) -> AffinePointExpr<F> {
        let a = to_affine(points);
        AffinePointExpr {
            x: self.lookup_3bit(
                &[
                    a[0].x, a[1].x, a[2].x, a[3].x, a[4].x, a[5].x, a[6].x, a[7].x,
                ],
                b0,
                b1,
                b2,
            ),
            y: self.lookup_3bit(
                &[
                    a[0].y, a[1].y, a[2].y, a[3].y, a[4].y, a[5].y, a[6].y, a[7].y,
                ],
                b0,
                b1,
                b2,
            ),
        }
    }

    /// Negate the point when the boolean is set: `(x, (1 − 2·bn)·y)`.
    pub fn conditional_negate_point(
        &mut self,
        p: &AffinePointExpr<F>,
        bn: &Expr<F>,
    ) -> AffinePointExpr<F> {
        let sign = Expr::from(F::ONE) - bn.clone() * F::TWO;
        AffinePointExpr {
            x: p.x.clone(),
            y: self.mul(&sign, &p.y),
        }
    }

    /// Affine addition of two points the caller guarantees to be distinct
    /// and not opposite.
    pub fn curve_add(
        &mut self,
        p1: &AffinePointExpr<F>,
        p2: &AffinePointExpr<F>,
    ) -> Result<AffinePointExpr<F>> {
        let lambda = self.div(
            &(p2.y.clone() - p1.y.clone()),
            &(p2.x.clone() - p1.x.clone()),
        )?;
        let x3 = self.mul(&lambda, &lambda) - p1.x.clone() - p2.x.clone();
        let y3 = self.mul(&lambda, &(p1.x.clone() - x3.clone())) - p1.y.clone();
        Ok(AffinePointExpr { x: x3, y: y3 })
    }

    /// As `curve_add`, but returns only the x-coordinate, saving one
    /// multiplication.
    pub fn curve_add_x(
        &mut self,
        p1: &AffinePointExpr<F>,
        p2: &AffinePointExpr<F>,
    ) -> Result<Expr<F>> {
        let lambda = self.div(
            &(p2.y.clone() - p1.y.clone()),
            &(p2.x.clone() - p1.x.clone()),
        )?;
        Ok(self.mul(&lambda, &lambda) - p1.x.clone() - p2.x.clone())
    }
}

#[cfg(test)]
mod tests {
    use num::bigint::BigUint;
    use purify_field::secp256k1_scalar::Secp256K1Scalar;
    use purify_field::types::Field;

    use super::AffinePointExpr;
    use crate::curve::curve_types::{AffinePoint, Curve, JacobianPoint};
    use crate::curve::purify_curves::Purify1;
    use crate::iop::expr::Expr;
    use crate::iop::transcript::Transcript;

    type F = Secp256K1Scalar;

    fn multiple(k: u64) -> JacobianPoint<Purify1> {
        Purify1::generator().to_jacobian().mul(&BigUint::from(k))
    }

    fn constant_point(p: &AffinePoint<Purify1>) -> AffinePointExpr<F> {
        AffinePointExpr {
            x: Expr::from(p.x),
            y: Expr::from(p.y),
        }
    }

    #[test]
    fn test_select_point_2bit() {
        let points = [multiple(1), multiple(3), multiple(5), multiple(7)];
        for index in 0..4u64 {
            let mut t = Transcript::new();
            let b0 = t.secret(Some(F::from_canonical_u64(index & 1)));
            let b1 = t.secret(Some(F::from_canonical_u64(index >> 1)));
            let selected = t.select_point_2bit(&points, &b0, &b1);
            let expected = points[index as usize].to_affine();
            assert_eq!(t.evaluate(&selected.x), Some(expected.x));
            assert_eq!(t.evaluate(&selected.y), Some(expected.y));
        }
    }

    #[test]
    fn test_conditional_negate_point() {
        let p = multiple(5).to_affine();
        for bit in 0..2u64 {
            let mut t = Transcript::new();
            let bn = t.secret(Some(F::from_canonical_u64(bit)));
            let out = t.conditional_negate_point(&constant_point(&p), &bn);
            let expected = if bit == 1 { -p } else { p };
            assert_eq!(t.evaluate(&out.y), Some(expected.y));
            assert_eq!(t.evaluate(&out.x), Some(expected.x));
        }
    }

    #[test]
    fn test_curve_add_matches_native() {
        let a = multiple(5);
        let b = multiple(9);
        let expected = a.add(&b).to_affine();

        let mut t = Transcript::new();
        let sum = t
            .curve_add(
                &constant_point(&a.to_affine()),
                &constant_point(&b.to_affine()),
            )
            .unwrap();
        assert_eq!(t.evaluate(&sum.x), Some(expected.x));
        assert_eq!(t.evaluate(&sum.y), Some(expected.y));

        let mut t = Transcript::new();
        let x = t
            .curve_add_x(
                &constant_point(&a.to_affine()),
                &constant_point(&b.to_affine()),
            )
            .unwrap();
        assert_eq!(t.evaluate(&x), Some(expected.x));
    }

    #[test]
    fn test_curve_add_of_equal_points_fails() {
        let a = multiple(5).to_affine();
        let mut t = Transcript::new();
        assert!(t
            .curve_add(&constant_point(&a), &constant_point(&a))
            .is_err());
    }
}
