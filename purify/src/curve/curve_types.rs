use core::fmt::Debug;
use core::hash::Hash;
use core::ops::Neg;

use num::bigint::BigUint;
use purify_field::ops::Square;
use purify_field::types::{Field, PrimeField};
use serde::{Deserialize, Serialize};

/// A short Weierstrass curve.
pub trait Curve: 'static + Sync + Sized + Copy + Debug {
    type BaseField: PrimeField;

    const A: Self::BaseField;
    const B: Self::BaseField;

    /// The order of the generator.
    fn order() -> BigUint;

    /// The fixed generator, derived by hash-to-curve from a curve-specific
    /// domain tag.
    fn generator() -> AffinePoint<Self>;

    fn is_safe_curve() -> bool {
        // Discriminant check: 4A³ + 27B² must not vanish.
        (Self::A.cube().double().double() + Self::B.square().triple().triple().triple())
            .is_nonzero()
    }

    /// Whether `x` is the affine x-coordinate of a curve point.
    fn is_x_coord(x: Self::BaseField) -> bool {
        (x.cube() + Self::A * x + Self::B).is_quadratic_residue()
    }

    /// Lift `x` to a curve point, picking the square root `sqrt` returns.
    fn lift_x(x: Self::BaseField) -> Option<AffinePoint<Self>> {
        let y = (x.cube() + Self::A * x + Self::B).sqrt()?;
        Some(AffinePoint::nonzero(x, y))
    }
}

/// A point on a short Weierstrass curve, represented in affine coordinates.
#[derive(Copy, Clone, Debug, Deserialize, Serialize)]
pub struct AffinePoint<C: Curve> {
    pub x: C::BaseField,
    pub y: C::BaseField,
    pub zero: bool,
}

impl<C: Curve> AffinePoint<C> {
    pub const ZERO: Self = Self {
        x: C::BaseField::ZERO,
        y: C::BaseField::ZERO,
        zero: true,
    };

    pub fn nonzero(x: C::BaseField, y: C::BaseField) -> Self {
        let point = Self { x, y, zero: false };
        debug_assert!(point.is_valid());
        point
    }

    pub fn is_valid(&self) -> bool {
        let Self { x, y, zero } = *self;
        zero || y.square() == x.cube() + C::A * x + C::B
    }

    pub fn to_jacobian(&self) -> JacobianPoint<C> {
        let Self { x, y, zero } = *self;
        if zero {
            JacobianPoint::ZERO
        } else {
            JacobianPoint {
                x,
                y,
                z: C::BaseField::ONE,
            }
        }
    }
}

impl<C: Curve> PartialEq for AffinePoint<C> {
    fn eq(&self, other: &Self) -> bool {
        let AffinePoint {
            x: x1,
            y: y1,
            zero: zero1,
        } = *self;
        let AffinePoint {
            x: x2,
            y: y2,
            zero: zero2,
        } = *other;
        if zero1 || zero2 {
            return zero1 == zero2;
        }
        x1 == x2 && y1 == y2
    }
}

impl<C: Curve> Eq for AffinePoint<C> {}

impl<C: Curve> Hash for AffinePoint<C> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        if self.zero {
            self.zero.hash(state);
        } else {
            self.x.hash(state);
            self.y.hash(state);
        }
    }
}

impl<C: Curve> Neg for AffinePoint<C> {
    type Output = AffinePoint<C>;

    fn neg(self) -> Self::Output {
        let AffinePoint { x, y, zero } = self;
        AffinePoint { x, y: -y, zero }
    }
}

/// A point on a short Weierstrass curve, in Jacobian coordinates: `(X, Y, Z)`
/// represents affine `(X/Z², Y/Z³)`, or the identity when `Z = 0`.
#[derive(Copy, Clone, Debug, Deserialize, Serialize)]
pub struct JacobianPoint<C: Curve> {
    pub x: C::BaseField,
    pub y: C::BaseField,
    pub z: C::BaseField,
}

impl<C: Curve> JacobianPoint<C> {
    pub const ZERO: Self = Self {
        x: C::BaseField::ZERO,
        y: C::BaseField::ONE,
        z: C::BaseField::ZERO,
    };

    pub fn nonzero(x: C::BaseField, y: C::BaseField, z: C::BaseField) -> Self {
        let point = Self { x, y, z };
        debug_assert!(point.is_valid());
        point
    }

    pub fn is_zero(&self) -> bool {
        self.z.is_zero()
    }

    pub fn is_valid(&self) -> bool {
        let Self { x, y, z } = *self;
        z.is_zero()
            || y.square()
                == x.cube() + C::A * x * z.square().square() + C::B * z.square().cube()
    }

    pub fn to_affine(&self) -> AffinePoint<C> {
        let Self { x, y, z } = *self;
        if z.is_zero() {
            AffinePoint::ZERO
        } else {
            let inv = z.inverse();
            let inv_sq = inv.square();
            AffinePoint::nonzero(x * inv_sq, y * inv_sq * inv)
        }
    }

    #[must_use]
    pub fn double(&self) -> Self {
        let Self { x, y, z } = *self;
        if z.is_zero() {
            return Self::ZERO;
        }

        let yy = y.square();
        let yyyy = yy.square();
        let xx = x.square();
        let s = (x * yy).double().double();
        let mut m = xx.triple();
        if C::A.is_nonzero() {
            m += C::A * z.square().square();
        }
        let x3 = m.square() - s.double();
        let y3 = m * (s - x3) - yyyy.double().double().double();
        let z3 = (y * z).double();
        Self {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    /// Add an affine point. Falls back to `double` on equal inputs and
    /// returns the identity on opposite inputs.
    #[must_use]
    pub fn add_mixed(&self, rhs: &AffinePoint<C>) -> Self {
        if rhs.zero {
            return *self;
        }
        if self.z.is_zero() {
            return rhs.to_jacobian();
        }

        let zz = self.z.square();
        let zzz = zz * self.z;
        let u2 = rhs.x * zz;
        let s2 = rhs.y * zzz;
        if self.x == u2 {
            if self.y != s2 {
                return Self::ZERO;
            }
            return self.double();
        }

        let h = u2 - self.x;
        let r = s2 - self.y;
        let hh = h.square();
        let hhh = hh * h;
        let u1hh = self.x * hh;
        let x3 = r.square() - hhh - u1hh.double();
        let y3 = r * (u1hh - x3) - self.y * hhh;
        let z3 = h * self.z;
        Self {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    /// Full Jacobian addition, with the same equal/opposite handling as
    /// `add_mixed`.
    #[must_use]
    pub fn add(&self, rhs: &Self) -> Self {
        if self.z.is_zero() {
            return *rhs;
        }
        if rhs.z.is_zero() {
            return *self;
        }
        if self.z.is_one() {
            return rhs.add_mixed(&AffinePoint::nonzero(self.x, self.y));
        }
        if rhs.z.is_one() {
            return self.add_mixed(&AffinePoint::nonzero(rhs.x, rhs.y));
        }

        let zz1 = self.z.square();
        let zzz1 = zz1 * self.z;
        let zz2 = rhs.z.square();
        let zzz2 = zz2 * rhs.z;
        let u1 = self.x * zz2;
        let u2 = rhs.x * zz1;
        let s1 = self.y * zzz2;
        let s2 = rhs.y * zzz1;
        if u1 == u2 {
            if s1 != s2 {
                return Self::ZERO;
            }
            return self.double();
        }

        let h = u2 - u1;
        let r = s2 - s1;
        let hh = h.square();
        let hhh = hh * h;
        let u1hh = u1 * hh;
        let x3 = r.square() - hhh - u1hh.double();
        let y3 = r * (u1hh - x3) - s1 * hhh;
        let z3 = h * self.z * rhs.z;
        Self {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    /// Double-and-add scalar multiplication, most significant bit first.
    #[must_use]
    pub fn mul(&self, n: &BigUint) -> Self {
        let mut result = Self::ZERO;
        for i in (0..n.bits()).rev() {
            result = result.double();
            if n.bit(i) {
                result = result.add(self);
            }
        }
        result
    }
}

impl<C: Curve> PartialEq for JacobianPoint<C> {
    fn eq(&self, other: &Self) -> bool {
        let Self {
            x: x1,
            y: y1,
            z: z1,
        } = *self;
        let Self {
            x: x2,
            y: y2,
            z: z2,
        } = *other;
        if z1.is_zero() || z2.is_zero() {
            return z1.is_zero() == z2.is_zero();
        }

        // Compare (x1/z1², y1/z1³) with (x2/z2², y2/z2³) without dividing.
        let zz1 = z1.square();
        let zz2 = z2.square();
        x1 * zz2 == x2 * zz1 && y1 * zz2 * z2 == y2 * zz1 * z1
    }
}

impl<C: Curve> Eq for JacobianPoint<C> {}

impl<C: Curve> Neg for JacobianPoint<C> {
    type Output = JacobianPoint<C>;

    fn neg(self) -> Self::Output {
        let JacobianPoint { x, y, z } = self;
        JacobianPoint { x, y: -y, z }
    }
}
