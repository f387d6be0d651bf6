use core::fmt::{Debug, Display};
use core::hash::Hash;
use core::iter::{Product, Sum};
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use num::bigint::BigUint;
use num::{One, Zero};
use rand::rngs::OsRng;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::ops::Square;

/// Sampling
pub trait Sample: Sized {
    /// Samples a single value using `rng`.
    fn sample<R>(rng: &mut R) -> Self
    where
        R: rand::RngCore + ?Sized;

    /// Samples a single value using the [`OsRng`].
    #[inline]
    fn rand() -> Self {
        Self::sample(&mut OsRng)
    }
}

/// A finite field.
pub trait Field:
    'static
    + Copy
    + Eq
    + Hash
    + Neg<Output = Self>
    + Add<Self, Output = Self>
    + AddAssign<Self>
    + Sum
    + Sub<Self, Output = Self>
    + SubAssign<Self>
    + Mul<Self, Output = Self>
    + MulAssign<Self>
    + Square
    + Product
    + Div<Self, Output = Self>
    + DivAssign<Self>
    + Debug
    + Default
    + Display
    + Sample
    + Send
    + Sync
    + Serialize
    + DeserializeOwned
{
    const ZERO: Self;
    const ONE: Self;
    const TWO: Self;
    const NEG_ONE: Self;

    /// The 2-adicity of this field's multiplicative group.
    const TWO_ADICITY: usize;

    /// Generator of the entire multiplicative group, i.e. all non-zero elements.
    const MULTIPLICATIVE_GROUP_GENERATOR: Self;
    /// Generator of a multiplicative subgroup of order `2^TWO_ADICITY`.
    const POWER_OF_TWO_GENERATOR: Self;

    /// The bit length of the field order.
    const BITS: usize;

    fn order() -> BigUint;

    #[inline]
    fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    #[inline]
    fn is_nonzero(&self) -> bool {
        *self != Self::ZERO
    }

    #[inline]
    fn is_one(&self) -> bool {
        *self == Self::ONE
    }

    #[inline]
    fn double(&self) -> Self {
        *self + *self
    }

    #[inline]
    fn cube(&self) -> Self {
        self.square() * *self
    }

    fn triple(&self) -> Self {
        *self * (Self::ONE + Self::TWO)
    }

    /// Compute the multiplicative inverse of this field element.
    fn try_inverse(&self) -> Option<Self>;

    fn inverse(&self) -> Self {
        self.try_inverse().expect("Tried to invert zero")
    }

    fn from_noncanonical_biguint(val: BigUint) -> Self;

    fn from_canonical_u64(n: u64) -> Self;

    #[inline]
    fn from_canonical_usize(n: usize) -> Self {
        Self::from_canonical_u64(n as u64)
    }

    #[inline]
    fn from_bool(b: bool) -> Self {
        Self::from_canonical_u64(b as u64)
    }
}

/// A prime field, with canonical big-integer representatives in `[0, order)`.
pub trait PrimeField: Field {
    fn to_canonical_biguint(&self) -> BigUint;

    fn exp_biguint(&self, power: &BigUint) -> Self {
        Self::from_noncanonical_biguint(
            self.to_canonical_biguint().modpow(power, &Self::order()),
        )
    }

    /// Legendre symbol: 1 for a nonzero square, -1 for a non-square, 0 for zero.
    fn legendre(&self) -> i32 {
        let p = Self::order();
        let e = (&p - BigUint::one()) >> 1;
        let ls = self.to_canonical_biguint().modpow(&e, &p);
        if ls.is_zero() {
            0
        } else if ls == &p - BigUint::one() {
            -1
        } else {
            1
        }
    }

    /// Whether this element is a square (zero included).
    #[inline]
    fn is_quadratic_residue(&self) -> bool {
        self.legendre() != -1
    }

    /// A square root by Tonelli-Shanks. Returns `None` for non-squares and for
    /// zero.
    ///
    /// <https://en.wikipedia.org/wiki/Tonelli-Shanks_algorithm>
    fn sqrt(&self) -> Option<Self> {
        if self.is_zero() || self.legendre() != 1 {
            return None;
        }

        // order - 1 = q * 2^TWO_ADICITY with q odd.
        let q = (Self::order() - BigUint::one()) >> Self::TWO_ADICITY;

        let mut x = self.exp_biguint(&((&q + BigUint::one()) >> 1));
        let mut t = self.exp_biguint(&q);
        let mut c = Self::POWER_OF_TWO_GENERATOR;
        let mut m = Self::TWO_ADICITY;

        while !t.is_one() {
            // Lowest i such that t^(2^i) = 1; i < m since t is in the 2^m-torsion.
            let mut i = 1;
            let mut e = t.square();
            while !e.is_one() {
                e = e.square();
                i += 1;
            }

            let mut b = c;
            for _ in 0..m - i - 1 {
                b = b.square();
            }
            x *= b;
            c = b.square();
            t *= c;
            m = i;
        }

        Some(x)
    }
}
