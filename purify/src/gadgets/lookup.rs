//! Boolean-indexed table lookups as multilinear interpolations.
//!
//! A k-bit lookup over booleans b0..b_{k-1} returns `v[b0 + 2·b1 + ...]` as
//! an affine expression; the only multiplications spent are the products of
//! distinct booleans, which the transcript shares across lookups.

use purify_field::types::PrimeField;

use crate::iop::expr::Expr;
use crate::iop::transcript::Transcript;

impl<F: PrimeField> Transcript<F> {
    /// One-boolean lookup: `v[x]`. Purely linear.
    pub fn lookup_1bit(&mut self, v: &[F; 2], x: &Expr<F>) -> Expr<F> {
        Expr::from(v[0]) + x.clone() * (v[1] - v[0])
    }

    /// Two-boolean lookup: `v[x + 2y]`. One multiplication.
    pub fn lookup_2bit(&mut self, v: &[F; 4], x: &Expr<F>, y: &Expr<F>) -> Expr<F> {
        let xy = self.mul(x, y);
        Expr::from(v[0])
            + x.clone() * (v[1] - v[0])
            + y.clone() * (v[2] - v[0])
            + xy * (v[0] + v[3] - v[1] - v[2])
    }

    /// Three-boolean lookup: `v[x + 2y + 4z]`. Four multiplications, all
    /// shared with any other lookup over the same booleans.
    pub fn lookup_3bit(&mut self, v: &[F; 8], x: &Expr<F>, y: &Expr<F>, z: &Expr<F>) -> Expr<F> {
        let xy = self.mul(x, y);
        let yz = self.mul(y, z);
        let zx = self.mul(z, x);
        let xyz = self.mul(&xy, z);
        Expr::from(v[0])
            + x.clone() * (v[1] - v[0])
            + y.clone() * (v[2] - v[0])
            + z.clone() * (v[4] - v[0])
            + xy * (v[0] + v[3] - v[1] - v[2])
            + zx * (v[0] + v[5] - v[1] - v[4])
            + yz * (v[0] + v[6] - v[2] - v[4])
            + xyz * (v[1] + v[2] + v[4] + v[7] - v[0] - v[3] - v[5] - v[6])
    }
}
