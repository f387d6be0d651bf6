//! Windowed scalar multiplication as a multiplicative circuit.
//!
//! The scalar is supplied as `n` committed booleans in the encoding of
//! [`recode_scalar`]. Bits are consumed in windows of three starting at bit
//! 1: two bits select from {Q, 3Q, 5Q, 7Q} with Q = 2^{3i}·P, and the third
//! is the window's sign. Bit 0 has no window of its own and is folded into
//! the tail lookup, whose shape depends on `n mod 3`. The selected points
//! are then accumulated with affine additions; the window tables are built
//! so that no two partial sums ever coincide or oppose.

use anyhow::{ensure, Result};
use num::bigint::BigUint;
use num::{One, Zero};
use purify_field::types::PrimeField;

use crate::curve::curve_types::{AffinePoint, Curve};
use crate::iop::expr::Expr;
use crate::iop::transcript::Transcript;

/// Encode a scalar `k` in `[1, 2^bits]` for the signed-window ladder.
///
/// `k − 1` is written in binary; then every bit at a positive multiple of 3
/// becomes its window's sign bit: when it is clear, the two bits below it
/// flip, and the bit itself always flips.
pub fn recode_scalar(k: &BigUint, bits: usize) -> Result<Vec<bool>> {
    ensure!(!k.is_zero(), "key out of range");
    let n = k - BigUint::one();
    ensure!(n.bits() as usize <= bits, "key out of range");

    let mut ret: Vec<bool> = (0..bits).map(|i| n.bit(i as u64)).collect();
    let mut i = 3;
    while i < bits {
        if !ret[i] {
            ret[i - 1] = !ret[i - 1];
            ret[i - 2] = !ret[i - 2];
        }
        ret[i] = !ret[i];
        i += 3;
    }
    Ok(ret)
}

impl<F: PrimeField> Transcript<F> {
    /// The x-coordinate of `k·p`, where `k` is given by its recoded bits.
    pub fn curve_windowed_mul_x<C: Curve<BaseField = F>>(
        &mut self,
        p: &AffinePoint<C>,
        bits: &[Expr<F>],
    ) -> Result<Expr<F>> {
        let n = bits.len();
        ensure!(n >= 4, "bit vector too short for the window layout");

        // p, 2p, 4p, ..., 2^{n-1}·p.
        let mut pows = Vec::with_capacity(n);
        pows.push(p.to_jacobian());
        for i in 1..n {
            pows.push(pows[i - 1].double());
        }

        let mut lookups = Vec::new();
        for i in 0..(n - 1) / 3 {
            let p1 = pows[i * 3];
            let p3 = p1.add(&pows[i * 3 + 1]);
            let p5 = p3.add(&pows[i * 3 + 1]);
            let p7 = p5.add(&pows[i * 3 + 1]);
            let selected =
                self.select_point_2bit(&[p1, p3, p5, p7], &bits[i * 3 + 1], &bits[i * 3 + 2]);
            lookups.push(self.conditional_negate_point(&selected, &bits[i * 3 + 3]));
        }

        match n % 3 {
            0 => {
                let pn = pows[n - 3];
                let p3n = pn.add(&pows[n - 2]);
                let p5n = p3n.add(&pows[n - 2]);
                let p7n = p5n.add(&pows[n - 2]);
                let pn1 = pn.add(&pows[0]);
                let p3n1 = p3n.add(&pows[0]);
                let p5n1 = p5n.add(&pows[0]);
                let p7n1 = p7n.add(&pows[0]);
                lookups.push(self.select_point_3bit(
                    &[pn, pn1, p3n, p3n1, p5n, p5n1, p7n, p7n1],
                    &bits[0],
                    &bits[n - 2],
                    &bits[n - 1],
                ));
            }
            1 => {
                let pn = pows[n - 1];
                let pn1 = pn.add(&pows[0]);
                lookups.push(self.select_point_1bit(&[pn, pn1], &bits[0]));
            }
            _ => {
                let pn = pows[n - 2];
                let p3n = pn.add(&pows[n - 1]);
                let pn1 = pn.add(&pows[0]);
                let p3n1 = p3n.add(&pows[0]);
                lookups.push(self.select_point_2bit(
                    &[pn, pn1, p3n, p3n1],
                    &bits[0],
                    &bits[n - 1],
                ));
            }
        }

        let mut acc = lookups[0].clone();
        for lookup in &lookups[1..lookups.len() - 1] {
            acc = self.curve_add(&acc, lookup)?;
        }
        self.curve_add_x(&acc, &lookups[lookups.len() - 1])
    }
}
