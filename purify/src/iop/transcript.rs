use anyhow::{ensure, Result};
use hashbrown::{HashMap, HashSet};
use purify_field::types::{Field, PrimeField};

use crate::iop::expr::{Expr, Variable};

/// Records the multiplication and linear constraints of a circuit over
/// symbolic expressions, together with optional witness values.
///
/// Multiplications, divisions and boolean constraints are memoized on the
/// canonical form of their operands, so a gadget reused on the same
/// expressions costs no extra gates.
#[derive(Debug, Default)]
pub struct Transcript<F: PrimeField> {
    values: Vec<Option<F>>,
    muls: Vec<(Expr<F>, Expr<F>, Expr<F>)>,
    eqs: Vec<Expr<F>>,
    mul_cache: HashMap<(Expr<F>, Expr<F>), Expr<F>>,
    div_cache: HashMap<(Expr<F>, Expr<F>), Expr<F>>,
    bool_cache: HashSet<Expr<F>>,
}

impl<F: PrimeField> Transcript<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded multiplication constraints `A·B ≡ C`.
    pub fn muls(&self) -> &[(Expr<F>, Expr<F>, Expr<F>)] {
        &self.muls
    }

    /// The recorded linear constraints `E ≡ 0`.
    pub fn eqs(&self) -> &[Expr<F>] {
        &self.eqs
    }

    pub fn num_variables(&self) -> usize {
        self.values.len()
    }

    /// Witness values indexed by variable; `None` for verifier-side synthesis.
    pub fn values(&self) -> &[Option<F>] {
        &self.values
    }

    pub fn value(&self, index: usize) -> Option<F> {
        self.values.get(index).copied().flatten()
    }

    /// Allocate a fresh witness variable holding `value` and return it as an
    /// expression.
    pub fn secret(&mut self, value: Option<F>) -> Expr<F> {
        let var = Variable::Witness(self.values.len());
        self.values.push(value);
        Expr::variable(var)
    }

    /// Record `e1·e2 ≡ o` for a fresh `o` and return it. Both operand
    /// orderings are cached.
    pub fn mul(&mut self, e1: &Expr<F>, e2: &Expr<F>) -> Expr<F> {
        if let Some(o) = self.mul_cache.get(&(e1.clone(), e2.clone())) {
            return o.clone();
        }

        let value = match (self.evaluate(e1), self.evaluate(e2)) {
            (Some(v1), Some(v2)) => Some(v1 * v2),
            _ => None,
        };
        let o = self.secret(value);
        self.mul_cache
            .insert((e1.clone(), e2.clone()), o.clone());
        self.mul_cache
            .insert((e2.clone(), e1.clone()), o.clone());
        self.muls.push((e1.clone(), e2.clone(), o.clone()));
        o
    }

    /// Record `o·e2 ≡ e1` for a fresh `o = e1/e2` and return it. Fails when
    /// the witness shows a zero divisor.
    pub fn div(&mut self, e1: &Expr<F>, e2: &Expr<F>) -> Result<Expr<F>> {
        if let Some(o) = self.div_cache.get(&(e1.clone(), e2.clone())) {
            return Ok(o.clone());
        }

        let v2 = self.evaluate(e2);
        if let Some(v2) = v2 {
            ensure!(v2.is_nonzero(), "division by zero");
        }
        let value = match (self.evaluate(e1), v2) {
            (Some(v1), Some(v2)) => Some(v1 * v2.inverse()),
            _ => None,
        };
        let o = self.secret(value);
        self.div_cache
            .insert((e1.clone(), e2.clone()), o.clone());
        self.muls.push((o.clone(), e2.clone(), e1.clone()));
        Ok(o)
    }

    /// Record `e·(e−1) ≡ 0`. Fails when the witness value is neither 0 nor 1.
    pub fn boolean(&mut self, e: &Expr<F>) -> Result<()> {
        if self.bool_cache.contains(e) {
            return Ok(());
        }

        if let Some(v) = self.evaluate(e) {
            ensure!(
                v.is_zero() || v.is_one(),
                "boolean constraint on non-boolean value"
            );
        }
        self.bool_cache.insert(e.clone());
        self.muls
            .push((e.clone(), e.clone() - Expr::from(F::ONE), Expr::zero()));
        Ok(())
    }

    /// Record `e1 − e2 ≡ 0`. Fails when the witness shows unequal values.
    pub fn equal(&mut self, e1: &Expr<F>, e2: &Expr<F>) -> Result<()> {
        let eq = e1.clone() - e2.clone();
        if let Some(v) = self.evaluate(&eq) {
            ensure!(v.is_zero(), "equation mismatch");
        }
        self.eqs.push(eq);
        Ok(())
    }

    /// Evaluate an expression under the recorded witness.
    pub fn evaluate(&self, e: &Expr<F>) -> Option<F> {
        e.evaluate(|var| match var {
            Variable::Witness(i) => self.value(i),
            _ => None,
        })
    }
}
