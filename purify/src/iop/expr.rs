use core::fmt;
use core::fmt::{Display, Formatter};
use core::ops::{Add, Mul, Neg, Sub};

use hashbrown::HashMap;
use purify_field::types::{Field, PrimeField};

/// Which slot of a multiplication gate a wire occupies.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum WireKind {
    Left,
    Right,
    Output,
}

impl WireKind {
    const fn prefix(self) -> char {
        match self {
            WireKind::Left => 'L',
            WireKind::Right => 'R',
            WireKind::Output => 'O',
        }
    }
}

/// A variable in the constraint system.
///
/// Witness variables are allocated sequentially by the transcript; wire and
/// commitment variables only exist after the Bulletproofs rewrite.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Variable {
    Witness(usize),
    Wire(WireKind, usize),
    Commitment(usize),
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Witness(i) => write!(f, "v[{i}]"),
            Variable::Wire(kind, i) => write!(f, "{}{i}", kind.prefix()),
            Variable::Commitment(i) => write!(f, "V{i}"),
        }
    }
}

/// An affine combination `constant + Σ factor_i · var_i` over the field.
///
/// The linear part is canonical: sorted by variable, variables unique,
/// factors nonzero. Structural equality and hashing of this form are what
/// the transcript's constraint caches key on.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Expr<F: PrimeField> {
    constant: F,
    linear: Vec<(Variable, F)>,
}

impl<F: PrimeField> Expr<F> {
    pub fn zero() -> Self {
        Self {
            constant: F::ZERO,
            linear: Vec::new(),
        }
    }

    pub fn variable(var: Variable) -> Self {
        Self {
            constant: F::ZERO,
            linear: vec![(var, F::ONE)],
        }
    }

    pub fn const_part(&self) -> F {
        self.constant
    }

    pub fn linear_part(&self) -> &[(Variable, F)] {
        &self.linear
    }

    pub fn is_constant(&self) -> bool {
        self.linear.is_empty()
    }

    /// Split into the constant-only and linear-only parts.
    pub fn split(&self) -> (F, Self) {
        (
            self.constant,
            Self {
                constant: F::ZERO,
                linear: self.linear.clone(),
            },
        )
    }

    /// The lone variable when the expression is exactly `1 · var`.
    pub fn single_variable(&self) -> Option<Variable> {
        if self.constant.is_zero() && self.linear.len() == 1 && self.linear[0].1.is_one() {
            Some(self.linear[0].0)
        } else {
            None
        }
    }

    /// Evaluate under an assignment; `None` when any variable is unknown.
    pub fn evaluate(&self, mut lookup: impl FnMut(Variable) -> Option<F>) -> Option<F> {
        let mut ret = self.constant;
        for &(var, factor) in &self.linear {
            ret += lookup(var)? * factor;
        }
        Some(ret)
    }

    /// Rename variables through `map`, leaving unmapped variables in place.
    pub fn rename(&mut self, map: &HashMap<Variable, Variable>) {
        if self.linear.iter().any(|(var, _)| map.contains_key(var)) {
            let terms = self
                .linear
                .drain(..)
                .map(|(var, factor)| (*map.get(&var).unwrap_or(&var), factor))
                .collect();
            self.linear = canonicalize(terms);
        }
    }
}

impl<F: PrimeField> From<F> for Expr<F> {
    fn from(constant: F) -> Self {
        Self {
            constant,
            linear: Vec::new(),
        }
    }
}

/// Sort terms by variable, merge duplicates, drop zero factors.
fn canonicalize<F: PrimeField>(mut terms: Vec<(Variable, F)>) -> Vec<(Variable, F)> {
    terms.sort_by(|a, b| a.0.cmp(&b.0));
    let mut ret: Vec<(Variable, F)> = Vec::with_capacity(terms.len());
    for (var, factor) in terms {
        match ret.last_mut() {
            Some(last) if last.0 == var => {
                last.1 += factor;
                if last.1.is_zero() {
                    ret.pop();
                }
            }
            _ => {
                if factor.is_nonzero() {
                    ret.push((var, factor));
                }
            }
        }
    }
    ret
}

impl<F: PrimeField> Add for Expr<F> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let constant = self.constant + rhs.constant;
        let mut terms = self.linear;
        terms.extend(rhs.linear);
        Self {
            constant,
            linear: canonicalize(terms),
        }
    }
}

impl<F: PrimeField> Sub for Expr<F> {
    type Output = Self;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn sub(self, rhs: Self) -> Self {
        self + -rhs
    }
}

impl<F: PrimeField> Neg for Expr<F> {
    type Output = Self;

    fn neg(self) -> Self {
        self * F::NEG_ONE
    }
}

impl<F: PrimeField> Mul<F> for Expr<F> {
    type Output = Self;

    fn mul(self, rhs: F) -> Self {
        if rhs.is_zero() {
            return Self::zero();
        }
        Self {
            constant: self.constant * rhs,
            linear: self
                .linear
                .into_iter()
                .map(|(var, factor)| (var, factor * rhs))
                .collect(),
        }
    }
}

impl<F: PrimeField> Display for Expr<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut terms = Vec::with_capacity(self.linear.len() + 1);
        if self.constant.is_nonzero() || self.linear.is_empty() {
            terms.push(format!("{}", self.constant));
        }
        for &(var, factor) in &self.linear {
            if factor.is_one() {
                terms.push(format!("{var}"));
            } else {
                terms.push(format!("{factor} * {var}"));
            }
        }
        if terms.len() == 1 {
            write!(f, "{}", terms[0])
        } else {
            write!(f, "({})", terms.join(" + "))
        }
    }
}

#[cfg(test)]
mod tests {
    use hashbrown::HashMap;
    use purify_field::secp256k1_scalar::Secp256K1Scalar;
    use purify_field::types::Field;

    use super::{Expr, Variable, WireKind};

    type F = Secp256K1Scalar;

    fn fe(n: u64) -> F {
        F::from_canonical_u64(n)
    }

    fn var(i: usize) -> Expr<F> {
        Expr::variable(Variable::Witness(i))
    }

    #[test]
    fn test_addition_is_canonical() {
        let a = var(0) + var(2) * fe(3);
        let b = var(2) * fe(3) + var(0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_cancellation_drops_terms() {
        let e = var(1) + Expr::from(fe(5)) - var(1);
        assert_eq!(e, Expr::from(fe(5)));
        assert!(e.is_constant());
    }

    #[test]
    fn test_mul_by_zero() {
        let e = (var(0) + Expr::from(fe(7))) * F::ZERO;
        assert_eq!(e, Expr::zero());
    }

    #[test]
    fn test_split() {
        let e = var(3) * fe(2) + Expr::from(fe(9));
        let (c, linear) = e.split();
        assert_eq!(c, fe(9));
        assert_eq!(linear, var(3) * fe(2));
    }

    #[test]
    fn test_single_variable() {
        assert_eq!(var(4).single_variable(), Some(Variable::Witness(4)));
        assert_eq!((var(4) * fe(2)).single_variable(), None);
        assert_eq!((var(4) + Expr::from(fe(1))).single_variable(), None);
    }

    #[test]
    fn test_evaluate() {
        let e = var(0) * fe(2) + var(1) + Expr::from(fe(10));
        let values = [fe(3), fe(4)];
        assert_eq!(
            e.evaluate(|v| match v {
                Variable::Witness(i) => values.get(i).copied(),
                _ => None,
            }),
            Some(fe(20))
        );
        assert_eq!(e.evaluate(|_| None), None);
    }

    #[test]
    fn test_rename() {
        let mut e = var(0) + var(1) * fe(2);
        let mut map = HashMap::new();
        map.insert(Variable::Witness(0), Variable::Wire(WireKind::Left, 7));
        e.rename(&map);
        assert_eq!(
            e,
            Expr::variable(Variable::Wire(WireKind::Left, 7)) + var(1) * fe(2)
        );
    }

    #[test]
    fn test_display_matches_script_syntax() {
        assert_eq!(format!("{}", Expr::<F>::zero()), "0");
        assert_eq!(format!("{}", var(3)), "v[3]");
        assert_eq!(format!("{}", var(0) + Expr::from(fe(1))), "(1 + v[0])");
        assert_eq!(format!("{}", var(0) * fe(2) + var(1)), "(2 * v[0] + v[1])");
        assert_eq!(
            format!("{}", Expr::<F>::variable(Variable::Wire(WireKind::Output, 12))),
            "O12"
        );
        assert_eq!(
            format!("{}", Expr::<F>::variable(Variable::Commitment(0))),
            "V0"
        );
    }
}
