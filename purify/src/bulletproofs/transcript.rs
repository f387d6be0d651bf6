//! Rewrites a recorded transcript into the wire layout of the
//! libsecp256k1-zkp Bulletproofs circuit format.

use anyhow::{anyhow, Result};
use hashbrown::HashMap;
use log::debug;
use num::bigint::BigUint;
use num::Integer;
use purify_field::types::{Field, PrimeField};

use crate::iop::expr::{Expr, Variable, WireKind};
use crate::iop::transcript::Transcript;

/// A transcript in Bulletproofs form.
///
/// Every recorded multiplication occupies one `(L_i, R_i, O_i)` wire triple,
/// padded with zero triples to a power of two. A witness variable whose
/// first appearance is as a bare wire slot is renamed to that wire
/// ("assignments" below); every other slot becomes a linear constraint
/// `wire − linear = constant`, with the first `2·n_bits` of those diverted
/// into the bit-commitment slots. A single commitment `V0` carries the PRF
/// output.
#[derive(Debug)]
pub struct BulletproofsTranscript<F: PrimeField> {
    n_muls: usize,
    n_commitments: usize,
    n_bits: usize,
    /// Wires that are plain renamings of a witness variable.
    assignments: Vec<(Variable, Expr<F>)>,
    /// Wires defined by a linear combination of earlier wires.
    linear_assignments: Vec<(Variable, Expr<F>)>,
    /// The first `2·n_bits` rewritten constraints; the Bulletproofs prover
    /// commits to these bits separately, so they are not serialized.
    bit_constraints: Vec<(Expr<F>, F)>,
    constraints: Vec<(Expr<F>, F)>,
    /// Variable-to-wire aliases, with a copy in insertion order: value
    /// propagation must follow it.
    aliases: HashMap<Variable, Variable>,
    alias_order: Vec<(Variable, Variable)>,
}

impl<F: PrimeField> BulletproofsTranscript<F> {
    pub fn new(transcript: &Transcript<F>, n_bits: usize) -> Self {
        let n_muls = transcript.muls().len().next_power_of_two();
        let mut ret = Self {
            n_muls,
            n_commitments: 1,
            n_bits,
            assignments: Vec::new(),
            linear_assignments: Vec::new(),
            bit_constraints: Vec::new(),
            constraints: Vec::new(),
            aliases: HashMap::new(),
            alias_order: Vec::new(),
        };

        for (i, (l, r, o)) in transcript.muls().iter().enumerate() {
            ret.add_mul(Variable::Wire(WireKind::Left, i), l.clone());
            ret.add_mul(Variable::Wire(WireKind::Right, i), r.clone());
            ret.add_mul(Variable::Wire(WireKind::Output, i), o.clone());
        }
        for i in transcript.muls().len()..n_muls {
            ret.add_mul(Variable::Wire(WireKind::Left, i), Expr::zero());
            ret.add_mul(Variable::Wire(WireKind::Right, i), Expr::zero());
            ret.add_mul(Variable::Wire(WireKind::Output, i), Expr::zero());
        }

        debug!(
            "bulletproofs rewrite: {} mul triples, {} assignments, {} linear assignments",
            ret.n_muls,
            ret.assignments.len(),
            ret.linear_assignments.len(),
        );
        ret
    }

    pub fn n_muls(&self) -> usize {
        self.n_muls
    }

    pub fn n_commitments(&self) -> usize {
        self.n_commitments
    }

    pub fn n_bits(&self) -> usize {
        self.n_bits
    }

    pub fn constraints(&self) -> &[(Expr<F>, F)] {
        &self.constraints
    }

    pub fn bit_constraints(&self) -> &[(Expr<F>, F)] {
        &self.bit_constraints
    }

    /// Alias the expression's variable to `wire` when it is a bare variable
    /// not aliased yet; returns whether the wire is thereby a plain renaming
    /// of a witness variable.
    fn try_alias(&mut self, expr: &mut Expr<F>, wire: Variable) -> bool {
        if expr.is_constant() {
            return false;
        }
        expr.rename(&self.aliases);
        if let Some(var) = expr.single_variable() {
            if !self.aliases.contains_key(&var) {
                self.aliases.insert(var, wire);
                self.alias_order.push((var, wire));
                return matches!(var, Variable::Witness(_));
            }
        }
        false
    }

    fn add_mul(&mut self, wire: Variable, mut expr: Expr<F>) {
        if self.try_alias(&mut expr, wire) {
            self.assignments.push((wire, expr));
        } else {
            // Only the constant part may sit on the right-hand side.
            let (constant, linear) = expr.split();
            let lhs = Expr::variable(wire) - linear;
            self.linear_assignments.push((wire, expr));
            if self.bit_constraints.len() < 2 * self.n_bits {
                self.bit_constraints.push((lhs, constant));
            } else {
                self.constraints.push((lhs, constant));
            }
        }
    }

    /// Bind the packed public key halves and the committed output:
    /// `P1x = pubkey mod P`, `P2x = pubkey div P`, `out = V0`.
    pub fn bind_public(
        &mut self,
        pubkey: &BigUint,
        p1x: &Expr<F>,
        p2x: &Expr<F>,
        out: &Expr<F>,
    ) {
        let (hi, lo) = pubkey.div_rem(&F::order());
        for (expr, bound) in [(p1x, lo), (p2x, hi)] {
            let mut expr = expr.clone();
            expr.rename(&self.aliases);
            let (constant, linear) = expr.split();
            self.constraints
                .push((linear, F::from_noncanonical_biguint(bound) - constant));
        }

        let mut out = out.clone();
        out.rename(&self.aliases);
        self.constraints
            .push((out - Expr::variable(Variable::Commitment(0)), F::ZERO));
    }

    /// Propagate a full witness into values for every wire.
    pub fn wire_values(
        &self,
        witness: &[Option<F>],
        commitment: F,
    ) -> Result<HashMap<Variable, F>> {
        let mut values = HashMap::new();
        for (i, v) in witness.iter().enumerate() {
            if let Some(v) = v {
                values.insert(Variable::Witness(i), *v);
            }
        }
        values.insert(Variable::Commitment(0), commitment);

        for &(src, wire) in &self.alias_order {
            let v = *values
                .get(&src)
                .ok_or_else(|| anyhow!("unassigned variable {src}"))?;
            values.insert(wire, v);
        }
        for (wire, expr) in self.assignments.iter().chain(&self.linear_assignments) {
            let v = expr
                .evaluate(|var| values.get(&var).copied())
                .ok_or_else(|| anyhow!("unassigned variable in the expression for {wire}"))?;
            values.insert(*wire, v);
        }
        Ok(values)
    }

    /// Check every multiplication gate `L_i·R_i = O_i` and every constraint
    /// against the given wire values.
    pub fn check(&self, values: &HashMap<Variable, F>) -> bool {
        for i in 0..self.n_muls {
            let l = values.get(&Variable::Wire(WireKind::Left, i));
            let r = values.get(&Variable::Wire(WireKind::Right, i));
            let o = values.get(&Variable::Wire(WireKind::Output, i));
            match (l, r, o) {
                (Some(&l), Some(&r), Some(&o)) if l * r == o => {}
                _ => return false,
            }
        }
        for (lhs, rhs) in self.constraints.iter().chain(&self.bit_constraints) {
            match lhs.evaluate(|var| values.get(&var).copied()) {
                Some(v) if v == *rhs => {}
                _ => return false,
            }
        }
        true
    }

    /// Whether the witness and commitment satisfy the rewritten system.
    pub fn evaluate(&self, witness: &[Option<F>], commitment: F) -> bool {
        match self.wire_values(witness, commitment) {
            Ok(values) => self.check(&values),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use hashbrown::HashMap;
    use num::bigint::BigUint;
    use purify_field::secp256k1_scalar::Secp256K1Scalar;
    use purify_field::types::Field;

    use super::BulletproofsTranscript;
    use crate::iop::expr::{Variable, WireKind};
    use crate::iop::transcript::Transcript;
    use crate::prf;
    use crate::prf::circuit::build_prf_circuit;

    type F = Secp256K1Scalar;

    fn fe(n: u64) -> F {
        F::from_canonical_u64(n)
    }

    /// A small satisfied transcript: one boolean, one product, one division.
    fn small_transcript() -> Transcript<F> {
        let mut t = Transcript::new();
        let b = t.secret(Some(fe(1)));
        t.boolean(&b).unwrap();
        let x = t.secret(Some(fe(6)));
        let y = t.secret(Some(fe(7)));
        let xy = t.mul(&x, &y);
        let z = t.secret(Some(fe(2)));
        t.div(&xy, &z).unwrap();
        t
    }

    #[test]
    fn test_padding_to_power_of_two() {
        let t = small_transcript();
        assert_eq!(t.muls().len(), 3);
        let b = BulletproofsTranscript::new(&t, 1);
        assert_eq!(b.n_muls(), 4);

        let values = b.wire_values(t.values(), fe(0)).unwrap();
        // Padded triples hold zeros.
        for kind in [WireKind::Left, WireKind::Right, WireKind::Output] {
            assert_eq!(values[&Variable::Wire(kind, 3)], F::ZERO);
        }
        assert!(b.check(&values));
    }

    #[test]
    fn test_bit_constraints_are_diverted() {
        let t = small_transcript();
        let b = BulletproofsTranscript::new(&t, 1);
        // The boolean gate contributes R0 = L0 − 1 and O0 = 0.
        assert_eq!(b.bit_constraints().len(), 2);
    }

    #[test]
    fn test_check_rejects_tampered_values() {
        let t = small_transcript();
        let b = BulletproofsTranscript::new(&t, 1);
        let mut values = b.wire_values(t.values(), fe(0)).unwrap();
        assert!(b.check(&values));

        *values.get_mut(&Variable::Wire(WireKind::Output, 1)).unwrap() += F::ONE;
        assert!(!b.check(&values));
    }

    #[test]
    fn test_full_prf_rewrite_satisfied() {
        let z = BigUint::from(0xC0FFEEu32);
        let (z1, z2) = prf::unpack_secret(&z);
        let msg = b"\x00";
        let (m1, m2) = prf::message_points(msg).unwrap();
        let (p1, p2) = prf::public_key_points(&z1, &z2);
        let out_native = prf::evaluate(msg, &z).unwrap();

        let mut transcript = Transcript::new();
        let circuit =
            build_prf_circuit(&mut transcript, &m1, &m2, Some((&z1, &z2))).unwrap();
        let mut b = BulletproofsTranscript::new(&transcript, circuit.n_bits);
        b.bind_public(
            &prf::pack_public(p1.x, p2.x),
            &circuit.p1x,
            &circuit.p2x,
            &circuit.out,
        );

        assert_eq!(b.n_muls(), 2048);
        assert_eq!(b.bit_constraints().len(), 1020);
        assert_eq!(b.constraints().len(), 3097);
        assert!(b.evaluate(transcript.values(), out_native));

        // A wrong commitment must not satisfy the output binding.
        assert!(!b.evaluate(transcript.values(), out_native + F::ONE));
    }

    #[test]
    fn test_wrong_pubkey_fails() {
        let z = BigUint::from(5u32);
        let (z1, z2) = prf::unpack_secret(&z);
        let msg = b"\x07";
        let (m1, m2) = prf::message_points(msg).unwrap();
        let out_native = prf::evaluate(msg, &z).unwrap();

        let mut transcript = Transcript::new();
        let circuit =
            build_prf_circuit(&mut transcript, &m1, &m2, Some((&z1, &z2))).unwrap();
        let mut b = BulletproofsTranscript::new(&transcript, circuit.n_bits);
        b.bind_public(
            &BigUint::from(123456u32),
            &circuit.p1x,
            &circuit.p2x,
            &circuit.out,
        );
        assert!(!b.evaluate(transcript.values(), out_native));
    }

    #[test]
    fn test_missing_witness_fails_propagation() {
        let mut t = Transcript::new();
        let a = t.secret(None);
        let b_ = t.secret(Some(fe(3)));
        t.mul(&a, &b_);
        let b = BulletproofsTranscript::new(&t, 0);
        assert!(b.wire_values(t.values(), fe(0)).is_err());

        let empty: HashMap<_, _> = HashMap::new();
        assert!(!b.check(&empty));
    }
}
