//! The PRF constraint system: four windowed scalar multiplications sharing
//! two committed bit vectors, followed by the x-combiner.

use anyhow::Result;
use log::debug;
use num::bigint::BigUint;
use purify_field::secp256k1_scalar::Secp256K1Scalar;
use purify_field::types::Field;

use crate::curve::curve_types::{AffinePoint, Curve};
use crate::curve::purify_curves::{Purify1, Purify2};
use crate::gadgets::curve_windowed_mul::recode_scalar;
use crate::iop::expr::Expr;
use crate::iop::transcript::Transcript;

type F = Secp256K1Scalar;

/// The distinguished expressions of the PRF constraint system.
#[derive(Clone, Debug)]
pub struct PrfCircuit {
    /// The PRF output.
    pub out: Expr<F>,
    /// x-coordinate of the public key half on the first curve.
    pub p1x: Expr<F>,
    /// x-coordinate of the public key half on the second curve.
    pub p2x: Expr<F>,
    /// Number of bit-committed inputs.
    pub n_bits: usize,
}

/// Wire the full PRF constraint system for the message points `(m1, m2)`,
/// with the witness scalars when proving and without them when synthesizing
/// the verifier side.
pub fn build_prf_circuit(
    transcript: &mut Transcript<F>,
    m1: &AffinePoint<Purify1>,
    m2: &AffinePoint<Purify2>,
    secrets: Option<(&BigUint, &BigUint)>,
) -> Result<PrfCircuit> {
    let n1 = Purify1::order().bits() as usize - 1;
    let n2 = Purify2::order().bits() as usize - 1;

    let (bits1, bits2) = match secrets {
        Some((z1, z2)) => (
            recode_scalar(z1, n1)?.into_iter().map(Some).collect(),
            recode_scalar(z2, n2)?.into_iter().map(Some).collect(),
        ),
        None => (vec![None; n1], vec![None; n2]),
    };
    let z1_bits = allocate_bits(transcript, &bits1)?;
    let z2_bits = allocate_bits(transcript, &bits2)?;
    let n_bits = z1_bits.len() + z2_bits.len();

    let p1x = transcript.curve_windowed_mul_x(&Purify1::generator(), &z1_bits)?;
    let p2x = transcript.curve_windowed_mul_x(&Purify2::generator(), &z2_bits)?;
    let out_x1 = transcript.curve_windowed_mul_x(m1, &z1_bits)?;
    let out_x2 = transcript.curve_windowed_mul_x(m2, &z2_bits)?;
    let out = transcript.combine_x(&out_x1, &out_x2)?;

    debug!(
        "PRF circuit: {} multiplications, {} linear equations, {} bit inputs",
        transcript.muls().len(),
        transcript.eqs().len(),
        n_bits,
    );

    Ok(PrfCircuit {
        out,
        p1x,
        p2x,
        n_bits,
    })
}

fn allocate_bits(
    transcript: &mut Transcript<F>,
    values: &[Option<bool>],
) -> Result<Vec<Expr<F>>> {
    values
        .iter()
        .map(|v| {
            let bit = transcript.secret(v.map(F::from_bool));
            transcript.boolean(&bit)?;
            Ok(bit)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use num::bigint::BigUint;

    use super::build_prf_circuit;
    use crate::prf;
    use crate::iop::transcript::Transcript;

    #[test]
    fn test_circuit_agrees_with_native_evaluation() {
        let z = BigUint::from(123456789u64);
        let (z1, z2) = prf::unpack_secret(&z);
        let msg = b"\x00";
        let (m1, m2) = prf::message_points(msg).unwrap();
        let (p1, p2) = prf::public_key_points(&z1, &z2);

        let mut transcript = Transcript::new();
        let circuit =
            build_prf_circuit(&mut transcript, &m1, &m2, Some((&z1, &z2))).unwrap();

        assert_eq!(circuit.n_bits, 510);
        // 510 boolean constraints plus the window and combiner gates.
        assert_eq!(transcript.muls().len(), 2030);
        assert_eq!(transcript.eqs().len(), 0);

        assert_eq!(transcript.evaluate(&circuit.p1x), Some(p1.x));
        assert_eq!(transcript.evaluate(&circuit.p2x), Some(p2.x));
        assert_eq!(
            transcript.evaluate(&circuit.out),
            Some(prf::evaluate(msg, &z).unwrap())
        );
    }

    #[test]
    fn test_verifier_side_synthesis_matches_prover_shape() {
        let msg = b"\x01\x02";
        let (m1, m2) = prf::message_points(msg).unwrap();

        let mut verifier = Transcript::new();
        let vc = build_prf_circuit(&mut verifier, &m1, &m2, None).unwrap();
        assert_eq!(verifier.evaluate(&vc.out), None);

        let z = BigUint::from(7u32);
        let (z1, z2) = prf::unpack_secret(&z);
        let mut prover = Transcript::new();
        let pc = build_prf_circuit(&mut prover, &m1, &m2, Some((&z1, &z2))).unwrap();

        // Identical constraint shapes with and without the witness.
        assert_eq!(verifier.muls().len(), prover.muls().len());
        assert_eq!(verifier.num_variables(), prover.num_variables());
        assert_eq!(vc.out, pc.out);
        assert_eq!(vc.p1x, pc.p1x);
        assert_eq!(vc.p2x, pc.p2x);
    }
}
