//! Script exporters: a self-contained Python verifier, a Z3 probe script,
//! and the witness call line consumed by the Python verifier.

use std::io::Write;

use anyhow::{anyhow, Result};
use num::bigint::BigUint;
use purify_field::types::{Field, PrimeField};

use crate::iop::expr::Expr;
use crate::iop::transcript::Transcript;

/// Emit a Python `verify(pubkey, output, v)` function checking every
/// constraint of the transcript plus the public key and output bindings.
pub fn write_python_verifier<F: PrimeField, W: Write>(
    w: &mut W,
    transcript: &Transcript<F>,
    p1x: &Expr<F>,
    p2x: &Expr<F>,
    out: &Expr<F>,
) -> Result<()> {
    writeln!(w, "def verify(pubkey, output, v):")?;
    writeln!(w, "    P = {}", F::order())?;
    writeln!(w, "    # {} multiplications", transcript.muls().len())?;
    for (a, b, o) in transcript.muls() {
        writeln!(w, "    assert(({a} * {b} - {o}) % P == 0)")?;
    }
    writeln!(w, "    # {} linear equations", transcript.eqs().len())?;
    for eq in transcript.eqs() {
        writeln!(w, "    assert(({eq}) % P == 0)")?;
    }
    writeln!(w, "    # Verify public key")?;
    writeln!(w, "    assert({p1x} % P == pubkey % P)")?;
    writeln!(w, "    assert({p2x} % P == pubkey // P)")?;
    writeln!(w, "    # Verify output")?;
    writeln!(w, "    assert(output == {out} % P)")?;
    Ok(())
}

/// Emit a Z3 script that searches for any satisfying assignment given only
/// the public key bindings. Finding one that differs from the honest witness
/// would mean the circuit is under-constrained.
pub fn write_z3_script<F: PrimeField, W: Write>(
    w: &mut W,
    transcript: &Transcript<F>,
    pubkey: &BigUint,
    p1x: &Expr<F>,
    p2x: &Expr<F>,
    _out: &Expr<F>,
) -> Result<()> {
    writeln!(w, "from z3 import *")?;
    writeln!(w, "s = Solver()")?;
    writeln!(w, "P = {}", F::order())?;
    writeln!(w, "v = IntVector('v', {})", transcript.num_variables())?;
    for i in 0..transcript.num_variables() {
        writeln!(w, "s.add(v[{i}] >= 0, v[{i}] < P)")?;
    }
    writeln!(w, "# {} multiplications", transcript.muls().len())?;
    for (a, b, o) in transcript.muls() {
        writeln!(w, "s.add(({a} * {b} - {o}) % P == 0)")?;
    }
    writeln!(w, "# {} linear equations", transcript.eqs().len())?;
    for eq in transcript.eqs() {
        writeln!(w, "s.add(({eq}) % P == 0)")?;
    }
    writeln!(w, "# Verify public key")?;
    writeln!(w, "s.add({p1x} % P == {pubkey} % P)")?;
    writeln!(w, "s.add({p2x} % P == {pubkey} // P)")?;
    writeln!(w, "print(\"Checking...\")")?;
    writeln!(w, "s.check()")?;
    writeln!(w, "model = s.model()")?;
    writeln!(w, "for var in model:")?;
    writeln!(w, "    print(var, model[var])")?;
    Ok(())
}

/// Emit the call line that feeds the prover's witness to the Python
/// verifier.
pub fn write_witness_call<F: PrimeField, W: Write>(
    w: &mut W,
    transcript: &Transcript<F>,
    pubkey: &BigUint,
    output: F,
) -> Result<()> {
    let values = (0..transcript.num_variables())
        .map(|i| {
            transcript
                .value(i)
                .map(|v| v.to_canonical_biguint().to_string())
                .ok_or_else(|| anyhow!("missing witness value for v[{i}]"))
        })
        .collect::<Result<Vec<_>>>()?;
    writeln!(
        w,
        "verify({:#x}, {:#x}, [{}])",
        pubkey,
        output.to_canonical_biguint(),
        values.join(","),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use num::bigint::BigUint;
    use purify_field::secp256k1_scalar::Secp256K1Scalar;
    use purify_field::types::Field;

    use super::{write_python_verifier, write_witness_call, write_z3_script};
    use crate::iop::transcript::Transcript;

    type F = Secp256K1Scalar;

    fn fe(n: u64) -> F {
        F::from_canonical_u64(n)
    }

    fn sample_transcript() -> (Transcript<F>, crate::iop::expr::Expr<F>) {
        let mut t = Transcript::new();
        let a = t.secret(Some(fe(2)));
        let b = t.secret(Some(fe(3)));
        let o = t.mul(&a, &b);
        (t, o)
    }

    #[test]
    fn test_python_verifier_shape() {
        let (t, o) = sample_transcript();
        let mut buf = Vec::new();
        write_python_verifier(&mut buf, &t, &o, &o, &o).unwrap();
        let script = String::from_utf8(buf).unwrap();
        assert!(script.starts_with("def verify(pubkey, output, v):\n"));
        assert!(script.contains("# 1 multiplications"));
        assert!(script.contains("assert((v[0] * v[1] - v[2]) % P == 0)"));
        assert!(script.contains("assert(output == v[2] % P)"));
    }

    #[test]
    fn test_z3_script_shape() {
        let (t, o) = sample_transcript();
        let mut buf = Vec::new();
        let pubkey = BigUint::from(77u32);
        write_z3_script(&mut buf, &t, &pubkey, &o, &o, &o).unwrap();
        let script = String::from_utf8(buf).unwrap();
        assert!(script.starts_with("from z3 import *\n"));
        assert!(script.contains("v = IntVector('v', 3)"));
        assert!(script.contains("s.add((v[0] * v[1] - v[2]) % P == 0)"));
        assert!(script.contains("s.add(v[2] % P == 77 % P)"));
    }

    #[test]
    fn test_witness_call_line() {
        let (t, _) = sample_transcript();
        let mut buf = Vec::new();
        write_witness_call(&mut buf, &t, &BigUint::from(255u32), fe(6)).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "verify(0xff, 0x6, [2,3,6])\n"
        );
    }

    #[test]
    fn test_witness_call_requires_full_witness() {
        let mut t = Transcript::<F>::new();
        t.secret(None);
        let mut buf = Vec::new();
        assert!(write_witness_call(&mut buf, &t, &BigUint::from(1u32), fe(0)).is_err());
    }
}
