//! The binary Bulletproofs circuit and assignment formats.
//!
//! Little-endian throughout. The circuit file carries, per wire row, the
//! (constraint index, factor) entries of that wire across all constraints;
//! indices and row lengths use the libsecp256k1-zkp width rule. Every
//! 32-byte field element is preceded by a 0x20 tag byte.

use std::io::Write;

use anyhow::{anyhow, bail, ensure, Result};
use hashbrown::HashMap;
use num::bigint::BigUint;
use purify_field::types::{Field, PrimeField};

use crate::bulletproofs::transcript::BulletproofsTranscript;
use crate::iop::expr::{Variable, WireKind};

const VERSION: u32 = 1;
/// Tag byte preceding every serialized field element.
const FIELD_TAG: u8 = 0x20;

/// Byte width of row lengths and constraint indices for a circuit with
/// `n_muls` multiplications.
pub const fn encoding_width(n_muls: usize) -> usize {
    if n_muls < 0x100 {
        1
    } else if n_muls < 0x10000 {
        2
    } else if n_muls < 0x1_0000_0000 {
        4
    } else {
        8
    }
}

fn write_uint<W: Write>(w: &mut W, value: u64, width: usize) -> Result<()> {
    w.write_all(&value.to_le_bytes()[..width])?;
    Ok(())
}

fn write_field<F: PrimeField, W: Write>(w: &mut W, value: F) -> Result<()> {
    w.write_all(&[FIELD_TAG])?;
    let mut bytes = value.to_canonical_biguint().to_bytes_le();
    bytes.resize(32, 0);
    w.write_all(&bytes)?;
    Ok(())
}

impl<F: PrimeField> BulletproofsTranscript<F> {
    /// Per-wire rows of `(constraint index, factor)` entries, in the order
    /// L, R, O, V.
    #[allow(clippy::type_complexity)]
    pub fn wire_matrix(&self) -> Result<Vec<Vec<(usize, F)>>> {
        let mut wl = vec![Vec::new(); self.n_muls()];
        let mut wr = vec![Vec::new(); self.n_muls()];
        let mut wo = vec![Vec::new(); self.n_muls()];
        let mut wv = vec![Vec::new(); self.n_commitments()];

        for (i, (lhs, _)) in self.constraints().iter().enumerate() {
            for &(var, factor) in lhs.linear_part() {
                match var {
                    Variable::Wire(WireKind::Left, idx) => wl[idx].push((i, factor)),
                    Variable::Wire(WireKind::Right, idx) => wr[idx].push((i, factor)),
                    Variable::Wire(WireKind::Output, idx) => wo[idx].push((i, factor)),
                    Variable::Commitment(idx) => wv[idx].push((i, factor)),
                    Variable::Witness(_) => {
                        bail!("witness variable {var} left in a rewritten constraint")
                    }
                }
            }
        }

        let mut rows = wl;
        rows.append(&mut wr);
        rows.append(&mut wo);
        rows.append(&mut wv);
        Ok(rows)
    }

    /// Write the circuit file.
    pub fn write_circuit<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&VERSION.to_le_bytes())?;
        w.write_all(&(self.n_commitments() as u32).to_le_bytes())?;
        w.write_all(&(self.n_muls() as u64).to_le_bytes())?;
        w.write_all(&(self.n_bits() as u64).to_le_bytes())?;
        w.write_all(&(self.constraints().len() as u64).to_le_bytes())?;

        let width = encoding_width(self.n_muls());
        for row in self.wire_matrix()? {
            write_uint(w, row.len() as u64, width)?;
            for (constraint, factor) in row {
                write_uint(w, constraint as u64, width)?;
                write_field(w, factor)?;
            }
        }

        // Constant terms, the constraints' right-hand sides.
        for (_, rhs) in self.constraints() {
            write_field(w, *rhs)?;
        }
        Ok(())
    }

    /// Write the assignment file. `values` must come from `wire_values`.
    pub fn write_assignment<W: Write>(
        &self,
        values: &HashMap<Variable, F>,
        w: &mut W,
    ) -> Result<()> {
        w.write_all(&VERSION.to_le_bytes())?;
        w.write_all(&(self.n_commitments() as u32).to_le_bytes())?;
        w.write_all(&(self.n_muls() as u64).to_le_bytes())?;

        let get = |var: Variable| {
            values
                .get(&var)
                .copied()
                .ok_or_else(|| anyhow!("unassigned wire {var}"))
        };
        for kind in [WireKind::Left, WireKind::Right, WireKind::Output] {
            for i in 0..self.n_muls() {
                write_field(w, get(Variable::Wire(kind, i))?)?;
            }
        }
        write_field(w, get(Variable::Commitment(0))?)?;
        Ok(())
    }
}

/// A byte-slice reader for the binary formats.
#[derive(Debug)]
pub struct Buffer<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Buffer<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos == self.bytes.len()
    }

    fn read_exact(&mut self, len: usize) -> Result<&'a [u8]> {
        ensure!(
            self.pos + len <= self.bytes.len(),
            "unexpected end of input at offset {}",
            self.pos
        );
        let ret = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(ret)
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_exact(4)?.try_into().unwrap()))
    }

    fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_exact(8)?.try_into().unwrap()))
    }

    fn read_uint(&mut self, width: usize) -> Result<u64> {
        let mut bytes = [0u8; 8];
        bytes[..width].copy_from_slice(self.read_exact(width)?);
        Ok(u64::from_le_bytes(bytes))
    }

    fn read_field<F: PrimeField>(&mut self) -> Result<F> {
        let tag = self.read_exact(1)?[0];
        ensure!(tag == FIELD_TAG, "bad field tag {tag:#04x}");
        let bytes = self.read_exact(32)?;
        Ok(F::from_noncanonical_biguint(BigUint::from_bytes_le(bytes)))
    }
}

/// A parsed circuit file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParsedCircuit<F: PrimeField> {
    pub n_commitments: usize,
    pub n_muls: usize,
    pub n_bits: usize,
    /// Wire rows in the order L, R, O, V.
    pub rows: Vec<Vec<(usize, F)>>,
    /// Constraint right-hand sides.
    pub constants: Vec<F>,
}

/// A parsed assignment file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParsedAssignment<F: PrimeField> {
    pub n_commitments: usize,
    pub n_muls: usize,
    pub l: Vec<F>,
    pub r: Vec<F>,
    pub o: Vec<F>,
    pub commitments: Vec<F>,
}

pub fn read_circuit<F: PrimeField>(bytes: &[u8]) -> Result<ParsedCircuit<F>> {
    let mut buf = Buffer::new(bytes);
    let version = buf.read_u32()?;
    ensure!(version == VERSION, "unsupported circuit version {version}");
    let n_commitments = buf.read_u32()? as usize;
    let n_muls = buf.read_u64()? as usize;
    let n_bits = buf.read_u64()? as usize;
    let n_constraints = buf.read_u64()? as usize;

    let width = encoding_width(n_muls);
    let mut rows = Vec::with_capacity(3 * n_muls + n_commitments);
    for _ in 0..3 * n_muls + n_commitments {
        let len = buf.read_uint(width)? as usize;
        let mut row = Vec::with_capacity(len);
        for _ in 0..len {
            let constraint = buf.read_uint(width)? as usize;
            ensure!(constraint < n_constraints, "constraint index out of range");
            row.push((constraint, buf.read_field::<F>()?));
        }
        rows.push(row);
    }
    let constants = (0..n_constraints)
        .map(|_| buf.read_field::<F>())
        .collect::<Result<Vec<_>>>()?;
    ensure!(buf.is_empty(), "trailing bytes after circuit");

    Ok(ParsedCircuit {
        n_commitments,
        n_muls,
        n_bits,
        rows,
        constants,
    })
}

pub fn read_assignment<F: PrimeField>(bytes: &[u8]) -> Result<ParsedAssignment<F>> {
    let mut buf = Buffer::new(bytes);
    let version = buf.read_u32()?;
    ensure!(version == VERSION, "unsupported assignment version {version}");
    let n_commitments = buf.read_u32()? as usize;
    let n_muls = buf.read_u64()? as usize;

    let read_block = |buf: &mut Buffer<'_>, len: usize| {
        (0..len)
            .map(|_| buf.read_field::<F>())
            .collect::<Result<Vec<_>>>()
    };
    let l = read_block(&mut buf, n_muls)?;
    let r = read_block(&mut buf, n_muls)?;
    let o = read_block(&mut buf, n_muls)?;
    let commitments = read_block(&mut buf, n_commitments)?;
    ensure!(buf.is_empty(), "trailing bytes after assignment");

    Ok(ParsedAssignment {
        n_commitments,
        n_muls,
        l,
        r,
        o,
        commitments,
    })
}

impl<F: PrimeField> ParsedCircuit<F> {
    /// Whether the assignment satisfies every multiplication gate and every
    /// serialized constraint of this circuit.
    pub fn satisfied_by(&self, assignment: &ParsedAssignment<F>) -> bool {
        if assignment.n_muls != self.n_muls
            || assignment.n_commitments != self.n_commitments
            || assignment.commitments.len() != self.n_commitments
        {
            return false;
        }
        for i in 0..self.n_muls {
            if assignment.l[i] * assignment.r[i] != assignment.o[i] {
                return false;
            }
        }

        let mut sums = vec![F::ZERO; self.constants.len()];
        let wires = [&assignment.l, &assignment.r, &assignment.o];
        for (row_index, row) in self.rows.iter().enumerate() {
            let value = if row_index < 3 * self.n_muls {
                wires[row_index / self.n_muls][row_index % self.n_muls]
            } else {
                assignment.commitments[row_index - 3 * self.n_muls]
            };
            for &(constraint, factor) in row {
                sums[constraint] += factor * value;
            }
        }
        sums == self.constants
    }
}

#[cfg(test)]
mod tests {
    use num::bigint::BigUint;
    use purify_field::secp256k1_scalar::Secp256K1Scalar;

    use super::{encoding_width, read_assignment, read_circuit};
    use crate::bulletproofs::transcript::BulletproofsTranscript;
    use crate::iop::transcript::Transcript;
    use crate::prf;
    use crate::prf::circuit::build_prf_circuit;

    type F = Secp256K1Scalar;

    #[test]
    fn test_encoding_width() {
        assert_eq!(encoding_width(255), 1);
        assert_eq!(encoding_width(256), 2);
        assert_eq!(encoding_width(65535), 2);
        assert_eq!(encoding_width(65536), 4);
        assert_eq!(encoding_width(1 << 32), 8);
    }

    fn prove(
        z: u64,
        msg: &[u8],
    ) -> (BulletproofsTranscript<F>, Vec<u8>, Vec<u8>) {
        let z = BigUint::from(z);
        let (z1, z2) = prf::unpack_secret(&z);
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

        let mut circuit_bytes = Vec::new();
        b.write_circuit(&mut circuit_bytes).unwrap();
        let values = b.wire_values(transcript.values(), out_native).unwrap();
        assert!(b.check(&values));
        let mut assignment_bytes = Vec::new();
        b.write_assignment(&values, &mut assignment_bytes).unwrap();

        (b, circuit_bytes, assignment_bytes)
    }

    #[test]
    fn test_round_trip_and_satisfaction() {
        let (b, circuit_bytes, assignment_bytes) = prove(999, b"\x00");

        let circuit = read_circuit::<F>(&circuit_bytes).unwrap();
        assert_eq!(circuit.n_muls, b.n_muls());
        assert_eq!(circuit.n_bits, b.n_bits());
        assert_eq!(circuit.n_commitments, b.n_commitments());
        assert_eq!(circuit.rows, b.wire_matrix().unwrap());
        assert_eq!(
            circuit.constants,
            b.constraints().iter().map(|(_, rhs)| *rhs).collect::<Vec<_>>()
        );

        let assignment = read_assignment::<F>(&assignment_bytes).unwrap();
        assert_eq!(
            assignment_bytes.len(),
            4 + 4 + 8 + 33 * (3 * b.n_muls() + 1)
        );
        assert!(circuit.satisfied_by(&assignment));
    }

    #[test]
    fn test_corrupted_assignment_is_rejected() {
        let (_, circuit_bytes, assignment_bytes) = prove(31337, b"\x01");
        let circuit = read_circuit::<F>(&circuit_bytes).unwrap();

        // Flip one byte inside the very first wire value.
        let mut corrupted = assignment_bytes.clone();
        corrupted[17] ^= 1;
        if let Ok(assignment) = read_assignment::<F>(&corrupted) {
            assert!(!circuit.satisfied_by(&assignment));
        }

        // Corrupting a tag byte is a parse error.
        let mut corrupted = assignment_bytes;
        corrupted[16] ^= 1;
        assert!(read_assignment::<F>(&corrupted).is_err());
    }

    #[test]
    fn test_circuit_header() {
        let (b, circuit_bytes, _) = prove(77, b"\x02");
        assert_eq!(&circuit_bytes[0..4], &1u32.to_le_bytes());
        assert_eq!(&circuit_bytes[4..8], &1u32.to_le_bytes());
        assert_eq!(&circuit_bytes[8..16], &(b.n_muls() as u64).to_le_bytes());
        assert_eq!(&circuit_bytes[16..24], &(b.n_bits() as u64).to_le_bytes());
        assert_eq!(
            &circuit_bytes[24..32],
            &(b.constraints().len() as u64).to_le_bytes()
        );
    }
}
