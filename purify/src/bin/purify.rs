//! Command-line driver for the Purify PRF.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use num::bigint::{BigUint, RandBigInt};
use num::One;
use purify::bulletproofs::transcript::BulletproofsTranscript;
use purify::curve::curve_types::Curve;
use purify::curve::purify_curves::{Purify1, Purify2};
use purify::export;
use purify::iop::transcript::Transcript;
use purify::prf;
use purify::prf::circuit::build_prf_circuit;
use purify_field::secp256k1_scalar::Secp256K1Scalar;
use purify_field::types::{Field, PrimeField};
use rand::rngs::OsRng;

type F = Secp256K1Scalar;

/// A PRF with low multiplicative complexity.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a key
    Gen {
        /// Packed secret key as hex; sampled uniformly when absent
        #[arg(long)]
        seckey: Option<String>,
    },
    /// Evaluate the PRF
    Eval {
        /// Message bytes as hex
        hexmsg: String,
        /// Packed secret key as hex
        seckey: String,
    },
    /// Output the verifier circuit for a given message
    Verifier {
        /// Message bytes as hex
        hexmsg: String,
        /// Packed public key as hex
        pubkey: String,
        /// Emit a Z3 script probing for stray satisfying assignments
        #[arg(short, long)]
        z3: bool,
        /// Write the binary Bulletproofs circuit to this file
        #[arg(short, long, conflicts_with = "z3")]
        bulletproofs_outfile: Option<PathBuf>,
    },
    /// Produce input for the verifier
    Prove {
        /// Message bytes as hex
        hexmsg: String,
        /// Packed secret key as hex
        seckey: String,
        /// Write the binary Bulletproofs assignment to this file
        #[arg(short, long)]
        bulletproofs_outfile: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    match Cli::parse().command {
        Command::Gen { seckey } => gen(seckey),
        Command::Eval { hexmsg, seckey } => eval(&hexmsg, &seckey),
        Command::Verifier {
            hexmsg,
            pubkey,
            z3,
            bulletproofs_outfile,
        } => verifier(&hexmsg, &pubkey, z3, bulletproofs_outfile),
        Command::Prove {
            hexmsg,
            seckey,
            bulletproofs_outfile,
        } => prove(&hexmsg, &seckey, bulletproofs_outfile),
    }
}

fn parse_hex_int(s: &str) -> Result<BigUint> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    BigUint::parse_bytes(digits.as_bytes(), 16)
        .with_context(|| format!("invalid hex integer {s:?}"))
}

fn create_outfile(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path).with_context(|| {
        format!("cannot create {}", path.display())
    })?))
}

fn gen(seckey: Option<String>) -> Result<()> {
    let z = match seckey {
        Some(s) => parse_hex_int(&s)?,
        None => {
            let bound = ((Purify1::order() - BigUint::one()) >> 1)
                * ((Purify2::order() - BigUint::one()) >> 1);
            OsRng.gen_biguint_below(&bound)
        }
    };
    let (z1, z2) = prf::unpack_secret(&z);
    let (p1, p2) = prf::public_key_points(&z1, &z2);
    println!("z={z:x} # private key");
    println!("x={:x} # public key", prf::pack_public(p1.x, p2.x));
    Ok(())
}

fn eval(hexmsg: &str, seckey: &str) -> Result<()> {
    let msg = hex::decode(hexmsg).context("invalid hex message")?;
    let z = parse_hex_int(seckey)?;
    let out = prf::evaluate(&msg, &z)?;
    println!("eval: {:x}", out.to_canonical_biguint());
    Ok(())
}

fn verifier(hexmsg: &str, pubkey: &str, z3: bool, outfile: Option<PathBuf>) -> Result<()> {
    let msg = hex::decode(hexmsg).context("invalid hex message")?;
    let pubkey = parse_hex_int(pubkey)?;
    ensure!(
        pubkey < F::order() * F::order(),
        "public key out of range"
    );

    let (m1, m2) = prf::message_points(&msg)?;
    let mut transcript = Transcript::new();
    let circuit = build_prf_circuit(&mut transcript, &m1, &m2, None)?;

    let stdout = io::stdout();
    if z3 {
        export::write_z3_script(
            &mut stdout.lock(),
            &transcript,
            &pubkey,
            &circuit.p1x,
            &circuit.p2x,
            &circuit.out,
        )
    } else if let Some(path) = outfile {
        let mut bulletproofs = BulletproofsTranscript::new(&transcript, circuit.n_bits);
        bulletproofs.bind_public(&pubkey, &circuit.p1x, &circuit.p2x, &circuit.out);
        let mut file = create_outfile(&path)?;
        bulletproofs.write_circuit(&mut file)?;
        file.flush()?;
        Ok(())
    } else {
        export::write_python_verifier(
            &mut stdout.lock(),
            &transcript,
            &circuit.p1x,
            &circuit.p2x,
            &circuit.out,
        )
    }
}

fn prove(hexmsg: &str, seckey: &str, outfile: Option<PathBuf>) -> Result<()> {
    let msg = hex::decode(hexmsg).context("invalid hex message")?;
    let z = parse_hex_int(seckey)?;
    let (z1, z2) = prf::unpack_secret(&z);

    let (m1, m2) = prf::message_points(&msg)?;
    let (p1, p2) = prf::public_key_points(&z1, &z2);
    let q1 = m1.to_jacobian().mul(&z1).to_affine();
    let q2 = m2.to_jacobian().mul(&z2).to_affine();
    let out_native = prf::combine(q1.x, q2.x);

    let mut transcript = Transcript::new();
    let circuit = build_prf_circuit(&mut transcript, &m1, &m2, Some((&z1, &z2)))?;
    ensure!(
        transcript.evaluate(&circuit.p1x) == Some(p1.x)
            && transcript.evaluate(&circuit.p2x) == Some(p2.x),
        "public key wires disagree with the native public key"
    );
    ensure!(
        transcript.evaluate(&circuit.out) == Some(out_native),
        "output wire disagrees with the native PRF output"
    );

    let pubkey = prf::pack_public(p1.x, p2.x);
    if let Some(path) = outfile {
        let mut bulletproofs = BulletproofsTranscript::new(&transcript, circuit.n_bits);
        bulletproofs.bind_public(&pubkey, &circuit.p1x, &circuit.p2x, &circuit.out);
        let values = bulletproofs.wire_values(transcript.values(), out_native)?;
        ensure!(
            bulletproofs.check(&values),
            "rewritten circuit rejected the witness"
        );
        let mut file = create_outfile(&path)?;
        bulletproofs.write_assignment(&values, &mut file)?;
        file.flush()?;
        Ok(())
    } else {
        export::write_witness_call(
            &mut io::stdout().lock(),
            &transcript,
            &pubkey,
            out_native,
        )
    }
}
