//! A PRF with low multiplicative complexity, expressed as an arithmetic
//! circuit over a prime field.
//!
//! The PRF is built from two elliptic curves sharing a base field and related
//! by a 2-isogeny; proving one evaluation takes about 3·(n1+n2)
//! multiplication gates plus windowing overhead, a few thousand in total.
//! The [`iop`] module records circuits symbolically,
//! [`gadgets`] provides the windowed scalar-multiplication and combiner
//! gadgets, and [`bulletproofs`] rewrites the result into the
//! libsecp256k1-zkp Bulletproofs wire layout and its binary formats.

#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod bulletproofs;
pub mod curve;
pub mod export;
pub mod gadgets;
pub mod hash;
pub mod iop;
pub mod prf;
