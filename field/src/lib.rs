#![allow(clippy::needless_range_loop)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_debug_implementations)]

pub mod ops;
pub mod secp256k1_scalar;
pub mod types;
