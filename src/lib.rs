#![no_std]
#![forbid(unsafe_code)]
#![warn(clippy::unwrap_used, rust_2018_idioms, unused_lifetimes, unused_qualifications)]

//! Pure Rust arithmetic for the BLS12-381 pairing-friendly elliptic curve
//! construction.
//!
//! This crate implements the prime fields `Fp`/`Fq` (the base field and the
//! scalar field of the prime-order subgroups), the tower extensions
//! `Fp2`/`Fp6`/`Fp12`, the prime-order subgroups `G1`/`G2`, the optimal ate
//! pairing and the hash-to-curve primitives for `G1`. All field and group
//! arithmetic is implemented over fixed-size limb arrays rather than a
//! general-purpose bignum backend, and every type implements the constant-time
//! comparison and selection traits from [`subtle`] rather than branching on
//! secret data.
//!
//! ## Feature flags
//!
//! - `alloc` (implied by `std`): enables APIs that need a heap allocation,
//!   such as batch affine normalization.
//! - `std` (default): no behavioral difference over `alloc` today; kept for
//!   API symmetry with the rest of the RustCrypto elliptic curve crates.
//!
//! ## What this crate does not do
//!
//! There is no encoding of BLS signatures, no message-to-field hashing (the
//! XOF/`expand_message` step that feeds [`hash_to_curve::hash_to_g1`]), and no
//! serialization format beyond the raw fixed-size byte encodings each type
//! exposes directly. Those concerns belong to a higher-level crate built on
//! top of this one.

#[cfg(feature = "alloc")]
extern crate alloc;

mod util;

pub mod fp;
pub mod fp12;
pub mod fp2;
pub mod fp6;
pub mod g1;
pub mod g2;
pub mod hash_to_curve;
pub mod pairing;
pub mod scalar;

pub use fp::Fp;
pub use fp12::Fp12;
pub use fp2::Fp2;
pub use fp6::Fp6;
pub use g1::{G1Affine, G1Projective};
pub use g2::{G2Affine, G2Projective};
pub use pairing::{pairing, G2Prepared, Gt};
pub use scalar::Scalar;
