//! Exercises the `rand_core::RngCore` boundary end to end with a concrete,
//! seeded RNG, and a fixed hex test vector for the wide-reduction `Fp`
//! constructor, rather than only unit-testing the reduction arithmetic in
//! isolation the way `src/fp.rs`/`src/scalar.rs`'s own `#[cfg(test)]`
//! modules do.

use hex_literal::hex;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

use bls12_381_pure::fp::Fp;
use bls12_381_pure::g1::G1Projective;
use bls12_381_pure::scalar::Scalar;

#[test]
fn scalar_random_is_deterministic_under_a_fixed_seed() {
    let mut rng_a = ChaCha20Rng::seed_from_u64(0xdead_beef);
    let mut rng_b = ChaCha20Rng::seed_from_u64(0xdead_beef);

    let a = Scalar::random(&mut rng_a);
    let b = Scalar::random(&mut rng_b);
    assert_eq!(a, b);

    // A different seed should (overwhelmingly) produce a different scalar.
    let mut rng_c = ChaCha20Rng::seed_from_u64(0x1234_5678);
    let c = Scalar::random(&mut rng_c);
    assert_ne!(a, c);
}

#[test]
fn scalar_random_feeds_scalar_multiplication_consistently() {
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    let k = Scalar::random(&mut rng);

    let g = G1Projective::generator();
    let lhs = g * k;
    let rhs = g * k;
    assert_eq!(lhs, rhs);
    assert_ne!(lhs, G1Projective::identity());
}

#[test]
fn fp_random_reduces_a_fixed_96_byte_vector_into_the_field() {
    // 96 big-endian bytes, clearly out of the canonical [0, p) range, to
    // confirm `Fp::random` reduces rather than panicking or truncating.
    let bytes: [u8; 96] = hex!(
        "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff
         ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff
         ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
    );

    let x = Fp::random(bytes);
    let y = Fp::random(bytes);
    assert_eq!(x, y);
    assert_ne!(x, Fp::zero());
}
