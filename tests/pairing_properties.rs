//! Cross-module scenarios from spec.md §8 that need `Fp`, `G1`, `G2` and
//! `pairing` together, split out of the per-module `#[cfg(test)]` blocks the
//! way `hash2curve` splits single-type unit tests from multi-type
//! integration tests.

use bls12_381_pure::g1::G1Projective;
use bls12_381_pure::g2::{G2Affine, G2Projective};
use bls12_381_pure::pairing::{multi_miller_loop, pairing, G2Prepared};
use bls12_381_pure::scalar::Scalar;

fn scalar_from_small(limbs: [u64; 4]) -> Scalar {
    Scalar::from_raw(limbs)
}

#[test]
fn bilinearity_matches_scenario_s4() {
    let a = scalar_from_small([1, 2, 3, 4]).invert().unwrap().square();
    let b = scalar_from_small([5, 6, 7, 8]).invert().unwrap().square();

    let g1 = G1Projective::generator();
    let g2 = G2Projective::generator();

    let lhs = pairing(&(g1 * a).to_affine(), &(g2 * b).to_affine());
    let rhs_ab = pairing(&(g1 * (a * b)).to_affine(), &g2.to_affine());
    let rhs_pow = pairing(&g1.to_affine(), &g2.to_affine()).mul(&(a * b));

    assert_eq!(lhs, rhs_ab);
    assert_eq!(lhs, rhs_pow);
}

#[test]
fn non_degeneracy_and_unitarity() {
    let g1 = G1Projective::generator().to_affine();
    let g2 = G2Projective::generator().to_affine();

    let base = pairing(&g1, &g2);
    assert_ne!(base, bls12_381_pure::pairing::Gt::identity());

    let neg_g1 = -g1;
    let neg_g2 = -g2;
    assert_eq!(-base, pairing(&neg_g1, &g2));
    assert_eq!(-base, pairing(&g1, &neg_g2));
}

#[test]
fn multi_miller_distributivity_matches_scenario_s5() {
    let scalars_a = [1u64, 2, 3, 4, 5];
    let scalars_b = [7u64, 6, 0, 9, 0];

    let mut terms = Vec::new();
    let mut expected = bls12_381_pure::pairing::Gt::identity();
    for (sa, sb) in scalars_a.iter().zip(scalars_b.iter()) {
        let a = if *sa == 0 {
            bls12_381_pure::g1::G1Affine::identity()
        } else {
            (G1Projective::generator() * scalar_from_small([*sa, 0, 0, 0])).to_affine()
        };
        let b = if *sb == 0 {
            G2Affine::identity()
        } else {
            (G2Projective::generator() * scalar_from_small([*sb, 0, 0, 0])).to_affine()
        };
        terms.push((a, G2Prepared::from(b)));
        expected = expected * pairing(&a, &b);
    }

    let ml = multi_miller_loop(&terms);
    let combined = bls12_381_pure::pairing::final_exponentiation(&ml).unwrap();

    assert_eq!(combined, expected);
}

#[test]
fn scalar_consistency() {
    let g1 = G1Projective::generator();
    let a = scalar_from_small([11, 0, 0, 0]);
    let b = scalar_from_small([13, 0, 0, 0]);

    assert_eq!((g1 * a) * b, g1 * (a * b));
    assert_eq!(g1 * Scalar::zero(), G1Projective::identity());
}
