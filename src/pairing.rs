//! The optimal ate pairing `e: G1 x G2 -> Gt` for BLS12-381.

use core::ops::{Mul, MulAssign, Neg};

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

use crate::fp12::Fp12;
use crate::fp2::Fp2;
use crate::g1::G1Affine;
use crate::g2::{G2Affine, G2Projective};
use crate::scalar::Scalar;

/// `|BLS_X| = 0xd201000000010000`; BLS12-381's curve parameter is its
/// negation.
const BLS_X: u64 = 0xd201_0000_0001_0000;
const BLS_X_IS_NEGATIVE: bool = true;

/// Number of line-evaluation coefficient triples a [`G2Prepared`] table
/// holds: one per non-skipped bit of `|BLS_X| >> 1` (62) plus one per set
/// bit among those (5, an addition step) plus the trailing doubling (1).
const NUM_COEFFS: usize = 68;

/// The accumulator `R` the Miller loop doubles/adds into, tracked
/// separately from [`crate::g2::G2Projective`] because its line-evaluation
/// steps are specific to pairing computation.
#[derive(Copy, Clone)]
struct MillerAccumulator {
    x: Fp2,
    y: Fp2,
    z: Fp2,
}

impl From<G2Affine> for MillerAccumulator {
    fn from(q: G2Affine) -> MillerAccumulator {
        MillerAccumulator {
            x: q.x,
            y: q.y,
            z: Fp2::one(),
        }
    }
}

impl MillerAccumulator {
    /// Tangent line at `self`, per Costello-Lange-Naehrig (ePrint 2010/354)
    /// Algorithm 26; updates `self` to `2*self` and returns the line's
    /// `(l0, l1, l2)` coefficients.
    fn doubling_step(&mut self) -> (Fp2, Fp2, Fp2) {
        let tmp0 = self.x.square();
        let tmp1 = self.y.square();
        let tmp2 = tmp1.square();
        let tmp3 = (tmp1 + self.x).square() - tmp0 - tmp2;
        let tmp3 = tmp3 + tmp3;
        let tmp4 = tmp0 + tmp0 + tmp0;
        let tmp6 = self.x + tmp4;
        let tmp5 = tmp4.square();
        let zsquared = self.z.square();

        self.x = tmp5 - tmp3 - tmp3;
        self.z = (self.z + self.y).square() - tmp1 - zsquared;
        self.y = (tmp3 - self.x) * tmp4;
        let tmp2_8 = tmp2.double().double().double();
        self.y = self.y - tmp2_8;

        let tmp3b = tmp4 * zsquared;
        let tmp3b = -(tmp3b + tmp3b);
        let tmp6 = tmp6.square() - tmp0 - tmp5;
        let tmp1_4 = tmp1.double().double();
        let tmp6 = tmp6 - tmp1_4;
        let tmp0_out = self.z * zsquared;
        let tmp0_out = tmp0_out + tmp0_out;

        (tmp0_out, tmp3b, tmp6)
    }

    /// Line through `self` and `q`, per Algorithm 27; updates `self` to
    /// `self + q` and returns the line's `(l0, l1, l2)` coefficients.
    fn addition_step(&mut self, q: &G2Affine) -> (Fp2, Fp2, Fp2) {
        let zsquared = self.z.square();
        let ysquared = q.y.square();
        let t0 = zsquared * q.x;
        let t1 = ((q.y + self.z).square() - ysquared - zsquared) * zsquared;
        let t2 = t0 - self.x;
        let t3 = t2.square();
        let t4 = t3.double().double();
        let t5 = t4 * t2;
        let t6 = t1 - self.y - self.y;
        let t9 = t6 * q.x;
        let t7 = t4 * self.x;

        self.x = t6.square() - t5 - t7 - t7;
        self.z = (self.z + t2).square() - zsquared - t3;
        let t10 = q.y + self.z;
        let t8 = (t7 - self.x) * t6;
        let t0b = self.y * t5;
        let t0b = t0b + t0b;
        self.y = t8 - t0b;

        let t10 = t10.square() - ysquared;
        let ztsquared = self.z.square();
        let t10 = t10 - ztsquared;
        let t9 = t9 + t9 - t10;
        let t10_out = self.z + self.z;
        let t6_neg = -t6;
        let t1_out = t6_neg + t6_neg;

        (t10_out, t1_out, t9)
    }
}

/// Folds a line-evaluation triple, scaled by `p`'s affine coordinates, into
/// the running Miller-loop product via [`Fp12::mul_by_014`].
fn ell(f: Fp12, coeffs: &(Fp2, Fp2, Fp2), p: &G1Affine) -> Fp12 {
    let c0 = Fp2 {
        c0: coeffs.0.c0 * p.y,
        c1: coeffs.0.c1 * p.y,
    };
    let c1 = Fp2 {
        c0: coeffs.1.c0 * p.x,
        c1: coeffs.1.c1 * p.x,
    };
    f.mul_by_014(&coeffs.2, &c1, &c0)
}

/// Walks the fixed bit pattern of `|BLS_X| >> 1`, skipping its leading bit,
/// invoking `on_bit(is_set)` once per remaining bit in descending order.
fn for_each_loop_bit(mut on_bit: impl FnMut(bool)) {
    let y = BLS_X >> 1;
    let top = 63 - y.leading_zeros(); // highest set-bit index of y
    for i in (0..top).rev() {
        on_bit(((y >> i) & 1) == 1);
    }
}

/// Precomputed line-evaluation coefficients for a fixed `G2` point, so a
/// multi-pairing can reuse them across every `G1` term without repeating
/// the Miller-loop bookkeeping on `Q`.
#[derive(Copy, Clone)]
pub struct G2Prepared {
    infinity: Choice,
    coeffs: [(Fp2, Fp2, Fp2); NUM_COEFFS],
}

impl From<G2Affine> for G2Prepared {
    fn from(q: G2Affine) -> G2Prepared {
        let is_identity = q.is_identity();
        let q = G2Affine::conditional_select(&q, &G2Affine::generator(), is_identity);

        let mut coeffs = [(Fp2::zero(), Fp2::zero(), Fp2::zero()); NUM_COEFFS];
        let mut acc = MillerAccumulator::from(q);
        let mut idx = 0;

        for_each_loop_bit(|bit| {
            coeffs[idx] = acc.doubling_step();
            idx += 1;
            if bit {
                coeffs[idx] = acc.addition_step(&q);
                idx += 1;
            }
        });
        coeffs[idx] = acc.doubling_step();
        idx += 1;
        debug_assert_eq!(idx, NUM_COEFFS);

        G2Prepared {
            infinity: is_identity,
            coeffs,
        }
    }
}

impl From<G2Projective> for G2Prepared {
    fn from(q: G2Projective) -> G2Prepared {
        G2Prepared::from(q.to_affine())
    }
}

/// The Miller loop for a single `(P, Q)` pair; see [`multi_miller_loop`]
/// for the general case and the pairing's overall shape.
pub fn miller_loop(p: &G1Affine, q: &G2Prepared) -> Fp12 {
    multi_miller_loop(&[(*p, *q)])
}

/// `Σ ML(Pᵢ, Qᵢ)`: runs one Miller loop consuming every term's prepared
/// line coefficients in lockstep, since they all follow the same fixed bit
/// pattern of `BLS_X`.
pub fn multi_miller_loop(terms: &[(G1Affine, G2Prepared)]) -> Fp12 {
    let mut f = Fp12::one();
    let mut idx = 0;

    for_each_loop_bit(|bit| {
        f = f.square();
        for (p, q) in terms {
            let coeffs = &q.coeffs[idx];
            let line = ell(Fp12::one(), coeffs, p);
            f = conditional_mul(f, line, q.infinity);
        }
        idx += 1;
        if bit {
            for (p, q) in terms {
                let coeffs = &q.coeffs[idx];
                let line = ell(Fp12::one(), coeffs, p);
                f = conditional_mul(f, line, q.infinity);
            }
            idx += 1;
        }
    });

    for (p, q) in terms {
        let coeffs = &q.coeffs[idx];
        let line = ell(Fp12::one(), coeffs, p);
        f = conditional_mul(f, line, q.infinity);
    }

    if BLS_X_IS_NEGATIVE {
        f.conjugate()
    } else {
        f
    }
}

fn conditional_mul(f: Fp12, line: Fp12, skip: Choice) -> Fp12 {
    Fp12::conditional_select(&(f * line), &f, skip)
}

/// The target group `Gt`: the order-`q` cyclotomic subgroup of `Fp12^*`
/// that every pairing value lands in.
#[derive(Copy, Clone, Debug)]
pub struct Gt(pub(crate) Fp12);

impl ConstantTimeEq for Gt {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl PartialEq for Gt {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.ct_eq(other))
    }
}
impl Eq for Gt {}

impl ConditionallySelectable for Gt {
    fn conditional_select(a: &Gt, b: &Gt, choice: Choice) -> Gt {
        Gt(Fp12::conditional_select(&a.0, &b.0, choice))
    }
}

impl Gt {
    pub fn identity() -> Gt {
        Gt(Fp12::one())
    }

    fn group_mul(&self, rhs: &Gt) -> Gt {
        Gt(self.0 * rhs.0)
    }

    /// Left-to-right square-and-multiply by the canonical 32-byte
    /// little-endian encoding of `scalar`, without skipping any leading
    /// zero bit (the multiplicative-notation analogue of
    /// `G1Projective::mul`/`G2Projective::mul`'s double-and-add).
    pub fn mul(&self, scalar: &Scalar) -> Gt {
        let bytes = scalar.to_bytes();
        let mut acc = Gt::identity();
        for byte in bytes.iter().rev() {
            for i in (0..8).rev() {
                acc = acc.group_mul(&acc);
                let bit = Choice::from((byte >> i) & 1);
                acc = Gt::conditional_select(&acc, &acc.group_mul(self), bit);
            }
        }
        acc
    }
}

impl Mul<&Gt> for &Gt {
    type Output = Gt;
    fn mul(self, rhs: &Gt) -> Gt {
        Gt::group_mul(self, rhs)
    }
}
impl Mul<Gt> for Gt {
    type Output = Gt;
    fn mul(self, rhs: Gt) -> Gt {
        Gt::group_mul(&self, &rhs)
    }
}
impl MulAssign<Gt> for Gt {
    fn mul_assign(&mut self, rhs: Gt) {
        *self = Gt::group_mul(self, &rhs);
    }
}

impl Neg for Gt {
    type Output = Gt;
    // Gt is the order-r unitary subgroup of Fp12, where inverse == conjugate.
    fn neg(self) -> Gt {
        Gt(self.0.conjugate())
    }
}
impl Neg for &Gt {
    type Output = Gt;
    fn neg(self) -> Gt {
        Gt((*self).0.conjugate())
    }
}

fn frobenius_pow(f: &Fp12, n: u32) -> Fp12 {
    let mut r = *f;
    for _ in 0..n {
        r = r.frobenius_map();
    }
    r
}

fn exp_by_x(f: &Fp12) -> Fp12 {
    f.cyclotomic_exp(&[BLS_X])
}

/// Raises the Miller-loop output to `(p^12 - 1) / q`, landing it in `Gt`.
///
/// Follows the exact addition chain spec.md gives: the first three steps
/// realize the "easy part" `f -> f^(p^6-1) * f^(p^2+1)`, producing a
/// unitary element that the rest of the chain raises through the "hard
/// part" exponent using `BLS_X`-exponentiation and cyclotomic squaring
/// (Granger-Scott, "Guide to Pairing-Based Cryptography" Algorithm 5.5.4).
///
/// Fails (empty `CtOption`) only if the input is zero, which cannot happen
/// for a Miller-loop output on valid, non-identity inputs.
pub fn final_exponentiation(f: &Fp12) -> CtOption<Gt> {
    f.invert().map(|f_inv| {
        let t0 = frobenius_pow(f, 6);
        let t1 = f_inv;
        let t2 = t0 * t1;
        let t1 = t2;
        let t2 = frobenius_pow(&t2, 2);
        let t2 = t2 * t1;

        let t1 = t2.cyclotomic_square().conjugate();
        let t3 = exp_by_x(&t2);
        let t4 = t3.cyclotomic_square();
        let t5 = t1 * t3;
        let t1 = exp_by_x(&t5);
        let t0 = exp_by_x(&t1);
        let t6 = exp_by_x(&t0) * t4;
        let t4 = exp_by_x(&t6);
        let t5 = t5.conjugate();
        let t4 = t4 * t5 * t2;
        let t5 = t2.conjugate();
        let t1 = t1 * t2;
        let t1 = frobenius_pow(&t1, 3);
        let t6 = t6 * t5;
        let t6 = frobenius_pow(&t6, 1);
        let t3 = t3 * t0;
        let t3 = frobenius_pow(&t3, 2);
        let t3 = t3 * t1 * t6;

        Gt(t3 * t4)
    })
}

/// `e(P, Q)`, the optimal ate pairing.
pub fn pairing(p: &G1Affine, q: &G2Affine) -> Gt {
    let prepared = G2Prepared::from(*q);
    let f = miller_loop(p, &prepared);
    final_exponentiation(&f).expect("Miller loop output on a valid input is never zero")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::g1::G1Projective;
    use crate::g2::G2Projective;

    #[test]
    fn non_degenerate() {
        let p = G1Affine::generator();
        let q = G2Affine::generator();
        assert_ne!(pairing(&p, &q), Gt::identity());
    }

    #[test]
    fn identity_is_trivial() {
        let q = G2Affine::generator();
        assert_eq!(pairing(&G1Affine::identity(), &q), Gt::identity());
    }

    #[test]
    fn bilinear_in_first_argument() {
        let a = Scalar::from_raw([3, 0, 0, 0]);
        let p = G1Projective::generator();
        let q = G2Affine::generator();

        let lhs = pairing(&p.mul(a).to_affine(), &q);
        let base = pairing(&p.to_affine(), &q);
        let rhs = Gt(base.0.pow_vartime(&[3]));
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn multi_miller_loop_matches_product_of_individual_loops() {
        let p1 = G1Affine::generator();
        let p2 = G1Projective::generator().double().to_affine();
        let q1 = G2Prepared::from(G2Affine::generator());
        let q2 = G2Prepared::from(G2Projective::generator().double().to_affine());

        let combined = multi_miller_loop(&[(p1, q1), (p2, q2)]);
        let separate = miller_loop(&p1, &q1) * miller_loop(&p2, &q2);
        assert_eq!(combined, separate);
    }
}
