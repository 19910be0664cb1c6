//! `G1`, the prime-order `Fp`-rational subgroup of `E: y^2 = x^3 + 4`.

use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use crate::fp::Fp;
use crate::scalar::Scalar;

/// `|BLS_X| = 0xd201000000010000`; the actual curve parameter is its
/// negation.
const BLS_X: u64 = 0xd201_0000_0001_0000;
const BLS_X_IS_NEGATIVE: bool = true;

fn curve_b() -> Fp {
    Fp::from_raw([4, 0, 0, 0, 0, 0])
}

fn curve_b3() -> Fp {
    let b = curve_b();
    b + b.double()
}

/// A primitive cube root of unity in `Fp`, i.e. a root of `x^2 + x + 1 = 0`:
/// `beta = (sqrt(-3) - 1) / 2`. Used by the `G1` GLV-style endomorphism.
fn endomorphism_beta() -> Fp {
    let neg_three = -Fp::from_raw([3, 0, 0, 0, 0, 0]);
    let sqrt_neg_three = neg_three.sqrt().expect("-3 is a quadratic residue in Fp");
    let two_inv = Fp::from_raw([2, 0, 0, 0, 0, 0])
        .invert()
        .expect("2 is invertible in Fp");
    (sqrt_neg_three - Fp::one()) * two_inv
}

fn generator_x() -> Fp {
    Fp::from_dec_str(
        "3685416753713387016781088315183077757961620795782546409894578378688607592378376318836054947676345821548104185464507",
    )
}

fn generator_y() -> Fp {
    Fp::from_dec_str(
        "1339506544944476473020471379941921221584933875938349620426543736416511423956333506472724655353366534992391756441569",
    )
}

/// A point on `E` in affine coordinates. `infinity` is `1` iff this
/// represents the point at infinity, in which case `x`/`y` are zero.
#[derive(Copy, Clone, Debug)]
pub struct G1Affine {
    pub(crate) x: Fp,
    pub(crate) y: Fp,
    infinity: Choice,
}

impl Default for G1Affine {
    fn default() -> G1Affine {
        G1Affine::identity()
    }
}

impl ConstantTimeEq for G1Affine {
    fn ct_eq(&self, other: &Self) -> Choice {
        (self.infinity & other.infinity)
            | (!self.infinity & !other.infinity & self.x.ct_eq(&other.x) & self.y.ct_eq(&other.y))
    }
}

impl ConditionallySelectable for G1Affine {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        G1Affine {
            x: Fp::conditional_select(&a.x, &b.x, choice),
            y: Fp::conditional_select(&a.y, &b.y, choice),
            infinity: Choice::conditional_select(&a.infinity, &b.infinity, choice),
        }
    }
}

impl PartialEq for G1Affine {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.ct_eq(other))
    }
}
impl Eq for G1Affine {}

impl G1Affine {
    pub fn identity() -> G1Affine {
        G1Affine {
            x: Fp::zero(),
            y: Fp::zero(),
            infinity: Choice::from(1u8),
        }
    }

    pub fn generator() -> G1Affine {
        G1Affine {
            x: generator_x(),
            y: generator_y(),
            infinity: Choice::from(0u8),
        }
    }

    pub fn is_identity(&self) -> Choice {
        self.infinity
    }

    pub fn is_on_curve(&self) -> Choice {
        let rhs = self.x.square() * self.x + curve_b();
        (self.y.square().ct_eq(&rhs)) | self.infinity
    }

    pub fn neg(&self) -> G1Affine {
        G1Affine {
            x: self.x,
            y: -self.y,
            infinity: self.infinity,
        }
    }

    pub fn to_projective(&self) -> G1Projective {
        G1Projective {
            x: self.x,
            y: Fp::conditional_select(&self.y, &Fp::one(), self.infinity),
            z: Fp::conditional_select(&Fp::one(), &Fp::zero(), self.infinity),
        }
    }
}

impl Neg for G1Affine {
    type Output = G1Affine;
    fn neg(self) -> G1Affine {
        G1Affine::neg(&self)
    }
}

/// A point on `E` in projective (homogeneous) coordinates.
#[derive(Copy, Clone, Debug)]
pub struct G1Projective {
    pub(crate) x: Fp,
    pub(crate) y: Fp,
    pub(crate) z: Fp,
}

impl Default for G1Projective {
    fn default() -> G1Projective {
        G1Projective::identity()
    }
}

impl ConstantTimeEq for G1Projective {
    fn ct_eq(&self, other: &Self) -> Choice {
        // Cross-multiply to avoid inverting either Z.
        let x1z2 = self.x * other.z;
        let x2z1 = other.x * self.z;
        let y1z2 = self.y * other.z;
        let y2z1 = other.y * self.z;

        let self_infinity = self.z.is_zero();
        let other_infinity = other.z.is_zero();

        (self_infinity & other_infinity)
            | (!self_infinity & !other_infinity & x1z2.ct_eq(&x2z1) & y1z2.ct_eq(&y2z1))
    }
}

impl ConditionallySelectable for G1Projective {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        G1Projective {
            x: Fp::conditional_select(&a.x, &b.x, choice),
            y: Fp::conditional_select(&a.y, &b.y, choice),
            z: Fp::conditional_select(&a.z, &b.z, choice),
        }
    }
}

impl PartialEq for G1Projective {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.ct_eq(other))
    }
}
impl Eq for G1Projective {}

impl G1Projective {
    pub fn identity() -> G1Projective {
        G1Projective {
            x: Fp::zero(),
            y: Fp::one(),
            z: Fp::zero(),
        }
    }

    pub fn generator() -> G1Projective {
        G1Affine::generator().to_projective()
    }

    pub fn is_identity(&self) -> Choice {
        self.z.is_zero()
    }

    pub fn is_on_curve(&self) -> Choice {
        // Y^2 Z = X^3 + b Z^3, the homogeneous form, true automatically at infinity.
        let rhs = (self.x.square() * self.x) + curve_b() * self.z.square() * self.z;
        (self.y.square() * self.z).ct_eq(&rhs) | self.z.is_zero()
    }

    pub fn neg(&self) -> G1Projective {
        G1Projective {
            x: self.x,
            y: -self.y,
            z: self.z,
        }
    }

    /// Complete addition, Algorithm 7 of Renes-Costello-Batina 2015
    /// (specialized to `a = 0`).
    pub fn add(&self, rhs: &G1Projective) -> G1Projective {
        let b3 = curve_b3();

        let t0 = self.x * rhs.x;
        let t1 = self.y * rhs.y;
        let t2 = self.z * rhs.z;
        let t3 = self.x + self.y;
        let t4 = rhs.x + rhs.y;
        let t3 = t3 * t4;
        let t4 = t0 + t1;
        let t3 = t3 - t4;
        let t4 = self.y + self.z;
        let x3 = rhs.y + rhs.z;
        let t4 = t4 * x3;
        let x3 = t1 + t2;
        let t4 = t4 - x3;
        let x3 = self.x + self.z;
        let y3 = rhs.x + rhs.z;
        let x3 = x3 * y3;
        let y3 = t0 + t2;
        let y3 = x3 - y3;
        let x3 = t0 + t0;
        let t0 = x3 + t0;
        let t2 = b3 * t2;
        let z3 = t1 + t2;
        let t1 = t1 - t2;
        let y3 = b3 * y3;
        let x3 = t4 * y3;
        let t2 = t3 * t1;
        let x3 = t2 - x3;
        let y3 = y3 * t0;
        let t1 = t1 * z3;
        let y3 = t1 + y3;
        let t0 = t0 * t3;
        let z3 = z3 * t4;
        let z3 = z3 + t0;

        G1Projective {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    /// Complete mixed addition, Algorithm 8 of Renes-Costello-Batina 2015.
    pub fn add_mixed(&self, rhs: &G1Affine) -> G1Projective {
        let b3 = curve_b3();

        let t0 = self.x * rhs.x;
        let t1 = self.y * rhs.y;
        let t3 = rhs.x + rhs.y;
        let t4 = self.x + self.y;
        let t3 = t3 * t4;
        let t4 = t0 + t1;
        let t3 = t3 - t4;
        let t4 = rhs.y * self.z;
        let t4 = t4 + self.y;
        let y3 = rhs.x * self.z;
        let y3 = y3 + self.x;
        let x3 = t0 + t0;
        let t0 = x3 + t0;
        let t2 = b3 * self.z;
        let z3 = t1 + t2;
        let t1 = t1 - t2;
        let y3 = b3 * y3;
        let x3 = t4 * y3;
        let t2 = t3 * t1;
        let x3 = t2 - x3;
        let y3 = y3 * t0;
        let t1 = t1 * z3;
        let y3 = t1 + y3;
        let t0 = t0 * t3;
        let z3 = z3 * t4;
        let z3 = z3 + t0;

        let result = G1Projective {
            x: x3,
            y: y3,
            z: z3,
        };
        G1Projective::conditional_select(&result, self, rhs.is_identity())
    }

    pub fn sub(&self, rhs: &G1Projective) -> G1Projective {
        self.add(&rhs.neg())
    }

    pub fn sub_mixed(&self, rhs: &G1Affine) -> G1Projective {
        self.add_mixed(&rhs.neg())
    }

    /// Exception-free doubling, Algorithm 9 of Renes-Costello-Batina 2015.
    pub fn double(&self) -> G1Projective {
        let b3 = curve_b3();

        let t0 = self.y.square();
        let z3 = t0 + t0;
        let z3 = z3 + z3;
        let z3 = z3 + z3;
        let t1 = self.y * self.z;
        let t2 = self.z.square();
        let t2 = b3 * t2;
        let x3 = t2 * z3;
        let y3 = t0 + t2;
        let z3 = t1 * z3;
        let t1 = t2 + t2;
        let t2 = t1 + t2;
        let t0 = t0 - t2;
        let y3 = t0 * y3;
        let y3 = x3 + y3;
        let t1 = self.x * self.y;
        let x3 = t0 * t1;
        let x3 = x3 + x3;

        G1Projective {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    pub fn to_affine(&self) -> G1Affine {
        self.z
            .invert()
            .map(|zinv| G1Affine {
                x: self.x * zinv,
                y: self.y * zinv,
                infinity: Choice::from(0u8),
            })
            .unwrap_or_else(G1Affine::identity)
    }

    /// Left-to-right double-and-add by the canonical 32-byte little-endian
    /// encoding of `scalar`, constant time in the scalar.
    pub fn mul(&self, scalar: &Scalar) -> G1Projective {
        let bytes = scalar.to_bytes();
        let mut acc = G1Projective::identity();
        for byte in bytes.iter().rev() {
            for i in (0..8).rev() {
                acc = acc.double();
                let bit = Choice::from((byte >> i) & 1);
                acc = G1Projective::conditional_select(&acc, &acc.add(self), bit);
            }
        }
        acc
    }

    /// Double-and-add by `|BLS_X|`, negating the result at the end iff the
    /// curve parameter `x` is negative (it is, for BLS12-381).
    pub fn mul_by_x(&self) -> G1Projective {
        let mut acc = G1Projective::identity();
        for i in (0..64).rev() {
            acc = acc.double();
            if ((BLS_X >> i) & 1) == 1 {
                acc = acc.add(self);
            }
        }
        if BLS_X_IS_NEGATIVE {
            acc.neg()
        } else {
            acc
        }
    }

    /// The GLV-style endomorphism `(x, y, z) -> (beta*x, y, z)`.
    pub fn endomorphism(&self) -> G1Projective {
        G1Projective {
            x: self.x * endomorphism_beta(),
            y: self.y,
            z: self.z,
        }
    }

    /// `true` iff `self` lies in the prime-order subgroup: checks
    /// `endomorphism(P) == -x^2 P`, per Scott et al.'s fast subgroup check.
    pub fn is_torsion_free(&self) -> Choice {
        let minus_x_squared_p = self.mul_by_x().mul_by_x().neg();
        self.endomorphism().ct_eq(&minus_x_squared_p)
    }

    /// Clears the cofactor via `P - x*P`, per spec.md's `h1 = 1 - x`.
    pub fn clear_cofactor(&self) -> G1Projective {
        self.sub(&self.mul_by_x())
    }

    /// Normalizes a batch of projective points to affine using a single
    /// field inversion (Montgomery's trick): a prefix-product pass, one
    /// inversion, then a reverse pass recovering each `1/Z_i`.
    #[cfg(feature = "alloc")]
    pub fn batch_normalize(points: &[G1Projective]) -> alloc::vec::Vec<G1Affine> {
        use alloc::vec;
        use alloc::vec::Vec;

        let mut prefix: Vec<Fp> = Vec::with_capacity(points.len());
        let mut acc = Fp::one();
        for p in points {
            prefix.push(acc);
            // Treat infinities as Z=1 so the running product stays invertible;
            // they are skipped on the way back out.
            let z = Fp::conditional_select(&p.z, &Fp::one(), p.is_identity());
            acc *= z;
        }

        let mut acc_inv = acc.invert().unwrap_or_else(Fp::zero);

        let mut out = vec![G1Affine::identity(); points.len()];
        for i in (0..points.len()).rev() {
            let p = &points[i];
            let z = Fp::conditional_select(&p.z, &Fp::one(), p.is_identity());
            let zinv = acc_inv * prefix[i];
            acc_inv *= z;

            let affine = G1Affine {
                x: p.x * zinv,
                y: p.y * zinv,
                infinity: Choice::from(0u8),
            };
            out[i] = G1Affine::conditional_select(&affine, &G1Affine::identity(), p.is_identity());
        }
        out
    }
}

impl Neg for G1Projective {
    type Output = G1Projective;
    fn neg(self) -> G1Projective {
        G1Projective::neg(&self)
    }
}
impl Neg for &G1Projective {
    type Output = G1Projective;
    fn neg(self) -> G1Projective {
        G1Projective::neg(self)
    }
}

macro_rules! impl_binop {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $func:ident) => {
        impl $trait<&G1Projective> for &G1Projective {
            type Output = G1Projective;
            fn $method(self, rhs: &G1Projective) -> G1Projective {
                G1Projective::$func(self, rhs)
            }
        }
        impl $trait<G1Projective> for G1Projective {
            type Output = G1Projective;
            fn $method(self, rhs: G1Projective) -> G1Projective {
                G1Projective::$func(&self, &rhs)
            }
        }
        impl $trait<&G1Projective> for G1Projective {
            type Output = G1Projective;
            fn $method(self, rhs: &G1Projective) -> G1Projective {
                G1Projective::$func(&self, rhs)
            }
        }
        impl $trait<G1Projective> for &G1Projective {
            type Output = G1Projective;
            fn $method(self, rhs: G1Projective) -> G1Projective {
                G1Projective::$func(self, &rhs)
            }
        }
        impl $assign_trait<G1Projective> for G1Projective {
            fn $assign_method(&mut self, rhs: G1Projective) {
                *self = G1Projective::$func(self, &rhs);
            }
        }
        impl $assign_trait<&G1Projective> for G1Projective {
            fn $assign_method(&mut self, rhs: &G1Projective) {
                *self = G1Projective::$func(self, rhs);
            }
        }
    };
}

impl_binop!(Add, add, AddAssign, add_assign, add);
impl_binop!(Sub, sub, SubAssign, sub_assign, sub);

impl Mul<&Scalar> for &G1Projective {
    type Output = G1Projective;
    fn mul(self, rhs: &Scalar) -> G1Projective {
        G1Projective::mul(self, rhs)
    }
}
impl Mul<Scalar> for G1Projective {
    type Output = G1Projective;
    fn mul(self, rhs: Scalar) -> G1Projective {
        G1Projective::mul(&self, &rhs)
    }
}
impl MulAssign<Scalar> for G1Projective {
    fn mul_assign(&mut self, rhs: Scalar) {
        *self = G1Projective::mul(self, &rhs);
    }
}

impl Add<&G1Affine> for &G1Projective {
    type Output = G1Projective;
    fn add(self, rhs: &G1Affine) -> G1Projective {
        G1Projective::add_mixed(self, rhs)
    }
}
impl Add<G1Affine> for G1Projective {
    type Output = G1Projective;
    fn add(self, rhs: G1Affine) -> G1Projective {
        G1Projective::add_mixed(&self, &rhs)
    }
}
impl Sub<&G1Affine> for &G1Projective {
    type Output = G1Projective;
    fn sub(self, rhs: &G1Affine) -> G1Projective {
        G1Projective::sub_mixed(self, rhs)
    }
}
impl Sub<G1Affine> for G1Projective {
    type Output = G1Projective;
    fn sub(self, rhs: G1Affine) -> G1Projective {
        G1Projective::sub_mixed(&self, &rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_is_on_curve() {
        assert!(bool::from(G1Affine::generator().is_on_curve()));
        assert!(bool::from(G1Projective::generator().is_on_curve()));
    }

    #[test]
    fn identity_round_trips_affine() {
        let p = G1Projective::identity();
        assert!(bool::from(p.to_affine().is_identity()));
    }

    #[test]
    fn double_matches_add_to_self() {
        let g = G1Projective::generator();
        assert_eq!(g.double(), g.add(&g));
    }

    #[test]
    fn add_mixed_matches_add() {
        let g = G1Projective::generator();
        let h = g.double();
        let h_affine = h.to_affine();
        assert_eq!(g.add(&h), g.add_mixed(&h_affine));
    }

    #[test]
    fn neg_then_add_is_identity() {
        let g = G1Projective::generator();
        assert!(bool::from(g.add(&g.neg()).is_identity()));
    }

    #[test]
    fn scalar_mul_by_one_is_identity_map() {
        let g = G1Projective::generator();
        assert_eq!(g.mul(Scalar::one()), g);
    }

    #[test]
    fn scalar_mul_distributes_over_addition() {
        let g = G1Projective::generator();
        let a = Scalar::from_raw([7, 0, 0, 0]);
        let b = Scalar::from_raw([11, 0, 0, 0]);
        assert_eq!(g.mul(a + b), g.mul(a).add(&g.mul(b)));
    }

    #[test]
    fn generator_is_torsion_free() {
        assert!(bool::from(G1Projective::generator().is_torsion_free()));
    }

    #[test]
    fn endomorphism_preserves_curve_membership() {
        let g = G1Projective::generator().double();
        assert!(bool::from(g.endomorphism().is_on_curve()));
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn batch_normalize_matches_individual_to_affine() {
        let g = G1Projective::generator();
        let points = [g, g.double(), g.double().double(), G1Projective::identity()];
        let affines = G1Projective::batch_normalize(&points);
        for (p, a) in points.iter().zip(affines.iter()) {
            assert_eq!(*a, p.to_affine());
        }
    }
}
