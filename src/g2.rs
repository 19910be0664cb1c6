//! `G2`, the prime-order subgroup of `E': y^2 = x^3 + 4(u+1)` over `Fp2`
//! that is `Fp2`-rational but not `Fp`-rational (the "twist" used for the
//! sextic twist pairing construction).

use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use crate::fp::Fp;
use crate::fp2::Fp2;
use crate::scalar::Scalar;

const BLS_X: u64 = 0xd201_0000_0001_0000;
const BLS_X_IS_NEGATIVE: bool = true;

fn curve_b() -> Fp2 {
    Fp2 {
        c0: Fp::from_raw([4, 0, 0, 0, 0, 0]),
        c1: Fp::from_raw([4, 0, 0, 0, 0, 0]),
    }
}

fn curve_b3() -> Fp2 {
    let b = curve_b();
    b + b.double()
}

/// `(p - 1) / 3`, shared with [`crate::fp6`]'s Frobenius twist exponent.
const EXP_P_MINUS_1_OVER_3: [u64; 6] = {
    let m = crate::fp::MODULUS.0;
    let mut lo = [m[0].wrapping_sub(1), m[1], m[2], m[3], m[4], m[5]];
    if m[0] == 0 {
        let mut i = 1;
        while i < 6 {
            if lo[i] == 0 {
                lo[i] = u64::MAX;
                i += 1;
            } else {
                lo[i] -= 1;
                break;
            }
        }
    }
    let mut rem: u128 = 0;
    let mut out = [0u64; 6];
    let mut i = 6;
    while i > 0 {
        i -= 1;
        let cur = (rem << 64) | (lo[i] as u128);
        out[i] = (cur / 3) as u64;
        rem = cur % 3;
    }
    out
};

/// Untwist-Frobenius-twist coefficients for the `psi` endomorphism:
/// `(u+1)^((p-1)/3)` twists the X coordinate, `(u+1)^((p-1)/2)` the Y.
fn psi_coeff_x() -> Fp2 {
    Fp2 {
        c0: Fp::one(),
        c1: Fp::one(),
    }
    .pow_vartime(&EXP_P_MINUS_1_OVER_3)
}

fn psi_coeff_y() -> Fp2 {
    let p_minus_1_over_2 = {
        let m = crate::fp::MODULUS.0;
        let (d0, borrow) = crate::util::sbb(m[0], 1, 0);
        let (d1, borrow) = crate::util::sbb(m[1], 0, borrow);
        let (d2, borrow) = crate::util::sbb(m[2], 0, borrow);
        let (d3, borrow) = crate::util::sbb(m[3], 0, borrow);
        let (d4, borrow) = crate::util::sbb(m[4], 0, borrow);
        let (d5, _) = crate::util::sbb(m[5], 0, borrow);
        [
            (d0 >> 1) | (d1 << 63),
            (d1 >> 1) | (d2 << 63),
            (d2 >> 1) | (d3 << 63),
            (d3 >> 1) | (d4 << 63),
            (d4 >> 1) | (d5 << 63),
            d5 >> 1,
        ]
    };
    Fp2 {
        c0: Fp::one(),
        c1: Fp::one(),
    }
    .pow_vartime(&p_minus_1_over_2)
}

fn generator_x() -> Fp2 {
    Fp2 {
        c0: Fp::from_dec_str(
            "352701069587466618187139116011060144890029952792775240219908644239793785735715026873347600343865175952761926303160",
        ),
        c1: Fp::from_dec_str(
            "3059144344244213709971259814753781636986470325476647558659373206291635324768958432433509563104347017837885763365758",
        ),
    }
}

fn generator_y() -> Fp2 {
    Fp2 {
        c0: Fp::from_dec_str(
            "1985150602287291935568054521177171638300868978215655730859378665066344726373823718423869104263333984641494340347905",
        ),
        c1: Fp::from_dec_str(
            "927553665492332455747201965776037880757740193453592970025027978793976877002259051258860946254104220774094836292650",
        ),
    }
}

/// A point on `E'` in affine coordinates.
#[derive(Copy, Clone, Debug)]
pub struct G2Affine {
    pub(crate) x: Fp2,
    pub(crate) y: Fp2,
    infinity: Choice,
}

impl Default for G2Affine {
    fn default() -> G2Affine {
        G2Affine::identity()
    }
}

impl ConstantTimeEq for G2Affine {
    fn ct_eq(&self, other: &Self) -> Choice {
        (self.infinity & other.infinity)
            | (!self.infinity & !other.infinity & self.x.ct_eq(&other.x) & self.y.ct_eq(&other.y))
    }
}

impl ConditionallySelectable for G2Affine {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        G2Affine {
            x: Fp2::conditional_select(&a.x, &b.x, choice),
            y: Fp2::conditional_select(&a.y, &b.y, choice),
            infinity: Choice::conditional_select(&a.infinity, &b.infinity, choice),
        }
    }
}

impl PartialEq for G2Affine {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.ct_eq(other))
    }
}
impl Eq for G2Affine {}

impl G2Affine {
    pub fn identity() -> G2Affine {
        G2Affine {
            x: Fp2::zero(),
            y: Fp2::zero(),
            infinity: Choice::from(1u8),
        }
    }

    pub fn generator() -> G2Affine {
        G2Affine {
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
        self.y.square().ct_eq(&rhs) | self.infinity
    }

    pub fn neg(&self) -> G2Affine {
        G2Affine {
            x: self.x,
            y: -self.y,
            infinity: self.infinity,
        }
    }

    pub fn to_projective(&self) -> G2Projective {
        G2Projective {
            x: self.x,
            y: Fp2::conditional_select(&self.y, &Fp2::one(), self.infinity),
            z: Fp2::conditional_select(&Fp2::one(), &Fp2::zero(), self.infinity),
        }
    }
}

impl Neg for G2Affine {
    type Output = G2Affine;
    fn neg(self) -> G2Affine {
        G2Affine::neg(&self)
    }
}

/// A point on `E'` in projective (homogeneous) coordinates.
#[derive(Copy, Clone, Debug)]
pub struct G2Projective {
    pub(crate) x: Fp2,
    pub(crate) y: Fp2,
    pub(crate) z: Fp2,
}

impl Default for G2Projective {
    fn default() -> G2Projective {
        G2Projective::identity()
    }
}

impl ConstantTimeEq for G2Projective {
    fn ct_eq(&self, other: &Self) -> Choice {
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

impl ConditionallySelectable for G2Projective {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        G2Projective {
            x: Fp2::conditional_select(&a.x, &b.x, choice),
            y: Fp2::conditional_select(&a.y, &b.y, choice),
            z: Fp2::conditional_select(&a.z, &b.z, choice),
        }
    }
}

impl PartialEq for G2Projective {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.ct_eq(other))
    }
}
impl Eq for G2Projective {}

impl G2Projective {
    pub fn identity() -> G2Projective {
        G2Projective {
            x: Fp2::zero(),
            y: Fp2::one(),
            z: Fp2::zero(),
        }
    }

    pub fn generator() -> G2Projective {
        G2Affine::generator().to_projective()
    }

    pub fn is_identity(&self) -> Choice {
        self.z.is_zero()
    }

    pub fn is_on_curve(&self) -> Choice {
        let rhs = (self.x.square() * self.x) + curve_b() * self.z.square() * self.z;
        (self.y.square() * self.z).ct_eq(&rhs) | self.z.is_zero()
    }

    pub fn neg(&self) -> G2Projective {
        G2Projective {
            x: self.x,
            y: -self.y,
            z: self.z,
        }
    }

    /// Complete addition, Algorithm 7 of Renes-Costello-Batina 2015.
    pub fn add(&self, rhs: &G2Projective) -> G2Projective {
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

        G2Projective {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    /// Complete mixed addition, Algorithm 8 of Renes-Costello-Batina 2015.
    pub fn add_mixed(&self, rhs: &G2Affine) -> G2Projective {
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

        let result = G2Projective {
            x: x3,
            y: y3,
            z: z3,
        };
        G2Projective::conditional_select(&result, self, rhs.is_identity())
    }

    pub fn sub(&self, rhs: &G2Projective) -> G2Projective {
        self.add(&rhs.neg())
    }

    pub fn sub_mixed(&self, rhs: &G2Affine) -> G2Projective {
        self.add_mixed(&rhs.neg())
    }

    /// Exception-free doubling, Algorithm 9 of Renes-Costello-Batina 2015.
    pub fn double(&self) -> G2Projective {
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

        G2Projective {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    pub fn to_affine(&self) -> G2Affine {
        self.z
            .invert()
            .map(|zinv| G2Affine {
                x: self.x * zinv,
                y: self.y * zinv,
                infinity: Choice::from(0u8),
            })
            .unwrap_or_else(G2Affine::identity)
    }

    pub fn mul(&self, scalar: &Scalar) -> G2Projective {
        let bytes = scalar.to_bytes();
        let mut acc = G2Projective::identity();
        for byte in bytes.iter().rev() {
            for i in (0..8).rev() {
                acc = acc.double();
                let bit = Choice::from((byte >> i) & 1);
                acc = G2Projective::conditional_select(&acc, &acc.add(self), bit);
            }
        }
        acc
    }

    pub fn mul_by_x(&self) -> G2Projective {
        let mut acc = G2Projective::identity();
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

    /// The untwist-Frobenius-twist endomorphism: applies `Fp2` Frobenius to
    /// each coordinate, then rescales `X` and `Y` by the sextic twist
    /// coefficients.
    pub fn psi(&self) -> G2Projective {
        G2Projective {
            x: self.x.frobenius_map() * psi_coeff_x(),
            y: self.y.frobenius_map() * psi_coeff_y(),
            z: self.z.frobenius_map(),
        }
    }

    /// `psi` applied twice.
    pub fn psi2(&self) -> G2Projective {
        self.psi().psi()
    }

    /// `true` iff `self` lies in the prime-order subgroup: checks
    /// `psi(P) == x*P`.
    pub fn is_torsion_free(&self) -> Choice {
        self.psi().ct_eq(&self.mul_by_x())
    }

    /// Clears the cofactor via the Fuentes-Castañeda–Knapp–Rodríguez-
    /// Henríquez (2011) optimized composition:
    /// `(x^2 - x - 1) P + (x - 1) psi(P) + psi(psi(2P))`.
    pub fn clear_cofactor(&self) -> G2Projective {
        let x_p = self.mul_by_x();
        let x2_p = x_p.mul_by_x();
        let t1 = x2_p.sub(&x_p).sub(self);

        let psi_p = self.psi();
        let t2 = psi_p.mul_by_x().sub(&psi_p);

        let t3 = self.double().psi().psi();

        t1.add(&t2).add(&t3)
    }
}

impl Neg for G2Projective {
    type Output = G2Projective;
    fn neg(self) -> G2Projective {
        G2Projective::neg(&self)
    }
}
impl Neg for &G2Projective {
    type Output = G2Projective;
    fn neg(self) -> G2Projective {
        G2Projective::neg(self)
    }
}

macro_rules! impl_binop {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $func:ident) => {
        impl $trait<&G2Projective> for &G2Projective {
            type Output = G2Projective;
            fn $method(self, rhs: &G2Projective) -> G2Projective {
                G2Projective::$func(self, rhs)
            }
        }
        impl $trait<G2Projective> for G2Projective {
            type Output = G2Projective;
            fn $method(self, rhs: G2Projective) -> G2Projective {
                G2Projective::$func(&self, &rhs)
            }
        }
        impl $trait<&G2Projective> for G2Projective {
            type Output = G2Projective;
            fn $method(self, rhs: &G2Projective) -> G2Projective {
                G2Projective::$func(&self, rhs)
            }
        }
        impl $trait<G2Projective> for &G2Projective {
            type Output = G2Projective;
            fn $method(self, rhs: G2Projective) -> G2Projective {
                G2Projective::$func(self, &rhs)
            }
        }
        impl $assign_trait<G2Projective> for G2Projective {
            fn $assign_method(&mut self, rhs: G2Projective) {
                *self = G2Projective::$func(self, &rhs);
            }
        }
        impl $assign_trait<&G2Projective> for G2Projective {
            fn $assign_method(&mut self, rhs: &G2Projective) {
                *self = G2Projective::$func(self, rhs);
            }
        }
    };
}

impl_binop!(Add, add, AddAssign, add_assign, add);
impl_binop!(Sub, sub, SubAssign, sub_assign, sub);

impl Mul<&Scalar> for &G2Projective {
    type Output = G2Projective;
    fn mul(self, rhs: &Scalar) -> G2Projective {
        G2Projective::mul(self, rhs)
    }
}
impl Mul<Scalar> for G2Projective {
    type Output = G2Projective;
    fn mul(self, rhs: Scalar) -> G2Projective {
        G2Projective::mul(&self, &rhs)
    }
}
impl MulAssign<Scalar> for G2Projective {
    fn mul_assign(&mut self, rhs: Scalar) {
        *self = G2Projective::mul(self, &rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_is_on_curve() {
        assert!(bool::from(G2Affine::generator().is_on_curve()));
        assert!(bool::from(G2Projective::generator().is_on_curve()));
    }

    #[test]
    fn double_matches_add_to_self() {
        let g = G2Projective::generator();
        assert_eq!(g.double(), g.add(&g));
    }

    #[test]
    fn add_mixed_matches_add() {
        let g = G2Projective::generator();
        let h = g.double();
        let h_affine = h.to_affine();
        assert_eq!(g.add(&h), g.add_mixed(&h_affine));
    }

    #[test]
    fn neg_then_add_is_identity() {
        let g = G2Projective::generator();
        assert!(bool::from(g.add(&g.neg()).is_identity()));
    }

    #[test]
    fn scalar_mul_distributes_over_addition() {
        let g = G2Projective::generator();
        let a = Scalar::from_raw([5, 0, 0, 0]);
        let b = Scalar::from_raw([9, 0, 0, 0]);
        assert_eq!(g.mul(a + b), g.mul(a).add(&g.mul(b)));
    }

    #[test]
    fn generator_is_torsion_free() {
        assert!(bool::from(G2Projective::generator().is_torsion_free()));
    }

    #[test]
    fn psi_preserves_curve_membership() {
        let g = G2Projective::generator().double();
        assert!(bool::from(g.psi().is_on_curve()));
        assert!(bool::from(g.psi2().is_on_curve()));
    }
}
