//! The extension `Fp12 = Fp6[w]/(w^2 - v)`, the target field of the pairing
//! (before it is restricted to the order-`r` subgroup `Gt`).
//!
//! An element `c0 + c1*w` is stored as the pair `(c0, c1)` of `Fp6`
//! elements.

use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

use crate::fp2::Fp2;
use crate::fp6::Fp6;

/// `(p - 1) / 6`, the exponent of the `c1` Frobenius twist constant.
const EXP_P_MINUS_1_OVER_6: [u64; 6] = {
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
        out[i] = (cur / 6) as u64;
        rem = cur % 6;
    }
    out
};

fn frobenius_c1_twist() -> Fp2 {
    Fp2 {
        c0: crate::fp::Fp::one(),
        c1: crate::fp::Fp::one(),
    }
    .pow_vartime(&EXP_P_MINUS_1_OVER_6)
}

/// An element `c0 + c1*w` of `Fp12 = Fp6[w]/(w^2 - v)`.
#[derive(Copy, Clone, Debug, Default)]
pub struct Fp12 {
    pub c0: Fp6,
    pub c1: Fp6,
}

impl ConstantTimeEq for Fp12 {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.c0.ct_eq(&other.c0) & self.c1.ct_eq(&other.c1)
    }
}

impl ConditionallySelectable for Fp12 {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Fp12 {
            c0: Fp6::conditional_select(&a.c0, &b.c0, choice),
            c1: Fp6::conditional_select(&a.c1, &b.c1, choice),
        }
    }
}

impl PartialEq for Fp12 {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.ct_eq(other))
    }
}
impl Eq for Fp12 {}

fn fp4_square(a: Fp2, b: Fp2) -> (Fp2, Fp2) {
    let t0 = a.square();
    let t1 = b.square();
    let t2 = t1.mul_by_nonresidue();
    let c0 = t2 + t0;
    let t2 = (a + b).square() - t0;
    let c1 = t2 - t1;
    (c0, c1)
}

impl Fp12 {
    pub fn zero() -> Fp12 {
        Fp12 {
            c0: Fp6::zero(),
            c1: Fp6::zero(),
        }
    }

    pub fn one() -> Fp12 {
        Fp12 {
            c0: Fp6::one(),
            c1: Fp6::zero(),
        }
    }

    pub fn is_zero(&self) -> Choice {
        self.c0.is_zero() & self.c1.is_zero()
    }

    pub fn add(&self, rhs: &Fp12) -> Fp12 {
        Fp12 {
            c0: self.c0 + rhs.c0,
            c1: self.c1 + rhs.c1,
        }
    }

    pub fn sub(&self, rhs: &Fp12) -> Fp12 {
        Fp12 {
            c0: self.c0 - rhs.c0,
            c1: self.c1 - rhs.c1,
        }
    }

    pub fn neg(&self) -> Fp12 {
        Fp12 {
            c0: -self.c0,
            c1: -self.c1,
        }
    }

    /// `(c0 + c1*w) * (d0 + d1*w) = c0*d0 + v*c1*d1 + ((c0+c1)(d0+d1) - c0*d0 - c1*d1) w`.
    pub fn mul(&self, rhs: &Fp12) -> Fp12 {
        let aa = self.c0 * rhs.c0;
        let bb = self.c1 * rhs.c1;
        let o = rhs.c0 + rhs.c1;
        let c1 = (self.c1 + self.c0) * o - aa - bb;
        let c0 = bb.mul_by_nonresidue() + aa;
        Fp12 { c0, c1 }
    }

    pub fn square(&self) -> Fp12 {
        let ab = self.c0 * self.c1;
        let c0c1 = self.c0 + self.c1;
        let c0 = (self.c1.mul_by_nonresidue() + self.c0) * c0c1 - ab;
        let c1 = ab + ab;
        let c0 = c0 - ab.mul_by_nonresidue();
        Fp12 { c0, c1 }
    }

    /// Multiplies `self` by a sparse element `(c0 + c1*v) + c4*v*w` produced
    /// by a Miller loop line evaluation.
    pub fn mul_by_014(&self, c0: &Fp2, c1: &Fp2, c4: &Fp2) -> Fp12 {
        let aa = self.c0.mul_by_01(c0, c1);
        let bb = self.c1.mul_by_1(c4);
        let o = c1 + c4;
        let c1_out = (self.c1 + self.c0).mul_by_01(c0, &o) - aa - bb;
        let c0_out = bb.mul_by_nonresidue() + aa;
        Fp12 {
            c0: c0_out,
            c1: c1_out,
        }
    }

    /// Conjugation over the `Fp6` subfield: `(c0, c1) -> (c0, -c1)`. This is
    /// inversion on the norm-one (cyclotomic) subgroup.
    pub fn conjugate(&self) -> Fp12 {
        Fp12 {
            c0: self.c0,
            c1: -self.c1,
        }
    }

    /// Frobenius endomorphism `x -> x^p`.
    pub fn frobenius_map(&self) -> Fp12 {
        let c0 = self.c0.frobenius_map();
        let c1 = self.c1.frobenius_map();
        // c1 * (w)^(p-1) = c1 * (u+1)^((p-1)/6)
        let c1 = Fp6 {
            c0: c1.c0 * frobenius_c1_twist(),
            c1: c1.c1 * frobenius_c1_twist(),
            c2: c1.c2 * frobenius_c1_twist(),
        };
        Fp12 { c0, c1 }
    }

    /// `1/(c0+c1w) = (c0 - c1w) / (c0^2 - v*c1^2)`.
    pub fn invert(&self) -> CtOption<Fp12> {
        (self.c0.square() - self.c1.square().mul_by_nonresidue())
            .invert()
            .map(|t| Fp12 {
                c0: self.c0 * t,
                c1: self.c1 * -t,
            })
    }

    /// Squaring specialized to the norm-one (cyclotomic) subgroup, per
    /// Granger-Scott, "Faster Squaring in the Cyclotomic Subgroup of Sixth
    /// Degree Extension Fields" (Algorithm 5.5.4's inner step).
    pub fn cyclotomic_square(&self) -> Fp12 {
        let mut z0 = self.c0.c0;
        let mut z4 = self.c0.c1;
        let mut z3 = self.c0.c2;
        let mut z2 = self.c1.c0;
        let mut z1 = self.c1.c1;
        let mut z5 = self.c1.c2;

        let (t0, t1) = fp4_square(z0, z1);
        z0 = t0 - z0;
        z0 = z0 + z0 + t0;
        z1 = t1 + z1;
        z1 = z1 + z1 + t1;

        let (mut t0, t1) = fp4_square(z2, z3);
        let (t2, t3) = fp4_square(z4, z5);

        z4 = t0 - z4;
        z4 = z4 + z4 + t0;
        z5 = t1 + z5;
        z5 = z5 + z5 + t1;

        t0 = t3.mul_by_nonresidue();
        z2 = t0 + z2;
        z2 = z2 + z2 + t0;
        z3 = t2 - z3;
        z3 = z3 + z3 + t2;

        Fp12 {
            c0: Fp6 {
                c0: z0,
                c1: z4,
                c2: z3,
            },
            c1: Fp6 {
                c0: z2,
                c1: z1,
                c2: z5,
            },
        }
    }

    /// Exponentiation by a public, little-endian bit sequence using
    /// repeated [`Fp12::cyclotomic_square`]; valid only on the norm-one
    /// subgroup (in particular, the output of a Miller loop or of
    /// [`Fp12::conjugate`] composed with inversion).
    pub fn cyclotomic_exp(&self, by: &[u64]) -> Fp12 {
        let mut res = Fp12::one();
        let mut found_one = false;
        for e in by.iter().rev() {
            for i in (0..64).rev() {
                if found_one {
                    res = res.cyclotomic_square();
                } else {
                    found_one = ((*e >> i) & 1) == 1;
                }
                if ((*e >> i) & 1) == 1 {
                    res *= self;
                }
            }
        }
        res
    }

    pub fn pow_vartime(&self, by: &[u64]) -> Fp12 {
        let mut res = Fp12::one();
        for e in by.iter().rev() {
            for i in (0..64).rev() {
                res = res.square();
                if ((*e >> i) & 1) == 1 {
                    res *= self;
                }
            }
        }
        res
    }
}

impl Neg for Fp12 {
    type Output = Fp12;
    fn neg(self) -> Fp12 {
        Fp12::neg(&self)
    }
}
impl Neg for &Fp12 {
    type Output = Fp12;
    fn neg(self) -> Fp12 {
        Fp12::neg(self)
    }
}

macro_rules! impl_binop {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $func:ident) => {
        impl $trait<&Fp12> for &Fp12 {
            type Output = Fp12;
            fn $method(self, rhs: &Fp12) -> Fp12 {
                Fp12::$func(self, rhs)
            }
        }
        impl $trait<Fp12> for Fp12 {
            type Output = Fp12;
            fn $method(self, rhs: Fp12) -> Fp12 {
                Fp12::$func(&self, &rhs)
            }
        }
        impl $trait<&Fp12> for Fp12 {
            type Output = Fp12;
            fn $method(self, rhs: &Fp12) -> Fp12 {
                Fp12::$func(&self, rhs)
            }
        }
        impl $trait<Fp12> for &Fp12 {
            type Output = Fp12;
            fn $method(self, rhs: Fp12) -> Fp12 {
                Fp12::$func(self, &rhs)
            }
        }
        impl $assign_trait<Fp12> for Fp12 {
            fn $assign_method(&mut self, rhs: Fp12) {
                *self = Fp12::$func(self, &rhs);
            }
        }
        impl $assign_trait<&Fp12> for Fp12 {
            fn $assign_method(&mut self, rhs: &Fp12) {
                *self = Fp12::$func(self, rhs);
            }
        }
    };
}

impl_binop!(Add, add, AddAssign, add_assign, add);
impl_binop!(Sub, sub, SubAssign, sub_assign, sub);
impl_binop!(Mul, mul, MulAssign, mul_assign, mul);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fp::Fp;

    fn small(n: u64) -> Fp {
        let mut acc = Fp::zero();
        for _ in 0..n {
            acc += Fp::one();
        }
        acc
    }

    fn fp12(a: u64, b: u64) -> Fp12 {
        let mk = |n: u64| Fp6 {
            c0: Fp2 {
                c0: small(n),
                c1: Fp::zero(),
            },
            c1: Fp2::zero(),
            c2: Fp2::zero(),
        };
        Fp12 {
            c0: mk(a),
            c1: mk(b),
        }
    }

    #[test]
    fn square_matches_mul() {
        let a = fp12(2, 3);
        assert_eq!(a.square(), a * a);
    }

    #[test]
    fn invert_round_trip() {
        let a = fp12(2, 3);
        let inv = a.invert().unwrap();
        assert_eq!(a * inv, Fp12::one());
    }

    #[test]
    fn conjugate_then_mul_is_norm() {
        let a = fp12(2, 3);
        let n = a * a.conjugate();
        assert_eq!(n.c1, Fp6::zero());
    }

    #[test]
    fn frobenius_applied_twelve_times_is_identity() {
        let a = fp12(2, 3);
        let mut acc = a;
        for _ in 0..12 {
            acc = acc.frobenius_map();
        }
        assert_eq!(acc, a);
    }

    #[test]
    fn cyclotomic_square_matches_square_on_norm_one_element() {
        let a = fp12(2, 3);
        // x = a / conjugate(a) has norm 1, i.e. lies in the cyclotomic subgroup.
        let x = a * a.conjugate().invert().unwrap();
        assert_eq!(x.cyclotomic_square(), x.square());
    }
}
