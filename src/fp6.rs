//! The cubic extension `Fp6 = Fp2[v]/(v^3 - (u+1))`.
//!
//! An element `c0 + c1*v + c2*v^2` is stored as the triple `(c0, c1, c2)`.
//! Multiplication and squaring use a three-term Karatsuba scheme over `Fp2`
//! so that only five `Fp2` products are needed instead of nine.

use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

use crate::fp2::Fp2;

/// `(p - 1) / 3`, the exponent of the `c1` Frobenius twist constant.
const EXP_P_MINUS_1_OVER_3: [u64; 6] = {
    let m = crate::fp::MODULUS.0;
    let mut rem: u128 = 0;
    let mut out = [0u64; 6];
    // m - 1
    let mut lo = [m[0].wrapping_sub(1), m[1], m[2], m[3], m[4], m[5]];
    if m[0] == 0 {
        // borrow propagation for the (vanishingly unlikely) zero low limb
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
    let mut i = 6;
    while i > 0 {
        i -= 1;
        let cur = (rem << 64) | (lo[i] as u128);
        out[i] = (cur / 3) as u64;
        rem = cur % 3;
    }
    out
};

/// `(2p - 2) / 3 = 2 * (p - 1) / 3`, the exponent of the `c2` twist constant.
const EXP_TWO_P_MINUS_2_OVER_3: [u64; 6] = {
    let e = EXP_P_MINUS_1_OVER_3;
    let mut out = [0u64; 6];
    let mut carry = 0u64;
    let mut i = 0;
    while i < 6 {
        let sum = (e[i] as u128) + (e[i] as u128) + (carry as u128);
        out[i] = sum as u64;
        carry = (sum >> 64) as u64;
        i += 1;
    }
    out
};

fn frobenius_c1_twist() -> Fp2 {
    Fp2 {
        c0: crate::fp::Fp::one(),
        c1: crate::fp::Fp::one(),
    }
    .pow_vartime(&EXP_P_MINUS_1_OVER_3)
}

fn frobenius_c2_twist() -> Fp2 {
    Fp2 {
        c0: crate::fp::Fp::one(),
        c1: crate::fp::Fp::one(),
    }
    .pow_vartime(&EXP_TWO_P_MINUS_2_OVER_3)
}

/// An element `c0 + c1*v + c2*v^2` of `Fp6 = Fp2[v]/(v^3 - (u+1))`.
#[derive(Copy, Clone, Debug, Default)]
pub struct Fp6 {
    pub c0: Fp2,
    pub c1: Fp2,
    pub c2: Fp2,
}

impl ConstantTimeEq for Fp6 {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.c0.ct_eq(&other.c0) & self.c1.ct_eq(&other.c1) & self.c2.ct_eq(&other.c2)
    }
}

impl ConditionallySelectable for Fp6 {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Fp6 {
            c0: Fp2::conditional_select(&a.c0, &b.c0, choice),
            c1: Fp2::conditional_select(&a.c1, &b.c1, choice),
            c2: Fp2::conditional_select(&a.c2, &b.c2, choice),
        }
    }
}

impl PartialEq for Fp6 {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.ct_eq(other))
    }
}
impl Eq for Fp6 {}

impl Fp6 {
    pub fn zero() -> Fp6 {
        Fp6 {
            c0: Fp2::zero(),
            c1: Fp2::zero(),
            c2: Fp2::zero(),
        }
    }

    pub fn one() -> Fp6 {
        Fp6 {
            c0: Fp2::one(),
            c1: Fp2::zero(),
            c2: Fp2::zero(),
        }
    }

    pub fn is_zero(&self) -> Choice {
        self.c0.is_zero() & self.c1.is_zero() & self.c2.is_zero()
    }

    pub fn add(&self, rhs: &Fp6) -> Fp6 {
        Fp6 {
            c0: self.c0 + rhs.c0,
            c1: self.c1 + rhs.c1,
            c2: self.c2 + rhs.c2,
        }
    }

    pub fn sub(&self, rhs: &Fp6) -> Fp6 {
        Fp6 {
            c0: self.c0 - rhs.c0,
            c1: self.c1 - rhs.c1,
            c2: self.c2 - rhs.c2,
        }
    }

    pub fn neg(&self) -> Fp6 {
        Fp6 {
            c0: -self.c0,
            c1: -self.c1,
            c2: -self.c2,
        }
    }

    /// Maps `(c0, c1, c2) -> (c2 * (u+1), c0, c1)`, i.e. multiplication by
    /// the defining non-residue of `Fp12`.
    pub fn mul_by_nonresidue(&self) -> Fp6 {
        Fp6 {
            c0: self.c2.mul_by_nonresidue(),
            c1: self.c0,
            c2: self.c1,
        }
    }

    /// Three-term Karatsuba multiplication over `Fp2`.
    pub fn mul(&self, rhs: &Fp6) -> Fp6 {
        let t0 = self.c0 * rhs.c0;
        let t1 = self.c1 * rhs.c1;
        let t2 = self.c2 * rhs.c2;

        let c0 = t0 + ((self.c1 + self.c2) * (rhs.c1 + rhs.c2) - t1 - t2).mul_by_nonresidue();
        let c1 = (self.c0 + self.c1) * (rhs.c0 + rhs.c1) - t0 - t1 + t2.mul_by_nonresidue();
        let c2 = (self.c0 + self.c2) * (rhs.c0 + rhs.c2) - t0 - t2 + t1;

        Fp6 { c0, c1, c2 }
    }

    /// Multiplies `self` by `c1 * v`, the shape needed by the pairing's
    /// sparse line multiplications.
    pub fn mul_by_1(&self, c1: &Fp2) -> Fp6 {
        Fp6 {
            c0: (self.c2 * c1).mul_by_nonresidue(),
            c1: self.c0 * c1,
            c2: self.c1 * c1,
        }
    }

    /// Multiplies `self` by `c0 + c1 * v`.
    pub fn mul_by_01(&self, c0: &Fp2, c1: &Fp2) -> Fp6 {
        let a_a = self.c0 * c0;
        let b_b = self.c1 * c1;

        let t1 = (self.c1 + self.c2) * c1 - b_b;
        let t1 = t1.mul_by_nonresidue() + a_a;

        let t2 = (c0 + c1) * (self.c0 + self.c1) - a_a - b_b;

        let t3 = (self.c0 + self.c2) * c0 - a_a + b_b;

        Fp6 {
            c0: t1,
            c1: t2,
            c2: t3,
        }
    }

    /// Chung-Hasan SQR2 squaring for cubic extensions.
    pub fn square(&self) -> Fp6 {
        let s0 = self.c0.square();
        let ab = self.c0 * self.c1;
        let s1 = ab.double();
        let s2 = (self.c0 - self.c1 + self.c2).square();
        let bc = self.c1 * self.c2;
        let s3 = bc.double();
        let s4 = self.c2.square();

        Fp6 {
            c0: s3.mul_by_nonresidue() + s0,
            c1: s4.mul_by_nonresidue() + s1,
            c2: s1 + s2 + s3 - s0 - s4,
        }
    }

    /// Frobenius endomorphism `x -> x^p`: coefficient-wise `Fp2` Frobenius,
    /// then `c1` is twisted by `(u+1)^((p-1)/3)` and `c2` by `(u+1)^((2p-2)/3)`.
    pub fn frobenius_map(&self) -> Fp6 {
        Fp6 {
            c0: self.c0.frobenius_map(),
            c1: self.c1.frobenius_map() * frobenius_c1_twist(),
            c2: self.c2.frobenius_map() * frobenius_c2_twist(),
        }
    }

    /// Inversion via the cofactor construction of spec.md §4.5; invalid on
    /// zero.
    pub fn invert(&self) -> CtOption<Fp6> {
        let xi = |x: Fp2| x.mul_by_nonresidue();

        let t0 = self.c0.square() - xi(self.c1 * self.c2);
        let t1 = xi(self.c2.square()) - self.c0 * self.c1;
        let t2 = self.c1.square() - self.c0 * self.c2;

        let denom = self.c0 * t0 + xi(self.c1 * t2 + self.c2 * t1);

        denom.invert().map(|r| Fp6 {
            c0: t0 * r,
            c1: t1 * r,
            c2: t2 * r,
        })
    }
}

impl Neg for Fp6 {
    type Output = Fp6;
    fn neg(self) -> Fp6 {
        Fp6::neg(&self)
    }
}
impl Neg for &Fp6 {
    type Output = Fp6;
    fn neg(self) -> Fp6 {
        Fp6::neg(self)
    }
}

macro_rules! impl_binop {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $func:ident) => {
        impl $trait<&Fp6> for &Fp6 {
            type Output = Fp6;
            fn $method(self, rhs: &Fp6) -> Fp6 {
                Fp6::$func(self, rhs)
            }
        }
        impl $trait<Fp6> for Fp6 {
            type Output = Fp6;
            fn $method(self, rhs: Fp6) -> Fp6 {
                Fp6::$func(&self, &rhs)
            }
        }
        impl $trait<&Fp6> for Fp6 {
            type Output = Fp6;
            fn $method(self, rhs: &Fp6) -> Fp6 {
                Fp6::$func(&self, rhs)
            }
        }
        impl $trait<Fp6> for &Fp6 {
            type Output = Fp6;
            fn $method(self, rhs: Fp6) -> Fp6 {
                Fp6::$func(self, &rhs)
            }
        }
        impl $assign_trait<Fp6> for Fp6 {
            fn $assign_method(&mut self, rhs: Fp6) {
                *self = Fp6::$func(self, &rhs);
            }
        }
        impl $assign_trait<&Fp6> for Fp6 {
            fn $assign_method(&mut self, rhs: &Fp6) {
                *self = Fp6::$func(self, rhs);
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

    fn fp6(a: u64, b: u64, c: u64) -> Fp6 {
        Fp6 {
            c0: Fp2 {
                c0: small(a),
                c1: Fp::zero(),
            },
            c1: Fp2 {
                c0: small(b),
                c1: Fp::zero(),
            },
            c2: Fp2 {
                c0: small(c),
                c1: Fp::zero(),
            },
        }
    }

    #[test]
    fn square_matches_mul() {
        let a = fp6(2, 3, 4);
        assert_eq!(a.square(), a * a);
    }

    #[test]
    fn mul_by_1_matches_general_mul() {
        let a = fp6(2, 3, 4);
        let c1 = Fp2 {
            c0: small(5),
            c1: small(1),
        };
        let b = Fp6 {
            c0: Fp2::zero(),
            c1,
            c2: Fp2::zero(),
        };
        assert_eq!(a.mul_by_1(&c1), a * b);
    }

    #[test]
    fn mul_by_01_matches_general_mul() {
        let a = fp6(2, 3, 4);
        let c0 = Fp2 {
            c0: small(7),
            c1: Fp::zero(),
        };
        let c1 = Fp2 {
            c0: small(5),
            c1: small(1),
        };
        let b = Fp6 {
            c0,
            c1,
            c2: Fp2::zero(),
        };
        assert_eq!(a.mul_by_01(&c0, &c1), a * b);
    }

    #[test]
    fn invert_round_trip() {
        let a = fp6(2, 3, 4);
        let inv = a.invert().unwrap();
        assert_eq!(a * inv, Fp6::one());
    }

    #[test]
    fn frobenius_applied_six_times_is_identity() {
        let a = fp6(2, 3, 4);
        let mut acc = a;
        for _ in 0..6 {
            acc = acc.frobenius_map();
        }
        assert_eq!(acc, a);
    }
}
