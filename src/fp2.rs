//! The quadratic extension `Fp2 = Fp[u]/(u^2 + 1)`.
//!
//! An element `c0 + c1*u` is stored as the pair `(c0, c1)`. Multiplication
//! and squaring avoid a second, independent 6x6 product by folding the
//! cross terms through [`Fp::sum_of_products`] (complex-multiplication
//! shortcut) and the `(a+b)(a-b)` identity respectively.

use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

use crate::fp::Fp;
use crate::util::sbb;

/// `(p - 3) / 4`, the exponent used by the first stage of [`Fp2::sqrt`].
const P_MINUS_3_OVER_4: [u64; 6] = {
    let m = crate::fp::MODULUS.0;
    let (d0, borrow) = sbb(m[0], 3, 0);
    let (d1, borrow) = sbb(m[1], 0, borrow);
    let (d2, borrow) = sbb(m[2], 0, borrow);
    let (d3, borrow) = sbb(m[3], 0, borrow);
    let (d4, borrow) = sbb(m[4], 0, borrow);
    let (d5, _) = sbb(m[5], 0, borrow);
    [
        (d0 >> 2) | (d1 << 62),
        (d1 >> 2) | (d2 << 62),
        (d2 >> 2) | (d3 << 62),
        (d3 >> 2) | (d4 << 62),
        (d4 >> 2) | (d5 << 62),
        d5 >> 2,
    ]
};

/// `(p - 1) / 2`, the exponent used by the second stage of [`Fp2::sqrt`].
const P_MINUS_1_OVER_2: [u64; 6] = {
    let m = crate::fp::MODULUS.0;
    let (d0, borrow) = sbb(m[0], 1, 0);
    let (d1, borrow) = sbb(m[1], 0, borrow);
    let (d2, borrow) = sbb(m[2], 0, borrow);
    let (d3, borrow) = sbb(m[3], 0, borrow);
    let (d4, borrow) = sbb(m[4], 0, borrow);
    let (d5, _) = sbb(m[5], 0, borrow);
    [
        (d0 >> 1) | (d1 << 63),
        (d1 >> 1) | (d2 << 63),
        (d2 >> 1) | (d3 << 63),
        (d3 >> 1) | (d4 << 63),
        (d4 >> 1) | (d5 << 63),
        d5 >> 1,
    ]
};

/// An element `c0 + c1*u` of `Fp2 = Fp[u]/(u^2 + 1)`.
#[derive(Copy, Clone, Debug, Default)]
pub struct Fp2 {
    pub c0: Fp,
    pub c1: Fp,
}

impl ConstantTimeEq for Fp2 {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.c0.ct_eq(&other.c0) & self.c1.ct_eq(&other.c1)
    }
}

impl ConditionallySelectable for Fp2 {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Fp2 {
            c0: Fp::conditional_select(&a.c0, &b.c0, choice),
            c1: Fp::conditional_select(&a.c1, &b.c1, choice),
        }
    }
}

impl PartialEq for Fp2 {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.ct_eq(other))
    }
}
impl Eq for Fp2 {}

impl Fp2 {
    pub fn zero() -> Fp2 {
        Fp2 {
            c0: Fp::zero(),
            c1: Fp::zero(),
        }
    }

    pub fn one() -> Fp2 {
        Fp2 {
            c0: Fp::one(),
            c1: Fp::zero(),
        }
    }

    pub fn is_zero(&self) -> Choice {
        self.c0.is_zero() & self.c1.is_zero()
    }

    /// Complex conjugate: `c0 - c1*u`. This is also the Frobenius map on
    /// `Fp2` over `Fp`, since `Frob(u) = u^p = -u` for `p` odd.
    pub fn conjugate(&self) -> Fp2 {
        Fp2 {
            c0: self.c0,
            c1: -self.c1,
        }
    }

    /// Frobenius endomorphism on `Fp2`, i.e. `x -> x^p`. Equal to
    /// conjugation.
    pub fn frobenius_map(&self) -> Fp2 {
        self.conjugate()
    }

    pub fn add(&self, rhs: &Fp2) -> Fp2 {
        Fp2 {
            c0: self.c0 + rhs.c0,
            c1: self.c1 + rhs.c1,
        }
    }

    pub fn sub(&self, rhs: &Fp2) -> Fp2 {
        Fp2 {
            c0: self.c0 - rhs.c0,
            c1: self.c1 - rhs.c1,
        }
    }

    pub fn neg(&self) -> Fp2 {
        Fp2 {
            c0: -self.c0,
            c1: -self.c1,
        }
    }

    pub fn double(&self) -> Fp2 {
        self.add(self)
    }

    /// `(c0, c1) * (d0, d1) = (c0*d0 - c1*d1, c0*d1 + c1*d0)`, computed via
    /// two calls to [`Fp::sum_of_products`] to share the addition chain.
    pub fn mul(&self, rhs: &Fp2) -> Fp2 {
        let c0 = Fp::sum_of_products(&[self.c0, -self.c1], &[rhs.c0, rhs.c1]);
        let c1 = Fp::sum_of_products(&[self.c0, self.c1], &[rhs.c1, rhs.c0]);
        Fp2 { c0, c1 }
    }

    /// `(a+b)(a-b), 2ab`.
    pub fn square(&self) -> Fp2 {
        let a = self.c0 + self.c1;
        let b = self.c0 - self.c1;
        let c = self.c0 + self.c0;
        Fp2 {
            c0: a * b,
            c1: c * self.c1,
        }
    }

    /// Multiplies by the `Fp6` non-residue `(u + 1)`: `(c0 - c1, c0 + c1)`.
    pub fn mul_by_nonresidue(&self) -> Fp2 {
        Fp2 {
            c0: self.c0 - self.c1,
            c1: self.c0 + self.c1,
        }
    }

    /// `true` iff `c1` is lexicographically largest, or `c1` is zero and
    /// `c0` is lexicographically largest.
    pub fn lexicographically_largest(&self) -> Choice {
        self.c1.lexicographically_largest()
            | (self.c1.is_zero() & self.c0.lexicographically_largest())
    }

    /// `1/(a+bu) = (a-bu)/(a^2+b^2)`, a single `Fp` inversion.
    pub fn invert(&self) -> CtOption<Fp2> {
        let norm = self.c0.square() + self.c1.square();
        norm.invert().map(|norm_inv| Fp2 {
            c0: self.c0 * norm_inv,
            c1: -self.c1 * norm_inv,
        })
    }

    /// Square root via Algorithm 9 of Aranha, Fuentes-Castañeda,
    /// Knapp, Menezes, Rodríguez-Henríquez, "Faster hashing to G2" (2012),
    /// specialized to `p ≡ 3 (mod 4)`.
    pub fn sqrt(&self) -> CtOption<Fp2> {
        let a1 = self.pow_vartime(&P_MINUS_3_OVER_4);
        let alpha = a1.square() * *self;
        let x0 = a1 * *self;

        let neg_one = -Fp2::one();
        let branch_neg_one = Fp2 {
            c0: -x0.c1,
            c1: x0.c0,
        };

        let alpha_plus_one = alpha + Fp2::one();
        let branch_general = alpha_plus_one.pow_vartime(&P_MINUS_1_OVER_2) * x0;

        let candidate = Fp2::conditional_select(
            &branch_general,
            &branch_neg_one,
            alpha.ct_eq(&neg_one),
        );

        CtOption::new(candidate, candidate.square().ct_eq(self))
    }

    /// `self` raised to a public (non-secret) exponent.
    pub fn pow_vartime(&self, by: &[u64; 6]) -> Fp2 {
        let mut res = Fp2::one();
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

impl Neg for Fp2 {
    type Output = Fp2;
    fn neg(self) -> Fp2 {
        Fp2::neg(&self)
    }
}
impl Neg for &Fp2 {
    type Output = Fp2;
    fn neg(self) -> Fp2 {
        Fp2::neg(self)
    }
}

macro_rules! impl_binop {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $func:ident) => {
        impl $trait<&Fp2> for &Fp2 {
            type Output = Fp2;
            fn $method(self, rhs: &Fp2) -> Fp2 {
                Fp2::$func(self, rhs)
            }
        }
        impl $trait<Fp2> for Fp2 {
            type Output = Fp2;
            fn $method(self, rhs: Fp2) -> Fp2 {
                Fp2::$func(&self, &rhs)
            }
        }
        impl $trait<&Fp2> for Fp2 {
            type Output = Fp2;
            fn $method(self, rhs: &Fp2) -> Fp2 {
                Fp2::$func(&self, rhs)
            }
        }
        impl $trait<Fp2> for &Fp2 {
            type Output = Fp2;
            fn $method(self, rhs: Fp2) -> Fp2 {
                Fp2::$func(self, &rhs)
            }
        }
        impl $assign_trait<Fp2> for Fp2 {
            fn $assign_method(&mut self, rhs: Fp2) {
                *self = Fp2::$func(self, &rhs);
            }
        }
        impl $assign_trait<&Fp2> for Fp2 {
            fn $assign_method(&mut self, rhs: &Fp2) {
                *self = Fp2::$func(self, rhs);
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

    fn small(n: u64) -> Fp {
        let mut acc = Fp::zero();
        for _ in 0..n {
            acc += Fp::one();
        }
        acc
    }

    fn fp2(a: u64, b: u64) -> Fp2 {
        Fp2 {
            c0: small(a),
            c1: small(b),
        }
    }

    #[test]
    fn mul_by_nonresidue_matches_definition() {
        let a = fp2(3, 5);
        let one_plus_u = Fp2 {
            c0: Fp::one(),
            c1: Fp::one(),
        };
        assert_eq!(a.mul_by_nonresidue(), a * one_plus_u);
    }

    #[test]
    fn square_matches_mul() {
        let a = fp2(11, 4);
        assert_eq!(a.square(), a * a);
    }

    #[test]
    fn invert_round_trip() {
        let a = fp2(9, 2);
        let inv = a.invert().unwrap();
        assert_eq!(a * inv, Fp2::one());
    }

    #[test]
    fn sqrt_of_square_is_a_root() {
        let a = fp2(7, 3);
        let sq = a.square();
        let root = sq.sqrt().unwrap();
        assert_eq!(root.square(), sq);
    }

    #[test]
    fn frobenius_applied_twice_is_identity() {
        let a = fp2(6, 10);
        assert_eq!(a.frobenius_map().frobenius_map(), a);
    }
}
