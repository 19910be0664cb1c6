//! The scalar field `Fq` of BLS12-381 (the prime-order subgroup order, often
//! called `r` or `Fr` elsewhere): a 255-bit prime field over four 64-bit
//! limbs in Montgomery form, structurally identical to [`crate::fp::Fp`] but
//! with its own modulus, Montgomery constants, and the extra 2-adic
//! constants `ff::PrimeField` needs for FFT-style code.

use core::fmt;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

use crate::util::{adc, ct_mask, mac, sbb};

/// `q = 0x73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000001`
pub(crate) const MODULUS: Scalar = Scalar([
    0xffff_ffff_0000_0001,
    0x53bd_a402_fffe_5bfe,
    0x3339_d808_09a1_d805,
    0x73ed_a753_299d_7d48,
]);

const INV: u64 = 0xffff_fffe_ffff_ffff;

const R: Scalar = Scalar([
    0x0000_0001_ffff_fffe,
    0x5884_b7fa_0003_4802,
    0x998c_4fef_ecbc_4ff5,
    0x1824_b159_acc5_056f,
]);

const R2: Scalar = Scalar([
    0xc999_e990_f3f2_9c6d,
    0x2b6c_edcb_8792_5c23,
    0x05d3_1496_7254_398f,
    0x0748_d9d9_9f59_ff11,
]);

const R3: Scalar = Scalar([
    0xc62c_1807_439b_73af,
    0x1b3e_0d18_8cf0_6990,
    0x73d1_3c71_c7b5_f418,
    0x6e2a_5bb9_c8db_33e9,
]);

const Q_MINUS_2: [u64; 4] = {
    let (d0, borrow) = sbb(MODULUS.0[0], 2, 0);
    let (d1, borrow) = sbb(MODULUS.0[1], 0, borrow);
    let (d2, borrow) = sbb(MODULUS.0[2], 0, borrow);
    let (d3, _) = sbb(MODULUS.0[3], 0, borrow);
    [d0, d1, d2, d3]
};

/// `(q - 1) >> S`, `S = 32`, the odd part of `q - 1`.
const T: [u64; 4] = {
    let (d0, borrow) = sbb(MODULUS.0[0], 1, 0);
    let (d1, borrow) = sbb(MODULUS.0[1], 0, borrow);
    let (d2, borrow) = sbb(MODULUS.0[2], 0, borrow);
    let (d3, _) = sbb(MODULUS.0[3], 0, borrow);
    [
        (d0 >> 32) | (d1 << 32),
        (d1 >> 32) | (d2 << 32),
        (d2 >> 32) | (d3 << 32),
        d3 >> 32,
    ]
};

/// `2^S`.
const TWO_TO_S: [u64; 4] = [1u64 << 32, 0, 0, 0];

/// An element of the BLS12-381 scalar field `Fq`, in Montgomery form across
/// four little-endian 64-bit limbs.
#[derive(Clone, Copy)]
pub struct Scalar(pub(crate) [u64; 4]);

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes();
        write!(f, "0x")?;
        for b in bytes.iter().rev() {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::zero()
    }
}

impl ConstantTimeEq for Scalar {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[0].ct_eq(&other.0[0])
            & self.0[1].ct_eq(&other.0[1])
            & self.0[2].ct_eq(&other.0[2])
            & self.0[3].ct_eq(&other.0[3])
    }
}

impl ConditionallySelectable for Scalar {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Scalar([
            u64::conditional_select(&a.0[0], &b.0[0], choice),
            u64::conditional_select(&a.0[1], &b.0[1], choice),
            u64::conditional_select(&a.0[2], &b.0[2], choice),
            u64::conditional_select(&a.0[3], &b.0[3], choice),
        ])
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.ct_eq(other))
    }
}
impl Eq for Scalar {}

impl Scalar {
    /// The additive identity.
    pub const fn zero() -> Scalar {
        Scalar([0, 0, 0, 0])
    }

    /// The multiplicative identity.
    pub const fn one() -> Scalar {
        R
    }

    /// Interprets `limbs` as a non-Montgomery (raw) 256-bit little-endian
    /// integer and converts it into a field element.
    pub const fn from_raw(limbs: [u64; 4]) -> Scalar {
        Scalar::mul(&Scalar(limbs), &R2)
    }

    pub fn is_zero(&self) -> Choice {
        self.ct_eq(&Scalar::zero())
    }

    #[inline]
    const fn subtract_q(&self) -> Scalar {
        let (r0, borrow) = sbb(self.0[0], MODULUS.0[0], 0);
        let (r1, borrow) = sbb(self.0[1], MODULUS.0[1], borrow);
        let (r2, borrow) = sbb(self.0[2], MODULUS.0[2], borrow);
        let (r3, borrow) = sbb(self.0[3], MODULUS.0[3], borrow);

        let mask = ct_mask((borrow >> 63) as u8);

        let (r0, carry) = adc(r0, MODULUS.0[0] & mask, 0);
        let (r1, carry) = adc(r1, MODULUS.0[1] & mask, carry);
        let (r2, carry) = adc(r2, MODULUS.0[2] & mask, carry);
        let (r3, _) = adc(r3, MODULUS.0[3] & mask, carry);

        Scalar([r0, r1, r2, r3])
    }

    #[inline]
    const fn montgomery_reduce(
        t0: u64,
        t1: u64,
        t2: u64,
        t3: u64,
        t4: u64,
        t5: u64,
        t6: u64,
        t7: u64,
    ) -> Scalar {
        let k = t0.wrapping_mul(INV);
        let (_, carry) = mac(t0, k, MODULUS.0[0], 0);
        let (r1, carry) = mac(t1, k, MODULUS.0[1], carry);
        let (r2, carry) = mac(t2, k, MODULUS.0[2], carry);
        let (r3, carry) = mac(t3, k, MODULUS.0[3], carry);
        let (r4, carry2) = adc(t4, 0, carry);

        let k = r1.wrapping_mul(INV);
        let (_, carry) = mac(r1, k, MODULUS.0[0], 0);
        let (r2, carry) = mac(r2, k, MODULUS.0[1], carry);
        let (r3, carry) = mac(r3, k, MODULUS.0[2], carry);
        let (r4, carry) = mac(r4, k, MODULUS.0[3], carry);
        let (r5, carry2) = adc(t5, carry2, carry);

        let k = r2.wrapping_mul(INV);
        let (_, carry) = mac(r2, k, MODULUS.0[0], 0);
        let (r3, carry) = mac(r3, k, MODULUS.0[1], carry);
        let (r4, carry) = mac(r4, k, MODULUS.0[2], carry);
        let (r5, carry) = mac(r5, k, MODULUS.0[3], carry);
        let (r6, carry2) = adc(t6, carry2, carry);

        let k = r3.wrapping_mul(INV);
        let (_, carry) = mac(r3, k, MODULUS.0[0], 0);
        let (r4, carry) = mac(r4, k, MODULUS.0[1], carry);
        let (r5, carry) = mac(r5, k, MODULUS.0[2], carry);
        let (r6, carry) = mac(r6, k, MODULUS.0[3], carry);
        let (r7, _) = adc(t7, carry2, carry);

        Scalar([r4, r5, r6, r7]).subtract_q()
    }

    /// `self + rhs`.
    pub const fn add(&self, rhs: &Scalar) -> Scalar {
        let (d0, carry) = adc(self.0[0], rhs.0[0], 0);
        let (d1, carry) = adc(self.0[1], rhs.0[1], carry);
        let (d2, carry) = adc(self.0[2], rhs.0[2], carry);
        let (d3, _) = adc(self.0[3], rhs.0[3], carry);

        Scalar([d0, d1, d2, d3]).subtract_q()
    }

    /// `self - rhs`.
    pub const fn sub(&self, rhs: &Scalar) -> Scalar {
        Scalar::add(&rhs.neg(), self)
    }

    /// `-self`.
    pub const fn neg(&self) -> Scalar {
        let (d0, borrow) = sbb(MODULUS.0[0], self.0[0], 0);
        let (d1, borrow) = sbb(MODULUS.0[1], self.0[1], borrow);
        let (d2, borrow) = sbb(MODULUS.0[2], self.0[2], borrow);
        let (d3, _) = sbb(MODULUS.0[3], self.0[3], borrow);

        let is_nonzero = ((self.0[0] | self.0[1] | self.0[2] | self.0[3]) != 0) as u8;
        let mask = ct_mask(is_nonzero);

        Scalar([d0 & mask, d1 & mask, d2 & mask, d3 & mask])
    }

    /// Schoolbook 4x4 multiplication with interleaved Montgomery reduction.
    pub const fn mul(&self, rhs: &Scalar) -> Scalar {
        let (t0, carry) = mac(0, self.0[0], rhs.0[0], 0);
        let (t1, carry) = mac(0, self.0[0], rhs.0[1], carry);
        let (t2, carry) = mac(0, self.0[0], rhs.0[2], carry);
        let (t3, t4) = mac(0, self.0[0], rhs.0[3], carry);

        let (t1, carry) = mac(t1, self.0[1], rhs.0[0], 0);
        let (t2, carry) = mac(t2, self.0[1], rhs.0[1], carry);
        let (t3, carry) = mac(t3, self.0[1], rhs.0[2], carry);
        let (t4, t5) = mac(t4, self.0[1], rhs.0[3], carry);

        let (t2, carry) = mac(t2, self.0[2], rhs.0[0], 0);
        let (t3, carry) = mac(t3, self.0[2], rhs.0[1], carry);
        let (t4, carry) = mac(t4, self.0[2], rhs.0[2], carry);
        let (t5, t6) = mac(t5, self.0[2], rhs.0[3], carry);

        let (t3, carry) = mac(t3, self.0[3], rhs.0[0], 0);
        let (t4, carry) = mac(t4, self.0[3], rhs.0[1], carry);
        let (t5, carry) = mac(t5, self.0[3], rhs.0[2], carry);
        let (t6, t7) = mac(t6, self.0[3], rhs.0[3], carry);

        Self::montgomery_reduce(t0, t1, t2, t3, t4, t5, t6, t7)
    }

    /// `self^2`.
    pub const fn square(&self) -> Scalar {
        self.mul(self)
    }

    /// `self` doubled.
    pub const fn double(&self) -> Scalar {
        self.add(self)
    }

    /// `self` raised to a public exponent. Must never be used on a secret
    /// exponent.
    pub const fn pow_vartime(&self, by: &[u64; 4]) -> Scalar {
        let mut res = Scalar::one();
        let mut limb_idx = 4;
        while limb_idx > 0 {
            limb_idx -= 1;
            let e = by[limb_idx];
            let mut bit = 64;
            while bit > 0 {
                bit -= 1;
                res = res.square();
                if ((e >> bit) & 1) == 1 {
                    res = Scalar::mul(&res, self);
                }
            }
        }
        res
    }

    /// `self` raised to a secret exponent, given as a canonical little-endian
    /// limb array. The exponent bits are still processed MSB-first but every
    /// iteration performs the same squarings and multiplications regardless
    /// of the bit value, via `conditional_select`.
    pub fn pow(&self, by: &[u64; 4]) -> Scalar {
        let mut res = Scalar::one();
        for e in by.iter().rev() {
            for i in (0..64).rev() {
                res = res.square();
                let bit = Choice::from(((e >> i) & 1) as u8);
                let multiplied = res * self;
                res = Scalar::conditional_select(&res, &multiplied, bit);
            }
        }
        res
    }

    /// `self^{-1}` computed as `self^{q-2}` (the exponent is fixed and
    /// public); invalid (returns `is_none`) on zero.
    pub fn invert(&self) -> CtOption<Scalar> {
        CtOption::new(self.pow_vartime(&Q_MINUS_2), !self.is_zero())
    }

    const fn invert_for_const(&self) -> Scalar {
        self.pow_vartime(&Q_MINUS_2)
    }

    /// Decodes 32 little-endian bytes as a canonical element, rejecting any
    /// input `>= q`.
    pub fn from_bytes(bytes: &[u8; 32]) -> CtOption<Scalar> {
        let mut tmp = Scalar([0, 0, 0, 0]);
        tmp.0[0] = u64::from_le_bytes(bytes[0..8].try_into().unwrap());
        tmp.0[1] = u64::from_le_bytes(bytes[8..16].try_into().unwrap());
        tmp.0[2] = u64::from_le_bytes(bytes[16..24].try_into().unwrap());
        tmp.0[3] = u64::from_le_bytes(bytes[24..32].try_into().unwrap());

        let (_, borrow) = sbb(tmp.0[0], MODULUS.0[0], 0);
        let (_, borrow) = sbb(tmp.0[1], MODULUS.0[1], borrow);
        let (_, borrow) = sbb(tmp.0[2], MODULUS.0[2], borrow);
        let (_, borrow) = sbb(tmp.0[3], MODULUS.0[3], borrow);
        let is_some = (borrow >> 63) as u8;

        tmp = tmp.mul(&R2);
        CtOption::new(tmp, Choice::from(is_some))
    }

    /// Encodes `self` as 32 canonical little-endian bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        let tmp = Self::montgomery_reduce(self.0[0], self.0[1], self.0[2], self.0[3], 0, 0, 0, 0);

        let mut res = [0; 32];
        res[0..8].copy_from_slice(&tmp.0[0].to_le_bytes());
        res[8..16].copy_from_slice(&tmp.0[1].to_le_bytes());
        res[16..24].copy_from_slice(&tmp.0[2].to_le_bytes());
        res[24..32].copy_from_slice(&tmp.0[3].to_le_bytes());
        res
    }

    /// Reduces 64 uniformly random little-endian bytes modulo `q`, via
    /// `low * R2 + high * R3`, mirroring [`crate::fp::Fp::random`].
    pub fn from_bytes_wide(bytes: &[u8; 64]) -> Scalar {
        let d0 = Scalar([
            u64::from_le_bytes(bytes[0..8].try_into().unwrap()),
            u64::from_le_bytes(bytes[8..16].try_into().unwrap()),
            u64::from_le_bytes(bytes[16..24].try_into().unwrap()),
            u64::from_le_bytes(bytes[24..32].try_into().unwrap()),
        ]);
        let d1 = Scalar([
            u64::from_le_bytes(bytes[32..40].try_into().unwrap()),
            u64::from_le_bytes(bytes[40..48].try_into().unwrap()),
            u64::from_le_bytes(bytes[48..56].try_into().unwrap()),
            u64::from_le_bytes(bytes[56..64].try_into().unwrap()),
        ]);
        d0.mul(&R2).add(&d1.mul(&R3))
    }

    /// Reduces a 512-bit (8-limb) little-endian integer modulo `q`.
    pub fn from_u512(limbs: [u64; 8]) -> Scalar {
        let d0 = Scalar([limbs[0], limbs[1], limbs[2], limbs[3]]);
        let d1 = Scalar([limbs[4], limbs[5], limbs[6], limbs[7]]);
        d0.mul(&R2).add(&d1.mul(&R3))
    }

    /// Consumes `rng` for 64 bytes and reduces them modulo `q` via
    /// [`Scalar::from_bytes_wide`] (the `RngCore` interface is the only
    /// randomness boundary this crate depends on).
    pub fn random(mut rng: impl rand_core::RngCore) -> Scalar {
        let mut buf = [0u8; 64];
        rng.fill_bytes(&mut buf);
        Scalar::from_bytes_wide(&buf)
    }
}

/// A fixed multiplicative generator of `Fq*`; also a quadratic non-residue.
const GENERATOR: Scalar = Scalar::from_raw([7, 0, 0, 0]);

/// `2^{-1} mod q`.
pub const TWO_INV: Scalar = Scalar::from_raw([2, 0, 0, 0]).invert_for_const();

/// 2-adicity of `q - 1`.
pub const S: u32 = 32;

/// A primitive `2^S`-th root of unity, `GENERATOR^T` where `T = (q-1) >> S`.
pub const ROOT_OF_UNITY: Scalar = GENERATOR.pow_vartime(&T);

/// `ROOT_OF_UNITY^{-1}`.
pub const ROOT_OF_UNITY_INV: Scalar = ROOT_OF_UNITY.invert_for_const();

/// `GENERATOR^{2^S}`; satisfies `DELTA^T = 1` since `T` is the odd part of
/// `q - 1`.
pub const DELTA: Scalar = GENERATOR.pow_vartime(&TWO_TO_S);

impl Neg for Scalar {
    type Output = Scalar;
    fn neg(self) -> Scalar {
        Scalar::neg(&self)
    }
}
impl Neg for &Scalar {
    type Output = Scalar;
    fn neg(self) -> Scalar {
        Scalar::neg(self)
    }
}

macro_rules! impl_binop {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $func:ident) => {
        impl $trait<&Scalar> for &Scalar {
            type Output = Scalar;
            fn $method(self, rhs: &Scalar) -> Scalar {
                Scalar::$func(self, rhs)
            }
        }
        impl $trait<Scalar> for Scalar {
            type Output = Scalar;
            fn $method(self, rhs: Scalar) -> Scalar {
                Scalar::$func(&self, &rhs)
            }
        }
        impl $trait<&Scalar> for Scalar {
            type Output = Scalar;
            fn $method(self, rhs: &Scalar) -> Scalar {
                Scalar::$func(&self, rhs)
            }
        }
        impl $trait<Scalar> for &Scalar {
            type Output = Scalar;
            fn $method(self, rhs: Scalar) -> Scalar {
                Scalar::$func(self, &rhs)
            }
        }
        impl $assign_trait<Scalar> for Scalar {
            fn $assign_method(&mut self, rhs: Scalar) {
                *self = Scalar::$func(self, &rhs);
            }
        }
        impl $assign_trait<&Scalar> for Scalar {
            fn $assign_method(&mut self, rhs: &Scalar) {
                *self = Scalar::$func(self, rhs);
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

    #[test]
    fn one_is_multiplicative_identity() {
        assert_eq!(Scalar::one() * Scalar::one(), Scalar::one());
    }

    #[test]
    fn invert_round_trip() {
        let a = Scalar::from_raw([12345, 0, 0, 0]);
        let inv = a.invert().unwrap();
        assert_eq!(a * inv, Scalar::one());
    }

    #[test]
    fn invert_zero_is_invalid() {
        assert!(bool::from(Scalar::zero().invert().is_none()));
    }

    #[test]
    fn two_inv_constant() {
        assert_eq!(Scalar::from_raw([2, 0, 0, 0]) * TWO_INV, Scalar::one());
    }

    #[test]
    fn root_of_unity_has_order_two_to_the_s() {
        let two_to_s = [1u64 << S, 0, 0, 0];
        assert_eq!(ROOT_OF_UNITY.pow_vartime(&two_to_s), Scalar::one());
    }

    #[test]
    fn root_of_unity_inv_round_trips() {
        assert_eq!(ROOT_OF_UNITY * ROOT_OF_UNITY_INV, Scalar::one());
    }

    #[test]
    fn delta_to_the_t_is_one() {
        assert_eq!(DELTA.pow_vartime(&T), Scalar::one());
    }

    #[test]
    fn bytes_round_trip() {
        let a = Scalar::from_raw([42, 7, 0, 0]);
        let bytes = a.to_bytes();
        let b = Scalar::from_bytes(&bytes).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn from_bytes_rejects_modulus() {
        let mut q_bytes = [0u8; 32];
        q_bytes[0..8].copy_from_slice(&0xffff_ffff_0000_0001u64.to_le_bytes());
        q_bytes[8..16].copy_from_slice(&0x53bd_a402_fffe_5bfeu64.to_le_bytes());
        q_bytes[16..24].copy_from_slice(&0x3339_d808_09a1_d805u64.to_le_bytes());
        q_bytes[24..32].copy_from_slice(&0x73ed_a753_299d_7d48u64.to_le_bytes());
        assert!(bool::from(Scalar::from_bytes(&q_bytes).is_none()));
    }
}
