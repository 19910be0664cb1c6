//! The base field `Fp` of BLS12-381: a 381-bit prime field, represented
//! internally as six 64-bit limbs in Montgomery form.
//!
//! Montgomery reduction follows Algorithm 14.32 of the Handbook of Applied
//! Cryptography: a 12-limb product is folded down to 6 limbs six rounds at a
//! time, each round clearing one more low limb by adding a multiple of the
//! modulus, followed by at most one final conditional subtraction.

use core::fmt;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

use crate::util::{adc, ct_mask, mac, sbb};

/// `p = 0x1a0111ea397fe69a4b1ba7b6434bacd764774b84f38512bf6730d2a0f6b0f6241eabfffeb153ffffb9feffffffffaaab`
pub(crate) const MODULUS: Fp = Fp([
    0xb9fe_ffff_ffff_aaab,
    0x1eab_fffe_b153_ffff,
    0x6730_d2a0_f6b0_f624,
    0x6477_4b84_f385_12bf,
    0x4b1b_a7b6_434b_acd7,
    0x1a01_11ea_397f_e69a,
]);

/// `-p^{-1} mod 2^64`, used by the Montgomery reduction.
const INV: u64 = 0x89f3_fffc_fffc_fffd;

/// `R = 2^384 mod p`, i.e. the Montgomery form of `1`.
const R: Fp = Fp([
    0x7609_0000_0002_fffd,
    0xebf4_000b_c40c_0002,
    0x5f48_9857_53c7_58ba,
    0x77ce_5853_7052_5745,
    0x5c07_1a97_a256_ec6d,
    0x15f6_5ec3_fa80_e493,
]);

/// `R2 = 2^768 mod p`, used to convert into Montgomery form.
const R2: Fp = Fp([
    0xf4df_1f34_1c34_1746,
    0x0a76_e6a6_09d1_04f1,
    0x8de5_476c_4c95_b6d5,
    0x67eb_88a9_939d_83c0,
    0x9a79_3e85_b519_952d,
    0x1198_8fe5_92ca_e3aa,
]);

/// `R3 = 2^1152 mod p`, used in `from_u768` to reduce a 768-bit random
/// sample in one multiply-reduce instead of two.
const R3: Fp = Fp([
    0xed48_ac6b_d94c_a1e0,
    0x315f_831e_03a7_adf8,
    0x9a53_352a_615e_29dd,
    0x34c0_4e5e_921e_1761,
    0x2512_d435_6572_4728,
    0x0aa6_3460_9175_5d4d,
]);

/// An element of the BLS12-381 base field `Fp`, stored as `a * R mod p` in
/// Montgomery form across six little-endian 64-bit limbs.
///
/// Invariant: the stored limbs always represent a value strictly less than
/// [`MODULUS`].
#[derive(Clone, Copy)]
pub struct Fp(pub(crate) [u64; 6]);

impl fmt::Debug for Fp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes();
        write!(f, "0x")?;
        for b in bytes.iter() {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl Default for Fp {
    fn default() -> Self {
        Fp::zero()
    }
}

impl ConstantTimeEq for Fp {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[0].ct_eq(&other.0[0])
            & self.0[1].ct_eq(&other.0[1])
            & self.0[2].ct_eq(&other.0[2])
            & self.0[3].ct_eq(&other.0[3])
            & self.0[4].ct_eq(&other.0[4])
            & self.0[5].ct_eq(&other.0[5])
    }
}

impl ConditionallySelectable for Fp {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Fp([
            u64::conditional_select(&a.0[0], &b.0[0], choice),
            u64::conditional_select(&a.0[1], &b.0[1], choice),
            u64::conditional_select(&a.0[2], &b.0[2], choice),
            u64::conditional_select(&a.0[3], &b.0[3], choice),
            u64::conditional_select(&a.0[4], &b.0[4], choice),
            u64::conditional_select(&a.0[5], &b.0[5], choice),
        ])
    }
}

impl PartialEq for Fp {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.ct_eq(other))
    }
}
impl Eq for Fp {}

impl Fp {
    /// The additive identity.
    pub const fn zero() -> Fp {
        Fp([0, 0, 0, 0, 0, 0])
    }

    /// The multiplicative identity.
    pub const fn one() -> Fp {
        R
    }

    /// Converts `limbs`, read as a plain (non-Montgomery) little-endian
    /// integer, into its Montgomery-form representation. Used for curve
    /// constants that are most legibly written as small plain integers.
    pub fn from_raw(limbs: [u64; 6]) -> Fp {
        Fp(limbs).mul(&R2)
    }

    /// Parses a base-10 literal (e.g. a generator coordinate copied from a
    /// published standard) via Horner's rule. Panics on non-digit input;
    /// only meant for fixed curve constants, never external data.
    pub(crate) fn from_dec_str(s: &str) -> Fp {
        let ten = Fp::from_raw([10, 0, 0, 0, 0, 0]);
        let mut acc = Fp::zero();
        for byte in s.bytes() {
            assert!(byte.is_ascii_digit(), "from_dec_str: non-digit byte");
            let digit = Fp::from_raw([(byte - b'0') as u64, 0, 0, 0, 0, 0]);
            acc = acc.mul(&ten).add(&digit);
        }
        acc
    }

    /// Returns true iff this is the additive identity.
    pub fn is_zero(&self) -> Choice {
        self.ct_eq(&Fp::zero())
    }

    /// Canonical reduction: subtracts the modulus if `self >= p`, via a
    /// borrow mask, leaving `self` unchanged otherwise.
    #[inline]
    const fn subtract_p(&self) -> Fp {
        let (r0, borrow) = sbb(self.0[0], MODULUS.0[0], 0);
        let (r1, borrow) = sbb(self.0[1], MODULUS.0[1], borrow);
        let (r2, borrow) = sbb(self.0[2], MODULUS.0[2], borrow);
        let (r3, borrow) = sbb(self.0[3], MODULUS.0[3], borrow);
        let (r4, borrow) = sbb(self.0[4], MODULUS.0[4], borrow);
        let (r5, borrow) = sbb(self.0[5], MODULUS.0[5], borrow);

        // If `self < p`, `borrow` is all-ones and we must undo the
        // subtraction by adding `p` back conditionally via the mask.
        let mask = ct_mask((borrow >> 63) as u8);

        let (r0, carry) = adc(r0, MODULUS.0[0] & mask, 0);
        let (r1, carry) = adc(r1, MODULUS.0[1] & mask, carry);
        let (r2, carry) = adc(r2, MODULUS.0[2] & mask, carry);
        let (r3, carry) = adc(r3, MODULUS.0[3] & mask, carry);
        let (r4, carry) = adc(r4, MODULUS.0[4] & mask, carry);
        let (r5, _) = adc(r5, MODULUS.0[5] & mask, carry);

        Fp([r0, r1, r2, r3, r4, r5])
    }

    /// Montgomery reduction of a 768-bit (12-limb) product down to a
    /// canonical 6-limb element, per HAC Algorithm 14.32.
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
        t8: u64,
        t9: u64,
        t10: u64,
        t11: u64,
    ) -> Fp {
        let k = t0.wrapping_mul(INV);
        let (_, carry) = mac(t0, k, MODULUS.0[0], 0);
        let (r1, carry) = mac(t1, k, MODULUS.0[1], carry);
        let (r2, carry) = mac(t2, k, MODULUS.0[2], carry);
        let (r3, carry) = mac(t3, k, MODULUS.0[3], carry);
        let (r4, carry) = mac(t4, k, MODULUS.0[4], carry);
        let (r5, carry) = mac(t5, k, MODULUS.0[5], carry);
        let (r6, carry2) = adc(t6, 0, carry);

        let k = r1.wrapping_mul(INV);
        let (_, carry) = mac(r1, k, MODULUS.0[0], 0);
        let (r2, carry) = mac(r2, k, MODULUS.0[1], carry);
        let (r3, carry) = mac(r3, k, MODULUS.0[2], carry);
        let (r4, carry) = mac(r4, k, MODULUS.0[3], carry);
        let (r5, carry) = mac(r5, k, MODULUS.0[4], carry);
        let (r6, carry) = mac(r6, k, MODULUS.0[5], carry);
        let (r7, carry2) = adc(t7, carry2, carry);

        let k = r2.wrapping_mul(INV);
        let (_, carry) = mac(r2, k, MODULUS.0[0], 0);
        let (r3, carry) = mac(r3, k, MODULUS.0[1], carry);
        let (r4, carry) = mac(r4, k, MODULUS.0[2], carry);
        let (r5, carry) = mac(r5, k, MODULUS.0[3], carry);
        let (r6, carry) = mac(r6, k, MODULUS.0[4], carry);
        let (r7, carry) = mac(r7, k, MODULUS.0[5], carry);
        let (r8, carry2) = adc(t8, carry2, carry);

        let k = r3.wrapping_mul(INV);
        let (_, carry) = mac(r3, k, MODULUS.0[0], 0);
        let (r4, carry) = mac(r4, k, MODULUS.0[1], carry);
        let (r5, carry) = mac(r5, k, MODULUS.0[2], carry);
        let (r6, carry) = mac(r6, k, MODULUS.0[3], carry);
        let (r7, carry) = mac(r7, k, MODULUS.0[4], carry);
        let (r8, carry) = mac(r8, k, MODULUS.0[5], carry);
        let (r9, carry2) = adc(t9, carry2, carry);

        let k = r4.wrapping_mul(INV);
        let (_, carry) = mac(r4, k, MODULUS.0[0], 0);
        let (r5, carry) = mac(r5, k, MODULUS.0[1], carry);
        let (r6, carry) = mac(r6, k, MODULUS.0[2], carry);
        let (r7, carry) = mac(r7, k, MODULUS.0[3], carry);
        let (r8, carry) = mac(r8, k, MODULUS.0[4], carry);
        let (r9, carry) = mac(r9, k, MODULUS.0[5], carry);
        let (r10, carry2) = adc(t10, carry2, carry);

        let k = r5.wrapping_mul(INV);
        let (_, carry) = mac(r5, k, MODULUS.0[0], 0);
        let (r6, carry) = mac(r6, k, MODULUS.0[1], carry);
        let (r7, carry) = mac(r7, k, MODULUS.0[2], carry);
        let (r8, carry) = mac(r8, k, MODULUS.0[3], carry);
        let (r9, carry) = mac(r9, k, MODULUS.0[4], carry);
        let (r10, carry) = mac(r10, k, MODULUS.0[5], carry);
        let (r11, _) = adc(t11, carry2, carry);

        // Result is in [0, 2p), one conditional subtraction makes it canonical.
        Fp([r6, r7, r8, r9, r10, r11]).subtract_p()
    }

    /// `self + self`.
    pub fn double(&self) -> Fp {
        self.add(self)
    }

    /// `self + rhs`, constant time.
    pub fn add(&self, rhs: &Fp) -> Fp {
        let (d0, carry) = adc(self.0[0], rhs.0[0], 0);
        let (d1, carry) = adc(self.0[1], rhs.0[1], carry);
        let (d2, carry) = adc(self.0[2], rhs.0[2], carry);
        let (d3, carry) = adc(self.0[3], rhs.0[3], carry);
        let (d4, carry) = adc(self.0[4], rhs.0[4], carry);
        let (d5, _) = adc(self.0[5], rhs.0[5], carry);

        Fp([d0, d1, d2, d3, d4, d5]).subtract_p()
    }

    /// `self - rhs`, constant time.
    pub fn sub(&self, rhs: &Fp) -> Fp {
        (-rhs).add(self)
    }

    /// `-self`, constant time.
    pub fn neg(&self) -> Fp {
        let (d0, borrow) = sbb(MODULUS.0[0], self.0[0], 0);
        let (d1, borrow) = sbb(MODULUS.0[1], self.0[1], borrow);
        let (d2, borrow) = sbb(MODULUS.0[2], self.0[2], borrow);
        let (d3, borrow) = sbb(MODULUS.0[3], self.0[3], borrow);
        let (d4, borrow) = sbb(MODULUS.0[4], self.0[4], borrow);
        let (d5, _) = sbb(MODULUS.0[5], self.0[5], borrow);

        // If self was zero, (p - 0) == p must collapse back to zero; mask
        // the subtrahend by whether self is zero rather than branch on it.
        let is_nonzero = ((self.0[0] | self.0[1] | self.0[2] | self.0[3] | self.0[4] | self.0[5])
            != 0) as u8;
        let mask = ct_mask(is_nonzero);

        Fp([
            d0 & mask,
            d1 & mask,
            d2 & mask,
            d3 & mask,
            d4 & mask,
            d5 & mask,
        ])
    }

    /// Schoolbook 6x6 multiplication with interleaved Montgomery reduction.
    pub fn mul(&self, rhs: &Fp) -> Fp {
        let (t0, carry) = mac(0, self.0[0], rhs.0[0], 0);
        let (t1, carry) = mac(0, self.0[0], rhs.0[1], carry);
        let (t2, carry) = mac(0, self.0[0], rhs.0[2], carry);
        let (t3, carry) = mac(0, self.0[0], rhs.0[3], carry);
        let (t4, carry) = mac(0, self.0[0], rhs.0[4], carry);
        let (t5, t6) = mac(0, self.0[0], rhs.0[5], carry);

        let (t1, carry) = mac(t1, self.0[1], rhs.0[0], 0);
        let (t2, carry) = mac(t2, self.0[1], rhs.0[1], carry);
        let (t3, carry) = mac(t3, self.0[1], rhs.0[2], carry);
        let (t4, carry) = mac(t4, self.0[1], rhs.0[3], carry);
        let (t5, carry) = mac(t5, self.0[1], rhs.0[4], carry);
        let (t6, t7) = mac(t6, self.0[1], rhs.0[5], carry);

        let (t2, carry) = mac(t2, self.0[2], rhs.0[0], 0);
        let (t3, carry) = mac(t3, self.0[2], rhs.0[1], carry);
        let (t4, carry) = mac(t4, self.0[2], rhs.0[2], carry);
        let (t5, carry) = mac(t5, self.0[2], rhs.0[3], carry);
        let (t6, carry) = mac(t6, self.0[2], rhs.0[4], carry);
        let (t7, t8) = mac(t7, self.0[2], rhs.0[5], carry);

        let (t3, carry) = mac(t3, self.0[3], rhs.0[0], 0);
        let (t4, carry) = mac(t4, self.0[3], rhs.0[1], carry);
        let (t5, carry) = mac(t5, self.0[3], rhs.0[2], carry);
        let (t6, carry) = mac(t6, self.0[3], rhs.0[3], carry);
        let (t7, carry) = mac(t7, self.0[3], rhs.0[4], carry);
        let (t8, t9) = mac(t8, self.0[3], rhs.0[5], carry);

        let (t4, carry) = mac(t4, self.0[4], rhs.0[0], 0);
        let (t5, carry) = mac(t5, self.0[4], rhs.0[1], carry);
        let (t6, carry) = mac(t6, self.0[4], rhs.0[2], carry);
        let (t7, carry) = mac(t7, self.0[4], rhs.0[3], carry);
        let (t8, carry) = mac(t8, self.0[4], rhs.0[4], carry);
        let (t9, t10) = mac(t9, self.0[4], rhs.0[5], carry);

        let (t5, carry) = mac(t5, self.0[5], rhs.0[0], 0);
        let (t6, carry) = mac(t6, self.0[5], rhs.0[1], carry);
        let (t7, carry) = mac(t7, self.0[5], rhs.0[2], carry);
        let (t8, carry) = mac(t8, self.0[5], rhs.0[3], carry);
        let (t9, carry) = mac(t9, self.0[5], rhs.0[4], carry);
        let (t10, t11) = mac(t10, self.0[5], rhs.0[5], carry);

        Self::montgomery_reduce(t0, t1, t2, t3, t4, t5, t6, t7, t8, t9, t10, t11)
    }

    /// `self^2`. Uses the doubled-half-products shortcut: every off-diagonal
    /// term `a_i * a_j` (i < j) is computed once and doubled, then the
    /// diagonal terms `a_i^2` are folded in separately.
    pub fn square(&self) -> Fp {
        let (t1, carry) = mac(0, self.0[0], self.0[1], 0);
        let (t2, carry) = mac(0, self.0[0], self.0[2], carry);
        let (t3, carry) = mac(0, self.0[0], self.0[3], carry);
        let (t4, carry) = mac(0, self.0[0], self.0[4], carry);
        let (t5, t6) = mac(0, self.0[0], self.0[5], carry);

        let (t3, carry) = mac(t3, self.0[1], self.0[2], 0);
        let (t4, carry) = mac(t4, self.0[1], self.0[3], carry);
        let (t5, carry) = mac(t5, self.0[1], self.0[4], carry);
        let (t6, t7) = mac(t6, self.0[1], self.0[5], carry);

        let (t5, carry) = mac(t5, self.0[2], self.0[3], 0);
        let (t6, carry) = mac(t6, self.0[2], self.0[4], carry);
        let (t7, t8) = mac(t7, self.0[2], self.0[5], carry);

        let (t7, carry) = mac(t7, self.0[3], self.0[4], 0);
        let (t8, t9) = mac(t8, self.0[3], self.0[5], carry);

        let (t9, t10) = mac(t9, self.0[4], self.0[5], 0);

        let t11 = t10 >> 63;
        let t10 = (t10 << 1) | (t9 >> 63);
        let t9 = (t9 << 1) | (t8 >> 63);
        let t8 = (t8 << 1) | (t7 >> 63);
        let t7 = (t7 << 1) | (t6 >> 63);
        let t6 = (t6 << 1) | (t5 >> 63);
        let t5 = (t5 << 1) | (t4 >> 63);
        let t4 = (t4 << 1) | (t3 >> 63);
        let t3 = (t3 << 1) | (t2 >> 63);
        let t2 = (t2 << 1) | (t1 >> 63);
        let t1 = t1 << 1;

        let (t0, carry) = mac(0, self.0[0], self.0[0], 0);
        let (t1, carry) = adc(t1, 0, carry);
        let (t2, carry) = mac(t2, self.0[1], self.0[1], carry);
        let (t3, carry) = adc(t3, 0, carry);
        let (t4, carry) = mac(t4, self.0[2], self.0[2], carry);
        let (t5, carry) = adc(t5, 0, carry);
        let (t6, carry) = mac(t6, self.0[3], self.0[3], carry);
        let (t7, carry) = adc(t7, 0, carry);
        let (t8, carry) = mac(t8, self.0[4], self.0[4], carry);
        let (t9, carry) = adc(t9, 0, carry);
        let (t10, carry) = mac(t10, self.0[5], self.0[5], carry);
        let (t11, _) = adc(t11, 0, carry);

        Self::montgomery_reduce(t0, t1, t2, t3, t4, t5, t6, t7, t8, t9, t10, t11)
    }

    /// `self` raised to the given exponent. The exponent is assumed public
    /// (a fixed, compile-time-known bit pattern such as `p - 2`); this
    /// routine must never be called with a secret exponent.
    pub fn pow_vartime(&self, by: &[u64; 6]) -> Fp {
        let mut res = Fp::one();
        for e in by.iter().rev() {
            for i in (0..64).rev() {
                res = res.square();
                if ((*e >> i) & 1) == 1 {
                    res = res.mul(self);
                }
            }
        }
        res
    }

    /// `self^{-1}`, or zero with `is_some() == false` when `self` is zero.
    /// Implemented as `self^{p-2}` (Fermat's little theorem); the exponent
    /// `p - 2` is a fixed public constant, so this is constant time in
    /// `self`.
    pub fn invert(&self) -> CtOption<Fp> {
        // p - 2, derived once from MODULUS rather than duplicated as a literal.
        const P_MINUS_2: [u64; 6] = {
            let (d0, borrow) = sbb(MODULUS.0[0], 2, 0);
            let (d1, borrow) = sbb(MODULUS.0[1], 0, borrow);
            let (d2, borrow) = sbb(MODULUS.0[2], 0, borrow);
            let (d3, borrow) = sbb(MODULUS.0[3], 0, borrow);
            let (d4, borrow) = sbb(MODULUS.0[4], 0, borrow);
            let (d5, _) = sbb(MODULUS.0[5], 0, borrow);
            [d0, d1, d2, d3, d4, d5]
        };

        CtOption::new(self.pow_vartime(&P_MINUS_2), !self.is_zero())
    }

    /// `sqrt(self)`. Since `p ≡ 3 (mod 4)`, a candidate square root is
    /// `self^{(p+1)/4}`; it is verified by squaring and comparing.
    pub fn sqrt(&self) -> CtOption<Fp> {
        const P_PLUS_1_OVER_4: [u64; 6] = {
            let (d0, carry) = adc(MODULUS.0[0], 1, 0);
            let (d1, carry) = adc(MODULUS.0[1], 0, carry);
            let (d2, carry) = adc(MODULUS.0[2], 0, carry);
            let (d3, carry) = adc(MODULUS.0[3], 0, carry);
            let (d4, carry) = adc(MODULUS.0[4], 0, carry);
            let (d5, _) = adc(MODULUS.0[5], 0, carry);
            // divide the 384-bit [d0..d5] by 4 (shift right by two)
            let d0 = (d0 >> 2) | (d1 << 62);
            let d1 = (d1 >> 2) | (d2 << 62);
            let d2 = (d2 >> 2) | (d3 << 62);
            let d3 = (d3 >> 2) | (d4 << 62);
            let d4 = (d4 >> 2) | (d5 << 62);
            let d5 = d5 >> 2;
            [d0, d1, d2, d3, d4, d5]
        };

        let candidate = self.pow_vartime(&P_PLUS_1_OVER_4);
        CtOption::new(candidate, candidate.square().ct_eq(self))
    }

    /// `true` if the canonical representative is strictly greater than
    /// `(p - 1) / 2`.
    pub fn lexicographically_largest(&self) -> Choice {
        // (p - 1) / 2, derived from MODULUS rather than hard-coded, per the
        // reference implementation's own caution about literal drift.
        const HALF_MODULUS_MINUS_ONE: [u64; 6] = {
            let (d0, borrow) = sbb(MODULUS.0[0], 1, 0);
            let (d1, borrow) = sbb(MODULUS.0[1], 0, borrow);
            let (d2, borrow) = sbb(MODULUS.0[2], 0, borrow);
            let (d3, borrow) = sbb(MODULUS.0[3], 0, borrow);
            let (d4, borrow) = sbb(MODULUS.0[4], 0, borrow);
            let (d5, _) = sbb(MODULUS.0[5], 0, borrow);
            let d0 = (d0 >> 1) | (d1 << 63);
            let d1 = (d1 >> 1) | (d2 << 63);
            let d2 = (d2 >> 1) | (d3 << 63);
            let d3 = (d3 >> 1) | (d4 << 63);
            let d4 = (d4 >> 1) | (d5 << 63);
            let d5 = d5 >> 1;
            [d0, d1, d2, d3, d4, d5]
        };

        let canon = self.subtract_p().0;

        let (_, borrow) = sbb(canon[0], HALF_MODULUS_MINUS_ONE[0], 0);
        let (_, borrow) = sbb(canon[1], HALF_MODULUS_MINUS_ONE[1], borrow);
        let (_, borrow) = sbb(canon[2], HALF_MODULUS_MINUS_ONE[2], borrow);
        let (_, borrow) = sbb(canon[3], HALF_MODULUS_MINUS_ONE[3], borrow);
        let (_, borrow) = sbb(canon[4], HALF_MODULUS_MINUS_ONE[4], borrow);
        let (_, borrow) = sbb(canon[5], HALF_MODULUS_MINUS_ONE[5], borrow);

        // borrow is all-ones iff canon < half, i.e. canon <= half - 1, i.e.
        // canon is NOT strictly greater than half; invert that.
        Choice::from((borrow >> 63) as u8 ^ 1)
    }

    /// The low bit of the canonical representative, `sgn0` in
    /// draft-irtf-cfrg-hash-to-curve's sense for a degree-1 extension
    /// (`sgn0_m_eq_1`): `sgn0(0) = 0`, `sgn0(1) = 1`, `sgn0(p-1) = 0`.
    pub fn sgn0(&self) -> Choice {
        Choice::from((self.subtract_p().0[0] & 1) as u8)
    }

    /// Evaluates `sum_i a_i * b_i` in `Fp`, as used by the `Fp2` tower
    /// multiplication and squaring formulas to combine several products
    /// before a single addition chain.
    pub fn sum_of_products(a: &[Fp], b: &[Fp]) -> Fp {
        debug_assert_eq!(a.len(), b.len());
        a.iter()
            .zip(b.iter())
            .fold(Fp::zero(), |acc, (x, y)| acc.add(&x.mul(y)))
    }

    /// Decodes 48 big-endian bytes as a canonical element, rejecting any
    /// input `>= p`.
    pub fn from_bytes(bytes: &[u8; 48]) -> CtOption<Fp> {
        let mut tmp = Fp([0, 0, 0, 0, 0, 0]);

        tmp.0[5] = u64::from_be_bytes(bytes[0..8].try_into().unwrap());
        tmp.0[4] = u64::from_be_bytes(bytes[8..16].try_into().unwrap());
        tmp.0[3] = u64::from_be_bytes(bytes[16..24].try_into().unwrap());
        tmp.0[2] = u64::from_be_bytes(bytes[24..32].try_into().unwrap());
        tmp.0[1] = u64::from_be_bytes(bytes[32..40].try_into().unwrap());
        tmp.0[0] = u64::from_be_bytes(bytes[40..48].try_into().unwrap());

        // Check whether the raw integer is already >= p: if subtracting p
        // does not borrow, it was not canonical.
        let (_, borrow) = sbb(tmp.0[0], MODULUS.0[0], 0);
        let (_, borrow) = sbb(tmp.0[1], MODULUS.0[1], borrow);
        let (_, borrow) = sbb(tmp.0[2], MODULUS.0[2], borrow);
        let (_, borrow) = sbb(tmp.0[3], MODULUS.0[3], borrow);
        let (_, borrow) = sbb(tmp.0[4], MODULUS.0[4], borrow);
        let (_, borrow) = sbb(tmp.0[5], MODULUS.0[5], borrow);
        let is_some = (borrow >> 63) as u8;

        // Convert to Montgomery form.
        tmp = tmp.mul(&R2);

        CtOption::new(tmp, Choice::from(is_some))
    }

    /// Encodes `self` as 48 canonical big-endian bytes.
    pub fn to_bytes(&self) -> [u8; 48] {
        // Undo Montgomery form by reducing against 1.
        let tmp = Self::montgomery_reduce(
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5], 0, 0, 0, 0, 0, 0,
        );

        let mut res = [0; 48];
        res[0..8].copy_from_slice(&tmp.0[5].to_be_bytes());
        res[8..16].copy_from_slice(&tmp.0[4].to_be_bytes());
        res[16..24].copy_from_slice(&tmp.0[3].to_be_bytes());
        res[24..32].copy_from_slice(&tmp.0[2].to_be_bytes());
        res[32..40].copy_from_slice(&tmp.0[1].to_be_bytes());
        res[40..48].copy_from_slice(&tmp.0[0].to_be_bytes());
        res
    }

    /// Reduces a uniformly random 768-bit little-endian-limb integer modulo
    /// `p`, via `from_u768(x) = low_384 * R^2 + high_384 * R^3`: both halves
    /// are lifted into Montgomery form and combined in a single pass, giving
    /// bias below `2^-384`.
    fn from_u768(limbs: [u64; 12]) -> Fp {
        let d0 = Fp([
            limbs[0], limbs[1], limbs[2], limbs[3], limbs[4], limbs[5],
        ]);
        let d1 = Fp([
            limbs[6], limbs[7], limbs[8], limbs[9], limbs[10], limbs[11],
        ]);
        // d0*R2 gives d0 shifted into Montgomery form; d1*R3 does the same
        // for the high half while also accounting for the 384-bit shift.
        d0.mul(&R2).add(&d1.mul(&R3))
    }

    /// Reduces 96 uniformly random bytes (big-endian limbs, matching
    /// [`Fp::from_bytes`]'s byte order) into an element of `Fp`.
    pub fn random(bytes: [u8; 96]) -> Fp {
        let mut limbs = [0u64; 12];
        for i in 0..12 {
            limbs[11 - i] = u64::from_be_bytes(bytes[i * 8..i * 8 + 8].try_into().unwrap());
        }
        Fp::from_u768(limbs)
    }
}

impl Neg for Fp {
    type Output = Fp;
    fn neg(self) -> Fp {
        (&self).neg()
    }
}
impl Neg for &Fp {
    type Output = Fp;
    fn neg(self) -> Fp {
        Fp::neg(self)
    }
}

macro_rules! impl_binop {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $func:ident) => {
        impl $trait<&Fp> for &Fp {
            type Output = Fp;
            fn $method(self, rhs: &Fp) -> Fp {
                Fp::$func(self, rhs)
            }
        }
        impl $trait<Fp> for Fp {
            type Output = Fp;
            fn $method(self, rhs: Fp) -> Fp {
                Fp::$func(&self, &rhs)
            }
        }
        impl $trait<&Fp> for Fp {
            type Output = Fp;
            fn $method(self, rhs: &Fp) -> Fp {
                Fp::$func(&self, rhs)
            }
        }
        impl $trait<Fp> for &Fp {
            type Output = Fp;
            fn $method(self, rhs: Fp) -> Fp {
                Fp::$func(self, &rhs)
            }
        }
        impl $assign_trait<Fp> for Fp {
            fn $assign_method(&mut self, rhs: Fp) {
                *self = Fp::$func(self, &rhs);
            }
        }
        impl $assign_trait<&Fp> for Fp {
            fn $assign_method(&mut self, rhs: &Fp) {
                *self = Fp::$func(self, rhs);
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
    fn zero_is_additive_identity() {
        assert_eq!(Fp::zero() + Fp::one(), Fp::one());
    }

    #[test]
    fn one_times_one_is_one() {
        assert_eq!(Fp::one() * Fp::one(), Fp::one());
    }

    #[test]
    fn neg_of_zero_is_zero() {
        assert_eq!(-Fp::zero(), Fp::zero());
    }

    #[test]
    fn roundtrip_bytes() {
        let a = Fp::one() + Fp::one() + Fp::one();
        let bytes = a.to_bytes();
        let b = Fp::from_bytes(&bytes).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn from_bytes_rejects_modulus() {
        // A direct big-endian encoding of the integer p itself must be rejected.
        let mut p_bytes = [0u8; 48];
        p_bytes[0..8].copy_from_slice(&MODULUS.0[5].to_be_bytes());
        p_bytes[8..16].copy_from_slice(&MODULUS.0[4].to_be_bytes());
        p_bytes[16..24].copy_from_slice(&MODULUS.0[3].to_be_bytes());
        p_bytes[24..32].copy_from_slice(&MODULUS.0[2].to_be_bytes());
        p_bytes[32..40].copy_from_slice(&MODULUS.0[1].to_be_bytes());
        p_bytes[40..48].copy_from_slice(&MODULUS.0[0].to_be_bytes());
        assert!(bool::from(Fp::from_bytes(&p_bytes).is_none()));
    }

    #[test]
    fn invert_zero_is_invalid() {
        assert!(bool::from(Fp::zero().invert().is_none()));
    }

    #[test]
    fn invert_round_trip() {
        let a = Fp::one() + Fp::one() + Fp::one() + Fp::one() + Fp::one();
        let inv = a.invert().unwrap();
        assert_eq!(a * inv, Fp::one());
    }

    #[test]
    fn sqrt_of_square_is_a_root() {
        let a = Fp::one() + Fp::one() + Fp::one() + Fp::one() + Fp::one() + Fp::one() + Fp::one();
        let sq = a.square();
        let root = sq.sqrt().unwrap();
        assert_eq!(root.square(), sq);
    }

    #[test]
    fn negation_matches_scenario_s2() {
        let a = Fp([
            0x5360_BB59_7867_8032,
            0x7DD2_75AE_799E_128E,
            0x5C5B_5071_CE4F_4DCF,
            0xCDB2_1F93_078D_BB3E,
            0xC323_65C5_E73F_474A,
            0x115A_2A54_89BA_BE5B,
        ]);
        let expect = Fp([
            0x669E_44A6_8798_2A79,
            0xA0D9_8A50_37B5_ED71,
            0x0AD5_822F_2861_A854,
            0x96C5_2BF1_EBF7_5781,
            0x87F8_41F0_5C0C_658C,
            0x08A6_E795_AFC5_283E,
        ]);
        assert_eq!(-a, expect);
    }

    #[test]
    fn sqrt_round_trip_matches_scenario_s3() {
        let a = Fp([
            0xAA27_0000_000C_FFF3,
            0x53CC_0032_FC34_000A,
            0x478F_E97A_6B0A_807F,
            0xB1D3_7EBE_E6BA_24D7,
            0x8EC9_733B_BF78_AB2F,
            0x09D6_4551_3D83_DE7E,
        ]);
        let expect_neg_root = Fp([
            0x3213_0000_0006_554F,
            0xB93C_0018_D6C4_0005,
            0x5760_5E0D_B0DD_BB51,
            0x8B25_6521_ED1F_9BCB,
            0x6CF2_8D79_0162_2C03,
            0x11EB_AB9D_BB81_E28C,
        ]);
        let s = a.sqrt().unwrap();
        assert!(s == expect_neg_root || -s == expect_neg_root);
    }

    #[test]
    fn sgn0_matches_scenario_s1() {
        let half = {
            // (p - 1) / 2, via the same raw-limb halving as
            // `lexicographically_largest`'s internal constant.
            let (d0, borrow) = sbb(MODULUS.0[0], 1, 0);
            let (d1, borrow) = sbb(MODULUS.0[1], 0, borrow);
            let (d2, borrow) = sbb(MODULUS.0[2], 0, borrow);
            let (d3, borrow) = sbb(MODULUS.0[3], 0, borrow);
            let (d4, borrow) = sbb(MODULUS.0[4], 0, borrow);
            let (d5, _) = sbb(MODULUS.0[5], 0, borrow);
            let d0 = (d0 >> 1) | (d1 << 63);
            let d1 = (d1 >> 1) | (d2 << 63);
            let d2 = (d2 >> 1) | (d3 << 63);
            let d3 = (d3 >> 1) | (d4 << 63);
            let d4 = (d4 >> 1) | (d5 << 63);
            let d5 = d5 >> 1;
            Fp::from_raw([d0, d1, d2, d3, d4, d5])
        };
        let p_minus_1 = -Fp::one();

        assert!(!bool::from(Fp::zero().sgn0()));
        assert!(bool::from(Fp::one().sgn0()));
        assert!(!bool::from(p_minus_1.sgn0()));
        assert!(bool::from(half.sgn0()));
    }
}
