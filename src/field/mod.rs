use rand::Rng;
use std::{
    fmt::{self, Debug, Display},
    ops::{Add, AddAssign, BitXor, Mul, MulAssign},
};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroize;

use crate::LAMBDA_BYTES;

/// low limb of the reduction polynomial: x^10 + x^5 + x^2 + 1
const MODULUS_LOW: u64 = 0x425;

/// An element of GF(2)[x] / (x^256 + x^10 + x^5 + x^2 + 1), as four little
/// endian u64 limbs. Bit `i` of the byte encoding is the coefficient of `x^i`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Zeroize)]
pub struct Gf256(pub(crate) [u64; 4]);

impl Debug for Gf256 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Gf256({})", self)
    }
}

impl Display for Gf256 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:016x}{:016x}{:016x}{:016x}",
            self.0[3], self.0[2], self.0[1], self.0[0]
        )
    }
}

impl Add for Gf256 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        let mut res = self;
        res += other;
        res
    }
}

impl AddAssign for Gf256 {
    fn add_assign(&mut self, other: Self) {
        self.0
            .iter_mut()
            .zip(other.0.iter())
            .for_each(|(x, y)| *x ^= y)
    }
}

impl BitXor for Gf256 {
    type Output = Self;

    fn bitxor(self, other: Self) -> Self {
        self + other
    }
}

impl Mul for Gf256 {
    type Output = Self;

    // shift and add, one masked step per bit of `other`
    fn mul(self, other: Self) -> Self {
        let mut acc = [0u64; 4];
        let mut a = self;
        for limb in other.0 {
            for i in 0..64 {
                let mask = 0u64.wrapping_sub((limb >> i) & 1);
                acc.iter_mut()
                    .zip(a.0.iter())
                    .for_each(|(x, y)| *x ^= y & mask);
                a = a.mul_x();
            }
        }
        Self(acc)
    }
}

impl MulAssign for Gf256 {
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other
    }
}

impl ConditionallySelectable for Gf256 {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        let mut res = [0u64; 4];
        for (r, (x, y)) in res.iter_mut().zip(a.0.iter().zip(b.0.iter())) {
            *r = u64::conditional_select(x, y, choice);
        }
        Self(res)
    }
}

impl ConstantTimeEq for Gf256 {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0
            .iter()
            .zip(other.0.iter())
            .fold(Choice::from(1), |acc, (x, y)| acc & x.ct_eq(y))
    }
}

impl From<&[u8; LAMBDA_BYTES]> for Gf256 {
    fn from(bytes: &[u8; LAMBDA_BYTES]) -> Self {
        let mut res = Self::ZERO;
        for (limb, chunk) in res.0.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            *limb = u64::from_le_bytes(buf);
        }
        res
    }
}

impl From<&Gf256> for [u8; LAMBDA_BYTES] {
    fn from(e: &Gf256) -> Self {
        let mut res = [0u8; LAMBDA_BYTES];
        for (chunk, limb) in res.chunks_exact_mut(8).zip(e.0.iter()) {
            chunk.copy_from_slice(&limb.to_le_bytes());
        }
        res
    }
}

/// interleave a zero bit after every bit of `x`
#[inline]
fn spread(x: u32) -> u64 {
    let mut x = x as u64;
    x = (x | (x << 16)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x << 8)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333_3333_3333;
    (x | (x << 1)) & 0x5555_5555_5555_5555
}

impl Gf256 {
    pub const ZERO: Self = Self([0; 4]);
    pub const ONE: Self = Self([1, 0, 0, 0]);
    /// the generator x
    pub const ALPHA: Self = Self([2, 0, 0, 0]);

    /// Read an element from the first 32 bytes of a slice.
    pub(crate) fn from_slice(bytes: &[u8]) -> Self {
        let mut buf = [0u8; LAMBDA_BYTES];
        buf.copy_from_slice(&bytes[..LAMBDA_BYTES]);
        Self::from(&buf)
    }

    pub fn to_bytes(&self) -> [u8; LAMBDA_BYTES] {
        self.into()
    }

    /// sample a uniformly random field element
    pub fn rand<R: Rng>(rng: &mut R) -> Self {
        Self([rng.next_u64(), rng.next_u64(), rng.next_u64(), rng.next_u64()])
    }

    /// The `i`-th coefficient, 0 or 1
    #[inline]
    pub fn bit(&self, i: usize) -> u64 {
        (self.0[i >> 6] >> (i & 63)) & 1
    }

    /// Multiply by a GF(2) scalar given as 0 or 1.
    #[inline]
    pub fn scale(&self, bit: u64) -> Self {
        let mask = 0u64.wrapping_sub(bit & 1);
        Self([
            self.0[0] & mask,
            self.0[1] & mask,
            self.0[2] & mask,
            self.0[3] & mask,
        ])
    }

    /// Multiply by x.
    #[inline]
    pub fn mul_x(&self) -> Self {
        let a = &self.0;
        let carry = a[3] >> 63;
        Self([
            (a[0] << 1) ^ (MODULUS_LOW & 0u64.wrapping_sub(carry)),
            (a[1] << 1) | (a[0] >> 63),
            (a[2] << 1) | (a[1] >> 63),
            (a[3] << 1) | (a[2] >> 63),
        ])
    }

    /// Reduce a 512 bit carry-less product.
    fn reduce(wide: &[u64; 8]) -> Self {
        let mut res = [wide[0], wide[1], wide[2], wide[3]];
        let hi = [wide[4], wide[5], wide[6], wide[7]];

        // hi * x^256 = hi * (x^10 + x^5 + x^2 + 1)
        res.iter_mut().zip(hi.iter()).for_each(|(r, h)| *r ^= h);
        let mut overflow = 0u64;
        for shift in [2u32, 5, 10] {
            res[0] ^= hi[0] << shift;
            for i in 1..4 {
                res[i] ^= (hi[i] << shift) | (hi[i - 1] >> (64 - shift));
            }
            overflow ^= hi[3] >> (64 - shift);
        }
        // the overflow has at most 10 bits, so its reduction stays in the low limb
        res[0] ^= overflow ^ (overflow << 2) ^ (overflow << 5) ^ (overflow << 10);
        Self(res)
    }

    /// Squaring is linear over GF(2): spread the bits and reduce.
    pub fn square(&self) -> Self {
        let mut wide = [0u64; 8];
        for (i, limb) in self.0.iter().enumerate() {
            wide[2 * i] = spread(*limb as u32);
            wide[2 * i + 1] = spread((*limb >> 32) as u32);
        }
        Self::reduce(&wide)
    }

    fn square_n(&self, n: usize) -> Self {
        let mut res = *self;
        for _ in 0..n {
            res = res.square();
        }
        res
    }

    /// Compute self^(2^256 - 2), i.e. the inverse for non-zero elements and
    /// zero for zero, with a fixed Itoh-Tsujii chain.
    pub fn inverse(&self) -> Self {
        // b_n = self^(2^n - 1), b_{m+n} = b_m^(2^n) * b_n
        let b1 = *self;
        let b2 = b1.square() * b1;
        let b4 = b2.square_n(2) * b2;
        let b8 = b4.square_n(4) * b4;
        let b16 = b8.square_n(8) * b8;
        let b32 = b16.square_n(16) * b16;
        let b64 = b32.square_n(32) * b32;
        let b128 = b64.square_n(64) * b64;

        let mut acc = b128;
        for (n, b) in [
            (64, b64),
            (32, b32),
            (16, b16),
            (8, b8),
            (4, b4),
            (2, b2),
            (1, b1),
        ] {
            acc = acc.square_n(n) * b;
        }
        // acc = self^(2^255 - 1)
        acc.square()
    }

    /// Combine bits given from the lowest coefficient up: sum_i bits[i] * x^i.
    pub(crate) fn from_bits(bits: impl Iterator<Item = u64>) -> Self {
        let mut res = Self::ZERO;
        for (i, b) in bits.enumerate() {
            res.0[i >> 6] |= (b & 1) << (i & 63);
        }
        res
    }

    /// Combine field elements as coefficients of x^i: sum_i elems[i] * x^i.
    pub(crate) fn combine(elems: impl DoubleEndedIterator<Item = Self>) -> Self {
        let mut res = Self::ZERO;
        for e in elems.rev() {
            res = res.mul_x() + e;
        }
        res
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_mul() {
        let mut rng = ChaCha20Rng::from_seed([0u8; 32]);
        for _ in 0..20 {
            let a = Gf256::rand(&mut rng);
            let b = Gf256::rand(&mut rng);
            let c = Gf256::rand(&mut rng);

            assert_eq!(a * b, b * a);
            assert_eq!((a * b) * c, a * (b * c));
            assert_eq!(a * (b + c), a * b + a * c);
            assert_eq!(a * Gf256::ONE, a);
            assert_eq!(a * Gf256::ALPHA, a.mul_x());
            assert_eq!(a.square(), a * a);
        }
    }

    #[test]
    fn test_reduction() {
        // x^255 * x = x^10 + x^5 + x^2 + 1
        let mut top = Gf256::ZERO;
        top.0[3] = 1 << 63;
        assert_eq!(top.mul_x(), Gf256([MODULUS_LOW, 0, 0, 0]));
        assert_eq!(top * Gf256::ALPHA, Gf256([MODULUS_LOW, 0, 0, 0]));

        // x^255 * x^255 = x^254 * (x^10 + x^5 + x^2 + 1)
        let expected = {
            let mut x254 = Gf256::ZERO;
            x254.0[3] = 1 << 62;
            x254 * Gf256([MODULUS_LOW, 0, 0, 0])
        };
        assert_eq!(top.square(), expected);
    }

    #[test]
    fn test_inverse() {
        let mut rng = ChaCha20Rng::from_seed([0u8; 32]);
        assert_eq!(Gf256::ZERO.inverse(), Gf256::ZERO);
        assert_eq!(Gf256::ONE.inverse(), Gf256::ONE);
        for _ in 0..10 {
            let a = Gf256::rand(&mut rng);
            assert_eq!(a * a.inverse(), Gf256::ONE);
            assert_eq!(a.inverse().inverse(), a);
        }
    }

    #[test]
    fn test_bits() {
        let mut rng = ChaCha20Rng::from_seed([0u8; 32]);
        let a = Gf256::rand(&mut rng);
        let bytes = a.to_bytes();
        assert_eq!(Gf256::from(&bytes), a);
        assert_eq!(Gf256::from_bits((0..256).map(|i| a.bit(i))), a);
        for i in [0, 7, 8, 63, 64, 200, 255] {
            assert_eq!(a.bit(i), ((bytes[i / 8] >> (i % 8)) & 1) as u64);
        }

        // combining constants reproduces the packed bits
        let elems: Vec<Gf256> = (0..256).map(|i| Gf256::ONE.scale(a.bit(i))).collect();
        assert_eq!(Gf256::combine(elems.into_iter()), a);
    }
}
