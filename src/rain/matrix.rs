use rand::Rng;

use crate::field::Gf256;
use crate::LAMBDA;

/// A square matrix over GF(2); row `i` is packed into a field element so that
/// output bit `i` is the parity of `row_i & x`.
#[derive(Debug, Clone, PartialEq)]
pub struct BitMatrix {
    pub(crate) rows: Vec<Gf256>,
}

impl BitMatrix {
    pub(crate) fn rand<R: Rng>(rng: &mut R) -> Self {
        Self {
            rows: (0..LAMBDA).map(|_| Gf256::rand(rng)).collect(),
        }
    }

    /// Matrix vector product on a packed bit vector.
    pub fn apply(&self, x: &Gf256) -> Gf256 {
        Gf256::from_bits(self.rows.iter().map(|row| {
            row.0
                .iter()
                .zip(x.0.iter())
                .fold(0u32, |acc, (r, v)| acc ^ (r & v).count_ones())
                as u64
                & 1
        }))
    }

    /// Matrix vector product on a vector whose entries live in any GF(2) vector
    /// space, e.g. committed bits.
    pub(crate) fn apply_generic<T>(&self, x: &[T]) -> Vec<T>
    where
        T: Copy + Default + std::ops::BitXor<Output = T>,
    {
        assert_eq!(x.len(), LAMBDA);
        self.rows
            .iter()
            .map(|row| {
                x.iter()
                    .enumerate()
                    .filter(|(j, _)| row.bit(*j) == 1)
                    .fold(T::default(), |acc, (_, &v)| acc ^ v)
            })
            .collect()
    }

    /// Gaussian elimination over GF(2).
    pub fn is_invertible(&self) -> bool {
        let mut m = self.rows.clone();
        for col in 0..LAMBDA {
            let pivot = match (col..LAMBDA).find(|&r| m[r].bit(col) == 1) {
                Some(p) => p,
                None => return false,
            };
            m.swap(col, pivot);
            let pivot_row = m[col];
            for (r, row) in m.iter_mut().enumerate() {
                if r != col && row.bit(col) == 1 {
                    *row += pivot_row;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn identity() -> BitMatrix {
        BitMatrix {
            rows: (0..LAMBDA)
                .map(|i| Gf256::from_bits((0..LAMBDA).map(|j| (i == j) as u64)))
                .collect(),
        }
    }

    #[test]
    fn test_identity() {
        let mut rng = ChaCha20Rng::from_seed([0u8; 32]);
        let m = identity();
        assert!(m.is_invertible());
        let x = Gf256::rand(&mut rng);
        assert_eq!(m.apply(&x), x);
    }

    #[test]
    fn test_singular() {
        let mut m = identity();
        m.rows[5] = m.rows[6];
        assert!(!m.is_invertible());
    }

    #[test]
    fn test_apply_is_linear() {
        let mut rng = ChaCha20Rng::from_seed([0u8; 32]);
        let m = BitMatrix::rand(&mut rng);
        let x = Gf256::rand(&mut rng);
        let y = Gf256::rand(&mut rng);
        assert_eq!(m.apply(&(x + y)), m.apply(&x) + m.apply(&y));

        // bits packed as u8 go through the generic path
        let bits: Vec<u8> = (0..LAMBDA).map(|i| x.bit(i) as u8).collect();
        let out = m.apply_generic(&bits);
        let expected = m.apply(&x);
        for (i, b) in out.iter().enumerate() {
            assert_eq!(*b as u64, expected.bit(i));
        }
    }
}
