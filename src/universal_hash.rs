use crate::field::Gf256;
use crate::random_oracle::{Domain, RandomOracle};
use crate::transcript::Digest;
use crate::{ELL, ELL_HAT_BYTES, LAMBDA, LAMBDA_BYTES};

const HASHED_BYTES: usize = (ELL + LAMBDA) / 8;

pub(crate) fn vole_hash(chall_1: &Digest, x: &[u8]) -> Gf256 {
    assert_eq!(x.len(), ELL_HAT_BYTES);
    let r = Gf256::from(chall_1);
    let h = x[..HASHED_BYTES]
        .chunks_exact(LAMBDA_BYTES)
        .fold(Gf256::ZERO, |h, chunk| (h + Gf256::from_slice(chunk)) * r);
    h + Gf256::from_slice(&x[HASHED_BYTES..])
}

/// h_v: the commitment to the hashed columns of the VOLE
pub(crate) fn hash_vole_check(v_tilde: &[Gf256]) -> Digest {
    let mut ro = RandomOracle::new(Domain::VoleCheck);
    v_tilde.iter().for_each(|v| {
        ro.update(v.to_bytes());
    });
    ro.finalize()
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    fn rand_column(rng: &mut ChaCha20Rng) -> Vec<u8> {
        let mut res = vec![0u8; ELL_HAT_BYTES];
        rng.fill_bytes(&mut res);
        res
    }

    #[test]
    fn test_vole_hash_is_linear() {
        let mut rng = ChaCha20Rng::from_seed([0u8; 32]);
        let mut chall = [0u8; 32];
        rng.fill_bytes(&mut chall);

        let x = rand_column(&mut rng);
        let y = rand_column(&mut rng);
        let sum: Vec<u8> = x.iter().zip(y.iter()).map(|(a, b)| a ^ b).collect();
        assert_eq!(
            vole_hash(&chall, &sum),
            vole_hash(&chall, &x) + vole_hash(&chall, &y)
        );
        assert_eq!(vole_hash(&chall, &vec![0u8; ELL_HAT_BYTES]), Gf256::ZERO);
    }

    #[test]
    fn test_vole_hash_detects_changes() {
        let mut rng = ChaCha20Rng::from_seed([0u8; 32]);
        let mut chall = [0u8; 32];
        rng.fill_bytes(&mut chall);
        let x = rand_column(&mut rng);
        let h = vole_hash(&chall, &x);

        for pos in [0, 100, HASHED_BYTES - 1, HASHED_BYTES, ELL_HAT_BYTES - 1] {
            let mut y = x.clone();
            y[pos] ^= 0x10;
            assert_ne!(vole_hash(&chall, &y), h);
        }

        let mut other = chall;
        other[0] ^= 1;
        assert_ne!(vole_hash(&other, &x), h);
    }
}
