use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

use crate::LAMBDA_BYTES;

const TAG: &[u8] = b"rain-ring/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum Domain {
    RainConstants = 0x01,
    PkMsg = 0x02,
    RootKey = 0x03,
    Iv = 0x04,
    Challenge1 = 0x05,
    Challenge2 = 0x06,
    Challenge3 = 0x07,
    RepetitionSeed = 0x08,
    TreeExpand = 0x09,
    LeafSeed = 0x0a,
    LeafCommit = 0x0b,
    RepetitionCommit = 0x0c,
    Hcom = 0x0d,
    VoleCheck = 0x0e,
}

#[derive(Clone)]
pub(crate) struct RandomOracle(Sha256);

impl RandomOracle {
    pub(crate) fn new(domain: Domain) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(TAG);
        hasher.update([domain as u8]);
        Self(hasher)
    }

    pub(crate) fn update(&mut self, data: impl AsRef<[u8]>) -> &mut Self {
        self.0.update(data);
        self
    }

    pub(crate) fn update_u32(&mut self, x: u32) -> &mut Self {
        self.update(x.to_le_bytes())
    }

    pub(crate) fn finalize(self) -> [u8; LAMBDA_BYTES] {
        self.0.finalize().into()
    }
}

/// Expand a seed into `len` pseudorandom bytes.
pub(crate) fn prg(seed: &[u8; LAMBDA_BYTES], len: usize) -> Vec<u8> {
    let mut rng = ChaCha20Rng::from_seed(*seed);
    let mut res = vec![0u8; len];
    rng.fill_bytes(&mut res);
    res
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_domain_separation() {
        let mut a = RandomOracle::new(Domain::Challenge1);
        a.update(b"input");
        let mut b = RandomOracle::new(Domain::Challenge2);
        b.update(b"input");
        assert_ne!(a.finalize(), b.finalize());
    }

    #[test]
    fn test_prg() {
        let seed = [7u8; 32];
        let a = prg(&seed, 100);
        let b = prg(&seed, 64);
        assert_eq!(a.len(), 100);
        // the stream does not depend on the requested length
        assert_eq!(a[..64], b[..]);
        assert_ne!(prg(&[8u8; 32], 64), b);
    }
}
