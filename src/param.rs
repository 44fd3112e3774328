use crate::{RainRingError, Result};

// =================SHARED PARAM===============
/// Security parameter in bits
pub const LAMBDA: usize = 256;
/// Security parameter in bytes; also the output size of the random oracle
pub const LAMBDA_BYTES: usize = 32;
/// Size of the IV that salts the seed trees
pub const IV_SIZE: usize = 16;
/// Largest supported GGM tree depth per repetition
pub const MAX_K: usize = 12;

// =================RING PARAM=================
/// number of keys in the anonymity set
pub const KEY_NUM: usize = 8;
/// byte size of a secret key, a public key and a ring tree node
pub const TREE_NODE_BYTE_SIZE: usize = 32;
/// number of nodes in the ring commitment tree: 2 * KEY_NUM - 1
pub const TREE_NODE_NUM: usize = 2 * KEY_NUM - 1;
/// Height of the ring commitment tree
pub const TREE_DEPTH: usize = 3;
/// The fixed message that the secret keys encrypt into public keys
pub const RAIN_MSG: [u8; TREE_NODE_BYTE_SIZE] = [0u8; TREE_NODE_BYTE_SIZE];

// =================RAIN PARAM=================
/// number of inversion rounds in Rain
pub const RAIN_ROUNDS: usize = 3;

// =================WITNESS PARAM==============
/// words per tree level: sibling, left input and the sbox outputs
pub const LEVEL_WORDS: usize = 2 + RAIN_ROUNDS;
/// secret key, its sbox outputs, and every tree level
pub const WITNESS_WORDS: usize = 1 + RAIN_ROUNDS + TREE_DEPTH * LEVEL_WORDS;
/// bit position of the first path bit
pub const PATH_BITS_OFFSET: usize = WITNESS_WORDS * LAMBDA;
/// witness length in bits, rounded up to whole field elements
pub const ELL: usize = (PATH_BITS_OFFSET + TREE_DEPTH + LAMBDA - 1) / LAMBDA * LAMBDA;
/// VOLE length: witness, the quicksilver mask and the universal hash mask
pub const ELL_HAT: usize = ELL + 2 * LAMBDA;
/// byte size of the witness
pub const ELL_BYTES: usize = ELL / 8;
/// byte size of one VOLE column
pub const ELL_HAT_BYTES: usize = ELL_HAT / 8;

/// Parameter set of one scheme instance.
///
/// The first `tau0` repetitions use seed trees with `2^k0` leaves, the remaining
/// `tau1` use `2^k1` leaves. Every repetition contributes `k` bits of the global
/// VOLE key, so `tau0 * k0 + tau1 * k1` must equal `lambda`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSet {
    pub lambda: usize,
    pub k0: usize,
    pub k1: usize,
    pub tau0: usize,
    pub tau1: usize,
    pub tau: usize,
}

impl Default for ParamSet {
    fn default() -> Self {
        Self {
            lambda: 256,
            k0: 8,
            k1: 8,
            tau0: 0,
            tau1: 32,
            tau: 32,
        }
    }
}

impl ParamSet {
    pub fn new(
        lambda: usize,
        k0: usize,
        k1: usize,
        tau0: usize,
        tau1: usize,
        tau: usize,
    ) -> Result<Self> {
        let res = Self {
            lambda,
            k0,
            k1,
            tau0,
            tau1,
            tau,
        };
        res.validate()?;
        Ok(res)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lambda != LAMBDA {
            return Err(RainRingError::Configuration(format!(
                "lambda {} is not supported, expected {}",
                self.lambda, LAMBDA
            )));
        }
        if self.tau0 + self.tau1 != self.tau {
            return Err(RainRingError::Configuration(format!(
                "tau0 + tau1 = {} does not match tau = {}",
                self.tau0 + self.tau1,
                self.tau
            )));
        }
        if self.tau == 0 {
            return Err(RainRingError::Configuration(
                "at least one repetition is required".to_string(),
            ));
        }
        for (k, count) in [(self.k0, self.tau0), (self.k1, self.tau1)] {
            if count > 0 && (k == 0 || k > MAX_K) {
                return Err(RainRingError::Configuration(format!(
                    "tree depth {} is outside [1, {}]",
                    k, MAX_K
                )));
            }
        }
        if self.tau0 * self.k0 + self.tau1 * self.k1 != self.lambda {
            return Err(RainRingError::Configuration(format!(
                "tau0 * k0 + tau1 * k1 = {} does not cover lambda = {}",
                self.tau0 * self.k0 + self.tau1 * self.k1,
                self.lambda
            )));
        }
        Ok(())
    }

    /// Depth of the seed tree of the `rep`-th repetition
    pub fn k(&self, rep: usize) -> usize {
        if rep < self.tau0 {
            self.k0
        } else {
            self.k1
        }
    }

    /// Position of the first VOLE key bit owned by the `rep`-th repetition
    pub fn bit_offset(&self, rep: usize) -> usize {
        if rep < self.tau0 {
            rep * self.k0
        } else {
            self.tau0 * self.k0 + (rep - self.tau0) * self.k1
        }
    }
}
