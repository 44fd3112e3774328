use ark_std::{end_timer, start_timer};
use rand::{CryptoRng, RngCore};
use std::fmt;
use subtle::{ConditionallySelectable, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::commit::CommitmentEngine;
use crate::rain::Rain;
use crate::tree::{RingTree, TreeNode};
use crate::{RainRingError, RainRingParam, Result, KEY_NUM, RAIN_MSG, TREE_NODE_BYTE_SIZE};

const fn default_secret_key(i: u8) -> [u8; TREE_NODE_BYTE_SIZE] {
    let mut res = [0xffu8; TREE_NODE_BYTE_SIZE];
    res[TREE_NODE_BYTE_SIZE - 1] = 0xf0 | i;
    res
}

/// Fixed test vectors; never use them outside of tests and benchmarks.
pub const DEFAULT_SECRET_KEYS: [[u8; TREE_NODE_BYTE_SIZE]; KEY_NUM] = [
    default_secret_key(0),
    default_secret_key(1),
    default_secret_key(2),
    default_secret_key(3),
    default_secret_key(4),
    default_secret_key(5),
    default_secret_key(6),
    default_secret_key(7),
];

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(pub(crate) [u8; TREE_NODE_BYTE_SIZE]);

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SecretKey(..)")
    }
}

/// What a verifier needs: the public keys and the tree over them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeySet {
    pub(crate) pkey: Vec<TreeNode>,
    pub(crate) tree: RingTree,
}

/// Secret keys of every slot together with the public ring.
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    pub(crate) skey: Vec<SecretKey>,
    pub(crate) public: PublicKeySet,
}

/// pkey[i] = Rain(skey[i], RAIN_MSG)
pub(crate) fn keygen(rain: &Rain, skey: &[SecretKey]) -> Vec<TreeNode> {
    let timer = start_timer!(|| format!("derive {} public keys", skey.len()));
    let res = skey.iter().map(|sk| rain.encrypt(&sk.0, &RAIN_MSG)).collect();
    end_timer!(timer);
    res
}

impl PublicKeySet {
    /// Rebuild the ring from published public keys.
    pub fn new(pkey: Vec<TreeNode>, pp: &RainRingParam) -> Result<Self> {
        if pkey.len() != KEY_NUM {
            return Err(RainRingError::Configuration(format!(
                "expected {} public keys, got {}",
                KEY_NUM,
                pkey.len()
            )));
        }
        let tree = RingTree::generate(&pkey, &CommitmentEngine::new(&pp.rain))?;
        Ok(Self { pkey, tree })
    }

    pub fn public_keys(&self) -> &[TreeNode] {
        &self.pkey
    }

    pub fn tree(&self) -> &RingTree {
        &self.tree
    }

    pub fn root(&self) -> &TreeNode {
        self.tree.root()
    }
}

impl KeyMaterial {
    /// Build the ring from externally supplied secret keys: runs keygen and
    /// treegen.
    pub fn new<K: AsRef<[u8]>>(skeys: &[K], pp: &RainRingParam) -> Result<Self> {
        let timer = start_timer!(|| "ring key material");
        if skeys.len() != KEY_NUM {
            return Err(RainRingError::Configuration(format!(
                "expected {} secret keys, got {}",
                KEY_NUM,
                skeys.len()
            )));
        }
        let skey = skeys
            .iter()
            .map(|k| {
                let k = k.as_ref();
                if k.len() != TREE_NODE_BYTE_SIZE {
                    return Err(RainRingError::Configuration(format!(
                        "secret key has {} bytes, expected {}",
                        k.len(),
                        TREE_NODE_BYTE_SIZE
                    )));
                }
                let mut buf = [0u8; TREE_NODE_BYTE_SIZE];
                buf.copy_from_slice(k);
                Ok(SecretKey(buf))
            })
            .collect::<Result<Vec<_>>>()?;

        let pkey = keygen(&pp.rain, &skey);
        let public = PublicKeySet::new(pkey, pp)?;
        log::info!("ring of {} keys ready", KEY_NUM);
        end_timer!(timer);
        Ok(Self { skey, public })
    }

    /// The ring of the fixed test vectors.
    pub fn with_default_keys(pp: &RainRingParam) -> Result<Self> {
        Self::new(&DEFAULT_SECRET_KEYS, pp)
    }

    /// A ring of freshly sampled secret keys.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R, pp: &RainRingParam) -> Result<Self> {
        let mut skeys = vec![[0u8; TREE_NODE_BYTE_SIZE]; KEY_NUM];
        for k in skeys.iter_mut() {
            rng.try_fill_bytes(k)?;
        }
        let res = Self::new(&skeys, pp);
        skeys.zeroize();
        res
    }

    pub fn public(&self) -> &PublicKeySet {
        &self.public
    }

    /// Copy out the key of slot `index`, touching every slot the same way.
    pub(crate) fn select_secret(&self, index: usize) -> Zeroizing<[u8; TREE_NODE_BYTE_SIZE]> {
        let mut sk = Zeroizing::new([0u8; TREE_NODE_BYTE_SIZE]);
        for (j, candidate) in self.skey.iter().enumerate() {
            let choice = (j as u64).ct_eq(&(index as u64));
            sk.iter_mut()
                .zip(candidate.0.iter())
                .for_each(|(d, s)| d.conditional_assign(s, choice));
        }
        sk
    }
}
