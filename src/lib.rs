mod circuit;
mod commit;
mod errors;
mod field;
mod keys;
mod param;
mod quicksilver;
mod rain;
mod random_oracle;
mod signature;
mod transcript;
mod tree;
mod universal_hash;
mod veccom;
mod vole;
mod witness;

pub use commit::*;
pub use errors::{RainRingError, Result};
pub use field::Gf256;
pub use keys::*;
pub use param::*;
pub use rain::{BitMatrix, Rain};
pub use signature::*;
pub use tree::{RingTree, TreeNode};
pub use veccom::AllButOneOpening;

use rand::{CryptoRng, RngCore};

pub trait RingSignature {
    type Param;
    type PK;
    type SK;
    type Signature;

    fn setup(params: ParamSet) -> Result<Self::Param>;

    /// Derive the public ring from the secret keys of all its members
    fn key_gen<K: AsRef<[u8]>>(skeys: &[K], pp: &Self::Param) -> Result<(Self::PK, Self::SK)>;

    /// Sign a message on behalf of the ring with the key in slot `index`
    fn sign<R: RngCore + CryptoRng>(
        sk: &Self::SK,
        index: usize,
        message: &[u8],
        pp: &Self::Param,
        rng: &mut R,
    ) -> Result<Self::Signature>;

    fn verify(pk: &Self::PK, message: &[u8], sig: &Self::Signature, pp: &Self::Param) -> bool;
}
