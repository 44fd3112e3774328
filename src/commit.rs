use crate::field::Gf256;
use crate::rain::Rain;
use crate::witness::WitnessWriter;
use crate::{RAIN_ROUNDS, TREE_NODE_BYTE_SIZE};

/// salt for hashing two public keys
pub const S_0: [u8; TREE_NODE_BYTE_SIZE] = [0u8; TREE_NODE_BYTE_SIZE];
/// salt for hashing two inner nodes
pub const S_1: [u8; TREE_NODE_BYTE_SIZE] = {
    let mut s = [0u8; TREE_NODE_BYTE_SIZE];
    s[0] = 1;
    s
};

/// `commit(l, r, s) = Rain_l(r + s) + r + s`
#[derive(Debug, Clone, Copy)]
pub struct CommitmentEngine<'a> {
    rain: &'a Rain,
}

impl<'a> CommitmentEngine<'a> {
    pub fn new(rain: &'a Rain) -> Self {
        Self { rain }
    }

    fn digest_core(
        &self,
        input_0: &[u8; TREE_NODE_BYTE_SIZE],
        input_1: &[u8; TREE_NODE_BYTE_SIZE],
        salt: &[u8; TREE_NODE_BYTE_SIZE],
    ) -> (Gf256, [Gf256; RAIN_ROUNDS]) {
        let key = Gf256::from(input_0);
        let msg = Gf256::from(input_1) + Gf256::from(salt);
        let (out, trace) = self.rain.encrypt_with_trace(&key, &msg);
        (out + msg, trace)
    }

    pub fn commit(
        &self,
        input_0: &[u8; TREE_NODE_BYTE_SIZE],
        input_1: &[u8; TREE_NODE_BYTE_SIZE],
        salt: &[u8; TREE_NODE_BYTE_SIZE],
    ) -> [u8; TREE_NODE_BYTE_SIZE] {
        self.digest_core(input_0, input_1, salt).0.to_bytes()
    }

    /// Commit and append `input_0` followed by every sbox output to the witness.
    pub(crate) fn commit_and_extract(
        &self,
        input_0: &[u8; TREE_NODE_BYTE_SIZE],
        input_1: &[u8; TREE_NODE_BYTE_SIZE],
        salt: &[u8; TREE_NODE_BYTE_SIZE],
        witness: &mut WitnessWriter,
    ) -> [u8; TREE_NODE_BYTE_SIZE] {
        let (digest, trace) = self.digest_core(input_0, input_1, salt);
        witness.write_word(input_0);
        for s in trace.iter() {
            witness.write_field(s);
        }
        digest.to_bytes()
    }
}
