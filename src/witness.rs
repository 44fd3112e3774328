use ark_std::{end_timer, start_timer};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroizing;

use crate::commit::CommitmentEngine;
use crate::field::Gf256;
use crate::tree::{level_salt, parent, sibling, TreeNode};
use crate::{
    KeyMaterial, Rain, ELL_BYTES, KEY_NUM, LAMBDA, LAMBDA_BYTES, PATH_BITS_OFFSET, RAIN_MSG,
    TREE_DEPTH, TREE_NODE_BYTE_SIZE, TREE_NODE_NUM,
};

/// In 256 bit words: the secret key and its sbox outputs, then per tree level
/// the sibling, the left input and the sbox outputs. Path bits start at
/// `PATH_BITS_OFFSET`.
pub(crate) struct Witness {
    bytes: Zeroizing<Vec<u8>>,
}

impl Witness {
    pub(crate) fn new() -> Self {
        Self {
            bytes: Zeroizing::new(vec![0u8; ELL_BYTES]),
        }
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub(crate) fn bit(&self, i: usize) -> u8 {
        (self.bytes[i >> 3] >> (i & 7)) & 1
    }

    pub(crate) fn writer(&mut self) -> WitnessWriter<'_> {
        WitnessWriter {
            buf: &mut self.bytes,
            pos: 0,
        }
    }
}

/// Sequential writer of whole words, plus random access to single bits.
pub(crate) struct WitnessWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> WitnessWriter<'a> {
    /// Current position in bits.
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn write_word(&mut self, word: &[u8; LAMBDA_BYTES]) {
        debug_assert_eq!(self.pos % 8, 0);
        let start = self.pos >> 3;
        self.buf[start..start + LAMBDA_BYTES].copy_from_slice(word);
        self.pos += LAMBDA;
    }

    pub(crate) fn write_field(&mut self, e: &Gf256) {
        self.write_word(&e.to_bytes())
    }

    /// Set bit `i` to `bit` (0 or 1), leaving the cursor untouched.
    pub(crate) fn set_bit(&mut self, i: usize, bit: u8) {
        let mask = 1u8 << (i & 7);
        let byte = &mut self.buf[i >> 3];
        *byte = (*byte & !mask) | ((bit & 1) << (i & 7));
    }
}

fn select_node(dst: &mut TreeNode, src: &TreeNode, choice: Choice) {
    dst.iter_mut()
        .zip(src.iter())
        .for_each(|(d, s)| d.conditional_assign(s, choice));
}

/// Assemble the witness for the key in slot `index` (gen_witness).
///
/// The caller has checked `index < KEY_NUM`.
pub(crate) fn gen_witness(keys: &KeyMaterial, rain: &Rain, index: usize) -> Witness {
    let timer = start_timer!(|| "witness generation");
    let engine = CommitmentEngine::new(rain);
    let nodes = keys.public.tree.nodes();
    let mut witness = Witness::new();
    let mut writer = witness.writer();

    // secret key of the signer
    let sk = keys.select_secret(index);
    writer.write_word(&sk);

    // public key derivation
    let (leaf_out, trace) =
        rain.encrypt_with_trace(&Gf256::from(&*sk), &Gf256::from(&RAIN_MSG));
    for s in trace.iter() {
        writer.write_field(s);
    }
    let mut node = leaf_out.to_bytes();

    // path to the root
    let mut pos = KEY_NUM - 1 + index;
    for level in 0..TREE_DEPTH {
        let sib_pos = sibling(pos);
        let mut sib = [0u8; TREE_NODE_BYTE_SIZE];
        for (q, candidate) in nodes.iter().enumerate().take(TREE_NODE_NUM).skip(1) {
            select_node(&mut sib, candidate, (q as u64).ct_eq(&(sib_pos as u64)));
        }
        writer.write_word(&sib);

        // the running node is a right child iff its position is even
        let is_right = ((pos as u8) & 1) ^ 1;
        writer.set_bit(PATH_BITS_OFFSET + level, is_right);
        let is_right = Choice::from(is_right);

        let mut left = node;
        let mut right = sib;
        select_node(&mut left, &sib, is_right);
        select_node(&mut right, &node, is_right);

        pos = parent(pos);
        node = engine.commit_and_extract(&left, &right, level_salt(level), &mut writer);
    }
    debug_assert_eq!(&node, keys.public.tree.root());
    debug_assert_eq!(writer.position(), PATH_BITS_OFFSET);

    end_timer!(timer);
    witness
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{ParamSet, RainRingParam, ELL, LEVEL_WORDS, RAIN_ROUNDS};

    fn word(w: &Witness, i: usize) -> &[u8] {
        &w.as_bytes()[i * LAMBDA_BYTES..(i + 1) * LAMBDA_BYTES]
    }

    #[test]
    fn test_witness_layout() {
        let pp = RainRingParam::new(ParamSet::default()).unwrap();
        let keys = KeyMaterial::with_default_keys(&pp).unwrap();
        let nodes = keys.public.tree.nodes();

        for index in 0..KEY_NUM {
            let w = gen_witness(&keys, &pp.rain, index);
            assert_eq!(w.as_bytes().len() * 8, ELL);
            assert_eq!(word(&w, 0), &keys.skey[index].0[..]);

            // path bits are the bits of the index
            for level in 0..TREE_DEPTH {
                assert_eq!(w.bit(PATH_BITS_OFFSET + level) as usize, (index >> level) & 1);
            }
            // padding stays zero
            for i in PATH_BITS_OFFSET + TREE_DEPTH..ELL {
                assert_eq!(w.bit(i), 0);
            }

            // siblings along the path
            let mut pos = KEY_NUM - 1 + index;
            for level in 0..TREE_DEPTH {
                let base = 1 + RAIN_ROUNDS + level * LEVEL_WORDS;
                assert_eq!(word(&w, base), &nodes[sibling(pos)][..]);
                let left = if pos % 2 == 1 { pos } else { sibling(pos) };
                assert_eq!(word(&w, base + 1), &nodes[left][..]);
                pos = parent(pos);
            }
        }
    }

    #[test]
    fn test_witness_shape_is_index_independent() {
        let pp = RainRingParam::new(ParamSet::default()).unwrap();
        let keys = KeyMaterial::with_default_keys(&pp).unwrap();
        let a = gen_witness(&keys, &pp.rain, 0);
        let b = gen_witness(&keys, &pp.rain, 7);
        assert_eq!(a.as_bytes().len(), b.as_bytes().len());
        assert_ne!(a.as_bytes(), b.as_bytes());
    }
}
