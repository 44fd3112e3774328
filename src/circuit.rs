use std::ops::BitXor;

use crate::field::Gf256;
use crate::rain::Rain;
use crate::tree::{level_salt, TreeNode};
use crate::{LAMBDA, LEVEL_WORDS, PATH_BITS_OFFSET, RAIN_MSG, RAIN_ROUNDS, TREE_DEPTH};

/// A value on the tape, linear in the committed bits.
pub(crate) trait TapeValue: Copy + Default + BitXor<Output = Self> {
    fn mul_x(&self) -> Self;
}

impl TapeValue for Gf256 {
    fn mul_x(&self) -> Self {
        Gf256::mul_x(self)
    }
}

pub(crate) trait ProofTape {
    type Value: TapeValue;

    /// The committed witness bit at `pos`.
    fn committed(&self, pos: usize) -> Self::Value;

    fn constant(&self, c: &Gf256) -> Self::Value;

    /// Record the constraint `x * y + z = 0`.
    fn assert_product(&mut self, x: Self::Value, y: Self::Value, z: Self::Value);
}

/// sum_i bits[i] * x^i
pub(crate) fn lift<V: TapeValue>(bits: &[V]) -> V {
    bits.iter()
        .rev()
        .fold(V::default(), |acc, b| acc.mul_x() ^ *b)
}

fn committed_bits<T: ProofTape>(tape: &T, word: usize) -> Vec<T::Value> {
    (0..LAMBDA)
        .map(|i| tape.committed(word * LAMBDA + i))
        .collect()
}

/// Rain on committed inputs. The sbox outputs are the witness words starting
/// at `first_word`; returns the cipher output.
fn rain_rounds<T: ProofTape>(
    tape: &mut T,
    rain: &Rain,
    key: T::Value,
    input: T::Value,
    first_word: usize,
) -> T::Value {
    let one = tape.constant(&Gf256::ONE);
    let mut state = input;
    for round in 0..RAIN_ROUNDS {
        let bits = committed_bits(tape, first_word + round);
        let sbox_out = lift(&bits);
        let sbox_in = state ^ key ^ tape.constant(&rain.round_constants[round]);
        tape.assert_product(sbox_in, sbox_out, one);
        state = match rain.matrices.get(round) {
            Some(m) => lift(&m.apply_generic(&bits)),
            None => sbox_out,
        };
    }
    state ^ key
}

/// Constrain the witness to a key of the ring with root `root`.
pub(crate) fn ring_membership<T: ProofTape>(tape: &mut T, rain: &Rain, root: &TreeNode) {
    let sk = lift(&committed_bits(tape, 0));
    let msg = tape.constant(&Gf256::from(&RAIN_MSG));
    let mut node = rain_rounds(tape, rain, sk, msg, 1);

    for level in 0..TREE_DEPTH {
        let base = 1 + RAIN_ROUNDS + level * LEVEL_WORDS;
        let sib = lift(&committed_bits(tape, base));
        let left = lift(&committed_bits(tape, base + 1));

        // left is the running node, or its sibling when the path bit is set
        let is_right = tape.committed(PATH_BITS_OFFSET + level);
        tape.assert_product(is_right, node ^ sib, left ^ node);
        let right = node ^ sib ^ left;

        let salt = tape.constant(&Gf256::from(level_salt(level)));
        let digest = rain_rounds(tape, rain, left, right ^ salt, base + 2);
        node = digest ^ right ^ salt;
    }

    let one = tape.constant(&Gf256::ONE);
    let zero = tape.constant(&Gf256::ZERO);
    let root = tape.constant(&Gf256::from(root));
    tape.assert_product(one, node ^ root, zero);
}
